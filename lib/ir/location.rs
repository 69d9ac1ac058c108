use serde::{Deserialize, Serialize};
use std::fmt;

/// The location of one instruction within a method body.
///
/// `instruction` is the position of the instruction inside its block, so
/// `ProgramPoint::new(block, 0)` is the first instruction of `block`.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct ProgramPoint {
    block: usize,
    instruction: usize,
}

impl ProgramPoint {
    pub fn new(block: usize, instruction: usize) -> ProgramPoint {
        ProgramPoint { block, instruction }
    }

    pub fn block(&self) -> usize {
        self.block
    }

    pub fn instruction(&self) -> usize {
        self.instruction
    }
}

impl fmt::Display for ProgramPoint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "0x{:X}:{}", self.block, self.instruction)
    }
}
