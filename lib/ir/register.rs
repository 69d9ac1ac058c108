use serde::{Deserialize, Serialize};
use std::fmt;

/// A virtual register of a method frame.
///
/// `Register::RESULT` is the pseudo register invokes write their return value
/// to, and `move-result` reads from.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Register(u32);

impl Register {
    pub const RESULT: Register = Register(u32::MAX);

    pub fn new(number: u32) -> Register {
        Register(number)
    }

    pub fn number(&self) -> u32 {
        self.0
    }

    pub fn is_result(&self) -> bool {
        *self == Register::RESULT
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_result() {
            write!(f, "RESULT")
        } else {
            write!(f, "v{}", self.0)
        }
    }
}
