//! The register IR consumed by dexflow's analyses.
//!
//! The IR follows the shape of Dex bytecode after it has been split into
//! basic blocks:
//!
//! * A `Method` owns an optional body, a `ControlFlowGraph` of `Block`s joined
//! by `Edge`s.
//! * A `Block` is a list of `Instruction`s. Each `Instruction` has an
//! `Opcode`, an optional destination `Register`, source registers, and a
//! `Payload` (a literal, a string, a type, a field or a method).
//! * Invokes do not name a destination. Their value is written to the
//! `Register::RESULT` pseudo register, and a following `move-result*` copies
//! it into a real register.
//! * A `ProgramPoint` names one instruction as a block index and a position
//! within that block.
//!
//! Types are Dex descriptors held by `DexType`. A `ClassHierarchy` provides
//! superclass links and finality, which is all the analyses need to know about
//! classes outside the method being analyzed.
//!
//! Nothing here parses dex files. Bodies are built with the `Block` builder
//! methods, or exchanged as JSON through serde.

mod block;
mod control_flow_graph;
mod edge;
mod hierarchy;
mod instruction;
mod location;
mod method;
mod opcode;
mod register;
mod types;

pub use self::block::*;
pub use self::control_flow_graph::*;
pub use self::edge::*;
pub use self::hierarchy::*;
pub use self::instruction::*;
pub use self::location::*;
pub use self::method::*;
pub use self::opcode::*;
pub use self::register::*;
pub use self::types::*;

/// A convenience function to create a new register.
pub fn reg(number: u32) -> Register {
    Register::new(number)
}

/// A convenience function to create a new type from its descriptor.
pub fn dex_type(descriptor: &str) -> DexType {
    DexType::new(descriptor)
}
