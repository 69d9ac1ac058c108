//! Implementations and traits for static analysis over the register IR.

pub mod fixed_point;
pub mod options;
pub mod reflection;

pub use self::options::{Options, OptionsBuilder};
pub use self::reflection::SimpleReflectionAnalysis;
