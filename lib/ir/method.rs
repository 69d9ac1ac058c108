//! A `Method` is a `MethodRef` with access flags, a frame size and an
//! optional body.

use crate::ir::*;
use crate::Error;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;

bitflags! {
    /// Dex access flags.
    #[derive(Deserialize, Serialize)]
    pub struct AccessFlags: u32 {
        const PUBLIC = 0x1;
        const PRIVATE = 0x2;
        const PROTECTED = 0x4;
        const STATIC = 0x8;
        const FINAL = 0x10;
        const SYNCHRONIZED = 0x20;
        const VOLATILE = 0x40;
        const BRIDGE = 0x40;
        const TRANSIENT = 0x80;
        const VARARGS = 0x80;
        const NATIVE = 0x100;
        const INTERFACE = 0x200;
        const ABSTRACT = 0x400;
        const STRICT = 0x800;
        const SYNTHETIC = 0x1000;
        const ANNOTATION = 0x2000;
        const ENUM = 0x4000;
        const CONSTRUCTOR = 0x10000;
    }
}

/// A method and, unless it is abstract or native, its body.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Method {
    method_ref: MethodRef,
    access_flags: AccessFlags,
    registers_size: u32,
    code: Option<ControlFlowGraph>,
}

impl Method {
    /// Create a new method.
    ///
    /// `registers_size` is the size of the whole register frame. Parameters
    /// occupy its last registers.
    pub fn new(
        method_ref: MethodRef,
        access_flags: AccessFlags,
        registers_size: u32,
        code: Option<ControlFlowGraph>,
    ) -> Method {
        Method {
            method_ref,
            access_flags,
            registers_size,
            code,
        }
    }

    /// Deserialize a method from JSON.
    pub fn from_json(json: &str) -> Result<Method, Error> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize this method to JSON.
    pub fn to_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn method_ref(&self) -> &MethodRef {
        &self.method_ref
    }

    pub fn access_flags(&self) -> AccessFlags {
        self.access_flags
    }

    pub fn is_static(&self) -> bool {
        self.access_flags.contains(AccessFlags::STATIC)
    }

    pub fn registers_size(&self) -> u32 {
        self.registers_size
    }

    /// The body of this method, if it has one.
    pub fn code(&self) -> Option<&ControlFlowGraph> {
        self.code.as_ref()
    }

    pub fn code_mut(&mut self) -> Option<&mut ControlFlowGraph> {
        self.code.as_mut()
    }

    /// Every register of the frame, in order. `RESULT` is not included.
    pub fn registers(&self) -> impl Iterator<Item = Register> {
        (0..self.registers_size).map(Register::new)
    }

    /// The number of registers the parameters take, `this` included.
    pub fn ins_size(&self) -> u32 {
        let this = if self.is_static() { 0 } else { 1 };
        self.method_ref
            .proto()
            .parameters()
            .iter()
            .fold(this, |size, parameter| {
                size + if parameter.is_wide() { 2 } else { 1 }
            })
    }

    /// The register each parameter arrives in, with its declared type.
    ///
    /// Instance methods receive `this` first, typed as the owner. Wide
    /// parameters occupy two registers and are reported by the first one.
    pub fn parameter_registers(&self) -> Result<Vec<(Register, DexType)>, Error> {
        let ins_size = self.ins_size();
        if ins_size > self.registers_size {
            return Err(Error::Custom(format!(
                "{} needs {} parameter registers but its frame has {}",
                self.method_ref, ins_size, self.registers_size
            )));
        }

        let mut number = self.registers_size - ins_size;
        let mut parameters = Vec::new();

        if !self.is_static() {
            parameters.push((Register::new(number), self.method_ref.owner().clone()));
            number += 1;
        }

        for parameter in self.method_ref.proto().parameters() {
            parameters.push((Register::new(number), parameter.clone()));
            number += if parameter.is_wide() { 2 } else { 1 };
        }

        Ok(parameters)
    }

    /// Every instruction of the body with its `ProgramPoint`, block by block.
    pub fn instructions(&self) -> Vec<(ProgramPoint, &Instruction)> {
        let mut instructions = Vec::new();
        if let Some(code) = self.code.as_ref() {
            for block in code.blocks() {
                for (position, instruction) in block.instructions().iter().enumerate() {
                    instructions.push((ProgramPoint::new(block.index(), position), instruction));
                }
            }
        }
        instructions
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "method {} (registers: {})", self.method_ref, self.registers_size)?;
        if let Some(code) = self.code.as_ref() {
            write!(f, "{}", code)?;
        }
        Ok(())
    }
}
