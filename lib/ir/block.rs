//! A `Block` is a straight-line sequence of `Instruction`s.
//!
//! Blocks are created through `ControlFlowGraph::new_block`, and filled with
//! the builder methods below, one per Dex operation shape.

use crate::ir::*;
use crate::{graph, Error};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A basic block.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct Block {
    /// The index of the block.
    index: usize,
    /// The instructions for this block.
    instructions: Vec<Instruction>,
}

impl Block {
    pub(crate) fn new(index: usize) -> Block {
        Block {
            index,
            instructions: Vec::new(),
        }
    }

    /// Returns the index of this block
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns this block's instructions
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Returns an instruction by its position in this block.
    pub fn instruction(&self, position: usize) -> Result<&Instruction, Error> {
        self.instructions.get(position).ok_or_else(|| {
            Error::Custom(format!(
                "No instruction at position {} in block {}",
                position, self.index
            ))
        })
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Appends an arbitrary instruction to the end of this block.
    pub fn push(&mut self, instruction: Instruction) {
        self.instructions.push(instruction);
    }

    fn emit(&mut self, opcode: Opcode, dest: Option<Register>, srcs: Vec<Register>, payload: Payload) {
        self.push(Instruction::new(opcode, dest, srcs, payload));
    }

    pub fn nop(&mut self) {
        self.emit(Opcode::Nop, None, vec![], Payload::None);
    }

    /// Adds a `const` of a narrow literal.
    pub fn const_literal(&mut self, dest: Register, literal: i64) {
        self.emit(Opcode::Const, Some(dest), vec![], Payload::Literal(literal));
    }

    pub fn const_wide(&mut self, dest: Register, literal: i64) {
        self.emit(Opcode::ConstWide, Some(dest), vec![], Payload::Literal(literal));
    }

    /// Adds a `const-string`, loading a string literal into `dest`.
    pub fn const_string<S: Into<String>>(&mut self, dest: Register, string: S) {
        self.emit(
            Opcode::ConstString,
            Some(dest),
            vec![],
            Payload::String(string.into()),
        );
    }

    /// Adds a `const-class`, loading the `Class` token of a type into `dest`.
    pub fn const_class<T: Into<DexType>>(&mut self, dest: Register, dex_type: T) {
        self.emit(
            Opcode::ConstClass,
            Some(dest),
            vec![],
            Payload::Type(dex_type.into()),
        );
    }

    /// Adds a narrow `move`.
    pub fn mov(&mut self, dest: Register, src: Register) {
        self.emit(Opcode::Move, Some(dest), vec![src], Payload::None);
    }

    pub fn move_wide(&mut self, dest: Register, src: Register) {
        self.emit(Opcode::MoveWide, Some(dest), vec![src], Payload::None);
    }

    pub fn move_object(&mut self, dest: Register, src: Register) {
        self.emit(Opcode::MoveObject, Some(dest), vec![src], Payload::None);
    }

    pub fn move_result(&mut self, dest: Register) {
        self.emit(Opcode::MoveResult, Some(dest), vec![], Payload::None);
    }

    pub fn move_result_wide(&mut self, dest: Register) {
        self.emit(Opcode::MoveResultWide, Some(dest), vec![], Payload::None);
    }

    pub fn move_result_object(&mut self, dest: Register) {
        self.emit(Opcode::MoveResultObject, Some(dest), vec![], Payload::None);
    }

    pub fn move_exception(&mut self, dest: Register) {
        self.emit(Opcode::MoveException, Some(dest), vec![], Payload::None);
    }

    pub fn new_instance<T: Into<DexType>>(&mut self, dest: Register, dex_type: T) {
        self.emit(
            Opcode::NewInstance,
            Some(dest),
            vec![],
            Payload::Type(dex_type.into()),
        );
    }

    /// Adds a `new-array` of `array_type`, with its length held in `size`.
    pub fn new_array<T: Into<DexType>>(&mut self, dest: Register, size: Register, array_type: T) {
        self.emit(
            Opcode::NewArray,
            Some(dest),
            vec![size],
            Payload::Type(array_type.into()),
        );
    }

    pub fn check_cast<T: Into<DexType>>(&mut self, dest: Register, src: Register, dex_type: T) {
        self.emit(
            Opcode::CheckCast,
            Some(dest),
            vec![src],
            Payload::Type(dex_type.into()),
        );
    }

    pub fn instance_of<T: Into<DexType>>(&mut self, dest: Register, src: Register, dex_type: T) {
        self.emit(
            Opcode::InstanceOf,
            Some(dest),
            vec![src],
            Payload::Type(dex_type.into()),
        );
    }

    pub fn array_length(&mut self, dest: Register, array: Register) {
        self.emit(Opcode::ArrayLength, Some(dest), vec![array], Payload::None);
    }

    /// Adds an `aget`, or `aget-object` when `object` is true.
    pub fn aget(&mut self, dest: Register, array: Register, index: Register, object: bool) {
        let opcode = if object {
            Opcode::AgetObject
        } else {
            Opcode::Aget
        };
        self.emit(opcode, Some(dest), vec![array, index], Payload::None);
    }

    pub fn aget_wide(&mut self, dest: Register, array: Register, index: Register) {
        self.emit(Opcode::AgetWide, Some(dest), vec![array, index], Payload::None);
    }

    /// Adds an `aput`, or `aput-object` when `object` is true.
    pub fn aput(&mut self, src: Register, array: Register, index: Register, object: bool) {
        let opcode = if object {
            Opcode::AputObject
        } else {
            Opcode::Aput
        };
        self.emit(opcode, None, vec![src, array, index], Payload::None);
    }

    /// Adds an instance field read. The opcode follows the field's type.
    pub fn iget(&mut self, dest: Register, object: Register, field: FieldRef) {
        let opcode = if field.field_type().is_reference() {
            Opcode::IgetObject
        } else {
            Opcode::Iget
        };
        self.emit(opcode, Some(dest), vec![object], Payload::Field(field));
    }

    pub fn iput(&mut self, src: Register, object: Register, field: FieldRef) {
        let opcode = if field.field_type().is_reference() {
            Opcode::IputObject
        } else {
            Opcode::Iput
        };
        self.emit(opcode, None, vec![src, object], Payload::Field(field));
    }

    /// Adds a static field read. The opcode follows the field's type.
    pub fn sget(&mut self, dest: Register, field: FieldRef) {
        let opcode = if field.field_type().is_reference() {
            Opcode::SgetObject
        } else {
            Opcode::Sget
        };
        self.emit(opcode, Some(dest), vec![], Payload::Field(field));
    }

    pub fn sput(&mut self, src: Register, field: FieldRef) {
        let opcode = if field.field_type().is_reference() {
            Opcode::SputObject
        } else {
            Opcode::Sput
        };
        self.emit(opcode, None, vec![src], Payload::Field(field));
    }

    /// Adds an invoke. `opcode` must be one of the `invoke-*` opcodes.
    ///
    /// For instance invokes the receiver is the first argument.
    pub fn invoke(&mut self, opcode: Opcode, method: MethodRef, args: Vec<Register>) -> Result<(), Error> {
        if !opcode.is_invoke() {
            return Err(Error::Custom(format!("{} is not an invoke opcode", opcode)));
        }
        self.emit(opcode, None, args, Payload::Method(method));
        Ok(())
    }

    pub fn invoke_static(&mut self, method: MethodRef, args: Vec<Register>) {
        self.emit(Opcode::InvokeStatic, None, args, Payload::Method(method));
    }

    pub fn invoke_virtual(&mut self, method: MethodRef, args: Vec<Register>) {
        self.emit(Opcode::InvokeVirtual, None, args, Payload::Method(method));
    }

    pub fn invoke_direct(&mut self, method: MethodRef, args: Vec<Register>) {
        self.emit(Opcode::InvokeDirect, None, args, Payload::Method(method));
    }

    pub fn unop(&mut self, dest: Register, src: Register) {
        self.emit(Opcode::Unop, Some(dest), vec![src], Payload::None);
    }

    pub fn binop(&mut self, dest: Register, lhs: Register, rhs: Register) {
        self.emit(Opcode::Binop, Some(dest), vec![lhs, rhs], Payload::None);
    }

    pub fn aput_wide(&mut self, src: Register, array: Register, index: Register) {
        self.emit(Opcode::AputWide, None, vec![src, array, index], Payload::None);
    }

    /// Adds a unary operation writing a register pair, as `neg-long` or
    /// `int-to-double`.
    pub fn unop_wide(&mut self, dest: Register, src: Register) {
        self.emit(Opcode::UnopWide, Some(dest), vec![src], Payload::None);
    }

    /// Adds a binary operation writing a register pair, as `add-long`.
    pub fn binop_wide(&mut self, dest: Register, lhs: Register, rhs: Register) {
        self.emit(Opcode::BinopWide, Some(dest), vec![lhs, rhs], Payload::None);
    }

    pub fn monitor_enter(&mut self, src: Register) {
        self.emit(Opcode::MonitorEnter, None, vec![src], Payload::None);
    }

    pub fn monitor_exit(&mut self, src: Register) {
        self.emit(Opcode::MonitorExit, None, vec![src], Payload::None);
    }

    /// Adds an `if-*z` comparing `src` against zero. Targets live on the
    /// outgoing edges.
    pub fn if_zero(&mut self, src: Register) {
        self.emit(Opcode::IfZero, None, vec![src], Payload::None);
    }

    /// Adds an `if-*` comparing two registers.
    pub fn if_test(&mut self, lhs: Register, rhs: Register) {
        self.emit(Opcode::If, None, vec![lhs, rhs], Payload::None);
    }

    pub fn switch(&mut self, src: Register) {
        self.emit(Opcode::Switch, None, vec![src], Payload::None);
    }

    pub fn goto(&mut self) {
        self.emit(Opcode::Goto, None, vec![], Payload::None);
    }

    pub fn return_void(&mut self) {
        self.emit(Opcode::ReturnVoid, None, vec![], Payload::None);
    }

    pub fn return_value(&mut self, src: Register) {
        self.emit(Opcode::Return, None, vec![src], Payload::None);
    }

    pub fn return_object(&mut self, src: Register) {
        self.emit(Opcode::ReturnObject, None, vec![src], Payload::None);
    }

    pub fn throw(&mut self, src: Register) {
        self.emit(Opcode::Throw, None, vec![src], Payload::None);
    }
}

impl graph::Vertex for Block {
    fn index(&self) -> usize {
        self.index
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "[ Block: 0x{:X} ]", self.index)?;
        for instruction in self.instructions() {
            writeln!(f, "{}", instruction)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_opcodes_follow_field_type() {
        let mut block = Block::new(0);
        block.sget(reg(0), FieldRef::new("LFoo;", "name", "Ljava/lang/String;"));
        block.sget(reg(1), FieldRef::new("LFoo;", "count", "I"));
        block.iput(reg(1), reg(2), FieldRef::new("LFoo;", "count", "I"));

        assert_eq!(block.instructions()[0].opcode(), Opcode::SgetObject);
        assert_eq!(block.instructions()[1].opcode(), Opcode::Sget);
        assert_eq!(block.instructions()[2].opcode(), Opcode::Iput);
        assert_eq!(block.instructions()[2].dest(), None);
    }

    #[test]
    fn invoke_rejects_non_invoke_opcodes() {
        let mut block = Block::new(0);
        let method = MethodRef::new("LFoo;", "bar", Proto::new("V", vec![]));

        assert!(block
            .invoke(Opcode::InvokeInterface, method.clone(), vec![reg(0)])
            .is_ok());
        assert!(block.invoke(Opcode::Goto, method, vec![]).is_err());
        assert_eq!(block.len(), 1);
        assert!(block.instruction(1).is_err());
    }
}
