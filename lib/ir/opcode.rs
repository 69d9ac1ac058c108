use serde::{Deserialize, Serialize};
use std::fmt;

/// The Dex opcodes this IR models.
///
/// Encoding variants (`move/from16`, `const/4`, `const/high16`, ...) are
/// folded into their base opcode. Arithmetic and conversions are folded into
/// `Unop` and `Binop`, or `UnopWide` and `BinopWide` when they write a
/// register pair (`add-long`, `int-to-double`, ...). Array accesses keep the
/// narrow, wide and object split; the byte/char/short/boolean forms are
/// `Aget` and `Aput`.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Opcode {
    Nop,
    Move,
    MoveObject,
    MoveWide,
    MoveResult,
    MoveResultObject,
    MoveResultWide,
    MoveException,
    ReturnVoid,
    Return,
    ReturnWide,
    ReturnObject,
    Const,
    ConstWide,
    ConstString,
    ConstClass,
    MonitorEnter,
    MonitorExit,
    CheckCast,
    InstanceOf,
    ArrayLength,
    NewInstance,
    NewArray,
    FilledNewArray,
    Throw,
    Goto,
    Switch,
    If,
    IfZero,
    Aget,
    AgetWide,
    AgetObject,
    Aput,
    AputWide,
    AputObject,
    Iget,
    IgetObject,
    Iput,
    IputObject,
    Sget,
    SgetObject,
    Sput,
    SputObject,
    InvokeVirtual,
    InvokeSuper,
    InvokeDirect,
    InvokeStatic,
    InvokeInterface,
    Unop,
    UnopWide,
    Binop,
    BinopWide,
}

impl Opcode {
    pub fn mnemonic(&self) -> &'static str {
        match *self {
            Opcode::Nop => "nop",
            Opcode::Move => "move",
            Opcode::MoveObject => "move-object",
            Opcode::MoveWide => "move-wide",
            Opcode::MoveResult => "move-result",
            Opcode::MoveResultObject => "move-result-object",
            Opcode::MoveResultWide => "move-result-wide",
            Opcode::MoveException => "move-exception",
            Opcode::ReturnVoid => "return-void",
            Opcode::Return => "return",
            Opcode::ReturnWide => "return-wide",
            Opcode::ReturnObject => "return-object",
            Opcode::Const => "const",
            Opcode::ConstWide => "const-wide",
            Opcode::ConstString => "const-string",
            Opcode::ConstClass => "const-class",
            Opcode::MonitorEnter => "monitor-enter",
            Opcode::MonitorExit => "monitor-exit",
            Opcode::CheckCast => "check-cast",
            Opcode::InstanceOf => "instance-of",
            Opcode::ArrayLength => "array-length",
            Opcode::NewInstance => "new-instance",
            Opcode::NewArray => "new-array",
            Opcode::FilledNewArray => "filled-new-array",
            Opcode::Throw => "throw",
            Opcode::Goto => "goto",
            Opcode::Switch => "switch",
            Opcode::If => "if",
            Opcode::IfZero => "if-z",
            Opcode::Aget => "aget",
            Opcode::AgetWide => "aget-wide",
            Opcode::AgetObject => "aget-object",
            Opcode::Aput => "aput",
            Opcode::AputWide => "aput-wide",
            Opcode::AputObject => "aput-object",
            Opcode::Iget => "iget",
            Opcode::IgetObject => "iget-object",
            Opcode::Iput => "iput",
            Opcode::IputObject => "iput-object",
            Opcode::Sget => "sget",
            Opcode::SgetObject => "sget-object",
            Opcode::Sput => "sput",
            Opcode::SputObject => "sput-object",
            Opcode::InvokeVirtual => "invoke-virtual",
            Opcode::InvokeSuper => "invoke-super",
            Opcode::InvokeDirect => "invoke-direct",
            Opcode::InvokeStatic => "invoke-static",
            Opcode::InvokeInterface => "invoke-interface",
            Opcode::Unop => "unop",
            Opcode::UnopWide => "unop-wide",
            Opcode::Binop => "binop",
            Opcode::BinopWide => "binop-wide",
        }
    }

    pub fn is_invoke(&self) -> bool {
        matches!(
            *self,
            Opcode::InvokeVirtual
                | Opcode::InvokeSuper
                | Opcode::InvokeDirect
                | Opcode::InvokeStatic
                | Opcode::InvokeInterface
        )
    }

    pub fn is_move_result(&self) -> bool {
        matches!(
            *self,
            Opcode::MoveResult | Opcode::MoveResultObject | Opcode::MoveResultWide
        )
    }

    /// Opcodes which write the `RESULT` pseudo register instead of a
    /// destination register.
    pub fn writes_result(&self) -> bool {
        self.is_invoke() || *self == Opcode::FilledNewArray
    }

    /// True for opcodes which end a basic block.
    pub fn is_terminator(&self) -> bool {
        matches!(
            *self,
            Opcode::ReturnVoid
                | Opcode::Return
                | Opcode::ReturnWide
                | Opcode::ReturnObject
                | Opcode::Throw
                | Opcode::Goto
                | Opcode::Switch
                | Opcode::If
                | Opcode::IfZero
        )
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.mnemonic())
    }
}
