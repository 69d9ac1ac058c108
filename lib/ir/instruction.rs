//! An `Instruction` is one Dex operation with its registers and its payload.

use crate::ir::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The constant operand an instruction carries, if any.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum Payload {
    None,
    Literal(i64),
    String(String),
    Type(DexType),
    Field(FieldRef),
    Method(MethodRef),
}

impl Default for Payload {
    fn default() -> Payload {
        Payload::None
    }
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Payload::None => Ok(()),
            Payload::Literal(literal) => write!(f, "#{}", literal),
            Payload::String(ref string) => write!(f, "{:?}", string),
            Payload::Type(ref dex_type) => write!(f, "{}", dex_type),
            Payload::Field(ref field) => write!(f, "{}", field),
            Payload::Method(ref method) => write!(f, "{}", method),
        }
    }
}

/// A single IR instruction.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct Instruction {
    opcode: Opcode,
    dest: Option<Register>,
    srcs: Vec<Register>,
    #[serde(default)]
    payload: Payload,
}

impl Instruction {
    pub fn new(
        opcode: Opcode,
        dest: Option<Register>,
        srcs: Vec<Register>,
        payload: Payload,
    ) -> Instruction {
        Instruction {
            opcode,
            dest,
            srcs,
            payload,
        }
    }

    pub fn opcode(&self) -> Opcode {
        self.opcode
    }

    /// The register this instruction writes, if any.
    ///
    /// Invokes have no destination; their value lands in `Register::RESULT`.
    pub fn dest(&self) -> Option<Register> {
        self.dest
    }

    pub fn srcs(&self) -> &[Register] {
        &self.srcs
    }

    pub fn src(&self, index: usize) -> Option<Register> {
        self.srcs.get(index).cloned()
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn literal(&self) -> Option<i64> {
        match self.payload {
            Payload::Literal(literal) => Some(literal),
            _ => None,
        }
    }

    pub fn string(&self) -> Option<&str> {
        match self.payload {
            Payload::String(ref string) => Some(string),
            _ => None,
        }
    }

    pub fn dex_type(&self) -> Option<&DexType> {
        match self.payload {
            Payload::Type(ref dex_type) => Some(dex_type),
            _ => None,
        }
    }

    pub fn field(&self) -> Option<&FieldRef> {
        match self.payload {
            Payload::Field(ref field) => Some(field),
            _ => None,
        }
    }

    pub fn method(&self) -> Option<&MethodRef> {
        match self.payload {
            Payload::Method(ref method) => Some(method),
            _ => None,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.opcode)?;
        let mut operands: Vec<String> = Vec::new();
        if let Some(dest) = self.dest {
            operands.push(dest.to_string());
        }
        if self.opcode.is_invoke() {
            let args = self
                .srcs
                .iter()
                .map(|src| src.to_string())
                .collect::<Vec<String>>();
            operands.push(format!("{{{}}}", args.join(", ")));
        } else {
            operands.extend(self.srcs.iter().map(|src| src.to_string()));
        }
        if self.payload != Payload::None {
            operands.push(self.payload.to_string());
        }
        if !operands.is_empty() {
            write!(f, " {}", operands.join(", "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        let instruction = Instruction::new(
            Opcode::ConstString,
            Some(reg(0)),
            vec![],
            Payload::String("foo1".to_string()),
        );
        assert_eq!(instruction.to_string(), "const-string v0, \"foo1\"");

        let method = MethodRef::new(
            "LFoo;",
            "check",
            Proto::new("V", vec![DexType::java_lang_string()]),
        );
        let instruction = Instruction::new(
            Opcode::InvokeStatic,
            None,
            vec![reg(1), reg(2)],
            Payload::Method(method),
        );
        assert_eq!(
            instruction.to_string(),
            "invoke-static {v1, v2}, LFoo;.check:(Ljava/lang/String;)V"
        );

        let instruction =
            Instruction::new(Opcode::MoveResultObject, Some(reg(3)), vec![], Payload::None);
        assert_eq!(instruction.to_string(), "move-result-object v3");
    }
}
