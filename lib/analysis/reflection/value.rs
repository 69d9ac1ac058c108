//! The abstract values tracked for each register.

use crate::ir::{ClassHierarchy, DexType};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of object an `AbstractValue` describes.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum AbstractObjectKind {
    /// Some object of a known type.
    Object,
    /// A specific string.
    String,
    /// A specific `java.lang.Class`.
    Class,
    /// A specific `java.lang.reflect.Field`.
    Field,
    /// A specific `java.lang.reflect.Method`.
    Method,
}

/// What a register provably holds.
///
/// `StringLiteral`, `ClassObject`, `FieldObject` and `MethodObject` are exact:
/// they name one object. `ObjectOfType` only names the object's type.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum AbstractValue {
    /// Nothing is known.
    Top,
    /// No value reaches here.
    Bottom,
    StringLiteral(String),
    ClassObject(DexType),
    ObjectOfType(DexType),
    FieldObject { owner: DexType, name: String },
    MethodObject { owner: DexType, name: String },
}

impl AbstractValue {
    pub fn string<S: Into<String>>(literal: S) -> AbstractValue {
        AbstractValue::StringLiteral(literal.into())
    }

    pub fn class<T: Into<DexType>>(dex_type: T) -> AbstractValue {
        AbstractValue::ClassObject(dex_type.into())
    }

    pub fn object<T: Into<DexType>>(dex_type: T) -> AbstractValue {
        AbstractValue::ObjectOfType(dex_type.into())
    }

    pub fn field<T: Into<DexType>, S: Into<String>>(owner: T, name: S) -> AbstractValue {
        AbstractValue::FieldObject {
            owner: owner.into(),
            name: name.into(),
        }
    }

    pub fn method<T: Into<DexType>, S: Into<String>>(owner: T, name: S) -> AbstractValue {
        AbstractValue::MethodObject {
            owner: owner.into(),
            name: name.into(),
        }
    }

    pub fn is_top(&self) -> bool {
        matches!(*self, AbstractValue::Top)
    }

    pub fn is_bottom(&self) -> bool {
        matches!(*self, AbstractValue::Bottom)
    }

    /// True for values which name exactly one object.
    pub fn is_exact(&self) -> bool {
        matches!(
            *self,
            AbstractValue::StringLiteral(_)
                | AbstractValue::ClassObject(_)
                | AbstractValue::FieldObject { .. }
                | AbstractValue::MethodObject { .. }
        )
    }

    /// The kind of object described, or `None` for `Top` and `Bottom`.
    pub fn kind(&self) -> Option<AbstractObjectKind> {
        match *self {
            AbstractValue::Top | AbstractValue::Bottom => None,
            AbstractValue::StringLiteral(_) => Some(AbstractObjectKind::String),
            AbstractValue::ClassObject(_) => Some(AbstractObjectKind::Class),
            AbstractValue::ObjectOfType(_) => Some(AbstractObjectKind::Object),
            AbstractValue::FieldObject { .. } => Some(AbstractObjectKind::Field),
            AbstractValue::MethodObject { .. } => Some(AbstractObjectKind::Method),
        }
    }

    /// The text of a string literal.
    pub fn string_literal(&self) -> Option<&str> {
        match *self {
            AbstractValue::StringLiteral(ref literal) => Some(literal),
            _ => None,
        }
    }

    /// The type this value is about.
    ///
    /// For a `ClassObject` this is the class the token stands for, for an
    /// `ObjectOfType` the object's type, and for reflected members the class
    /// declaring them.
    pub fn dex_type(&self) -> Option<&DexType> {
        match *self {
            AbstractValue::ClassObject(ref dex_type)
            | AbstractValue::ObjectOfType(ref dex_type)
            | AbstractValue::FieldObject {
                owner: ref dex_type,
                ..
            }
            | AbstractValue::MethodObject {
                owner: ref dex_type,
                ..
            } => Some(dex_type),
            _ => None,
        }
    }

    /// The name of a reflected field or method.
    pub fn member_name(&self) -> Option<&str> {
        match *self {
            AbstractValue::FieldObject { ref name, .. }
            | AbstractValue::MethodObject { ref name, .. } => Some(name),
            _ => None,
        }
    }

    /// The type of the object at runtime, when it is known.
    pub fn runtime_type(&self) -> Option<DexType> {
        match *self {
            AbstractValue::Top | AbstractValue::Bottom => None,
            AbstractValue::StringLiteral(_) => Some(DexType::java_lang_string()),
            AbstractValue::ClassObject(_) => Some(DexType::java_lang_class()),
            AbstractValue::ObjectOfType(ref dex_type) => Some(dex_type.clone()),
            AbstractValue::FieldObject { .. } => Some(DexType::java_lang_reflect_field()),
            AbstractValue::MethodObject { .. } => Some(DexType::java_lang_reflect_method()),
        }
    }

    /// Join two values.
    pub fn join(&self, other: &AbstractValue, hierarchy: &ClassHierarchy) -> AbstractValue {
        match (self, other) {
            (AbstractValue::Bottom, _) => other.clone(),
            (_, AbstractValue::Bottom) => self.clone(),
            (AbstractValue::Top, _) | (_, AbstractValue::Top) => AbstractValue::Top,
            _ if self == other => self.clone(),
            // Two different exact facts of the same kind, or an exact fact
            // and a type, or two types. All of them join on runtime types.
            _ => match (self.runtime_type(), other.runtime_type()) {
                (Some(lhs), Some(rhs)) => match hierarchy.lub(&lhs, &rhs) {
                    Some(lub) => AbstractValue::ObjectOfType(lub),
                    None => AbstractValue::Top,
                },
                _ => AbstractValue::Top,
            },
        }
    }

    /// True if `self` is at least as precise as `other`.
    pub fn leq(&self, other: &AbstractValue, hierarchy: &ClassHierarchy) -> bool {
        &self.join(other, hierarchy) == other
    }
}

impl fmt::Display for AbstractValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            AbstractValue::Top => write!(f, "TOP"),
            AbstractValue::Bottom => write!(f, "BOTTOM"),
            AbstractValue::StringLiteral(ref literal) => write!(f, "\"{}\"", literal),
            AbstractValue::ClassObject(ref dex_type) => write!(f, "CLASS{{{}}}", dex_type),
            AbstractValue::ObjectOfType(ref dex_type) => write!(f, "OBJECT{{{}}}", dex_type),
            AbstractValue::FieldObject {
                ref owner,
                ref name,
            } => write!(f, "FIELD{{{}:{}}}", owner, name),
            AbstractValue::MethodObject {
                ref owner,
                ref name,
            } => write!(f, "METHOD{{{}:{}}}", owner, name),
        }
    }
}
