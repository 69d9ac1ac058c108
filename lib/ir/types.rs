//! Type descriptors and symbolic references to fields and methods.
//!
//! Types use the Dex descriptor syntax: `I` for an int, `Ljava/lang/String;`
//! for a class, `[Ljava/lang/Object;` for an array of objects.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A Dex type descriptor.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct DexType(String);

impl DexType {
    pub fn new<S: Into<String>>(descriptor: S) -> DexType {
        DexType(descriptor.into())
    }

    pub fn void() -> DexType {
        DexType::new("V")
    }

    pub fn java_lang_object() -> DexType {
        DexType::new("Ljava/lang/Object;")
    }

    pub fn java_lang_string() -> DexType {
        DexType::new("Ljava/lang/String;")
    }

    pub fn java_lang_class() -> DexType {
        DexType::new("Ljava/lang/Class;")
    }

    pub fn java_lang_reflect_field() -> DexType {
        DexType::new("Ljava/lang/reflect/Field;")
    }

    pub fn java_lang_reflect_method() -> DexType {
        DexType::new("Ljava/lang/reflect/Method;")
    }

    /// The raw descriptor, ie `Ljava/lang/String;`.
    pub fn descriptor(&self) -> &str {
        &self.0
    }

    pub fn is_void(&self) -> bool {
        self.0 == "V"
    }

    /// True for the single character primitive descriptors, `void` included.
    pub fn is_primitive(&self) -> bool {
        matches!(
            self.0.as_str(),
            "Z" | "B" | "S" | "C" | "I" | "J" | "F" | "D" | "V"
        )
    }

    /// True for `long` and `double`, which occupy two registers.
    pub fn is_wide(&self) -> bool {
        self.0 == "J" || self.0 == "D"
    }

    pub fn is_array(&self) -> bool {
        self.0.starts_with('[')
    }

    /// True for classes and arrays.
    pub fn is_reference(&self) -> bool {
        self.is_array() || (self.0.starts_with('L') && self.0.ends_with(';'))
    }

    /// The element type of an array type, or `None` if this is not an array.
    pub fn component_type(&self) -> Option<DexType> {
        self.0.strip_prefix('[').map(DexType::new)
    }

    /// The name `Class.getName()` returns for this type.
    ///
    /// Classes use dotted names (`java.lang.String`), arrays keep their
    /// descriptor with dots (`[Ljava.lang.String;`), primitives use their
    /// keyword.
    pub fn java_name(&self) -> String {
        let primitive = match self.0.as_str() {
            "Z" => Some("boolean"),
            "B" => Some("byte"),
            "S" => Some("short"),
            "C" => Some("char"),
            "I" => Some("int"),
            "J" => Some("long"),
            "F" => Some("float"),
            "D" => Some("double"),
            "V" => Some("void"),
            _ => None,
        };
        if let Some(primitive) = primitive {
            return primitive.to_string();
        }
        if self.is_array() {
            return self.0.replace('/', ".");
        }
        self.0
            .trim_start_matches('L')
            .trim_end_matches(';')
            .replace('/', ".")
    }

    /// The inverse of `java_name` for the names `Class.forName` accepts.
    ///
    /// Returns `None` for strings that cannot name a class.
    pub fn from_java_name(name: &str) -> Option<DexType> {
        if name.is_empty() || name.contains('/') || name.contains(char::is_whitespace) {
            return None;
        }
        if name.starts_with('[') {
            return Some(DexType::new(name.replace('.', "/")));
        }
        if name.starts_with('.') || name.ends_with('.') || name.contains("..") {
            return None;
        }
        Some(DexType::new(format!("L{};", name.replace('.', "/"))))
    }
}

impl From<&str> for DexType {
    fn from(descriptor: &str) -> DexType {
        DexType::new(descriptor)
    }
}

impl From<String> for DexType {
    fn from(descriptor: String) -> DexType {
        DexType(descriptor)
    }
}

impl fmt::Display for DexType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A method prototype: return type and parameter types.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Proto {
    return_type: DexType,
    parameters: Vec<DexType>,
}

impl Proto {
    pub fn new<R: Into<DexType>>(return_type: R, parameters: Vec<DexType>) -> Proto {
        Proto {
            return_type: return_type.into(),
            parameters,
        }
    }

    pub fn return_type(&self) -> &DexType {
        &self.return_type
    }

    pub fn parameters(&self) -> &[DexType] {
        &self.parameters
    }
}

impl fmt::Display for Proto {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "(")?;
        for parameter in &self.parameters {
            write!(f, "{}", parameter)?;
        }
        write!(f, "){}", self.return_type)
    }
}

/// A symbolic reference to a field, `Lowner;.name:Ltype;`.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct FieldRef {
    owner: DexType,
    name: String,
    field_type: DexType,
}

impl FieldRef {
    pub fn new<O, S, T>(owner: O, name: S, field_type: T) -> FieldRef
    where
        O: Into<DexType>,
        S: Into<String>,
        T: Into<DexType>,
    {
        FieldRef {
            owner: owner.into(),
            name: name.into(),
            field_type: field_type.into(),
        }
    }

    pub fn owner(&self) -> &DexType {
        &self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn field_type(&self) -> &DexType {
        &self.field_type
    }
}

impl fmt::Display for FieldRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}.{}:{}", self.owner, self.name, self.field_type)
    }
}

/// A symbolic reference to a method, `Lowner;.name:(params)ret`.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct MethodRef {
    owner: DexType,
    name: String,
    proto: Proto,
}

impl MethodRef {
    pub fn new<O, S>(owner: O, name: S, proto: Proto) -> MethodRef
    where
        O: Into<DexType>,
        S: Into<String>,
    {
        MethodRef {
            owner: owner.into(),
            name: name.into(),
            proto,
        }
    }

    pub fn owner(&self) -> &DexType {
        &self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn proto(&self) -> &Proto {
        &self.proto
    }

    pub fn return_type(&self) -> &DexType {
        self.proto.return_type()
    }

    /// True if owner, name and prototype all match the given strings.
    ///
    /// `signature` is the prototype in descriptor form, ie
    /// `(Ljava/lang/Object;)Ljava/lang/String;`.
    pub fn matches(&self, owner: &str, name: &str, signature: &str) -> bool {
        self.owner.descriptor() == owner
            && self.name == name
            && self.proto.to_string() == signature
    }
}

impl fmt::Display for MethodRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}.{}:{}", self.owner, self.name, self.proto)
    }
}
