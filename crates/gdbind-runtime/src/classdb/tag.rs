//! Type tags declared on method signatures and properties

use std::fmt;

/// Declared type of a parameter, return value or property.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeTag {
    /// No value (return tags only)
    Nil,
    /// Two-valued boolean
    Bool,
    /// 64-bit integer
    Int,
    /// 64-bit float
    Float,
    /// String
    String,
    /// Object reference, optionally restricted to a class and its subclasses
    Object(Option<String>),
    /// Any value
    Variant,
}

impl TypeTag {
    /// Parse a tag as written in the class database.
    ///
    /// Any identifier that is not a builtin tag names an object class; whether
    /// that class exists is checked by the loader.
    pub fn parse(raw: &str) -> Option<TypeTag> {
        let tag = match raw {
            "nil" | "void" => TypeTag::Nil,
            "bool" => TypeTag::Bool,
            "int" => TypeTag::Int,
            "float" => TypeTag::Float,
            "String" => TypeTag::String,
            "Object" => TypeTag::Object(None),
            "Variant" => TypeTag::Variant,
            other if is_identifier(other) => TypeTag::Object(Some(other.to_string())),
            _ => return None,
        };
        Some(tag)
    }

    /// Check if this is the "no value" tag
    pub fn is_nil(&self) -> bool {
        matches!(self, TypeTag::Nil)
    }

    /// Class named by an object tag, if any
    pub fn class_name(&self) -> Option<&str> {
        match self {
            TypeTag::Object(Some(name)) => Some(name),
            _ => None,
        }
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeTag::Nil => write!(f, "nil"),
            TypeTag::Bool => write!(f, "bool"),
            TypeTag::Int => write!(f, "int"),
            TypeTag::Float => write!(f, "float"),
            TypeTag::String => write!(f, "String"),
            TypeTag::Object(None) => write!(f, "Object"),
            TypeTag::Object(Some(name)) => write!(f, "{}", name),
            TypeTag::Variant => write!(f, "Variant"),
        }
    }
}
