//! Embedding-side values
//!
//! What callers of the runtime pass in and get back. Objects are
//! [`Wrapper`]s from the identity cache, never raw handles.
//!
//! Equality never fails: values of different kinds compare unequal
//! (`Int(1) != Float(1.0)`), and wrappers compare by native handle.

use std::fmt;

use gdbind_sdk::Variant;

use crate::identity::Wrapper;

/// Value as seen by the embedding language
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// No value
    #[default]
    Nil,
    /// Boolean
    Bool(bool),
    /// Integer
    Int(i64),
    /// Float
    Float(f64),
    /// String
    Str(String),
    /// Wrapped native object
    Object(Wrapper),
}

impl Value {
    /// Check if this is `Nil`
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    /// Extract a boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Extract an integer
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Extract a float
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Extract a string slice
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Extract a wrapped object
    pub fn as_object(&self) -> Option<&Wrapper> {
        match self {
            Value::Object(w) => Some(w),
            _ => None,
        }
    }

    /// Kind name for diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "String",
            Value::Object(_) => "Object",
        }
    }

    /// Structural conversion to a raw variant (objects become handles)
    pub fn to_raw(&self) -> Variant {
        match self {
            Value::Nil => Variant::Nil,
            Value::Bool(b) => Variant::Bool(*b),
            Value::Int(i) => Variant::Int(*i),
            Value::Float(f) => Variant::Float(*f),
            Value::Str(s) => Variant::String(s.clone()),
            Value::Object(w) => Variant::Object(w.handle()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Str(s) => write!(f, "{:?}", s),
            Value::Object(w) => write!(f, "{}", w),
        }
    }
}

impl PartialEq<Wrapper> for Value {
    fn eq(&self, other: &Wrapper) -> bool {
        matches!(self, Value::Object(w) if w == other)
    }
}

impl PartialEq<Value> for Wrapper {
    fn eq(&self, other: &Value) -> bool {
        other == self
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i as i64)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<Wrapper> for Value {
    fn from(w: Wrapper) -> Self {
        Value::Object(w)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Nil, Into::into)
    }
}
