//! Value marshalling between the embedding side and the native channel
//!
//! Every method parameter, return value and property carries a [`Coercion`]
//! decided once at bind time from its [`TypeTag`]. Call time only applies
//! it; nothing is inferred from the shape of the raw value.
//!
//! Arguments are checked strictly (an `Int` widens to `float`, `Nil` is a
//! valid object reference, nothing else converts). Return values are
//! normalized: `bool` collapses any raw truthiness to `true`/`false`, `nil`
//! discards the result, numeric tags accept any numeric encoding.

use gdbind_sdk::{ChannelError, Variant};
use rustc_hash::FxHashMap;

use crate::classdb::TypeTag;
use crate::error::{BindError, BindResult};
use crate::identity::IdentityCache;
use crate::lattice::{ClassId, TypeLattice};
use crate::value::Value;

/// Conversion applied to a value crossing the boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coercion {
    /// Drop the raw value (`nil` return tag)
    Discard,
    /// Two-valued boolean
    Bool,
    /// Integer
    Int,
    /// Float
    Float,
    /// String
    Str,
    /// Object reference, optionally restricted to a class and its subclasses
    Object(Option<ClassId>),
    /// Any value, converted structurally
    Any,
}

impl Coercion {
    /// Coercion for `tag`, resolving class names through `ids`
    pub fn from_tag(tag: &TypeTag, ids: &FxHashMap<String, ClassId>) -> Option<Coercion> {
        let coercion = match tag {
            TypeTag::Nil => Coercion::Discard,
            TypeTag::Bool => Coercion::Bool,
            TypeTag::Int => Coercion::Int,
            TypeTag::Float => Coercion::Float,
            TypeTag::String => Coercion::Str,
            TypeTag::Object(None) => Coercion::Object(None),
            TypeTag::Object(Some(name)) => Coercion::Object(Some(*ids.get(name)?)),
            TypeTag::Variant => Coercion::Any,
        };
        Some(coercion)
    }
}

/// Marshalling failure
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MarshalError {
    /// Value kind does not fit the declared type
    #[error("expected {expected}, got {got}")]
    TypeMismatch {
        /// Declared type
        expected: String,
        /// Actual value kind
        got: String,
    },

    /// Object argument is not an instance of the declared class
    #[error("expected {expected}, got an instance of {got}")]
    NotASubtype {
        /// Declared class
        expected: String,
        /// Runtime class of the argument
        got: String,
    },

    /// Wrapping a returned object failed
    #[error(transparent)]
    Wrap(#[from] BindError),
}

impl MarshalError {
    /// Error for argument `index` of `method`
    pub fn into_argument_error(self, method: &str, index: usize) -> BindError {
        match self {
            MarshalError::Wrap(err) => err,
            other => BindError::ArgumentType {
                method: method.to_string(),
                index: Some(index),
                message: format!("argument {}: {}", index, other),
            },
        }
    }

    /// Error for the value returned by `method`
    pub fn into_return_error(self, method: &str) -> BindError {
        match self {
            MarshalError::Wrap(err) => err,
            MarshalError::TypeMismatch { expected, got }
            | MarshalError::NotASubtype { expected, got } => {
                BindError::native(method, ChannelError::TypeMismatch { expected, got })
            }
        }
    }
}

fn mismatch(expected: &str, got: &str) -> MarshalError {
    MarshalError::TypeMismatch {
        expected: expected.to_string(),
        got: got.to_string(),
    }
}

fn class_label(lattice: &TypeLattice, class: Option<ClassId>) -> String {
    class
        .and_then(|id| lattice.by_id(id))
        .map_or_else(|| "Object".to_string(), |t| t.name().to_string())
}

/// Marshal an argument or property value for the channel.
///
/// With `strict` set, objects passed for a class-tagged parameter must be
/// instances of that class.
pub fn to_variant(
    value: &Value,
    coercion: Coercion,
    lattice: &TypeLattice,
    strict: bool,
) -> Result<Variant, MarshalError> {
    match (coercion, value) {
        (Coercion::Bool, Value::Bool(b)) => Ok(Variant::Bool(*b)),
        (Coercion::Int, Value::Int(i)) => Ok(Variant::Int(*i)),
        (Coercion::Float, Value::Float(f)) => Ok(Variant::Float(*f)),
        (Coercion::Float, Value::Int(i)) => Ok(Variant::Float(*i as f64)),
        (Coercion::Str, Value::Str(s)) => Ok(Variant::String(s.clone())),
        (Coercion::Object(_), Value::Nil) => Ok(Variant::Nil),
        (Coercion::Object(class), Value::Object(w)) => {
            if let Some(id) = class {
                if strict && !w.class().is_subtype_of(id) {
                    return Err(MarshalError::NotASubtype {
                        expected: class_label(lattice, class),
                        got: w.class_name().to_string(),
                    });
                }
            }
            Ok(Variant::Object(w.handle()))
        }
        (Coercion::Discard, Value::Nil) => Ok(Variant::Nil),
        (Coercion::Any, value) => Ok(value.to_raw()),
        (Coercion::Discard, other) => Err(mismatch("nil", other.type_name())),
        (Coercion::Bool, other) => Err(mismatch("bool", other.type_name())),
        (Coercion::Int, other) => Err(mismatch("int", other.type_name())),
        (Coercion::Float, other) => Err(mismatch("float", other.type_name())),
        (Coercion::Str, other) => Err(mismatch("String", other.type_name())),
        (Coercion::Object(class), other) => {
            Err(mismatch(&class_label(lattice, class), other.type_name()))
        }
    }
}

/// Convert a raw channel result to an embedding-side value.
///
/// Object handles go through the identity cache.
pub fn from_variant(
    raw: Variant,
    coercion: Coercion,
    cache: &IdentityCache,
) -> Result<Value, MarshalError> {
    let value = match (coercion, raw) {
        (Coercion::Discard, _) => Value::Nil,
        (Coercion::Bool, raw) => Value::Bool(raw.truthy()),

        (Coercion::Int, Variant::Int(i)) => Value::Int(i),
        (Coercion::Int, Variant::Bool(b)) => Value::Int(b as i64),
        (Coercion::Int, Variant::Float(f)) => Value::Int(f as i64),
        (Coercion::Int, Variant::Nil) => Value::Int(0),

        (Coercion::Float, Variant::Float(f)) => Value::Float(f),
        (Coercion::Float, Variant::Int(i)) => Value::Float(i as f64),
        (Coercion::Float, Variant::Bool(b)) => Value::Float(if b { 1.0 } else { 0.0 }),
        (Coercion::Float, Variant::Nil) => Value::Float(0.0),

        (Coercion::Str, Variant::String(s)) => Value::Str(s),
        (Coercion::Str, Variant::Nil) => Value::Str(String::new()),

        (Coercion::Object(_) | Coercion::Any, Variant::Object(handle)) => {
            Value::Object(cache.wrap(handle)?)
        }
        (Coercion::Object(_) | Coercion::Any, Variant::Nil) => Value::Nil,

        (Coercion::Any, Variant::Bool(b)) => Value::Bool(b),
        (Coercion::Any, Variant::Int(i)) => Value::Int(i),
        (Coercion::Any, Variant::Float(f)) => Value::Float(f),
        (Coercion::Any, Variant::String(s)) => Value::Str(s),

        (Coercion::Int, other) => return Err(mismatch("int", other.type_name())),
        (Coercion::Float, other) => return Err(mismatch("float", other.type_name())),
        (Coercion::Str, other) => return Err(mismatch("String", other.type_name())),
        (Coercion::Object(_), other) => return Err(mismatch("Object", other.type_name())),
    };
    Ok(value)
}

/// Marshal positional arguments for `method` against its parameter coercions
pub fn marshal_args(
    method: &str,
    args: &[Value],
    params: &[Coercion],
    lattice: &TypeLattice,
    strict: bool,
) -> BindResult<Vec<Variant>> {
    if args.len() != params.len() {
        return Err(BindError::ArgumentType {
            method: method.to_string(),
            index: None,
            message: format!("expected {} argument(s), got {}", params.len(), args.len()),
        });
    }
    args.iter()
        .zip(params)
        .enumerate()
        .map(|(i, (value, &coercion))| {
            to_variant(value, coercion, lattice, strict).map_err(|e| e.into_argument_error(method, i))
        })
        .collect()
}
