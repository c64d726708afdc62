//! Conversions between `Variant` and Rust types.
//!
//! Native method handlers receive `&[Variant]` and return a `Variant`. These
//! traits keep that plumbing out of handler bodies:
//!
//! ```ignore
//! engine.register_method("LineEdit", "set_secret", |engine, this, args| {
//!     let secret = bool::from_variant(arg(args, 0)?)?;
//!     engine.set_field(this, "secret", secret.to_variant())?;
//!     Ok(().to_variant())
//! });
//! ```

use crate::error::{ChannelError, ChannelResult};
use crate::value::{ObjectHandle, Variant};

/// Convert from a `Variant` to a Rust type.
pub trait FromVariant: Sized {
    /// Convert, returning an error if the variant does not hold this type.
    fn from_variant(value: &Variant) -> ChannelResult<Self>;
}

/// Convert from a Rust type to a `Variant`.
pub trait ToVariant {
    /// Convert to a `Variant`.
    fn to_variant(self) -> Variant;
}

fn mismatch(expected: &str, got: &Variant) -> ChannelError {
    ChannelError::TypeMismatch {
        expected: expected.to_string(),
        got: got.type_name().to_string(),
    }
}

/// Fetch positional argument `index`, failing with a type mismatch when absent.
pub fn arg(args: &[Variant], index: usize) -> ChannelResult<&Variant> {
    args.get(index).ok_or_else(|| ChannelError::TypeMismatch {
        expected: format!("argument {}", index),
        got: format!("{} argument(s)", args.len()),
    })
}

impl FromVariant for bool {
    fn from_variant(value: &Variant) -> ChannelResult<Self> {
        value.as_bool().ok_or_else(|| mismatch("bool", value))
    }
}

impl FromVariant for i64 {
    fn from_variant(value: &Variant) -> ChannelResult<Self> {
        value.as_int().ok_or_else(|| mismatch("int", value))
    }
}

impl FromVariant for f64 {
    fn from_variant(value: &Variant) -> ChannelResult<Self> {
        match value {
            Variant::Float(f) => Ok(*f),
            Variant::Int(i) => Ok(*i as f64),
            other => Err(mismatch("float", other)),
        }
    }
}

impl FromVariant for String {
    fn from_variant(value: &Variant) -> ChannelResult<Self> {
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| mismatch("String", value))
    }
}

impl FromVariant for ObjectHandle {
    fn from_variant(value: &Variant) -> ChannelResult<Self> {
        value.as_object().ok_or_else(|| mismatch("Object", value))
    }
}

impl<T: FromVariant> FromVariant for Option<T> {
    fn from_variant(value: &Variant) -> ChannelResult<Self> {
        if value.is_nil() {
            Ok(None)
        } else {
            T::from_variant(value).map(Some)
        }
    }
}

impl ToVariant for bool {
    fn to_variant(self) -> Variant {
        Variant::Bool(self)
    }
}

impl ToVariant for i64 {
    fn to_variant(self) -> Variant {
        Variant::Int(self)
    }
}

impl ToVariant for f64 {
    fn to_variant(self) -> Variant {
        Variant::Float(self)
    }
}

impl ToVariant for String {
    fn to_variant(self) -> Variant {
        Variant::String(self)
    }
}

impl ToVariant for ObjectHandle {
    fn to_variant(self) -> Variant {
        Variant::Object(self)
    }
}

// Unit type (for methods that return nothing)
impl ToVariant for () {
    fn to_variant(self) -> Variant {
        Variant::Nil
    }
}

impl<T: ToVariant> ToVariant for Option<T> {
    fn to_variant(self) -> Variant {
        match self {
            Some(v) => v.to_variant(),
            None => Variant::Nil,
        }
    }
}
