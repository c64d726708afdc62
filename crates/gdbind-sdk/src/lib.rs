//! gdbind SDK - the native side of the binding boundary
//!
//! This crate provides the minimal types and traits shared by the binding
//! runtime and any engine that backs it, without depending on the runtime:
//!
//! - [`Variant`] and [`ObjectHandle`]: raw values as the engine sees them
//! - [`NativeChannel`]: the synchronous call channel into the engine
//! - [`FromVariant`] / [`ToVariant`]: conversions used by native handlers
//! - [`HeadlessEngine`]: an in-process engine for tests, demos and tooling
//!
//! # Example
//!
//! ```ignore
//! use gdbind_sdk::{HeadlessEngine, NativeChannel, Variant};
//!
//! let engine = HeadlessEngine::new();
//! engine.define_class("Object", None);
//! engine.define_class("LineEdit", Some("Object"));
//! engine.set_default("LineEdit", "max_length", Variant::Int(0));
//!
//! let edit = engine.instantiate("LineEdit")?;
//! engine.call(edit, "set_max_length", &[Variant::Int(42)])?;
//! assert_eq!(engine.call(edit, "get_max_length", &[])?, Variant::Int(42));
//! ```

#![warn(missing_docs)]

pub mod channel;
pub mod convert;
pub mod error;
pub mod handler;
pub mod headless;
pub mod value;

pub use channel::NativeChannel;
pub use convert::{FromVariant, ToVariant};
pub use error::{ChannelError, ChannelResult};
pub use handler::{MethodHandlerFn, MethodRegistry};
pub use headless::HeadlessEngine;
pub use value::{ObjectHandle, Variant};
