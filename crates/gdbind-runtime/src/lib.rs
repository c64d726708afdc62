//! gdbind runtime - dynamic bindings over a native engine's class database
//!
//! Given a [`ClassDatabase`] and a [`NativeChannel`](gdbind_sdk::NativeChannel),
//! the runtime synthesizes one type per native class, binds methods,
//! properties, constants and signals to native calls, and keeps native
//! object identity stable across crossings.
//!
//! # Example
//!
//! ```ignore
//! use gdbind_runtime::{ClassDatabase, Runtime, RuntimeOptions, Value};
//!
//! let db = ClassDatabase::from_file("classes.json")?;
//! let runtime = Runtime::new(db, channel, RuntimeOptions::default())?;
//!
//! let edit = runtime.instantiate("LineEdit")?;
//! runtime.setattr(&edit, "max_length", Value::Int(42))?;
//! let engine = runtime.singleton("Engine").unwrap();
//! let tree = runtime.call(engine, "get_main_loop", &[])?;
//! ```

#![warn(missing_docs)]

pub mod binder;
pub mod bridge;
pub mod classdb;
pub mod error;
pub mod identity;
pub mod lattice;
pub mod marshal;
pub mod module;
pub mod options;
pub mod runtime;
pub mod singleton;
pub mod value;

pub use binder::{Attribute, BoundMethod, Member, MemberKind};
pub use classdb::{ClassDatabase, ClassDescriptor, TypeTag};
pub use error::{BindError, BindResult, InitError, LoadError, StructureError};
pub use identity::{IdentityCache, Wrapper};
pub use lattice::{ClassId, SynthesizedType, TypeLattice, TypeRef};
pub use module::{Binding, BindingKind, Module};
pub use options::{RuntimeOptions, UnknownClassPolicy};
pub use runtime::Runtime;
pub use singleton::SingletonMarker;
pub use value::Value;

use once_cell::sync::OnceCell;

static RUNTIME: OnceCell<Runtime> = OnceCell::new();

/// Install the process-wide runtime. Fails if one is already installed.
pub fn install(runtime: Runtime) -> Result<&'static Runtime, InitError> {
    RUNTIME
        .try_insert(runtime)
        .map_err(|_| InitError::AlreadyInstalled)
}

/// The process-wide runtime, if installed
pub fn global() -> Option<&'static Runtime> {
    RUNTIME.get()
}
