//! Class database
//!
//! Machine-readable description of every native class: name, parent,
//! methods with typed signatures, properties, constants, signals and
//! singleton flags. Loaded once, validated as a whole, immutable afterwards.

mod descriptor;
mod format;
mod loader;
mod tag;

pub use descriptor::{ClassDescriptor, MethodDescriptor, PropertyDescriptor, SignalDescriptor};
pub use format::FORMAT_VERSION;
pub use loader::ClassDatabase;
pub use tag::TypeTag;
