//! NativeChannel trait: the opaque call channel into the engine
//!
//! The binding runtime never touches engine internals. Everything it needs
//! from the engine goes through these four synchronous calls. Engines
//! implement the trait; the runtime holds it as `Arc<dyn NativeChannel>`.

use crate::error::ChannelResult;
use crate::value::{ObjectHandle, Variant};

/// Synchronous, handle-referential channel to the native engine.
///
/// Every call blocks until the engine returns or reports failure. Timeouts,
/// if any, are the implementor's concern. A handle stays valid for as long
/// as the native object exists; calls on a destroyed object must fail with
/// [`ChannelError::DestroyedObject`](crate::ChannelError::DestroyedObject).
pub trait NativeChannel: Send + Sync {
    /// Invoke `method` on the object behind `handle` with positional arguments
    fn call(&self, handle: ObjectHandle, method: &str, args: &[Variant]) -> ChannelResult<Variant>;

    /// Report the most specific native class name of a live object
    fn class_name_of(&self, handle: ObjectHandle) -> ChannelResult<String>;

    /// Find the one native object registered as the singleton `name`
    fn lookup_singleton(&self, name: &str) -> ChannelResult<ObjectHandle>;

    /// Create a new native object of class `class`
    fn instantiate(&self, class: &str) -> ChannelResult<ObjectHandle>;
}
