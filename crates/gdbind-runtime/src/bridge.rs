//! Call bridge
//!
//! The narrow waist between bound members and the [`NativeChannel`]. Every
//! channel failure, a destroyed receiver included, becomes
//! [`BindError::NativeCall`] and propagates to the caller. Nothing is
//! retried.

use std::fmt;
use std::sync::Arc;

use gdbind_sdk::{NativeChannel, ObjectHandle, Variant};

use crate::error::{BindError, BindResult};
use crate::lattice::SynthesizedType;

/// Shared handle to the native channel
#[derive(Clone)]
pub struct CallBridge {
    channel: Arc<dyn NativeChannel>,
}

impl CallBridge {
    /// Wrap a channel
    pub fn new(channel: Arc<dyn NativeChannel>) -> Self {
        Self { channel }
    }

    /// Invoke `method` on `handle`
    pub fn invoke(&self, handle: ObjectHandle, method: &str, args: &[Variant]) -> BindResult<Variant> {
        tracing::trace!(%handle, method, args = args.len(), "native call");
        self.channel.call(handle, method, args).map_err(|e| {
            tracing::debug!(%handle, method, error = %e, "native call failed");
            BindError::native(method, e)
        })
    }

    /// Create a native object of `class`
    pub fn instantiate(&self, class: &SynthesizedType) -> BindResult<ObjectHandle> {
        if !class.descriptor().instantiable {
            return Err(BindError::NotInstantiable(class.name().to_string()));
        }
        self.channel
            .instantiate(class.name())
            .map_err(|e| BindError::native("instantiate", e))
    }

    /// Runtime class name of `handle`
    pub fn class_name_of(&self, handle: ObjectHandle) -> BindResult<String> {
        self.channel
            .class_name_of(handle)
            .map_err(|e| BindError::native("class_name_of", e))
    }

    /// Handle of the singleton bound as `name`
    pub fn lookup_singleton(&self, name: &str) -> BindResult<ObjectHandle> {
        self.channel
            .lookup_singleton(name)
            .map_err(|e| BindError::native("lookup_singleton", e))
    }
}

impl fmt::Debug for CallBridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallBridge").finish_non_exhaustive()
    }
}
