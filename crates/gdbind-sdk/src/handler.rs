//! Native method registry (name-based dispatch)
//!
//! Engines built on the SDK register method implementations per class. The
//! [`HeadlessEngine`] resolves a call by walking the receiver's class chain
//! and invoking the first handler registered for `(class, method)`.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::error::ChannelResult;
use crate::headless::HeadlessEngine;
use crate::value::{ObjectHandle, Variant};

/// A native method implementation.
///
/// Receives the engine (for field access and object creation), the receiver
/// handle and the positional arguments. Handlers run without any engine lock
/// held, so they may call back into the engine freely.
pub type MethodHandlerFn =
    Arc<dyn Fn(&HeadlessEngine, ObjectHandle, &[Variant]) -> ChannelResult<Variant> + Send + Sync>;

/// Registry of native methods indexed by class and method name.
#[derive(Default)]
pub struct MethodRegistry {
    handlers: FxHashMap<String, FxHashMap<String, MethodHandlerFn>>,
}

impl MethodRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a method implementation for `class`.
    ///
    /// Registering the same `(class, method)` twice replaces the handler.
    pub fn register(
        &mut self,
        class: &str,
        method: &str,
        handler: impl Fn(&HeadlessEngine, ObjectHandle, &[Variant]) -> ChannelResult<Variant>
            + Send
            + Sync
            + 'static,
    ) {
        self.handlers
            .entry(class.to_string())
            .or_default()
            .insert(method.to_string(), Arc::new(handler));
    }

    /// Get the handler declared directly on `class`
    pub fn get(&self, class: &str, method: &str) -> Option<MethodHandlerFn> {
        self.handlers.get(class)?.get(method).cloned()
    }

    /// Check if `class` declares `method` directly
    pub fn contains(&self, class: &str, method: &str) -> bool {
        self.handlers
            .get(class)
            .map_or(false, |methods| methods.contains_key(method))
    }

    /// Get the number of registered handlers across all classes
    pub fn len(&self) -> usize {
        self.handlers.values().map(|m| m.len()).sum()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for MethodRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MethodRegistry")
            .field("classes", &self.handlers.len())
            .field("count", &self.len())
            .finish()
    }
}
