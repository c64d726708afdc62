//! Instance identity cache
//!
//! Maps a native [`ObjectHandle`] to the one live [`Wrapper`] for it, so
//! repeated crossings of the same object hand out the same wrapper. The
//! cache only holds weak references: native lifetime belongs to the engine
//! and wrapper lifetime belongs to the embedding side. When the last clone
//! of a wrapper is dropped its entry is removed, and the next crossing
//! builds a fresh wrapper for the same handle.
//!
//! All map access goes through one mutex, held only for check-then-insert.
//! Resolving the runtime class of a new handle is a native round-trip and
//! always happens with the lock released.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Weak};

use gdbind_sdk::ObjectHandle;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::bridge::CallBridge;
use crate::error::{BindError, BindResult};
use crate::lattice::{SynthesizedType, TypeLattice, TypeRef};
use crate::options::UnknownClassPolicy;

type Slots = Mutex<FxHashMap<ObjectHandle, Weak<WrapperInner>>>;

struct WrapperInner {
    handle: ObjectHandle,
    class: TypeRef,
    slots: Weak<Slots>,
}

impl Drop for WrapperInner {
    fn drop(&mut self) {
        let Some(slots) = self.slots.upgrade() else {
            return;
        };
        let mut slots = slots.lock();
        // A newer wrapper may already own the entry; only clear a dead one
        if slots
            .get(&self.handle)
            .map_or(false, |entry| entry.strong_count() == 0)
        {
            slots.remove(&self.handle);
            tracing::trace!(handle = %self.handle, "wrapper released");
        }
    }
}

/// Embedding-side wrapper around one native object.
///
/// Cheap to clone; clones share identity. Two wrappers are equal iff they
/// wrap the same handle. Dropping wrappers never affects the native object.
#[derive(Clone)]
pub struct Wrapper(Arc<WrapperInner>);

impl Wrapper {
    /// Native handle
    pub fn handle(&self) -> ObjectHandle {
        self.0.handle
    }

    /// Most specific known type of the native object
    pub fn class(&self) -> &TypeRef {
        &self.0.class
    }

    /// Name of [`class`](Self::class)
    pub fn class_name(&self) -> &str {
        self.0.class.name()
    }

    /// Check if the object is an instance of `ty` or one of its subtypes
    pub fn is_instance_of(&self, ty: &SynthesizedType) -> bool {
        self.0.class.is_subtype_of(ty.id())
    }

    /// Check if both wrappers are the same allocation
    pub fn ptr_eq(a: &Wrapper, b: &Wrapper) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }
}

impl PartialEq for Wrapper {
    fn eq(&self, other: &Self) -> bool {
        self.0.handle == other.0.handle
    }
}

impl Eq for Wrapper {}

impl Hash for Wrapper {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.handle.hash(state);
    }
}

impl fmt::Debug for Wrapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Wrapper({} {:?})", self.class_name(), self.0.handle)
    }
}

impl fmt::Display for Wrapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}:{}]", self.class_name(), self.0.handle)
    }
}

/// Handle → wrapper registry
pub struct IdentityCache {
    slots: Arc<Slots>,
    bridge: CallBridge,
    lattice: Arc<TypeLattice>,
    fallback: UnknownClassPolicy,
}

impl IdentityCache {
    /// Create an empty cache
    pub fn new(bridge: CallBridge, lattice: Arc<TypeLattice>, fallback: UnknownClassPolicy) -> Self {
        Self {
            slots: Arc::new(Mutex::new(FxHashMap::default())),
            bridge,
            lattice,
            fallback,
        }
    }

    /// Return the live wrapper for `handle`, creating one if needed
    pub fn wrap(&self, handle: ObjectHandle) -> BindResult<Wrapper> {
        if let Some(existing) = self.lookup(handle) {
            tracing::trace!(%handle, "identity cache hit");
            return Ok(existing);
        }

        let class_name = self.bridge.class_name_of(handle)?;
        let class = self.resolve(&class_name)?;
        let fresh = Wrapper(Arc::new(WrapperInner {
            handle,
            class,
            slots: Arc::downgrade(&self.slots),
        }));

        let mut slots = self.slots.lock();
        if let Some(winner) = slots.get(&handle).and_then(Weak::upgrade) {
            // Lost the race; `fresh` must be dropped after unlocking since
            // its destructor takes the lock
            drop(slots);
            drop(fresh);
            return Ok(Wrapper(winner));
        }
        slots.insert(handle, Arc::downgrade(&fresh.0));
        drop(slots);

        tracing::trace!(%handle, class = %class_name, "wrapper created");
        Ok(fresh)
    }

    /// Live wrapper for `handle`, if any
    pub fn lookup(&self, handle: ObjectHandle) -> Option<Wrapper> {
        self.slots
            .lock()
            .get(&handle)
            .and_then(Weak::upgrade)
            .map(Wrapper)
    }

    /// Drop the entry for `handle` (the native object was destroyed).
    ///
    /// Existing wrappers stay usable but calls through them will fail; the
    /// next crossing of the handle builds a new wrapper.
    pub fn forget(&self, handle: ObjectHandle) -> bool {
        self.slots.lock().remove(&handle).is_some()
    }

    /// Remove dead entries, returning how many were removed
    pub fn purge(&self) -> usize {
        let mut slots = self.slots.lock();
        let before = slots.len();
        slots.retain(|_, entry| entry.strong_count() > 0);
        before - slots.len()
    }

    /// Number of handles with a live wrapper
    pub fn live_count(&self) -> usize {
        self.slots
            .lock()
            .values()
            .filter(|entry| entry.strong_count() > 0)
            .count()
    }

    fn resolve(&self, class_name: &str) -> BindResult<TypeRef> {
        if let Some(class) = self.lattice.get(class_name) {
            return Ok(Arc::clone(class));
        }
        match self.fallback {
            UnknownClassPolicy::Root => {
                let root = self.lattice.root();
                tracing::warn!(
                    class = class_name,
                    fallback = root.name(),
                    "native class not in class database"
                );
                Ok(Arc::clone(root))
            }
            UnknownClassPolicy::Error => Err(BindError::UnknownClass(class_name.to_string())),
        }
    }
}

impl fmt::Debug for IdentityCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityCache")
            .field("entries", &self.slots.lock().len())
            .field("fallback", &self.fallback)
            .finish()
    }
}
