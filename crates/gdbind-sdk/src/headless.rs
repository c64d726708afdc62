//! Headless engine
//!
//! An in-process [`NativeChannel`] implementation with a tiny object model:
//! classes with single inheritance, objects with a field table, named
//! singletons and explicit destruction. It backs the runtime's tests and
//! any tooling that needs a channel without a real engine.
//!
//! Method resolution walks the receiver's class chain looking for a handler
//! registered with [`HeadlessEngine::register_method`]. When none is found
//! the engine falls back to accessor conventions: `get_<field>()` and
//! `is_<field>()` read a field, `set_<field>(value)` writes it.

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::channel::NativeChannel;
use crate::error::{ChannelError, ChannelResult};
use crate::handler::{MethodHandlerFn, MethodRegistry};
use crate::value::{ObjectHandle, Variant};

#[derive(Debug)]
struct HeadlessClass {
    parent: Option<String>,
    defaults: FxHashMap<String, Variant>,
    instantiable: bool,
}

#[derive(Debug)]
struct HeadlessObject {
    class: String,
    fields: FxHashMap<String, Variant>,
}

/// In-process engine implementing [`NativeChannel`].
pub struct HeadlessEngine {
    classes: RwLock<FxHashMap<String, HeadlessClass>>,
    objects: RwLock<FxHashMap<ObjectHandle, HeadlessObject>>,
    singletons: RwLock<FxHashMap<String, ObjectHandle>>,
    methods: RwLock<MethodRegistry>,
    next_id: AtomicU64,
}

impl HeadlessEngine {
    /// Create an engine with no classes
    pub fn new() -> Self {
        Self {
            classes: RwLock::new(FxHashMap::default()),
            objects: RwLock::new(FxHashMap::default()),
            singletons: RwLock::new(FxHashMap::default()),
            methods: RwLock::new(MethodRegistry::new()),
            next_id: AtomicU64::new(1),
        }
    }

    // ========================================================================
    // Class setup
    // ========================================================================

    /// Define (or redefine) a class. Parents are referenced by name and need
    /// not exist yet.
    pub fn define_class(&self, name: &str, parent: Option<&str>) {
        self.classes.write().insert(
            name.to_string(),
            HeadlessClass {
                parent: parent.map(str::to_string),
                defaults: FxHashMap::default(),
                instantiable: true,
            },
        );
    }

    /// Set the initial value of `field` for new objects of `class` and its
    /// subclasses. Unknown classes are ignored.
    pub fn set_default(&self, class: &str, field: &str, value: Variant) {
        if let Some(c) = self.classes.write().get_mut(class) {
            c.defaults.insert(field.to_string(), value);
        }
    }

    /// Allow or refuse `instantiate` for `class`
    pub fn set_instantiable(&self, class: &str, instantiable: bool) {
        if let Some(c) = self.classes.write().get_mut(class) {
            c.instantiable = instantiable;
        }
    }

    /// Register a native method implementation on `class`
    pub fn register_method(
        &self,
        class: &str,
        method: &str,
        handler: impl Fn(&HeadlessEngine, ObjectHandle, &[Variant]) -> ChannelResult<Variant>
            + Send
            + Sync
            + 'static,
    ) {
        self.methods.write().register(class, method, handler);
    }

    /// Create an object and publish it as singleton `name`
    pub fn register_singleton(&self, name: &str, class: &str) -> ChannelResult<ObjectHandle> {
        let handle = self.create_object(class)?;
        self.singletons.write().insert(name.to_string(), handle);
        Ok(handle)
    }

    // ========================================================================
    // Objects
    // ========================================================================

    /// Create an object of `class`, bypassing the instantiable flag.
    pub fn create_object(&self, class: &str) -> ChannelResult<ObjectHandle> {
        let fields = {
            let classes = self.classes.read();
            if !classes.contains_key(class) {
                return Err(ChannelError::UnknownClass(class.to_string()));
            }
            // Root-most defaults first so subclasses override them
            let mut fields = FxHashMap::default();
            for name in self.chain_locked(&classes, class).iter().rev() {
                if let Some(c) = classes.get(name) {
                    for (k, v) in &c.defaults {
                        fields.insert(k.clone(), v.clone());
                    }
                }
            }
            fields
        };

        let handle = ObjectHandle::from_raw(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.objects.write().insert(
            handle,
            HeadlessObject {
                class: class.to_string(),
                fields,
            },
        );
        tracing::trace!(class, %handle, "headless object created");
        Ok(handle)
    }

    /// Destroy an object. Returns false if it was already gone.
    pub fn destroy(&self, handle: ObjectHandle) -> bool {
        let removed = self.objects.write().remove(&handle).is_some();
        if removed {
            tracing::trace!(%handle, "headless object destroyed");
        }
        removed
    }

    /// Check if an object is still alive
    pub fn is_alive(&self, handle: ObjectHandle) -> bool {
        self.objects.read().contains_key(&handle)
    }

    /// Number of live objects
    pub fn object_count(&self) -> usize {
        self.objects.read().len()
    }

    /// Read a field. Missing fields read as `Nil`.
    pub fn field(&self, handle: ObjectHandle, name: &str) -> ChannelResult<Variant> {
        let objects = self.objects.read();
        let obj = objects
            .get(&handle)
            .ok_or(ChannelError::DestroyedObject(handle))?;
        Ok(obj.fields.get(name).cloned().unwrap_or_default())
    }

    /// Write a field
    pub fn set_field(&self, handle: ObjectHandle, name: &str, value: Variant) -> ChannelResult<()> {
        let mut objects = self.objects.write();
        let obj = objects
            .get_mut(&handle)
            .ok_or(ChannelError::DestroyedObject(handle))?;
        obj.fields.insert(name.to_string(), value);
        Ok(())
    }

    // ========================================================================
    // Internals
    // ========================================================================

    /// Class chain from `class` up to its root
    fn chain_locked(&self, classes: &FxHashMap<String, HeadlessClass>, class: &str) -> Vec<String> {
        let mut chain = Vec::new();
        let mut current = Some(class.to_string());
        while let Some(name) = current {
            // Guard against a cyclic setup
            if chain.contains(&name) {
                break;
            }
            current = classes.get(&name).and_then(|c| c.parent.clone());
            chain.push(name);
        }
        chain
    }

    fn resolve_handler(&self, class: &str, method: &str) -> Option<MethodHandlerFn> {
        let chain = self.chain_locked(&self.classes.read(), class);
        let methods = self.methods.read();
        chain.iter().find_map(|c| methods.get(c, method))
    }

    fn class_of(&self, handle: ObjectHandle) -> ChannelResult<String> {
        self.objects
            .read()
            .get(&handle)
            .map(|o| o.class.clone())
            .ok_or(ChannelError::DestroyedObject(handle))
    }
}

impl Default for HeadlessEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for HeadlessEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeadlessEngine")
            .field("classes", &self.classes.read().len())
            .field("objects", &self.objects.read().len())
            .field("singletons", &self.singletons.read().len())
            .finish()
    }
}

impl NativeChannel for HeadlessEngine {
    fn call(&self, handle: ObjectHandle, method: &str, args: &[Variant]) -> ChannelResult<Variant> {
        let class = self.class_of(handle)?;
        tracing::trace!(%handle, class = %class, method, "headless call");

        if let Some(handler) = self.resolve_handler(&class, method) {
            return handler(self, handle, args);
        }

        let getter = method
            .strip_prefix("get_")
            .or_else(|| method.strip_prefix("is_"));
        match (getter, method.strip_prefix("set_"), args) {
            (Some(field), _, []) => self.field(handle, field),
            (_, Some(field), [value]) => {
                self.set_field(handle, field, value.clone())?;
                Ok(Variant::Nil)
            }
            _ => Err(ChannelError::UnknownMethod {
                class,
                method: method.to_string(),
            }),
        }
    }

    fn class_name_of(&self, handle: ObjectHandle) -> ChannelResult<String> {
        self.class_of(handle)
    }

    fn lookup_singleton(&self, name: &str) -> ChannelResult<ObjectHandle> {
        let handle = self
            .singletons
            .read()
            .get(name)
            .copied()
            .ok_or_else(|| ChannelError::UnknownSingleton(name.to_string()))?;
        if !self.is_alive(handle) {
            return Err(ChannelError::DestroyedObject(handle));
        }
        Ok(handle)
    }

    fn instantiate(&self, class: &str) -> ChannelResult<ObjectHandle> {
        let instantiable = self
            .classes
            .read()
            .get(class)
            .map(|c| c.instantiable)
            .ok_or_else(|| ChannelError::UnknownClass(class.to_string()))?;
        if !instantiable {
            return Err(ChannelError::NotInstantiable(class.to_string()));
        }
        self.create_object(class)
    }
}
