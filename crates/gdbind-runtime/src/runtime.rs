//! The binding runtime
//!
//! Ties together the lattice, the call bridge, the identity cache, the
//! singleton registry and the module surface. Built once; every failure
//! during construction aborts the whole initialization.

use std::fmt;
use std::sync::Arc;

use gdbind_sdk::{NativeChannel, ObjectHandle};

use crate::binder::{Attribute, Member};
use crate::bridge::CallBridge;
use crate::classdb::ClassDatabase;
use crate::error::{BindError, BindResult, InitError};
use crate::identity::{IdentityCache, Wrapper};
use crate::lattice::{SynthesizedType, TypeLattice, TypeRef};
use crate::module::Module;
use crate::options::RuntimeOptions;
use crate::singleton::SingletonRegistry;
use crate::value::Value;

/// Process-wide binding state
pub struct Runtime {
    lattice: Arc<TypeLattice>,
    bridge: CallBridge,
    cache: IdentityCache,
    singletons: SingletonRegistry,
    module: Module,
    options: RuntimeOptions,
}

impl Runtime {
    /// Synthesize types, bind members and obtain singletons
    pub fn new(
        db: ClassDatabase,
        channel: Arc<dyn NativeChannel>,
        options: RuntimeOptions,
    ) -> Result<Self, InitError> {
        let lattice = Arc::new(TypeLattice::synthesize(&db, &options)?);
        let bridge = CallBridge::new(channel);
        let cache = IdentityCache::new(
            bridge.clone(),
            Arc::clone(&lattice),
            options.unknown_class_fallback,
        );
        let singletons = SingletonRegistry::initialize(&lattice, &bridge, &cache)?;
        let module = Module::build(&lattice, &singletons, db.constants());

        tracing::info!(
            classes = lattice.len(),
            singletons = singletons.len(),
            module = module.len(),
            "binding runtime initialized"
        );

        Ok(Self {
            lattice,
            bridge,
            cache,
            singletons,
            module,
            options,
        })
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Synthesized types
    pub fn lattice(&self) -> &TypeLattice {
        &self.lattice
    }

    /// Call bridge
    pub fn bridge(&self) -> &CallBridge {
        &self.bridge
    }

    /// Identity cache
    pub fn cache(&self) -> &IdentityCache {
        &self.cache
    }

    /// Module namespace
    pub fn module(&self) -> &Module {
        &self.module
    }

    /// Options in effect
    pub fn options(&self) -> &RuntimeOptions {
        &self.options
    }

    /// Singleton bound as `name`
    pub fn singleton(&self, name: &str) -> Option<&Wrapper> {
        self.singletons.get(name)
    }

    /// Singleton registry
    pub fn singletons(&self) -> &SingletonRegistry {
        &self.singletons
    }

    /// Synthesized type of a class
    pub fn type_named(&self, name: &str) -> Option<&TypeRef> {
        self.lattice.get(name)
    }

    // ========================================================================
    // Instances
    // ========================================================================

    /// Wrapper for a native handle crossing into the embedding side
    pub fn wrap(&self, handle: ObjectHandle) -> BindResult<Wrapper> {
        self.cache.wrap(handle)
    }

    /// Construct a new native object of `class`
    pub fn instantiate(&self, class: &str) -> BindResult<Wrapper> {
        let ty = self
            .lattice
            .get(class)
            .ok_or_else(|| BindError::UnknownClass(class.to_string()))?;
        let handle = self.bridge.instantiate(ty)?;
        self.cache.wrap(handle)
    }

    /// Check if `value` is an instance of `class` or one of its subclasses.
    ///
    /// Never fails: non-objects and unknown class names yield `false`.
    pub fn is_instance(&self, value: &Value, class: &str) -> bool {
        match (value, self.lattice.get(class)) {
            (Value::Object(w), Some(ty)) => w.is_instance_of(ty),
            _ => false,
        }
    }

    // ========================================================================
    // Attribute Protocol
    // ========================================================================

    /// Read an attribute of an instance
    pub fn getattr(&self, receiver: &Wrapper, name: &str) -> BindResult<Attribute> {
        let member = Self::member_of(receiver.class(), name)?;
        Attribute::resolve(self, receiver, member)
    }

    /// Write an attribute of an instance. Only writable properties accept.
    pub fn setattr(&self, receiver: &Wrapper, name: &str, value: Value) -> BindResult<()> {
        match Self::member_of(receiver.class(), name)? {
            Member::Property(property) => property.set(self, receiver, &value),
            _ => Err(BindError::ImmutableMember {
                class: receiver.class_name().to_string(),
                member: name.to_string(),
            }),
        }
    }

    /// Call a method on an instance
    pub fn call(&self, receiver: &Wrapper, name: &str, args: &[Value]) -> BindResult<Value> {
        match Self::member_of(receiver.class(), name)? {
            Member::Method(method) => method.invoke(self, receiver, args),
            _ => Err(BindError::NotCallable {
                class: receiver.class_name().to_string(),
                member: name.to_string(),
            }),
        }
    }

    /// Read a class-level member: constants, signals and unbound methods
    pub fn class_attr(&self, class: &SynthesizedType, name: &str) -> BindResult<Member> {
        Self::member_of(class, name).cloned()
    }

    /// Class-level members are read-only
    pub fn set_class_attr(&self, class: &SynthesizedType, name: &str, _value: Value) -> BindResult<()> {
        Self::member_of(class, name)?;
        Err(BindError::ImmutableMember {
            class: class.name().to_string(),
            member: name.to_string(),
        })
    }

    fn member_of<'a>(class: &'a SynthesizedType, name: &str) -> BindResult<&'a Member> {
        class.member(name).ok_or_else(|| BindError::UnknownMember {
            class: class.name().to_string(),
            member: name.to_string(),
        })
    }
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("classes", &self.lattice.len())
            .field("singletons", &self.singletons.len())
            .field("cache", &self.cache)
            .field("options", &self.options)
            .finish()
    }
}
