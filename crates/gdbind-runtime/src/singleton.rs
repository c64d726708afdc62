//! Singleton registry
//!
//! Engine singletons are looked up eagerly at initialization and wrapped
//! through the identity cache. The registry keeps a strong reference to each
//! wrapper for the runtime's lifetime, so a singleton keeps one identity.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::bridge::CallBridge;
use crate::error::InitError;
use crate::identity::{IdentityCache, Wrapper};
use crate::lattice::{TypeLattice, TypeRef};

/// Marks a module binding as "the singleton accessor" rather than a class
#[derive(Clone)]
pub struct SingletonMarker {
    name: String,
    class: TypeRef,
}

impl SingletonMarker {
    /// Module-level binding name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared class of the singleton
    pub fn class(&self) -> &TypeRef {
        &self.class
    }
}

impl PartialEq for SingletonMarker {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.class.id() == other.class.id()
    }
}

impl Eq for SingletonMarker {}

impl fmt::Debug for SingletonMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SingletonMarker({}: {})", self.name, self.class.name())
    }
}

#[derive(Debug, Clone)]
struct SingletonEntry {
    marker: SingletonMarker,
    instance: Wrapper,
}

/// Pre-instantiated singleton wrappers by binding name
#[derive(Debug, Default)]
pub struct SingletonRegistry {
    entries: BTreeMap<String, SingletonEntry>,
}

impl SingletonRegistry {
    /// Look up and wrap every singleton class. Any failure is fatal.
    pub fn initialize(
        lattice: &TypeLattice,
        bridge: &CallBridge,
        cache: &IdentityCache,
    ) -> Result<Self, InitError> {
        let mut entries = BTreeMap::new();

        for class in lattice.iter().filter(|t| t.descriptor().singleton) {
            let name = class.descriptor().binding_name().to_string();
            let instance = bridge
                .lookup_singleton(&name)
                .and_then(|handle| cache.wrap(handle))
                .map_err(|source| InitError::Singleton {
                    name: name.clone(),
                    source,
                })?;

            tracing::debug!(
                singleton = %name,
                class = class.name(),
                handle = %instance.handle(),
                "singleton bound"
            );
            let marker = SingletonMarker {
                name: name.clone(),
                class: Arc::clone(class),
            };
            entries.insert(name, SingletonEntry { marker, instance });
        }

        Ok(Self { entries })
    }

    /// Wrapper of the singleton bound as `name`
    pub fn get(&self, name: &str) -> Option<&Wrapper> {
        self.entries.get(name).map(|e| &e.instance)
    }

    /// Marker of the singleton bound as `name`
    pub fn marker(&self, name: &str) -> Option<&SingletonMarker> {
        self.entries.get(name).map(|e| &e.marker)
    }

    /// Check if `name` is a singleton binding
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Singletons sorted by binding name
    pub fn iter(&self) -> impl Iterator<Item = (&SingletonMarker, &Wrapper)> {
        self.entries.values().map(|e| (&e.marker, &e.instance))
    }

    /// Number of singletons
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if there are no singletons
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classdb::{ClassDatabase, ClassDescriptor};
    use crate::error::BindError;
    use crate::options::{RuntimeOptions, UnknownClassPolicy};
    use gdbind_sdk::{ChannelError, HeadlessEngine, NativeChannel};

    fn setup(engine: Arc<HeadlessEngine>) -> Result<(SingletonRegistry, IdentityCache), InitError> {
        let db = ClassDatabase::from_descriptors(
            vec![
                ClassDescriptor::new("Object"),
                ClassDescriptor::new("_Engine").inherits("Object").as_singleton(Some("Engine")),
                ClassDescriptor::new("Input").inherits("Object").as_singleton(None),
            ],
            BTreeMap::new(),
        )?;
        let lattice = Arc::new(TypeLattice::synthesize(&db, &RuntimeOptions::default())?);
        let channel: Arc<dyn NativeChannel> = engine;
        let bridge = CallBridge::new(channel);
        let cache = IdentityCache::new(bridge.clone(), Arc::clone(&lattice), UnknownClassPolicy::Root);
        let registry = SingletonRegistry::initialize(&lattice, &bridge, &cache)?;
        Ok((registry, cache))
    }

    fn engine() -> Arc<HeadlessEngine> {
        let engine = Arc::new(HeadlessEngine::new());
        engine.define_class("Object", None);
        engine.define_class("_Engine", Some("Object"));
        engine.define_class("Input", Some("Object"));
        engine
    }

    #[test]
    fn test_singletons_are_bound_and_kept_alive() {
        let engine = engine();
        let engine_handle = engine.register_singleton("Engine", "_Engine").unwrap();
        engine.register_singleton("Input", "Input").unwrap();

        let (registry, cache) = setup(engine).unwrap();
        assert_eq!(registry.len(), 2);

        let marker = registry.marker("Engine").unwrap();
        assert_eq!(marker.class().name(), "_Engine");
        assert_eq!(registry.get("Engine").unwrap().handle(), engine_handle);
        assert!(registry.get("_Engine").is_none());

        // The registry holds the wrapper, so the cache hands out the same one
        let again = cache.wrap(engine_handle).unwrap();
        assert!(Wrapper::ptr_eq(&again, registry.get("Engine").unwrap()));
    }

    #[test]
    fn test_missing_singleton_is_fatal() {
        let engine = engine();
        engine.register_singleton("Engine", "_Engine").unwrap();

        let err = setup(engine).unwrap_err();
        match err {
            InitError::Singleton { name, source } => {
                assert_eq!(name, "Input");
                assert_eq!(
                    source,
                    BindError::native(
                        "lookup_singleton",
                        ChannelError::UnknownSingleton("Input".to_string())
                    )
                );
            }
            other => panic!("Expected singleton error, got {:?}", other),
        }
    }
}
