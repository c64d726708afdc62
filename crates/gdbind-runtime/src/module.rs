//! Module surface
//!
//! The names the embedding language sees at module scope: one binding per
//! class (usable as a constructor and for instance checks), one per
//! singleton, one per global integer constant. Module bindings are
//! read-only.
//!
//! Binding order is classes, then singletons, then constants. A singleton
//! whose binding name equals its class name replaces the class binding
//! (the loader rejects singleton names that belong to any other class);
//! a constant colliding with either replaces it with a warning.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::{BindError, BindResult};
use crate::identity::Wrapper;
use crate::lattice::{TypeLattice, TypeRef};
use crate::singleton::{SingletonMarker, SingletonRegistry};
use crate::value::Value;

/// Runtime kind of a module binding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    /// Class type (constructor, instance checks)
    Class,
    /// Singleton accessor
    Singleton,
    /// Integer constant
    Constant,
}

/// Module-level binding
#[derive(Debug, Clone)]
pub enum Binding {
    /// Synthesized class type
    Class(TypeRef),
    /// Singleton instance with its marker
    Singleton {
        /// Marker distinguishing the accessor from a class
        marker: SingletonMarker,
        /// The singleton wrapper
        instance: Wrapper,
    },
    /// Global integer constant
    Constant(i64),
}

impl Binding {
    /// Runtime kind
    pub fn kind(&self) -> BindingKind {
        match self {
            Binding::Class(_) => BindingKind::Class,
            Binding::Singleton { .. } => BindingKind::Singleton,
            Binding::Constant(_) => BindingKind::Constant,
        }
    }

    /// Class type, if this is a class binding
    pub fn as_class(&self) -> Option<&TypeRef> {
        match self {
            Binding::Class(t) => Some(t),
            _ => None,
        }
    }

    /// Singleton instance, if this is a singleton binding
    pub fn as_singleton(&self) -> Option<&Wrapper> {
        match self {
            Binding::Singleton { instance, .. } => Some(instance),
            _ => None,
        }
    }

    /// Constant value, if this is a constant binding
    pub fn as_constant(&self) -> Option<i64> {
        match self {
            Binding::Constant(v) => Some(*v),
            _ => None,
        }
    }

    /// Value of the binding as seen by the embedding language.
    ///
    /// Class bindings have no value representation and yield `None`.
    pub fn value(&self) -> Option<Value> {
        match self {
            Binding::Class(_) => None,
            Binding::Singleton { instance, .. } => Some(Value::Object(instance.clone())),
            Binding::Constant(v) => Some(Value::Int(*v)),
        }
    }
}

/// Read-only module namespace
#[derive(Debug, Default)]
pub struct Module {
    bindings: BTreeMap<String, Binding>,
}

impl Module {
    /// Build the module from synthesized types, singletons and constants
    pub fn build(
        lattice: &TypeLattice,
        singletons: &SingletonRegistry,
        constants: &BTreeMap<String, i64>,
    ) -> Self {
        let mut bindings = BTreeMap::new();

        for ty in lattice.iter() {
            bindings.insert(ty.name().to_string(), Binding::Class(Arc::clone(ty)));
        }

        for (marker, instance) in singletons.iter() {
            let binding = Binding::Singleton {
                marker: marker.clone(),
                instance: instance.clone(),
            };
            if let Some(Binding::Class(_)) = bindings.insert(marker.name().to_string(), binding) {
                tracing::debug!(name = marker.name(), "singleton replaces class binding");
            }
        }

        for (name, &value) in constants {
            if let Some(previous) = bindings.insert(name.clone(), Binding::Constant(value)) {
                tracing::warn!(
                    name = %name,
                    replaced = ?previous.kind(),
                    "global constant shadows a module binding"
                );
            }
        }

        Self { bindings }
    }

    /// Look up a binding
    pub fn get(&self, name: &str) -> Option<&Binding> {
        self.bindings.get(name)
    }

    /// Runtime kind of a binding
    pub fn kind_of(&self, name: &str) -> Option<BindingKind> {
        self.bindings.get(name).map(Binding::kind)
    }

    /// All binding names, sorted
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.bindings.keys().map(String::as_str)
    }

    /// Check if a binding exists
    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    /// Number of bindings
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Check if the module is empty
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Module bindings cannot be reassigned
    pub fn assign(&self, name: &str, _value: Value) -> BindResult<()> {
        if self.bindings.contains_key(name) {
            Err(BindError::ImmutableMember {
                class: "module".to_string(),
                member: name.to_string(),
            })
        } else {
            Err(BindError::UnknownMember {
                class: "module".to_string(),
                member: name.to_string(),
            })
        }
    }
}
