//! Class descriptors
//!
//! Plain data describing one native class as exported by the engine. The
//! builder methods (`with_*`) exist for constructing databases in code; the
//! JSON loader produces the same structures.

use std::collections::BTreeMap;

use super::tag::TypeTag;

/// Method signature
#[derive(Debug, Clone, PartialEq)]
pub struct MethodDescriptor {
    /// Method name
    pub name: String,
    /// Positional parameter types
    pub params: Vec<TypeTag>,
    /// Return type
    pub returns: TypeTag,
}

impl MethodDescriptor {
    /// Create a method descriptor
    pub fn new(name: impl Into<String>, params: Vec<TypeTag>, returns: TypeTag) -> Self {
        Self {
            name: name.into(),
            params,
            returns,
        }
    }

    /// Check if the engine treats this method as private
    pub fn is_private(&self) -> bool {
        self.name.starts_with('_')
    }
}

/// Property backed by a getter and an optional setter
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDescriptor {
    /// Property name
    pub name: String,
    /// Value type
    pub ty: TypeTag,
    /// Getter method name
    pub getter: String,
    /// Setter method name, `None` for read-only properties
    pub setter: Option<String>,
}

impl PropertyDescriptor {
    /// Check if the property has no setter
    pub fn is_read_only(&self) -> bool {
        self.setter.is_none()
    }
}

/// Signal declaration. Dispatch belongs to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SignalDescriptor {
    /// Signal name
    pub name: String,
}

/// One native class
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDescriptor {
    /// Class name, unique within a database
    pub name: String,
    /// Parent class name, `None` for the root
    pub parent: Option<String>,
    /// Methods in declaration order
    pub methods: Vec<MethodDescriptor>,
    /// Properties by name
    pub properties: BTreeMap<String, PropertyDescriptor>,
    /// Integer constants by name
    pub constants: BTreeMap<String, i64>,
    /// Signals in declaration order
    pub signals: Vec<SignalDescriptor>,
    /// The engine exposes exactly one instance of this class
    pub singleton: bool,
    /// Module-level name of the singleton, defaults to the class name
    pub singleton_name: Option<String>,
    /// New instances may be created from the embedding side
    pub instantiable: bool,
}

impl ClassDescriptor {
    /// Create an empty, instantiable root class
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            methods: Vec::new(),
            properties: BTreeMap::new(),
            constants: BTreeMap::new(),
            signals: Vec::new(),
            singleton: false,
            singleton_name: None,
            instantiable: true,
        }
    }

    /// Set the parent class
    pub fn inherits(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Add a method
    pub fn with_method(mut self, name: &str, params: Vec<TypeTag>, returns: TypeTag) -> Self {
        self.methods.push(MethodDescriptor::new(name, params, returns));
        self
    }

    /// Add a property
    pub fn with_property(
        mut self,
        name: &str,
        ty: TypeTag,
        getter: &str,
        setter: Option<&str>,
    ) -> Self {
        self.properties.insert(
            name.to_string(),
            PropertyDescriptor {
                name: name.to_string(),
                ty,
                getter: getter.to_string(),
                setter: setter.map(str::to_string),
            },
        );
        self
    }

    /// Add an integer constant
    pub fn with_constant(mut self, name: &str, value: i64) -> Self {
        self.constants.insert(name.to_string(), value);
        self
    }

    /// Add a signal
    pub fn with_signal(mut self, name: &str) -> Self {
        self.signals.push(SignalDescriptor {
            name: name.to_string(),
        });
        self
    }

    /// Mark as singleton, optionally bound under a different module name
    pub fn as_singleton(mut self, binding_name: Option<&str>) -> Self {
        self.singleton = true;
        self.singleton_name = binding_name.map(str::to_string);
        self
    }

    /// Refuse instantiation from the embedding side
    pub fn not_instantiable(mut self) -> Self {
        self.instantiable = false;
        self
    }

    /// Check if this is a root class
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Module-level name of the singleton instance
    pub fn binding_name(&self) -> &str {
        self.singleton_name.as_deref().unwrap_or(&self.name)
    }

    /// Find a method declared directly on this class
    pub fn find_method(&self, name: &str) -> Option<&MethodDescriptor> {
        self.methods.iter().find(|m| m.name == name)
    }

    /// Count of declared members of every kind
    pub fn member_count(&self) -> usize {
        self.methods.len() + self.properties.len() + self.constants.len() + self.signals.len()
    }
}
