//! Member binding
//!
//! Turns a class descriptor into a [`MemberTable`] of methods, property
//! accessors, constants and signals. Members bind in a fixed kind order
//! (methods, properties, signals, constants); when two members of one class
//! share a name the later kind wins and a warning is logged. A child's
//! resolved table is its parent's with the child's own members overlaid.

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::classdb::{ClassDescriptor, MethodDescriptor, PropertyDescriptor, SignalDescriptor, TypeTag};
use crate::error::{BindError, BindResult, LoadError};
use crate::identity::Wrapper;
use crate::lattice::ClassId;
use crate::marshal::{self, Coercion};
use crate::options::RuntimeOptions;
use crate::runtime::Runtime;
use crate::value::Value;

// ============================================================================
// Bindings
// ============================================================================

/// Method bound to the call bridge
#[derive(Debug)]
pub struct MethodBinding {
    owner: String,
    descriptor: MethodDescriptor,
    params: Vec<Coercion>,
    returns: Coercion,
    qualified: String,
}

impl MethodBinding {
    /// Class declaring the method
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Method name
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    /// Declared signature
    pub fn descriptor(&self) -> &MethodDescriptor {
        &self.descriptor
    }

    /// Parameter coercions
    pub fn params(&self) -> &[Coercion] {
        &self.params
    }

    /// Return coercion
    pub fn returns(&self) -> Coercion {
        self.returns
    }

    /// Call on `receiver` with positional `args`
    pub fn invoke(&self, rt: &Runtime, receiver: &Wrapper, args: &[Value]) -> BindResult<Value> {
        let raw_args = marshal::marshal_args(
            &self.qualified,
            args,
            &self.params,
            rt.lattice(),
            rt.options().strict_object_args,
        )?;
        let raw = rt.bridge().invoke(receiver.handle(), self.name(), &raw_args)?;
        marshal::from_variant(raw, self.returns, rt.cache())
            .map_err(|e| e.into_return_error(self.name()))
    }
}

/// Property backed by getter and setter methods
#[derive(Debug)]
pub struct PropertyBinding {
    owner: String,
    descriptor: PropertyDescriptor,
    coercion: Coercion,
}

impl PropertyBinding {
    /// Class declaring the property
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Property name
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    /// Declared property
    pub fn descriptor(&self) -> &PropertyDescriptor {
        &self.descriptor
    }

    /// Check if there is no setter
    pub fn is_read_only(&self) -> bool {
        self.descriptor.is_read_only()
    }

    /// Read through the getter
    pub fn get(&self, rt: &Runtime, receiver: &Wrapper) -> BindResult<Value> {
        let getter = &self.descriptor.getter;
        let raw = rt.bridge().invoke(receiver.handle(), getter, &[])?;
        marshal::from_variant(raw, self.coercion, rt.cache()).map_err(|e| e.into_return_error(getter))
    }

    /// Write through the setter. Read-only properties fail without a native call.
    pub fn set(&self, rt: &Runtime, receiver: &Wrapper, value: &Value) -> BindResult<()> {
        let Some(setter) = &self.descriptor.setter else {
            return Err(BindError::ImmutableMember {
                class: receiver.class_name().to_string(),
                member: self.name().to_string(),
            });
        };
        let raw = marshal::to_variant(
            value,
            self.coercion,
            rt.lattice(),
            rt.options().strict_object_args,
        )
        .map_err(|e| e.into_argument_error(&format!("{}.{}", self.owner, setter), 0))?;
        rt.bridge().invoke(receiver.handle(), setter, &[raw])?;
        Ok(())
    }
}

/// Class-level integer constant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstantBinding {
    /// Declaring class
    pub owner: String,
    /// Constant name
    pub name: String,
    /// Value
    pub value: i64,
}

/// Signal declared on a class
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignalBinding {
    /// Declaring class
    pub owner: String,
    /// Signal
    pub signal: SignalDescriptor,
}

// ============================================================================
// Member Table
// ============================================================================

/// Kind of a bound member
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    /// Method
    Method,
    /// Property
    Property,
    /// Constant
    Constant,
    /// Signal
    Signal,
}

impl fmt::Display for MemberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MemberKind::Method => "method",
            MemberKind::Property => "property",
            MemberKind::Constant => "constant",
            MemberKind::Signal => "signal",
        };
        f.write_str(s)
    }
}

/// One bound member
#[derive(Debug, Clone)]
pub enum Member {
    /// Callable method
    Method(Arc<MethodBinding>),
    /// Property accessor pair
    Property(Arc<PropertyBinding>),
    /// Integer constant
    Constant(ConstantBinding),
    /// Signal descriptor
    Signal(SignalBinding),
}

impl Member {
    /// Member kind
    pub fn kind(&self) -> MemberKind {
        match self {
            Member::Method(_) => MemberKind::Method,
            Member::Property(_) => MemberKind::Property,
            Member::Constant(_) => MemberKind::Constant,
            Member::Signal(_) => MemberKind::Signal,
        }
    }

    /// Class declaring the member
    pub fn owner(&self) -> &str {
        match self {
            Member::Method(m) => m.owner(),
            Member::Property(p) => p.owner(),
            Member::Constant(c) => &c.owner,
            Member::Signal(s) => &s.owner,
        }
    }
}

/// Name → member map of one type
#[derive(Debug, Clone, Default)]
pub struct MemberTable {
    entries: FxHashMap<String, Member>,
}

impl MemberTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert, returning the member previously bound under `name`
    pub fn insert(&mut self, name: impl Into<String>, member: Member) -> Option<Member> {
        self.entries.insert(name.into(), member)
    }

    /// Look up a member
    pub fn get(&self, name: &str) -> Option<&Member> {
        self.entries.get(name)
    }

    /// Check if a member exists
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Number of members
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the table is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Members in arbitrary order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Member)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Members sorted by name
    pub fn sorted(&self) -> Vec<(&str, &Member)> {
        let mut members: Vec<_> = self.iter().collect();
        members.sort_unstable_by(|a, b| a.0.cmp(b.0));
        members
    }

    /// Copy every entry of `other` over this table
    pub fn overlay(&mut self, other: &MemberTable) {
        for (name, member) in &other.entries {
            self.entries.insert(name.clone(), member.clone());
        }
    }
}

// ============================================================================
// Attribute Protocol
// ============================================================================

/// Method bound to a receiver
#[derive(Debug, Clone)]
pub struct BoundMethod {
    receiver: Wrapper,
    method: Arc<MethodBinding>,
}

impl BoundMethod {
    /// Receiver
    pub fn receiver(&self) -> &Wrapper {
        &self.receiver
    }

    /// Method binding
    pub fn method(&self) -> &Arc<MethodBinding> {
        &self.method
    }

    /// Call with positional `args`
    pub fn call(&self, rt: &Runtime, args: &[Value]) -> BindResult<Value> {
        self.method.invoke(rt, &self.receiver, args)
    }
}

/// Result of reading an attribute from an instance
#[derive(Debug, Clone)]
pub enum Attribute {
    /// Callable bound to the instance
    Method(BoundMethod),
    /// Property or constant value
    Value(Value),
    /// Signal descriptor
    Signal(SignalDescriptor),
}

impl Attribute {
    /// Value of a property or constant
    pub fn into_value(self) -> Option<Value> {
        match self {
            Attribute::Value(v) => Some(v),
            _ => None,
        }
    }

    /// Bound method, if this is one
    pub fn into_method(self) -> Option<BoundMethod> {
        match self {
            Attribute::Method(m) => Some(m),
            _ => None,
        }
    }

    pub(crate) fn resolve(rt: &Runtime, receiver: &Wrapper, member: &Member) -> BindResult<Self> {
        match member {
            Member::Method(method) => Ok(Attribute::Method(BoundMethod {
                receiver: receiver.clone(),
                method: Arc::clone(method),
            })),
            Member::Property(property) => property.get(rt, receiver).map(Attribute::Value),
            Member::Constant(constant) => Ok(Attribute::Value(Value::Int(constant.value))),
            Member::Signal(signal) => Ok(Attribute::Signal(signal.signal.clone())),
        }
    }
}

// ============================================================================
// Binding
// ============================================================================

fn coercion(
    tag: &TypeTag,
    ids: &FxHashMap<String, ClassId>,
    context: impl FnOnce() -> String,
) -> Result<Coercion, LoadError> {
    Coercion::from_tag(tag, ids).ok_or_else(|| LoadError::UnknownTypeTag {
        tag: tag.to_string(),
        context: context(),
    })
}

fn bind_member(table: &mut MemberTable, class: &str, name: &str, member: Member) {
    let kind = member.kind();
    if let Some(previous) = table.insert(name, member) {
        tracing::warn!(
            class,
            member = name,
            replaced = %previous.kind(),
            by = %kind,
            "member name collision, later binding wins"
        );
    }
}

/// Bind the members declared directly on `class`
pub fn bind_class(
    class: &ClassDescriptor,
    ids: &FxHashMap<String, ClassId>,
    options: &RuntimeOptions,
) -> Result<MemberTable, LoadError> {
    let mut table = MemberTable::new();
    let name = class.name.as_str();

    let mut hidden = 0usize;
    for method in &class.methods {
        if method.is_private() && !options.expose_private_methods {
            hidden += 1;
            continue;
        }
        let context = || format!("{}.{}", name, method.name);
        let params = method
            .params
            .iter()
            .map(|p| coercion(p, ids, context))
            .collect::<Result<Vec<_>, _>>()?;
        let returns = coercion(&method.returns, ids, context)?;
        let binding = MethodBinding {
            owner: name.to_string(),
            descriptor: method.clone(),
            params,
            returns,
            qualified: context(),
        };
        bind_member(&mut table, name, &method.name, Member::Method(Arc::new(binding)));
    }
    if hidden > 0 {
        tracing::trace!(class = name, hidden, "private methods not bound");
    }

    for property in class.properties.values() {
        let coercion = coercion(&property.ty, ids, || format!("{}.{}", name, property.name))?;
        let binding = PropertyBinding {
            owner: name.to_string(),
            descriptor: property.clone(),
            coercion,
        };
        bind_member(&mut table, name, &property.name, Member::Property(Arc::new(binding)));
    }

    for signal in &class.signals {
        let binding = SignalBinding {
            owner: name.to_string(),
            signal: signal.clone(),
        };
        bind_member(&mut table, name, &signal.name, Member::Signal(binding));
    }

    for (constant, &value) in &class.constants {
        let binding = ConstantBinding {
            owner: name.to_string(),
            name: constant.clone(),
            value,
        };
        bind_member(&mut table, name, constant, Member::Constant(binding));
    }

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(names: &[&str]) -> FxHashMap<String, ClassId> {
        let db = crate::classdb::ClassDatabase::from_descriptors(
            names
                .iter()
                .enumerate()
                .map(|(i, n)| {
                    let c = ClassDescriptor::new(*n);
                    if i == 0 {
                        c
                    } else {
                        c.inherits(names[0])
                    }
                })
                .collect(),
            Default::default(),
        )
        .unwrap();
        let lattice =
            crate::lattice::TypeLattice::synthesize(&db, &RuntimeOptions::default()).unwrap();
        names
            .iter()
            .filter_map(|n| lattice.id_of(n).map(|id| (n.to_string(), id)))
            .collect()
    }

    #[test]
    fn test_bind_all_kinds() {
        let class = ClassDescriptor::new("LineEdit")
            .with_method("get_max_length", vec![], TypeTag::Int)
            .with_method("set_max_length", vec![TypeTag::Int], TypeTag::Nil)
            .with_property("max_length", TypeTag::Int, "get_max_length", Some("set_max_length"))
            .with_signal("text_changed")
            .with_constant("ALIGN_LEFT", 0);

        let table = bind_class(&class, &ids(&["Object"]), &RuntimeOptions::default()).unwrap();
        assert_eq!(table.len(), 5);
        assert_eq!(table.get("max_length").unwrap().kind(), MemberKind::Property);
        assert_eq!(table.get("text_changed").unwrap().kind(), MemberKind::Signal);
        match table.get("set_max_length") {
            Some(Member::Method(m)) => {
                assert_eq!(m.params(), &[Coercion::Int]);
                assert_eq!(m.returns(), Coercion::Discard);
            }
            other => panic!("Expected method, got {:?}", other),
        }
    }

    #[test]
    fn test_collision_later_kind_wins() {
        let class = ClassDescriptor::new("Node")
            .with_method("name", vec![], TypeTag::String)
            .with_method("get_name", vec![], TypeTag::String)
            .with_property("name", TypeTag::String, "get_name", None)
            .with_constant("name", 3);

        let table = bind_class(&class, &ids(&["Object"]), &RuntimeOptions::default()).unwrap();
        assert_eq!(table.get("name").unwrap().kind(), MemberKind::Constant);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_private_methods_hidden_by_default() {
        let class = ClassDescriptor::new("Node")
            .with_method("_ready", vec![], TypeTag::Nil)
            .with_method("ready", vec![], TypeTag::Nil);

        let hidden = bind_class(&class, &ids(&["Object"]), &RuntimeOptions::default()).unwrap();
        assert!(!hidden.contains("_ready"));
        assert!(hidden.contains("ready"));

        let options = RuntimeOptions {
            expose_private_methods: true,
            ..RuntimeOptions::default()
        };
        let exposed = bind_class(&class, &ids(&["Object"]), &options).unwrap();
        assert!(exposed.contains("_ready"));
    }

    #[test]
    fn test_object_tag_resolves_to_class_id() {
        let ids = ids(&["Object", "SceneTree"]);
        let class = ClassDescriptor::new("Engine").with_method(
            "get_main_loop",
            vec![],
            TypeTag::Object(Some("SceneTree".into())),
        );
        let table = bind_class(&class, &ids, &RuntimeOptions::default()).unwrap();
        match table.get("get_main_loop") {
            Some(Member::Method(m)) => {
                assert_eq!(m.returns(), Coercion::Object(Some(ids["SceneTree"])));
            }
            other => panic!("Expected method, got {:?}", other),
        }
    }

    #[test]
    fn test_overlay_shadows() {
        let mut parent = MemberTable::new();
        parent.insert(
            "A",
            Member::Constant(ConstantBinding {
                owner: "Object".into(),
                name: "A".into(),
                value: 1,
            }),
        );
        let mut child = MemberTable::new();
        child.insert(
            "A",
            Member::Constant(ConstantBinding {
                owner: "Node".into(),
                name: "A".into(),
                value: 2,
            }),
        );
        parent.overlay(&child);
        assert_eq!(parent.get("A").unwrap().owner(), "Node");
    }
}
