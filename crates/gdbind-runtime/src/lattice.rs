//! Type synthesis
//!
//! One [`SynthesizedType`] per class, wired into a single-rooted lattice that
//! mirrors the native parent relation. Types are built once, in topological
//! order, so a parent's flattened member table is always complete before its
//! children copy it.

use std::fmt;
use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::binder::{self, Member, MemberTable};
use crate::classdb::{ClassDatabase, ClassDescriptor};
use crate::error::LoadError;
use crate::options::RuntimeOptions;

/// Dense identifier of a synthesized type, assigned in topological order
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(u32);

impl ClassId {
    /// Position in the lattice
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClassId({})", self.0)
    }
}

/// Shared reference to a synthesized type
pub type TypeRef = Arc<SynthesizedType>;

/// Embedding-side type of one native class
pub struct SynthesizedType {
    id: ClassId,
    descriptor: ClassDescriptor,
    parent: Option<ClassId>,
    /// Self first, root last
    chain: Vec<ClassId>,
    ancestors: FxHashSet<ClassId>,
    own: MemberTable,
    members: MemberTable,
}

impl SynthesizedType {
    /// Type id
    pub fn id(&self) -> ClassId {
        self.id
    }

    /// Native class name
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    /// Descriptor this type was synthesized from
    pub fn descriptor(&self) -> &ClassDescriptor {
        &self.descriptor
    }

    /// Parent type, `None` for the root
    pub fn parent(&self) -> Option<ClassId> {
        self.parent
    }

    /// Ancestor chain, self first, root last
    pub fn chain(&self) -> &[ClassId] {
        &self.chain
    }

    /// Check if this type is `other` or one of its descendants
    #[inline]
    pub fn is_subtype_of(&self, other: ClassId) -> bool {
        self.ancestors.contains(&other)
    }

    /// Members declared on this class only
    pub fn own_members(&self) -> &MemberTable {
        &self.own
    }

    /// Members visible on this class, inherited ones included
    pub fn members(&self) -> &MemberTable {
        &self.members
    }

    /// Resolve a member by name
    pub fn member(&self, name: &str) -> Option<&Member> {
        self.members.get(name)
    }
}

impl fmt::Debug for SynthesizedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SynthesizedType")
            .field("id", &self.id)
            .field("name", &self.descriptor.name)
            .field("parent", &self.parent)
            .field("members", &self.members.len())
            .finish()
    }
}

/// All synthesized types of a database
#[derive(Debug)]
pub struct TypeLattice {
    types: Vec<TypeRef>,
    by_name: FxHashMap<String, ClassId>,
}

impl TypeLattice {
    /// Synthesize and bind one type per class of `db`
    pub fn synthesize(db: &ClassDatabase, options: &RuntimeOptions) -> Result<Self, LoadError> {
        let by_name: FxHashMap<String, ClassId> = db
            .iter()
            .enumerate()
            .map(|(i, c)| (c.name.clone(), ClassId(i as u32)))
            .collect();

        let mut types: Vec<TypeRef> = Vec::with_capacity(db.len());
        for (i, descriptor) in db.iter().enumerate() {
            let id = ClassId(i as u32);
            let parent_type = match &descriptor.parent {
                None => None,
                Some(parent) => {
                    let parent_type = by_name
                        .get(parent)
                        .and_then(|p| types.get(p.index()))
                        .ok_or_else(|| LoadError::UnresolvedParent {
                            class: descriptor.name.clone(),
                            parent: parent.clone(),
                        })?;
                    Some(Arc::clone(parent_type))
                }
            };

            let own = binder::bind_class(descriptor, &by_name, options)?;
            let mut chain = vec![id];
            let mut members = MemberTable::new();
            if let Some(parent) = &parent_type {
                chain.extend_from_slice(&parent.chain);
                members = parent.members.clone();
            }
            members.overlay(&own);

            tracing::debug!(
                class = %descriptor.name,
                own = own.len(),
                resolved = members.len(),
                "synthesized type"
            );

            types.push(Arc::new(SynthesizedType {
                id,
                descriptor: descriptor.clone(),
                parent: parent_type.map(|p| p.id),
                ancestors: chain.iter().copied().collect(),
                chain,
                own,
                members,
            }));
        }

        Ok(Self { types, by_name })
    }

    /// Look up a type by class name
    pub fn get(&self, name: &str) -> Option<&TypeRef> {
        self.by_name.get(name).and_then(|id| self.types.get(id.index()))
    }

    /// Look up a type by id
    pub fn by_id(&self, id: ClassId) -> Option<&TypeRef> {
        self.types.get(id.index())
    }

    /// Id of a class name
    pub fn id_of(&self, name: &str) -> Option<ClassId> {
        self.by_name.get(name).copied()
    }

    /// The root type
    pub fn root(&self) -> &TypeRef {
        // Databases are never empty and the root is synthesized first
        &self.types[0]
    }

    /// Types in topological order
    pub fn iter(&self) -> impl Iterator<Item = &TypeRef> {
        self.types.iter()
    }

    /// Number of types
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Check if the lattice is empty
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Check if `sub` is `sup` or one of its descendants
    pub fn is_subtype_of(&self, sub: ClassId, sup: ClassId) -> bool {
        self.by_id(sub).map_or(false, |t| t.is_subtype_of(sup))
    }

    /// Same as [`is_subtype_of`](Self::is_subtype_of), by class name
    pub fn is_subclass_of(&self, sub: &str, sup: &str) -> bool {
        match (self.id_of(sub), self.id_of(sup)) {
            (Some(sub), Some(sup)) => self.is_subtype_of(sub, sup),
            _ => false,
        }
    }

    /// Ancestor chain of `id`, self first, root last
    pub fn hierarchy(&self, id: ClassId) -> Vec<&TypeRef> {
        self.by_id(id)
            .map(|t| t.chain.iter().filter_map(|&c| self.by_id(c)).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classdb::TypeTag;
    use std::collections::BTreeMap;

    fn lattice(classes: Vec<ClassDescriptor>) -> TypeLattice {
        let db = ClassDatabase::from_descriptors(classes, BTreeMap::new()).unwrap();
        TypeLattice::synthesize(&db, &RuntimeOptions::default()).unwrap()
    }

    #[test]
    fn test_viewport_is_node_and_object() {
        let lattice = lattice(vec![
            ClassDescriptor::new("Viewport").inherits("Node"),
            ClassDescriptor::new("Object"),
            ClassDescriptor::new("Node").inherits("Object"),
        ]);

        assert!(lattice.is_subclass_of("Viewport", "Node"));
        assert!(lattice.is_subclass_of("Viewport", "Object"));
        assert!(lattice.is_subclass_of("Viewport", "Viewport"));
        assert!(!lattice.is_subclass_of("Node", "Viewport"));
        assert!(!lattice.is_subclass_of("Viewport", "Missing"));
        assert_eq!(lattice.root().name(), "Object");
        assert!(lattice.root().parent().is_none());

        let viewport = lattice.get("Viewport").unwrap();
        let node = lattice.get("Node").unwrap();
        assert_eq!(viewport.parent(), Some(node.id()));
    }

    #[test]
    fn test_hierarchy() {
        let lattice = lattice(vec![
            ClassDescriptor::new("Object"),
            ClassDescriptor::new("Node").inherits("Object"),
            ClassDescriptor::new("Viewport").inherits("Node"),
        ]);
        let id = lattice.id_of("Viewport").unwrap();
        let names: Vec<&str> = lattice.hierarchy(id).iter().map(|t| t.name()).collect();
        assert_eq!(names, vec!["Viewport", "Node", "Object"]);
    }

    #[test]
    fn test_empty_class_is_valid_type() {
        let lattice = lattice(vec![ClassDescriptor::new("Object")]);
        let root = lattice.root();
        assert!(root.members().is_empty());
        assert!(root.own_members().is_empty());
    }

    #[test]
    fn test_members_are_inherited_and_shadowed() {
        let lattice = lattice(vec![
            ClassDescriptor::new("Object")
                .with_method("get_class", vec![], TypeTag::String)
                .with_constant("NOTIFICATION_POSTINITIALIZE", 0),
            ClassDescriptor::new("Node")
                .inherits("Object")
                .with_method("get_class", vec![], TypeTag::String)
                .with_constant("NOTIFICATION_READY", 13),
        ]);

        let node = lattice.get("Node").unwrap();
        assert_eq!(node.members().len(), 3);
        assert_eq!(node.own_members().len(), 2);
        assert!(node.member("NOTIFICATION_POSTINITIALIZE").is_some());
        match node.member("get_class") {
            Some(Member::Method(m)) => assert_eq!(m.owner(), "Node"),
            other => panic!("Expected method, got {:?}", other),
        }
    }
}
