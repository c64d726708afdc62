//! Class database loading and validation
//!
//! Validation runs in a fixed order so the reported error is deterministic:
//! class names, singleton names, parent resolution, parent graph structure,
//! then members.
//! The resulting database stores classes in topological order (parents
//! strictly before children, ties in declaration order).

use std::collections::BTreeMap;
use std::path::Path;

use rustc_hash::{FxHashMap, FxHashSet};

use super::descriptor::{ClassDescriptor, MethodDescriptor, PropertyDescriptor, SignalDescriptor};
use super::format::{RawClass, RawDatabase, FORMAT_VERSION};
use super::tag::TypeTag;
use crate::error::{InitError, LoadError, StructureError};

/// Validated, immutable class database
#[derive(Debug, Clone)]
pub struct ClassDatabase {
    /// Classes in topological order
    classes: Vec<ClassDescriptor>,
    index: FxHashMap<String, usize>,
    constants: BTreeMap<String, i64>,
}

impl ClassDatabase {
    /// Load from a JSON string
    pub fn from_json_str(json: &str) -> Result<Self, InitError> {
        let raw: RawDatabase = serde_json::from_str(json).map_err(LoadError::from)?;
        Self::from_raw(raw)
    }

    /// Load from JSON bytes
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, InitError> {
        let raw: RawDatabase = serde_json::from_slice(bytes).map_err(LoadError::from)?;
        Self::from_raw(raw)
    }

    /// Load from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, InitError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(LoadError::from)?;
        tracing::debug!(path = %path.display(), bytes = bytes.len(), "reading class database");
        Self::from_json_slice(&bytes)
    }

    fn from_raw(raw: RawDatabase) -> Result<Self, InitError> {
        if raw.version != FORMAT_VERSION {
            return Err(LoadError::UnsupportedVersion {
                found: raw.version,
                expected: FORMAT_VERSION,
            }
            .into());
        }
        let classes = raw
            .classes
            .into_iter()
            .map(convert_class)
            .collect::<Result<Vec<_>, LoadError>>()?;
        Self::from_descriptors(classes, raw.constants)
    }

    /// Validate descriptors built in code (or converted from JSON)
    pub fn from_descriptors(
        classes: Vec<ClassDescriptor>,
        constants: BTreeMap<String, i64>,
    ) -> Result<Self, InitError> {
        if classes.is_empty() {
            return Err(LoadError::Empty.into());
        }

        let mut index = FxHashMap::default();
        for (i, class) in classes.iter().enumerate() {
            if index.insert(class.name.clone(), i).is_some() {
                return Err(LoadError::DuplicateClass(class.name.clone()).into());
            }
        }

        check_singleton_names(&classes, &index)?;

        let parents = resolve_parents(&classes, &index)?;
        check_structure(&classes, &parents)?;
        for (i, class) in classes.iter().enumerate() {
            validate_members(class, i, &classes, &parents, &index)?;
        }

        let order = topological_order(&parents);
        let mut slots: Vec<Option<ClassDescriptor>> = classes.into_iter().map(Some).collect();
        let classes: Vec<ClassDescriptor> = order.iter().filter_map(|&i| slots[i].take()).collect();
        let index = classes
            .iter()
            .enumerate()
            .map(|(i, c)| (c.name.clone(), i))
            .collect();

        tracing::debug!(
            classes = classes.len(),
            constants = constants.len(),
            "class database loaded"
        );
        Ok(Self {
            classes,
            index,
            constants,
        })
    }

    /// Look up a class by name
    pub fn get(&self, name: &str) -> Option<&ClassDescriptor> {
        self.index.get(name).map(|&i| &self.classes[i])
    }

    /// Check if a class exists
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Number of classes
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Always false for a loaded database
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Classes in topological order
    pub fn iter(&self) -> impl Iterator<Item = &ClassDescriptor> {
        self.classes.iter()
    }

    /// The single root class
    pub fn root(&self) -> &ClassDescriptor {
        // Topological order puts the root first
        &self.classes[0]
    }

    /// Database-level integer constants
    pub fn constants(&self) -> &BTreeMap<String, i64> {
        &self.constants
    }

    /// Singleton classes in topological order
    pub fn singletons(&self) -> impl Iterator<Item = &ClassDescriptor> {
        self.classes.iter().filter(|c| c.singleton)
    }

    /// Ancestor chain of `name`, starting with the class itself
    pub fn ancestors(&self, name: &str) -> Vec<&ClassDescriptor> {
        let mut chain = Vec::new();
        let mut current = self.get(name);
        while let Some(class) = current {
            chain.push(class);
            current = class.parent.as_deref().and_then(|p| self.get(p));
        }
        chain
    }
}

fn convert_class(raw: RawClass) -> Result<ClassDescriptor, LoadError> {
    let parse = |tag: &str, context: String| {
        TypeTag::parse(tag).ok_or_else(|| LoadError::UnknownTypeTag {
            tag: tag.to_string(),
            context,
        })
    };

    let mut methods = Vec::with_capacity(raw.methods.len());
    for m in &raw.methods {
        let context = format!("{}.{}", raw.name, m.name);
        let params = m
            .args
            .iter()
            .map(|a| parse(a, context.clone()))
            .collect::<Result<Vec<_>, _>>()?;
        let returns = parse(&m.returns, context)?;
        methods.push(MethodDescriptor::new(m.name.clone(), params, returns));
    }

    let mut properties = BTreeMap::new();
    for p in raw.properties {
        let ty = parse(&p.ty, format!("{}.{}", raw.name, p.name))?;
        let descriptor = PropertyDescriptor {
            name: p.name.clone(),
            ty,
            getter: p.getter,
            setter: p.setter,
        };
        if properties.insert(p.name.clone(), descriptor).is_some() {
            tracing::warn!(class = %raw.name, property = %p.name, "duplicate property, keeping the last one");
        }
    }

    Ok(ClassDescriptor {
        name: raw.name,
        parent: raw.parent,
        methods,
        properties,
        constants: raw.constants,
        signals: raw
            .signals
            .into_iter()
            .map(|s| SignalDescriptor { name: s.name })
            .collect(),
        singleton: raw.singleton,
        singleton_name: raw.singleton_name,
        instantiable: raw.instantiable,
    })
}

/// Singleton binding names must be unique and must not name another class
fn check_singleton_names(
    classes: &[ClassDescriptor],
    index: &FxHashMap<String, usize>,
) -> Result<(), LoadError> {
    let mut bound: FxHashMap<&str, &str> = FxHashMap::default();
    for class in classes.iter().filter(|c| c.singleton) {
        let name = class.binding_name();
        if name != class.name && index.contains_key(name) {
            return Err(LoadError::SingletonShadowsClass {
                class: class.name.clone(),
                name: name.to_string(),
            });
        }
        if let Some(first) = bound.insert(name, &class.name) {
            return Err(LoadError::DuplicateSingleton {
                name: name.to_string(),
                first: first.to_string(),
                second: class.name.clone(),
            });
        }
    }
    Ok(())
}

/// Parent index of every class
fn resolve_parents(
    classes: &[ClassDescriptor],
    index: &FxHashMap<String, usize>,
) -> Result<Vec<Option<usize>>, LoadError> {
    classes
        .iter()
        .map(|class| match &class.parent {
            None => Ok(None),
            Some(parent) => index.get(parent).copied().map(Some).ok_or_else(|| {
                LoadError::UnresolvedParent {
                    class: class.name.clone(),
                    parent: parent.clone(),
                }
            }),
        })
        .collect()
}

/// Reject cycles and multiple roots.
///
/// With every parent resolved and no cycle, at least one root exists.
fn check_structure(
    classes: &[ClassDescriptor],
    parents: &[Option<usize>],
) -> Result<(), StructureError> {
    let mut settled = vec![false; classes.len()];

    for start in 0..classes.len() {
        let mut path: Vec<usize> = Vec::new();
        let mut on_path = FxHashSet::default();
        let mut current = Some(start);

        while let Some(i) = current {
            if settled[i] {
                break;
            }
            if !on_path.insert(i) {
                let from = path.iter().position(|&p| p == i).unwrap_or(0);
                let mut cycle: Vec<String> =
                    path[from..].iter().map(|&p| classes[p].name.clone()).collect();
                cycle.push(classes[i].name.clone());
                return Err(StructureError::Cycle(cycle));
            }
            path.push(i);
            current = parents[i];
        }

        for i in path {
            settled[i] = true;
        }
    }

    let roots: Vec<String> = classes
        .iter()
        .filter(|c| c.is_root())
        .map(|c| c.name.clone())
        .collect();
    if roots.len() > 1 {
        return Err(StructureError::MultipleRoots(roots));
    }
    Ok(())
}

fn validate_members(
    class: &ClassDescriptor,
    position: usize,
    classes: &[ClassDescriptor],
    parents: &[Option<usize>],
    index: &FxHashMap<String, usize>,
) -> Result<(), LoadError> {
    let check_class_tag = |tag: &TypeTag, context: &str| match tag.class_name() {
        Some(name) if !index.contains_key(name) => Err(LoadError::UnknownTypeTag {
            tag: name.to_string(),
            context: context.to_string(),
        }),
        _ => Ok(()),
    };

    let mut seen = FxHashSet::default();
    for method in &class.methods {
        let context = format!("{}.{}", class.name, method.name);
        if !seen.insert(method.name.as_str()) {
            return Err(LoadError::DuplicateMethod {
                class: class.name.clone(),
                method: method.name.clone(),
            });
        }
        for param in &method.params {
            if param.is_nil() {
                return Err(LoadError::NilParameter(context));
            }
            check_class_tag(param, &context)?;
        }
        check_class_tag(&method.returns, &context)?;
    }

    for property in class.properties.values() {
        let context = format!("{}.{}", class.name, property.name);
        if property.ty.is_nil() {
            return Err(LoadError::NilParameter(context));
        }
        check_class_tag(&property.ty, &context)?;

        let signature_error = |accessor: &str, reason: String| LoadError::AccessorSignature {
            class: class.name.clone(),
            property: property.name.clone(),
            accessor: accessor.to_string(),
            reason,
        };

        let getter = find_in_chain(&property.getter, position, classes, parents)
            .ok_or_else(|| unresolved(class, &property.name, &property.getter))?;
        if !getter.params.is_empty() {
            return Err(signature_error(
                &property.getter,
                format!("getter takes {} argument(s)", getter.params.len()),
            ));
        }
        let returns_fit = getter.returns == TypeTag::Variant
            || assignable(&getter.returns, &property.ty, classes, parents, index);
        if !returns_fit {
            return Err(signature_error(
                &property.getter,
                format!("getter returns {}, property is {}", getter.returns, property.ty),
            ));
        }

        if let Some(name) = &property.setter {
            let setter = find_in_chain(name, position, classes, parents)
                .ok_or_else(|| unresolved(class, &property.name, name))?;
            match setter.params.as_slice() {
                [param] if assignable(&property.ty, param, classes, parents, index) => {}
                [param] => {
                    return Err(signature_error(
                        name,
                        format!("setter takes {}, property is {}", param, property.ty),
                    ));
                }
                params => {
                    return Err(signature_error(
                        name,
                        format!("setter takes {} argument(s), expected 1", params.len()),
                    ));
                }
            }
        }
    }
    Ok(())
}

fn unresolved(class: &ClassDescriptor, property: &str, accessor: &str) -> LoadError {
    LoadError::UnresolvedAccessor {
        class: class.name.clone(),
        property: property.to_string(),
        accessor: accessor.to_string(),
    }
}

/// Check if a value tagged `from` is accepted where `to` is declared
fn assignable(
    from: &TypeTag,
    to: &TypeTag,
    classes: &[ClassDescriptor],
    parents: &[Option<usize>],
    index: &FxHashMap<String, usize>,
) -> bool {
    match (from, to) {
        _ if from == to => true,
        (_, TypeTag::Variant) => true,
        (TypeTag::Int, TypeTag::Float) => true,
        (TypeTag::Object(_), TypeTag::Object(None)) => true,
        (TypeTag::Object(Some(sub)), TypeTag::Object(Some(sup))) => {
            let mut current = index.get(sub.as_str()).copied();
            while let Some(i) = current {
                if classes[i].name == *sup {
                    return true;
                }
                current = parents[i];
            }
            false
        }
        _ => false,
    }
}

fn find_in_chain<'a>(
    method: &str,
    start: usize,
    classes: &'a [ClassDescriptor],
    parents: &[Option<usize>],
) -> Option<&'a MethodDescriptor> {
    let mut current = Some(start);
    while let Some(i) = current {
        if let Some(found) = classes[i].find_method(method) {
            return Some(found);
        }
        current = parents[i];
    }
    None
}

/// Parents strictly before children, otherwise declaration order
fn topological_order(parents: &[Option<usize>]) -> Vec<usize> {
    let mut placed = vec![false; parents.len()];
    let mut order = Vec::with_capacity(parents.len());

    for start in 0..parents.len() {
        let mut pending = Vec::new();
        let mut current = Some(start);
        while let Some(i) = current {
            if placed[i] {
                break;
            }
            pending.push(i);
            current = parents[i];
        }
        for &i in pending.iter().rev() {
            placed[i] = true;
            order.push(i);
        }
    }
    order
}
