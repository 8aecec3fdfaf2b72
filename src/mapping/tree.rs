//! In-memory namespace mapping tables.

use indexmap::IndexMap;

use super::MappingError;
use crate::base::Name;
use crate::descriptor::rewrite_embedded_class_refs;

/// Index of a namespace inside a [`NamespaceMapping`]. `0` is the source namespace.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NamespaceId(u16);

impl NamespaceId {
    pub const SOURCE: NamespaceId = NamespaceId(0);

    pub const fn new(index: u16) -> Self {
        Self(index)
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Destination names of one entry, one slot per destination namespace.
/// `None` means the table leaves the name unchanged in that namespace.
fn name_in<'a>(src: &'a Name, names: &'a [Option<Name>], ns: NamespaceId) -> &'a Name {
    if ns == NamespaceId::SOURCE {
        return src;
    }
    names
        .get(ns.index() - 1)
        .and_then(Option::as_ref)
        .unwrap_or(src)
}

fn collect_names(names: &[&str]) -> Vec<Option<Name>> {
    names
        .iter()
        .map(|n| (!n.is_empty()).then(|| Name::new(n)))
        .collect()
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldEntry {
    pub src: Name,
    pub descriptor: Option<Name>,
    names: Vec<Option<Name>>,
}

impl FieldEntry {
    pub fn name_in(&self, ns: NamespaceId) -> &Name {
        name_in(&self.src, &self.names, ns)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MethodEntry {
    pub src: Name,
    /// Descriptor in the source namespace.
    pub descriptor: Name,
    names: Vec<Option<Name>>,
}

impl MethodEntry {
    pub fn name_in(&self, ns: NamespaceId) -> &Name {
        name_in(&self.src, &self.names, ns)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassEntry {
    /// Internal name in the source namespace.
    pub src: Name,
    names: Vec<Option<Name>>,
    fields: Vec<FieldEntry>,
    methods: Vec<MethodEntry>,
}

impl ClassEntry {
    fn new(src: Name, names: Vec<Option<Name>>) -> Self {
        Self {
            src,
            names,
            fields: Vec::new(),
            methods: Vec::new(),
        }
    }

    pub fn name_in(&self, ns: NamespaceId) -> &Name {
        name_in(&self.src, &self.names, ns)
    }

    pub fn fields(&self) -> &[FieldEntry] {
        &self.fields
    }

    pub fn methods(&self) -> &[MethodEntry] {
        &self.methods
    }

    /// Look up a field by name. With a descriptor, an entry with the same
    /// descriptor wins, and entries without a descriptor still match.
    pub fn get_field(&self, name: &str, descriptor: Option<&str>) -> Option<&FieldEntry> {
        let mut named = self.fields.iter().filter(|f| f.src == name);
        match descriptor {
            None => named.next(),
            Some(desc) => {
                let mut untyped = None;
                for field in named {
                    match &field.descriptor {
                        Some(d) if d == desc => return Some(field),
                        None if untyped.is_none() => untyped = Some(field),
                        _ => {}
                    }
                }
                untyped
            }
        }
    }

    pub fn get_method(&self, name: &str, descriptor: &str) -> Option<&MethodEntry> {
        self.methods
            .iter()
            .find(|m| m.src == name && m.descriptor == descriptor)
    }

    pub fn methods_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a MethodEntry> + 'a {
        self.methods.iter().filter(move |m| m.src == name)
    }

    /// Add a field mapping. Empty destination names mean "unchanged".
    pub fn field(&mut self, name: &str, descriptor: Option<&str>, names: &[&str]) -> &mut Self {
        self.fields.push(FieldEntry {
            src: Name::new(name),
            descriptor: descriptor.map(Name::new),
            names: collect_names(names),
        });
        self
    }

    /// Add a method mapping. Empty destination names mean "unchanged".
    pub fn method(&mut self, name: &str, descriptor: &str, names: &[&str]) -> &mut Self {
        self.methods.push(MethodEntry {
            src: Name::new(name),
            descriptor: Name::new(descriptor),
            names: collect_names(names),
        });
        self
    }
}

/// A directed mapping table from one source namespace to one or more
/// destination namespaces. Immutable once shared in a chain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NamespaceMapping {
    namespaces: Vec<Name>,
    classes: IndexMap<Name, ClassEntry>,
}

impl NamespaceMapping {
    pub fn new(source: &str, destinations: &[&str]) -> Self {
        let mut namespaces = Vec::with_capacity(destinations.len() + 1);
        namespaces.push(Name::new(source));
        namespaces.extend(destinations.iter().map(|d| Name::new(d)));
        Self {
            namespaces,
            classes: IndexMap::new(),
        }
    }

    pub fn source_namespace(&self) -> &Name {
        &self.namespaces[0]
    }

    pub fn destination_namespaces(&self) -> &[Name] {
        &self.namespaces[1..]
    }

    pub fn namespace_name(&self, ns: NamespaceId) -> Option<&Name> {
        self.namespaces.get(ns.index())
    }

    pub fn namespace_id(&self, name: &str) -> Result<NamespaceId, MappingError> {
        self.namespaces
            .iter()
            .position(|n| n == name)
            .map(|i| NamespaceId::new(i as u16))
            .ok_or_else(|| MappingError::UnknownNamespace(name.to_string()))
    }

    /// Add (or replace) a class mapping and return it for member chaining.
    pub fn class(&mut self, src: &str, names: &[&str]) -> &mut ClassEntry {
        let src = Name::new(src);
        let entry = ClassEntry::new(src.clone(), collect_names(names));
        self.classes.insert(src.clone(), entry);
        &mut self.classes[&src]
    }

    pub fn get_class(&self, internal_name: &str) -> Option<&ClassEntry> {
        self.classes.get(internal_name)
    }

    pub(crate) fn get_class_mut(&mut self, internal_name: &str) -> Option<&mut ClassEntry> {
        self.classes.get_mut(internal_name)
    }

    pub fn classes(&self) -> impl Iterator<Item = &ClassEntry> {
        self.classes.values()
    }

    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    /// Translate a class name, passing unknown classes through.
    pub fn map_class_name<'a>(&'a self, internal_name: &'a str, ns: NamespaceId) -> &'a str {
        match self.classes.get(internal_name) {
            Some(class) => class.name_in(ns).as_str(),
            None => internal_name,
        }
    }

    /// Translate the class references inside a source-namespace descriptor.
    pub fn map_descriptor(&self, descriptor: &str, ns: NamespaceId) -> String {
        rewrite_embedded_class_refs(descriptor, |name| {
            self.classes
                .get(name)
                .map(|class| class.name_in(ns).to_string())
        })
    }
}
