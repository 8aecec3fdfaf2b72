//! Mapping chain resolution.
//!
//! A chain walks a symbol through every table in order. Each step looks the
//! symbol up by its spelling in that table's source namespace and advances
//! owner, name and descriptor to the link's destination namespace. A miss at
//! any step means the symbol is unresolved; nothing is partially applied.

use std::sync::Arc;

use tracing::trace;

use super::{
    ClassName, ClassSymbol, FieldSymbol, MappingError, MethodSymbol, NamespaceId,
    NamespaceMapping, Symbol,
};
use crate::base::Name;
use crate::descriptor::rewrite_embedded_class_refs;

/// One table of a chain plus the destination namespace it is read into.
#[derive(Clone, Debug)]
pub struct ChainLink {
    table: Arc<NamespaceMapping>,
    destination: NamespaceId,
}

impl ChainLink {
    /// Create a link reading `table` into the namespace called `destination`.
    pub fn new(table: Arc<NamespaceMapping>, destination: &str) -> Result<Self, MappingError> {
        let destination = table.namespace_id(destination)?;
        Ok(Self { table, destination })
    }

    pub fn table(&self) -> &NamespaceMapping {
        &self.table
    }

    pub fn destination(&self) -> NamespaceId {
        self.destination
    }

    pub fn destination_name(&self) -> &str {
        self.table
            .namespace_name(self.destination)
            .map_or("", |n| n.as_str())
    }
}

/// An ordered sequence of mapping tables applied one after another.
#[derive(Clone, Debug, Default)]
pub struct MappingChain {
    links: Vec<ChainLink>,
}

impl MappingChain {
    pub fn new(links: Vec<ChainLink>) -> Self {
        Self { links }
    }

    /// Build a chain from `(table, destination namespace)` pairs.
    pub fn from_tables<'a>(
        tables: impl IntoIterator<Item = (Arc<NamespaceMapping>, &'a str)>,
    ) -> Result<Self, MappingError> {
        let links = tables
            .into_iter()
            .map(|(table, dst)| ChainLink::new(table, dst))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { links })
    }

    pub fn push(&mut self, link: ChainLink) {
        self.links.push(link);
    }

    pub fn links(&self) -> &[ChainLink] {
        &self.links
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// The table whose source namespace the input code is written in.
    pub fn first_table(&self) -> Option<&NamespaceMapping> {
        self.links.first().map(|l| l.table())
    }

    // ========================================================================
    // RESOLUTION (final spelling, unchanged names included)
    // ========================================================================

    pub fn resolve_class(&self, internal_name: &str) -> Option<Name> {
        let mut name = Name::new(internal_name);
        for link in &self.links {
            let class = link.table.get_class(&name)?;
            name = class.name_in(link.destination).clone();
        }
        Some(name)
    }

    pub fn resolve_field(&self, field: &FieldSymbol) -> Option<FieldSymbol> {
        let mut current = field.clone();
        for link in &self.links {
            let class = link.table.get_class(&current.owner)?;
            let entry = class.get_field(&current.name, current.descriptor.as_deref())?;
            current = FieldSymbol {
                owner: class.name_in(link.destination).clone(),
                name: entry.name_in(link.destination).clone(),
                descriptor: current
                    .descriptor
                    .as_deref()
                    .map(|d| Name::new(link.table.map_descriptor(d, link.destination))),
            };
        }
        Some(current)
    }

    pub fn resolve_method(&self, method: &MethodSymbol) -> Option<MethodSymbol> {
        let mut current = method.clone();
        for link in &self.links {
            let class = link.table.get_class(&current.owner)?;
            let entry = class.get_method(&current.name, &current.descriptor)?;
            current = MethodSymbol {
                owner: class.name_in(link.destination).clone(),
                name: entry.name_in(link.destination).clone(),
                descriptor: Name::new(
                    link.table.map_descriptor(&entry.descriptor, link.destination),
                ),
            };
        }
        Some(current)
    }

    pub fn resolve(&self, symbol: &Symbol) -> Option<Symbol> {
        match symbol {
            Symbol::Class(c) => self
                .resolve_class(&c.internal_name)
                .map(|n| Symbol::Class(ClassSymbol::new(n))),
            Symbol::Field(f) => self.resolve_field(f).map(Symbol::Field),
            Symbol::Method(m) => self.resolve_method(m).map(Symbol::Method),
        }
    }

    // ========================================================================
    // TRANSLATION (only names that actually change)
    // ========================================================================

    /// New name of a symbol: the internal class name, or the member name.
    /// `None` when unresolved or when the name does not change.
    pub fn translate(&self, symbol: &Symbol) -> Option<Name> {
        let resolved = self.resolve(symbol)?;
        let new_name = resolved.name();
        if new_name == symbol.name() {
            trace!("[CHAIN] {} resolves to itself", symbol);
            return None;
        }
        trace!("[CHAIN] {} -> {}", symbol, new_name);
        Some(new_name.clone())
    }

    pub fn translate_class(&self, internal_name: &str) -> Option<ClassName> {
        self.translate(&Symbol::Class(ClassSymbol::new(internal_name)))
            .map(ClassName::new)
    }

    pub fn translate_field(&self, owner: &str, name: &str, descriptor: Option<&str>) -> Option<Name> {
        self.translate(&Symbol::Field(FieldSymbol::new(
            owner,
            name,
            descriptor.map(Name::new),
        )))
    }

    pub fn translate_method(&self, owner: &str, name: &str, descriptor: &str) -> Option<Name> {
        self.translate(&Symbol::Method(MethodSymbol::new(owner, name, descriptor)))
    }

    /// Rewrite every class reference in a descriptor through the whole chain.
    pub fn translate_descriptor(&self, descriptor: &str) -> String {
        rewrite_embedded_class_refs(descriptor, |name| {
            self.resolve_class(name)
                .filter(|new| new != name)
                .map(|new| new.to_string())
        })
    }

    /// Pre-compose the chain into one table from the first source namespace to
    /// the final destination namespace. Symbols the chain cannot resolve are
    /// left out.
    pub fn flatten(&self) -> Option<NamespaceMapping> {
        let first = self.links.first()?;
        let last = self.links.last()?;
        let mut flat = NamespaceMapping::new(
            first.table.source_namespace(),
            &[last.destination_name()],
        );

        for class in first.table.classes() {
            let Some(class_dst) = self.resolve_class(&class.src) else {
                continue;
            };
            let entry = flat.class(&class.src, &[class_dst.as_str()]);

            for field in class.fields() {
                let symbol = FieldSymbol::new(class.src.clone(), field.src.clone(), field.descriptor.clone());
                if let Some(resolved) = self.resolve_field(&symbol) {
                    entry.field(&field.src, field.descriptor.as_deref(), &[resolved.name.as_str()]);
                }
            }
            for method in class.methods() {
                let symbol = MethodSymbol::new(class.src.clone(), method.src.clone(), method.descriptor.clone());
                if let Some(resolved) = self.resolve_method(&symbol) {
                    entry.method(&method.src, &method.descriptor, &[resolved.name.as_str()]);
                }
            }
        }

        Some(flat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_step() -> MappingChain {
        let mut first = NamespaceMapping::new("official", &["intermediary"]);
        first
            .class("a", &["pkg/class_1"])
            .field("b", None, &["field_1"])
            .method("c", "(La;)La;", &["method_1"]);
        first.class("z", &["pkg/class_2"]);

        let mut second = NamespaceMapping::new("intermediary", &["named"]);
        second
            .class("pkg/class_1", &["pkg/Foo"])
            .field("field_1", None, &["count"])
            .method("method_1", "(Lpkg/class_1;)Lpkg/class_1;", &["copy"]);

        MappingChain::from_tables([
            (Arc::new(first), "intermediary"),
            (Arc::new(second), "named"),
        ])
        .unwrap()
    }

    #[test]
    fn test_class_through_chain() {
        let chain = two_step();
        assert_eq!(chain.translate_class("a").unwrap().internal(), "pkg/Foo");
    }

    #[test]
    fn test_broken_link_is_unresolved() {
        let chain = two_step();
        assert_eq!(chain.resolve_class("z"), None);
        assert_eq!(chain.translate_class("z"), None);
    }

    #[test]
    fn test_method_descriptor_advances_between_links() {
        let chain = two_step();
        assert_eq!(chain.translate_method("a", "c", "(La;)La;").as_deref(), Some("copy"));
        let resolved = chain
            .resolve_method(&MethodSymbol::new("a", "c", "(La;)La;"))
            .unwrap();
        assert_eq!(resolved.descriptor, "(Lpkg/Foo;)Lpkg/Foo;");
    }

    #[test]
    fn test_field_through_chain() {
        let chain = two_step();
        assert_eq!(chain.translate_field("a", "b", None).as_deref(), Some("count"));
        assert_eq!(chain.translate_field("a", "missing", None), None);
    }

    #[test]
    fn test_identity_is_not_a_rename() {
        let mut table = NamespaceMapping::new("src", &["dst"]);
        table.class("pkg/Same", &["pkg/Same"]).method("run", "()V", &["run"]);
        let chain = MappingChain::from_tables([(Arc::new(table), "dst")]).unwrap();
        assert_eq!(chain.translate_class("pkg/Same"), None);
        assert_eq!(chain.translate_method("pkg/Same", "run", "()V"), None);
        assert!(chain.resolve_method(&MethodSymbol::new("pkg/Same", "run", "()V")).is_some());
    }

    #[test]
    fn test_translate_descriptor() {
        let chain = two_step();
        assert_eq!(chain.translate_descriptor("(La;Lq;I)V"), "(Lpkg/Foo;Lq;I)V");
    }

    #[test]
    fn test_flatten_matches_chain() {
        let chain = two_step();
        let flat = chain.flatten().unwrap();
        let flat_chain = MappingChain::from_tables([(Arc::new(flat), "named")]).unwrap();

        assert_eq!(flat_chain.translate_class("a"), chain.translate_class("a"));
        assert_eq!(
            flat_chain.translate_method("a", "c", "(La;)La;"),
            chain.translate_method("a", "c", "(La;)La;")
        );
        assert_eq!(flat_chain.translate_class("z"), None);
    }
}
