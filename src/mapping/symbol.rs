//! Symbol identities shared by the chain resolver, the override resolver and
//! the mixin resolver.
//!
//! All names are in JVM internal form: `/` separates packages and `$`
//! separates nested classes.

use std::fmt;

use crate::base::Name;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ClassSymbol {
    pub internal_name: Name,
}

impl ClassSymbol {
    pub fn new(internal_name: impl Into<Name>) -> Self {
        Self {
            internal_name: internal_name.into(),
        }
    }
}

/// A field identity. The descriptor is optional because most lookups only know the name.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FieldSymbol {
    pub owner: Name,
    pub name: Name,
    pub descriptor: Option<Name>,
}

impl FieldSymbol {
    pub fn new(owner: impl Into<Name>, name: impl Into<Name>, descriptor: Option<Name>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
            descriptor,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MethodSymbol {
    pub owner: Name,
    pub name: Name,
    pub descriptor: Name,
}

impl MethodSymbol {
    pub fn new(owner: impl Into<Name>, name: impl Into<Name>, descriptor: impl Into<Name>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
            descriptor: descriptor.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Symbol {
    Class(ClassSymbol),
    Field(FieldSymbol),
    Method(MethodSymbol),
}

impl Symbol {
    /// The part of the symbol a rename changes: the internal name for
    /// classes, the member name otherwise.
    pub fn name(&self) -> &Name {
        match self {
            Symbol::Class(c) => &c.internal_name,
            Symbol::Field(f) => &f.name,
            Symbol::Method(m) => &m.name,
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbol::Class(c) => f.write_str(&c.internal_name),
            Symbol::Field(s) => match &s.descriptor {
                Some(desc) => write!(f, "{}#{}:{}", s.owner, s.name, desc),
                None => write!(f, "{}#{}", s.owner, s.name),
            },
            Symbol::Method(m) => write!(f, "{}#{}{}", m.owner, m.name, m.descriptor),
        }
    }
}

impl From<ClassSymbol> for Symbol {
    fn from(value: ClassSymbol) -> Self {
        Symbol::Class(value)
    }
}

impl From<FieldSymbol> for Symbol {
    fn from(value: FieldSymbol) -> Self {
        Symbol::Field(value)
    }
}

impl From<MethodSymbol> for Symbol {
    fn from(value: MethodSymbol) -> Self {
        Symbol::Method(value)
    }
}

// ============================================================================
// QUALIFIER HELPERS
// ============================================================================

/// `a/b/Outer$Inner` → `a.b.Outer.Inner`
pub fn replace_all_qualifiers(internal: &str) -> String {
    internal.replace(['/', '$'], ".")
}

/// `a/b/Outer$Inner` → `a.b.Outer$Inner`
pub fn replace_package_qualifiers(internal: &str) -> String {
    internal.replace('/', ".")
}

/// A translated class name, split the way reference rewriting needs it.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ClassName {
    internal: Name,
}

impl ClassName {
    pub fn new(internal: impl Into<Name>) -> Self {
        Self {
            internal: internal.into(),
        }
    }

    pub fn internal(&self) -> &str {
        &self.internal
    }

    /// Source-level fully qualified name, `a.b.Outer.Inner`.
    pub fn qualified(&self) -> String {
        replace_all_qualifiers(&self.internal)
    }

    /// Binary name, `a.b.Outer$Inner`.
    pub fn binary(&self) -> String {
        replace_package_qualifiers(&self.internal)
    }

    /// Last segment, `Inner`.
    pub fn simple_name(&self) -> &str {
        match self.internal.rfind(['/', '$']) {
            Some(i) => &self.internal[i + 1..],
            None => &self.internal,
        }
    }

    /// Everything before the simple name in source form, `a.b.Outer`.
    pub fn qualifier(&self) -> Option<String> {
        self.internal
            .rfind(['/', '$'])
            .map(|i| replace_all_qualifiers(&self.internal[..i]))
    }

    /// Package in source form, `a.b`. Empty for the default package.
    pub fn package(&self) -> String {
        match self.internal.rfind('/') {
            Some(i) => replace_package_qualifiers(&self.internal[..i]),
            None => String::new(),
        }
    }

    /// Internal name of the enclosing class, if this is a nested class.
    pub fn outer_internal(&self) -> Option<&str> {
        let slash = self.internal.rfind('/').map_or(0, |i| i + 1);
        self.internal[slash..]
            .rfind('$')
            .map(|i| &self.internal[..slash + i])
    }
}

impl fmt::Display for ClassName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.qualified())
    }
}
