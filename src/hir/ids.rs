//! Identifiers for indexed declarations.

use crate::base::Name;

/// A class, interface, enum, record or annotation type with source in the index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClassId(u32);

/// A field or enum constant declared in an indexed class.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FieldId(u32);

/// A method or constructor declared in an indexed class.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MethodId(u32);

impl ClassId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl FieldId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl MethodId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A resolved class: indexed, or known only by its internal name.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ClassRef {
    Indexed(ClassId),
    /// No source available; only class-level translation applies.
    External(Name),
}

impl ClassRef {
    pub fn as_indexed(&self) -> Option<ClassId> {
        match self {
            ClassRef::Indexed(id) => Some(*id),
            ClassRef::External(_) => None,
        }
    }
}

/// A declaration with source.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DeclId {
    Class(ClassId),
    Field(FieldId),
    Method(MethodId),
}

impl From<ClassId> for DeclId {
    fn from(id: ClassId) -> Self {
        DeclId::Class(id)
    }
}

impl From<FieldId> for DeclId {
    fn from(id: FieldId) -> Self {
        DeclId::Field(id)
    }
}

impl From<MethodId> for DeclId {
    fn from(id: MethodId) -> Self {
        DeclId::Method(id)
    }
}
