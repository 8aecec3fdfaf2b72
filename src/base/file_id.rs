/// Identifier of a source file inside a [`ProgramIndex`](crate::hir::ProgramIndex).
///
/// File ids are dense: the n-th file added to an index gets id `n`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FileId(u32);

impl FileId {
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Position of this file in dense per-file tables.
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for FileId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "file#{}", self.0)
    }
}
