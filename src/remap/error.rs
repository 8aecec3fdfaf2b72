//! Error types for remap runs.

use thiserror::Error;

use crate::base::FileId;

/// A failure that stops analysis of one file.
#[derive(Debug, Error)]
pub enum RemapError {
    /// A usage search returned a site in a file the program does not hold.
    #[error("usage in {0}, which is not part of the program")]
    MissingFile(FileId),
}

/// A failure while committing edits.
#[derive(Debug, Error)]
pub enum WriteError {
    /// The text at the edit site changed since analysis.
    #[error("stale edit at {offset}: expected {expected:?}, found {found:?}")]
    Stale {
        offset: u32,
        expected: String,
        found: String,
    },

    /// The edit overlaps an earlier edit in the same file.
    #[error("edit at {offset} overlaps an earlier edit")]
    Overlap { offset: u32 },

    #[error("edit at {offset} is outside the document")]
    OutOfBounds { offset: u32 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
