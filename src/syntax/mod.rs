// Syntax layer: parsed files with their text and location data
pub mod file;

pub use file::{FileRole, SyntaxFile};

// Re-export position types from base for convenience
pub use crate::base::{LineCol, LineIndex, TextRange, TextSize};
