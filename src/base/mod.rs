//! Foundation types for the Ravel toolchain.
//!
//! This module provides fundamental types used throughout the remapper:
//! - [`FileId`] - Interned file identifiers
//! - [`TextRange`], [`TextSize`] - Source positions (byte offsets)
//! - [`LineCol`], [`LineIndex`] - Line/column conversion
//! - [`Name`] - Cheap-to-clone identifier text
//!
//! This module has NO dependencies on other ravel modules.

mod file_id;
mod span;

pub use file_id::FileId;
pub use span::{LineCol, LineIndex};

// Re-export text-size types for convenience
pub use text_size::{TextRange, TextSize};

/// Identifier text. Small names stay inline, so cloning is cheap.
pub type Name = smol_str::SmolStr;
