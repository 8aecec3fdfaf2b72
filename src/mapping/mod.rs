//! Namespace mappings and the chain resolver.
//!
//! ## Key Types
//!
//! - [`NamespaceMapping`] - one table, source namespace to destination namespaces
//! - [`MappingChain`] - ordered tables composed into one translator
//! - [`Symbol`] - class/field/method identity shared by every resolver
//! - [`ClassName`] - a translated class name split for reference rewriting
//!
//! ```text
//! official ──table 0──▶ intermediary ──table 1──▶ named
//!     a                   class_1                  Foo
//! ```

mod chain;
mod symbol;
pub mod tiny;
mod tree;

pub use chain::{ChainLink, MappingChain};
pub use symbol::{
    ClassName, ClassSymbol, FieldSymbol, MethodSymbol, Symbol, replace_all_qualifiers,
    replace_package_qualifiers,
};
pub use tiny::parse_tiny_v2;
pub use tree::{ClassEntry, FieldEntry, MethodEntry, NamespaceId, NamespaceMapping};

use thiserror::Error;

use crate::descriptor::DescriptorError;

/// Errors raised while loading or linking mapping tables.
#[derive(Debug, Error)]
pub enum MappingError {
    /// Malformed line in a mapping file.
    #[error("line {line}: {reason}")]
    Syntax { line: usize, reason: String },

    #[error("unsupported mapping header: {0}")]
    UnsupportedHeader(String),

    /// A descriptor in the mapping file does not parse.
    #[error("line {line}: {source}")]
    Descriptor {
        line: usize,
        #[source]
        source: DescriptorError,
    },

    #[error("unknown namespace: {0}")]
    UnknownNamespace(String),
}

impl MappingError {
    /// Create a syntax error for a 1-based line.
    pub fn syntax(line: usize, reason: impl Into<String>) -> Self {
        Self::Syntax {
            line,
            reason: reason.into(),
        }
    }
}
