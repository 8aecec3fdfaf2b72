//! # ravel-base
//!
//! Core library for remapping identifiers in Java source, Mixin annotation
//! strings included, from one mapping namespace to another.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! remap       → Override resolution, rewriters, mixins, write-back
//!   ↓
//! project     → Workspace loading
//!   ↓
//! hir         → Program index, name resolution, reference locator
//!   ↓
//! syntax      → SyntaxFile (text, parsed unit, line index)
//!   ↓
//! parser      → Logos lexer, recursive-descent parser, body scanner
//!   ↓
//! mapping     → Namespace tables, Tiny v2, mapping chain
//!   ↓
//! descriptor  → JVM descriptor codec
//!   ↓
//! base        → Primitives (FileId, Name, TextRange)
//! ```

// ============================================================================
// MODULES (dependency order: base → descriptor → mapping → parser → syntax → hir → project → remap)
// ============================================================================

/// Foundation types: FileId, Name, TextRange, LineIndex
pub mod base;

/// JVM descriptors: parsing, encoding, embedded class references
pub mod descriptor;

/// Namespace mappings and the chain resolver
pub mod mapping;

/// Parser: Logos lexer, recursive-descent parser for Java declarations
pub mod parser;

/// Syntax: parsed files with their text
pub mod syntax;

/// High-level IR: program index, resolution, references
pub mod hir;

/// Project management: workspace loading
pub mod project;

/// Remap engine
pub mod remap;

// Re-export foundation types
pub use base::{FileId, LineCol, LineIndex, Name, TextRange, TextSize};

// Re-export the entry points
pub use mapping::{MappingChain, NamespaceMapping};
pub use project::WorkspaceLoader;
pub use remap::{RemapConfig, RemapReport, Remapper};
