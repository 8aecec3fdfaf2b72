//! The remap engine: override resolution, source rewriting, mixin
//! annotations and transactional write-back.
//!
//! ## Phases
//!
//! ```text
//! ProgramIndex + MappingChain
//!     ↓
//! ReferenceIndex          (every resolved name token)
//!     ↓
//! analysis, per file      java rewriter → mixin resolver → FileOutcome
//!     ↓                   (parallel, read-only)
//! TransactionSet::commit  (one write per file)
//! ```
//!
//! ## Key Types
//!
//! - [`Remapper`] - Runs a remap and returns a [`RemapReport`]
//! - [`RemapContext`] - Immutable inputs shared by every rewriter
//! - [`Resolution`] - Renamed, unchanged or flagged
//! - [`TransactionSet`] - Pending edits grouped by file

mod config;
mod context;
mod diagnostics;
mod driver;
mod error;
mod java;
pub mod mixin;
mod overrides;
mod resolution;
mod transaction;

pub use config::RemapConfig;
pub use context::{FileOutcome, FileSink, RemapContext};
pub use diagnostics::{Diagnostic, Issue, Severity};
pub use driver::{RemapReport, RemapTimings, Remapper};
pub use error::{RemapError, WriteError};
pub use java::rewrite_references;
pub use mixin::rewrite_mixins;
pub use overrides::resolve_renamed_method;
pub use resolution::{Resolution, reconcile};
pub use transaction::{
    AppliedEdits, CommitSummary, DocumentStore, Edit, FileTransaction, FsDocumentStore,
    MemoryDocumentStore, TransactionSet,
};
