//! High-level program model over parsed Java files.
//!
//! ## Pipeline
//!
//! ```text
//! SyntaxFile[] ──▶ ProgramIndex ──▶ Resolver ──▶ ReferenceIndex
//!                  (declarations)   (names,      (per-file references,
//!                                    hierarchy)   reverse lookup)
//! ```
//!
//! ## Key Types
//!
//! - [`ProgramIndex`] - Classes, fields and methods addressable by id
//! - [`Resolver`] - Type names, imports, expression chains and hierarchy queries
//! - [`ReferenceIndex`] - Every resolved name token, implements [`ReferenceLocator`]

mod hierarchy;
mod ids;
mod index;
mod references;
mod resolve;

pub use hierarchy::OverriddenMethod;
pub use ids::{ClassId, ClassRef, DeclId, FieldId, MethodId};
pub use index::{ClassInfo, FieldInfo, MethodInfo, ParamInfo, ProgramIndex};
pub use references::{
    RefTarget, Reference, ReferenceIndex, ReferenceLocator, ReferenceSite, SearchScope,
};
pub use resolve::{LocalBinding, NameRes, Resolver, Scope, TypeBinding};
