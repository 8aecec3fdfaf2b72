//! Project loading: collect Java sources from disk and index them.

mod workspace_loader;

pub use workspace_loader::{LoadError, WorkspaceLoader, collect_java_files};
