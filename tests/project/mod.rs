//! Project tests
//!
//! - Loading a workspace from disk
//! - Remapping it in place

pub mod tests_workspace;
