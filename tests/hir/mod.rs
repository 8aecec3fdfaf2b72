//! HIR layer tests
//!
//! Cross-file resolution and the reference locator.

pub mod tests_references;
