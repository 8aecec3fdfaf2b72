//! Parser tests
//!
//! Declarations and annotation values as the remapper reads them.

pub mod tests_annotations;
