//! Mapping layer tests
//!
//! - Chain composition and flattening
//! - Descriptor encoding and class reference rewriting

pub mod tests_chain;
pub mod tests_descriptor;
