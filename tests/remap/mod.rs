//! Remap engine tests
//!
//! - Java references, end to end through a two-step chain
//! - Override sets
//! - Mixin annotations
//! - Write-back failures and cancellation

pub mod tests_java;
pub mod tests_mixin;
pub mod tests_overrides;
pub mod tests_write_back;
