//! Shared test helpers.

pub mod remap_helpers;
