//! Read-only renderers for the two asynchronous results.

pub mod result;
pub mod stats;
