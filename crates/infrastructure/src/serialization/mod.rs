//! Deterministic JSON output for reports.

mod json;

pub use json::*;
