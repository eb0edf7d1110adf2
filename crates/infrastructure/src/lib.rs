//! Conform Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports defined in
//! the application layer, plus suite loading and report rendering.

pub mod adapters;
pub mod fixtures;
pub mod loader;
pub mod report;
pub mod serialization;

pub use adapters::{DEFAULT_USER_AGENT, ReqwestHttpClient};
pub use fixtures::{DirectoryFixtureProvider, InMemoryFixtureProvider};
pub use loader::{LoadError, SuiteFormat, load_suite, parse_suite, suite_dir};
pub use report::{ReportFormat, failure_lines, render_json, render_text};
pub use serialization::{SerializationError, from_json, to_json_stable, write_json_stable};
