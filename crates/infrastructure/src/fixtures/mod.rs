//! Fixture providers.
//!
//! Fixtures are looked up by name from a directory of JSON or YAML files, or
//! from memory when a suite is assembled in code.

mod directory;
mod memory;

pub use directory::{DirectoryFixtureProvider, FIXTURE_EXTENSIONS};
pub use memory::InMemoryFixtureProvider;
