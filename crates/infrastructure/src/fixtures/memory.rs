//! In-memory fixture provider.

use std::collections::HashMap;

use async_trait::async_trait;
use conform_application::ports::{FixtureError, FixtureProvider};
use serde_json::Value;

/// Fixtures held in a map, for suites assembled in code and for tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryFixtureProvider {
    fixtures: HashMap<String, Value>,
}

impl InMemoryFixtureProvider {
    /// Creates an empty provider.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a fixture (builder pattern).
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: Value) -> Self {
        self.insert(name, value);
        self
    }

    /// Adds or replaces a fixture.
    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.fixtures.insert(name.into(), value);
    }
}

#[async_trait]
impl FixtureProvider for InMemoryFixtureProvider {
    async fn resolve(&self, name: &str) -> Result<Value, FixtureError> {
        self.fixtures
            .get(name)
            .cloned()
            .ok_or_else(|| FixtureError::NotFound(name.to_string()))
    }
}
