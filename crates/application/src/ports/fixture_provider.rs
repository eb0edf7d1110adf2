//! Fixture provider port
//!
//! Fixtures are named expected values (category lists, key sets, ...) kept
//! outside the suite definition.

use async_trait::async_trait;
use serde_json::Value;

/// Errors that can occur while resolving a fixture.
#[derive(Debug, thiserror::Error)]
pub enum FixtureError {
    /// No fixture is registered under the name.
    #[error("fixture not found: {0}")]
    NotFound(String),

    /// The fixture exists but could not be parsed.
    #[error("fixture '{name}' is malformed: {message}")]
    Malformed {
        /// Fixture name.
        name: String,
        /// Parser message.
        message: String,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FixtureError {
    /// Whether this error means the definition references a missing fixture,
    /// as opposed to the provider itself failing.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Port for looking up named fixtures.
#[async_trait]
pub trait FixtureProvider: Send + Sync {
    /// Resolves a fixture by name.
    ///
    /// # Errors
    ///
    /// Returns `FixtureError::NotFound` if no fixture has this name.
    async fn resolve(&self, name: &str) -> Result<Value, FixtureError>;
}
