//! Application error types

use conform_domain::DomainError;
use thiserror::Error;

use crate::ports::{FixtureError, HttpClientError};

/// Application-level errors.
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// A definition failed validation.
    #[error("{0}")]
    Domain(#[from] DomainError),

    /// A fixture could not be resolved.
    #[error("{0}")]
    Fixture(#[from] FixtureError),

    /// A request failed before a response arrived.
    #[error("{0}")]
    Http(#[from] HttpClientError),

    /// Template placeholders had no value at run time.
    #[error("unresolved placeholder(s): {}", .0.join(", "))]
    UnresolvedPlaceholders(Vec<String>),

    /// An internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type alias for application operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
