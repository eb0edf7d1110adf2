//! CLI error type.

use conform_application::HttpClientError;
use conform_infrastructure::{LoadError, SerializationError};
use thiserror::Error;

/// Failures that stop the CLI before or after a suite run.
///
/// Every variant is a configuration or usage problem; scenario failures are
/// reported through the suite report instead.
#[derive(Debug, Error)]
pub enum CliError {
    /// The suite file could not be loaded.
    #[error(transparent)]
    Load(#[from] LoadError),

    /// The HTTP client could not be configured.
    #[error("invalid HTTP settings: {0}")]
    Http(#[from] HttpClientError),

    /// The report could not be rendered or written.
    #[error("report output failed: {0}")]
    Report(#[from] SerializationError),

    /// The suite has invalid scenario definitions.
    #[error("{count} invalid scenario definition(s)")]
    InvalidSuite {
        /// Number of invalid scenarios.
        count: usize,
    },
}

/// Result alias for CLI commands.
pub type CliResult<T> = Result<T, CliError>;
