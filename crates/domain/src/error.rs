//! Domain error types

use thiserror::Error;

/// Errors raised while constructing or validating suite definitions.
///
/// Every variant is a configuration problem: it is detected before any
/// request is sent and never produced while validating a response.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A JSON path expression is malformed.
    #[error("invalid path '{path}': {reason}")]
    InvalidPath {
        /// The offending path expression.
        path: String,
        /// Why it could not be parsed.
        reason: String,
    },

    /// A regular expression does not compile.
    #[error("invalid regex pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// The offending pattern.
        pattern: String,
        /// Compiler message.
        reason: String,
    },

    /// A matcher is structurally invalid (bad range, wrong literal shape, ...).
    #[error("invalid matcher: {0}")]
    InvalidMatcher(String),

    /// The HTTP method is not supported.
    #[error("unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    /// A variable or capture name is malformed.
    #[error("invalid variable name: '{0}'")]
    InvalidVariableName(String),

    /// A scenario has no steps.
    #[error("scenario '{0}' has no steps")]
    EmptyScenario(String),

    /// A template placeholder references a name no earlier step declares.
    #[error("step '{step}': placeholder '{{{{{name}}}}}' references an undeclared capture")]
    UndeclaredPlaceholder {
        /// Step containing the placeholder.
        step: String,
        /// Referenced name.
        name: String,
    },

    /// A `$capture` reference in a contract names an undeclared capture.
    #[error("step '{step}': contract references undeclared capture '{name}'")]
    UndeclaredCapture {
        /// Step containing the reference.
        step: String,
        /// Referenced name.
        name: String,
    },

    /// A capture name is declared more than once in the same scenario.
    #[error("step '{step}': capture '{name}' is already declared")]
    DuplicateCapture {
        /// Step re-declaring the capture.
        step: String,
        /// Capture name.
        name: String,
    },

    /// A capture path would fan out over several locations.
    #[error("step '{step}': capture '{name}' uses wildcard path '{path}'")]
    WildcardCapture {
        /// Step declaring the capture.
        step: String,
        /// Capture name.
        name: String,
        /// Offending path.
        path: String,
    },

    /// An expected status can never match.
    #[error("invalid expected status: {0}")]
    InvalidStatus(String),
}

/// Result type alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
