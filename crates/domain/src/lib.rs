//! Conform Domain - Core contract-verification types
//!
//! This crate defines the data model for declarative API contract suites:
//! JSON paths, matchers, contracts, scenarios, requests, responses and reports.
//! All types here are pure Rust with no I/O dependencies.

pub mod contract;
pub mod error;
pub mod matcher;
pub mod path;
pub mod report;
pub mod request;
pub mod response;
pub mod scenario;
pub mod settings;
pub mod status;
pub mod template;

pub use contract::{Contract, Rule};
pub use error::{DomainError, DomainResult};
pub use matcher::{
    ComparisonOperator, Expected, JsonType, Matcher, Pattern, ReferenceValues, References,
    SortOrder,
};
pub use path::{JsonPath, PathRoot, Segment, Selection};
pub use report::{
    CaptureOutcome, FailureKind, RuleOutcome, ScenarioResult, ScenarioState, StepResult,
    SuiteReport,
};
pub use request::{Header, Headers, HttpMethod, HttpRequest};
pub use response::HttpResponse;
pub use scenario::{Scenario, Step, Suite};
pub use settings::{DEFAULT_CONCURRENCY, DEFAULT_TIMEOUT_MS, RunSettings};
pub use status::StatusExpectation;
pub use template::{BUILTIN_PLACEHOLDERS, Placeholder};
