//! Conform Application - Verification engine and ports
//!
//! This crate defines the application layer with:
//! - Port traits (HTTP client, fixture provider)
//! - Value matcher evaluation and response validation
//! - Template binding and the scenario capture table
//! - Scenario and suite orchestration

pub mod capture;
pub mod error;
pub mod matching;
pub mod ports;
pub mod use_cases;
pub mod validation;
pub mod variable_resolver;

pub use capture::{Bindings, CaptureTable};
pub use error::{ApplicationError, ApplicationResult};
pub use matching::{MatchResult, evaluate};
pub use ports::{FixtureError, FixtureProvider, HttpClient, HttpClientError};
pub use use_cases::{ScenarioRunner, SuiteExecutor};
pub use validation::{ResponseView, Validation, validate};
pub use variable_resolver::TemplateEngine;
