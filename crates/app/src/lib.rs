//! Conform - declarative API contract verification
//!
//! Command-line front end: loads a suite, wires the reqwest client and the
//! fixture directory into the suite executor, and renders the report.

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;

pub use cli::{Cli, Command, OutputFormat, RunArgs, ValidateArgs};
pub use commands::{EXIT_CONFIG, EXIT_FAILED, EXIT_PASSED, dispatch, exit_status};
pub use error::{CliError, CliResult};
pub use logging::init_tracing;
