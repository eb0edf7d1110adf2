//! Command-line interface definition.
//!
//! Settings precedence for `run`: flags, then `CONFORM_*` environment
//! variables (both handled by clap), then the suite file.

use std::path::{Path, PathBuf};

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use conform_domain::RunSettings;
use conform_infrastructure::ReportFormat;

/// Verify a REST API against a declarative contract suite.
#[derive(Parser, Debug)]
#[command(name = "conform", version, about)]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace). Logs go to stderr.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Command to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a suite and report the results.
    Run(RunArgs),
    /// Load and check a suite without sending any request.
    Validate(ValidateArgs),
}

/// Arguments of `conform run`.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Suite file (.yaml, .yml or .json).
    #[arg(value_name = "SUITE")]
    pub suite: PathBuf,

    /// Base URL relative step URLs are resolved against.
    #[arg(long, env = "CONFORM_BASE_URL", value_name = "URL")]
    pub base_url: Option<String>,

    /// Maximum number of scenarios run at once.
    #[arg(long, env = "CONFORM_CONCURRENCY", value_name = "N")]
    pub concurrency: Option<usize>,

    /// Per-request timeout in milliseconds.
    #[arg(long, env = "CONFORM_TIMEOUT_MS", value_name = "MS")]
    pub timeout_ms: Option<u64>,

    /// Fixture directory; defaults to the suite's `fixtures_dir`, then
    /// `fixtures/` next to the suite file.
    #[arg(long, value_name = "DIR")]
    pub fixtures: Option<PathBuf>,

    /// Report format written to stdout.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Also write the JSON report to this file.
    #[arg(long, value_name = "PATH")]
    pub report: Option<PathBuf>,
}

impl RunArgs {
    /// Overlays the command-line settings on those read from the suite.
    pub fn apply(&self, settings: &mut RunSettings) {
        if let Some(base_url) = &self.base_url {
            settings.base_url = Some(base_url.clone());
        }
        if let Some(concurrency) = self.concurrency {
            settings.concurrency = concurrency;
        }
        if let Some(timeout_ms) = self.timeout_ms {
            settings.timeout_ms = timeout_ms;
        }
    }

    /// Picks the fixture directory for a suite.
    #[must_use]
    pub fn fixtures_dir(&self, suite_fixtures: Option<&Path>, suite_dir: &Path) -> PathBuf {
        self.fixtures
            .clone()
            .or_else(|| suite_fixtures.map(Path::to_path_buf))
            .unwrap_or_else(|| suite_dir.join("fixtures"))
    }
}

/// Arguments of `conform validate`.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Suite file (.yaml, .yml or .json).
    #[arg(value_name = "SUITE")]
    pub suite: PathBuf,
}

/// Report formats selectable on the command line.
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable summary with attributed failures.
    Text,
    /// The full report as pretty JSON.
    Json,
}

impl From<OutputFormat> for ReportFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Text => Self::Text,
            OutputFormat::Json => Self::Json,
        }
    }
}
