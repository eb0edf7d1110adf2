//! Command implementations.

use std::process::ExitCode;
use std::sync::Arc;

use conform_application::SuiteExecutor;
use conform_domain::{Suite, SuiteReport};
use conform_infrastructure::{
    DirectoryFixtureProvider, ReportFormat, ReqwestHttpClient, load_suite, suite_dir,
    write_json_stable,
};
use tracing::{info, warn};

use crate::cli::{Cli, Command, RunArgs, ValidateArgs};
use crate::error::{CliError, CliResult};

/// Exit status when every scenario passed.
pub const EXIT_PASSED: u8 = 0;
/// Exit status when any scenario failed.
pub const EXIT_FAILED: u8 = 1;
/// Exit status for configuration and usage errors.
pub const EXIT_CONFIG: u8 = 2;

/// Dispatches a parsed command line.
///
/// # Errors
///
/// Returns a `CliError` for configuration problems; scenario failures are
/// reflected in the exit code instead.
pub async fn dispatch(cli: Cli) -> CliResult<ExitCode> {
    match cli.command {
        Command::Run(args) => run(&args).await,
        Command::Validate(args) => validate(&args).await,
    }
}

/// Exit status for a finished run.
#[must_use]
pub const fn exit_status(report: &SuiteReport) -> u8 {
    if report.all_passed() {
        EXIT_PASSED
    } else {
        EXIT_FAILED
    }
}

async fn run(args: &RunArgs) -> CliResult<ExitCode> {
    let mut suite = load_suite(&args.suite).await?;
    args.apply(&mut suite.settings);

    let fixtures_dir = args.fixtures_dir(suite.fixtures_dir.as_deref(), &suite_dir(&args.suite));
    info!(
        suite = %suite.name,
        base_url = suite.settings.base_url.as_deref().unwrap_or("-"),
        fixtures = %fixtures_dir.display(),
        "Running suite"
    );

    let client = ReqwestHttpClient::from_settings(&suite.settings)?;
    let executor = SuiteExecutor::from_settings(
        Arc::new(client),
        Arc::new(DirectoryFixtureProvider::new(fixtures_dir)),
        &suite.settings,
    );
    let report = executor.run_suite(&suite).await;

    let format = ReportFormat::from(args.format);
    print!("{}", format.render(&report)?);
    if let Some(path) = &args.report {
        write_json_stable(path, &report).await?;
        info!(path = %path.display(), "Report written");
    }

    Ok(ExitCode::from(exit_status(&report)))
}

async fn validate(args: &ValidateArgs) -> CliResult<ExitCode> {
    let suite = load_suite(&args.suite).await?;
    let errors = suite.validation_errors();
    for (scenario, error) in &errors {
        warn!(scenario = %scenario, error = %error, "Invalid scenario");
        println!("{scenario}: {error}");
    }

    if errors.is_empty() {
        println!("{}", summary(&suite));
        Ok(ExitCode::from(EXIT_PASSED))
    } else {
        Err(CliError::InvalidSuite {
            count: errors.len(),
        })
    }
}

fn summary(suite: &Suite) -> String {
    let steps: usize = suite.scenarios.iter().map(|s| s.steps.len()).sum();
    format!(
        "suite '{}' is valid: {} scenario(s), {steps} step(s)",
        suite.name,
        suite.scenarios.len()
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use conform_domain::{FailureKind, ScenarioResult};
    use pretty_assertions::assert_eq;

    fn report(scenarios: Vec<ScenarioResult>) -> SuiteReport {
        SuiteReport::new("catalog", Default::default(), scenarios, 0)
    }

    #[test]
    fn test_exit_status() {
        assert_eq!(exit_status(&report(Vec::new())), EXIT_PASSED);
        let broken = ScenarioResult::aborted("broken", FailureKind::Configuration, "bad", 1);
        assert_eq!(exit_status(&report(vec![broken])), EXIT_FAILED);
    }

    #[test]
    fn test_summary_counts_steps() {
        let suite: Suite = serde_json::from_value(serde_json::json!({
            "name": "catalog",
            "scenarios": [
                {"name": "a", "steps": [{"name": "one", "url": "/a"}, {"name": "two", "url": "/b"}]},
                {"name": "b", "steps": [{"name": "one", "url": "/c"}]}
            ]
        }))
        .unwrap();
        assert_eq!(summary(&suite), "suite 'catalog' is valid: 2 scenario(s), 3 step(s)");
    }
}
