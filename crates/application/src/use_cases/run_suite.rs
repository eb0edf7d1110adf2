//! Run suite use case.
//!
//! Runs independent scenarios concurrently and assembles the suite report.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use conform_domain::{
    DEFAULT_CONCURRENCY, FailureKind, RunSettings, Scenario, ScenarioResult, Suite, SuiteReport,
};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{Instrument, error, info, info_span, warn};

use super::run_scenario::ScenarioRunner;
use crate::ports::{FixtureProvider, HttpClient};

/// Use case for running a suite of scenarios.
///
/// At most `concurrency` scenarios are in flight at once. A scenario that
/// fails, or whose task panics, never affects the others.
pub struct SuiteExecutor {
    runner: Arc<ScenarioRunner>,
    concurrency: usize,
}

impl SuiteExecutor {
    /// Creates an executor with default concurrency and timeout.
    #[must_use]
    pub fn new(client: Arc<dyn HttpClient>, fixtures: Arc<dyn FixtureProvider>) -> Self {
        Self {
            runner: Arc::new(ScenarioRunner::new(client, fixtures)),
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    /// Creates an executor configured from run settings.
    #[must_use]
    pub fn from_settings(
        client: Arc<dyn HttpClient>,
        fixtures: Arc<dyn FixtureProvider>,
        settings: &RunSettings,
    ) -> Self {
        Self {
            runner: Arc::new(ScenarioRunner::new(client, fixtures).with_timeout(settings.timeout())),
            concurrency: settings.workers(),
        }
    }

    /// Sets the worker count, clamped to at least one (builder pattern).
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Runs every scenario of a suite, with suite variables applied.
    pub async fn run_suite(&self, suite: &Suite) -> SuiteReport {
        self.run(&suite.name, suite.resolved_scenarios()).await
    }

    /// Runs scenarios and returns the report.
    ///
    /// Each scenario is validated first; an invalid one is reported as a
    /// configuration failure and sends no requests. Results appear in
    /// declaration order regardless of completion order.
    pub async fn run(&self, name: &str, scenarios: Vec<Scenario>) -> SuiteReport {
        let started_at = Utc::now();
        let started = Instant::now();
        info!(suite = %name, scenarios = scenarios.len(), concurrency = self.concurrency, "Suite started");

        let mut slots: Vec<Option<ScenarioResult>> = vec![None; scenarios.len()];
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks = JoinSet::new();

        for (index, scenario) in scenarios.into_iter().enumerate() {
            if let Err(e) = scenario.validate() {
                warn!(scenario = %scenario.name, error = %e, "Scenario definition is invalid");
                slots[index] = Some(ScenarioResult::aborted(
                    &scenario.name,
                    FailureKind::Configuration,
                    e.to_string(),
                    scenario.steps.len(),
                ));
                continue;
            }

            let runner = Arc::clone(&self.runner);
            let semaphore = Arc::clone(&semaphore);
            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await;
                let name = scenario.name.clone();
                let steps = scenario.steps.len();
                let span = info_span!("scenario", name = %name);
                let handle =
                    tokio::spawn(async move { runner.run(&scenario).await }.instrument(span));
                let result = match handle.await {
                    Ok(result) => result,
                    Err(e) => {
                        error!(scenario = %name, error = %e, "Scenario task failed");
                        ScenarioResult::aborted(
                            name,
                            FailureKind::Internal,
                            format!("scenario task failed: {e}"),
                            steps,
                        )
                    }
                };
                (index, result)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, result)) => slots[index] = Some(result),
                Err(e) => error!(error = %e, "Scenario worker failed"),
            }
        }

        let results: Vec<ScenarioResult> = slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| {
                slot.unwrap_or_else(|| {
                    ScenarioResult::aborted(
                        format!("scenario #{}", index + 1),
                        FailureKind::Internal,
                        "scenario did not complete",
                        0,
                    )
                })
            })
            .collect();

        let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        let report = SuiteReport::new(name, started_at, results, duration_ms);
        info!(
            suite = %name,
            passed = report.passed,
            failed = report.failed,
            duration_ms,
            "Suite finished"
        );
        report
    }
}

impl std::fmt::Debug for SuiteExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SuiteExecutor")
            .field("concurrency", &self.concurrency)
            .finish_non_exhaustive()
    }
}
