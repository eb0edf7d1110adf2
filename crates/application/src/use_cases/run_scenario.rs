//! Run scenario use case.
//!
//! Runs the steps of one scenario strictly in order, threading captured
//! values from each response into the requests that follow.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use conform_domain::{
    CaptureOutcome, DEFAULT_TIMEOUT_MS, FailureKind, HttpResponse, Scenario, ScenarioResult, Step,
    StepResult,
};
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::capture::{Bindings, CaptureTable};
use crate::error::{ApplicationError, ApplicationResult};
use crate::ports::{FixtureProvider, HttpClient, HttpClientError};
use crate::validation::{ResponseView, lookup, validate};
use crate::variable_resolver::TemplateEngine;

/// Use case for running one scenario.
///
/// The runner holds no per-scenario state, so one instance can run many
/// scenarios concurrently.
pub struct ScenarioRunner {
    client: Arc<dyn HttpClient>,
    fixtures: Arc<dyn FixtureProvider>,
    default_timeout: Duration,
}

impl ScenarioRunner {
    /// Creates a runner with the default request timeout.
    #[must_use]
    pub fn new(client: Arc<dyn HttpClient>, fixtures: Arc<dyn FixtureProvider>) -> Self {
        Self {
            client,
            fixtures,
            default_timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }

    /// Sets the timeout for steps that do not override it (builder pattern).
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    /// Runs a scenario to completion.
    ///
    /// Fixtures referenced anywhere in the scenario are resolved before the
    /// first request. The first failing step halts the scenario; later steps
    /// are counted as skipped.
    pub async fn run(&self, scenario: &Scenario) -> ScenarioResult {
        let started = Instant::now();
        let mut result = ScenarioResult::new(&scenario.name);
        result.start();
        info!(scenario = %scenario.name, steps = scenario.steps.len(), "Scenario started");

        let fixtures = match self.resolve_fixtures(scenario).await {
            Ok(fixtures) => fixtures,
            Err(e) => {
                let kind = match &e {
                    ApplicationError::Fixture(inner) if inner.is_not_found() => {
                        warn!(scenario = %scenario.name, error = %e, "Fixture lookup failed");
                        FailureKind::Configuration
                    }
                    _ => {
                        error!(scenario = %scenario.name, error = %e, "Fixture provider failed");
                        FailureKind::Internal
                    }
                };
                let mut aborted =
                    ScenarioResult::aborted(&scenario.name, kind, e.to_string(), scenario.steps.len());
                aborted.duration_ms = elapsed_ms(started);
                return aborted;
            }
        };

        let mut captures = CaptureTable::seeded(&scenario.variables);
        let mut skipped = 0;
        for (index, step) in scenario.steps.iter().enumerate() {
            let step_result = self.run_step(step, &fixtures, &mut captures).await;
            let passed = step_result.passed;
            if !passed {
                skipped = scenario.steps.len() - index - 1;
                warn!(
                    scenario = %scenario.name,
                    step = %step.name,
                    kind = step_result.failure_kind.map_or("unknown", FailureKind::as_str),
                    skipped,
                    "Step failed, halting scenario"
                );
            }
            result.record(step_result);
            if !passed {
                break;
            }
        }

        result.finish(skipped, elapsed_ms(started));
        info!(
            scenario = %scenario.name,
            passed = result.passed(),
            duration_ms = result.duration_ms,
            "Scenario finished"
        );
        result
    }

    async fn resolve_fixtures(
        &self,
        scenario: &Scenario,
    ) -> ApplicationResult<HashMap<String, Value>> {
        let mut resolved = HashMap::new();
        for name in scenario.fixture_names() {
            let value = self.fixtures.resolve(&name).await?;
            debug!(fixture = %name, "Fixture resolved");
            resolved.insert(name, value);
        }
        Ok(resolved)
    }

    async fn run_step(
        &self,
        step: &Step,
        fixtures: &HashMap<String, Value>,
        captures: &mut CaptureTable,
    ) -> StepResult {
        let request = match TemplateEngine::new(captures).render_request(step, self.default_timeout) {
            Ok(request) => request,
            Err(e) => {
                return StepResult::configuration_error(
                    &step.name,
                    step.method,
                    &step.url,
                    step.expected_status.clone(),
                    e.to_string(),
                );
            }
        };

        let timeout = request.timeout.unwrap_or(self.default_timeout);
        debug!(step = %step.name, method = %request.method, url = %request.url, "Sending request");

        let started = Instant::now();
        let sent = tokio::time::timeout(timeout, self.client.send(&request)).await;
        let duration_ms = elapsed_ms(started);

        let response = match sent {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                return transport_failure(step, &request.url, &e, duration_ms);
            }
            Err(_) => {
                let e = HttpClientError::Timeout {
                    timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                };
                return transport_failure(step, &request.url, &e, duration_ms);
            }
        };

        let contract = step.contract.bind(&Bindings::new(fixtures, captures));
        let validation = validate(&contract, &step.expected_status, &response);
        debug!(
            step = %step.name,
            status = response.status,
            passed = validation.passed(),
            "Response validated"
        );

        let outcomes = write_captures(step, &response, captures);
        StepResult::validated(
            &step.name,
            step.method,
            request.url,
            step.expected_status.clone(),
            response.status,
            validation.rules,
            duration_ms,
        )
        .with_captures(outcomes)
    }
}

fn transport_failure(step: &Step, url: &str, e: &HttpClientError, duration_ms: u64) -> StepResult {
    warn!(step = %step.name, url, category = e.category(), error = %e, "Request failed");
    StepResult::transport_error(
        &step.name,
        step.method,
        url,
        step.expected_status.clone(),
        e.to_string(),
        duration_ms,
    )
}

fn write_captures(
    step: &Step,
    response: &HttpResponse,
    captures: &mut CaptureTable,
) -> Vec<CaptureOutcome> {
    if step.captures.is_empty() {
        return Vec::new();
    }

    let body = response.body_value();
    let view = ResponseView::response(response, &body);
    step.captures
        .iter()
        .map(|(name, path)| match lookup(path, &view) {
            Some(value) => {
                if captures.insert(name.clone(), value.clone()) {
                    CaptureOutcome::captured(name, path.as_str(), value)
                } else {
                    CaptureOutcome {
                        error: Some("already captured".to_string()),
                        ..CaptureOutcome::captured(name, path.as_str(), value)
                    }
                }
            }
            None => CaptureOutcome::missing(name, path.as_str()),
        })
        .collect()
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use conform_domain::{HttpMethod, HttpRequest, ScenarioState};
    use serde_json::json;

    use crate::ports::FixtureError;

    struct EchoClient;

    #[async_trait]
    impl HttpClient for EchoClient {
        async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, HttpClientError> {
            Ok(HttpResponse::json(
                200,
                &json!({"url": request.url, "body": request.body}),
            ))
        }
    }

    struct NoFixtures;

    #[async_trait]
    impl FixtureProvider for NoFixtures {
        async fn resolve(&self, name: &str) -> Result<Value, FixtureError> {
            Err(FixtureError::NotFound(name.to_string()))
        }
    }

    fn runner() -> ScenarioRunner {
        ScenarioRunner::new(Arc::new(EchoClient), Arc::new(NoFixtures))
    }

    #[tokio::test]
    async fn test_variables_seed_captures() {
        let scenario = Scenario::new("echo")
            .with_variable("category", "smartphones")
            .with_step(
                Step::new("list", HttpMethod::Get, "/products/category/{{category}}")
                    .capture("echoed", "$.url")
                    .unwrap(),
            );

        let result = runner().run(&scenario).await;
        assert_eq!(result.state, ScenarioState::Passed);
        assert_eq!(
            result.steps[0].captures[0].value,
            Some(json!("/products/category/smartphones"))
        );
    }

    #[tokio::test]
    async fn test_unresolved_placeholder_is_configuration_failure() {
        let scenario = Scenario::new("broken")
            .with_step(Step::new("read", HttpMethod::Get, "/products/{{id}}"))
            .with_step(Step::new("never", HttpMethod::Get, "/products"));

        let result = runner().run(&scenario).await;
        assert_eq!(result.state, ScenarioState::Failed);
        assert_eq!(result.failure_kind, Some(FailureKind::Configuration));
        assert_eq!(result.steps.len(), 1);
        assert_eq!(result.skipped_steps, 1);
        assert_eq!(result.steps[0].url, "/products/{{id}}");
    }
}
