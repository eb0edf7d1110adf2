//! Run results: rule outcomes, step results, scenario results and the suite report.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::request::HttpMethod;
use crate::status::StatusExpectation;

/// Outcome of one rule against one location.
///
/// Wildcard rules produce a single outcome whose `actual` lists the failing
/// values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleOutcome {
    /// Path the rule was applied to.
    pub path: String,
    /// Rule description.
    pub description: String,
    /// What the matcher expected.
    pub expected: String,
    /// Value found at the path, absent if the path did not resolve.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual: Option<Value>,
    /// Whether the rule passed.
    pub passed: bool,
    /// Failure detail.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl RuleOutcome {
    /// Create a passed outcome.
    #[must_use]
    pub fn pass(
        path: impl Into<String>,
        description: impl Into<String>,
        expected: impl Into<String>,
        actual: Option<Value>,
    ) -> Self {
        Self {
            path: path.into(),
            description: description.into(),
            expected: expected.into(),
            actual,
            passed: true,
            detail: None,
        }
    }

    /// Create a failed outcome.
    #[must_use]
    pub fn fail(
        path: impl Into<String>,
        description: impl Into<String>,
        expected: impl Into<String>,
        actual: Option<Value>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            description: description.into(),
            expected: expected.into(),
            actual,
            passed: false,
            detail: Some(detail.into()),
        }
    }
}

/// Outcome of extracting one capture from a response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureOutcome {
    /// Capture name.
    pub name: String,
    /// Path it was read from.
    pub path: String,
    /// Captured value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    /// Why the capture failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CaptureOutcome {
    /// A successful capture.
    #[must_use]
    pub fn captured(name: impl Into<String>, path: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            value: Some(value),
            error: None,
        }
    }

    /// A capture whose path did not resolve.
    #[must_use]
    pub fn missing(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            value: None,
            error: Some("path not found".to_string()),
        }
    }

    /// Whether a value was captured.
    #[must_use]
    pub const fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Why a step or scenario failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// A rule, capture or status expectation did not hold.
    Assertion,
    /// The request never produced a response (connection, DNS, timeout, ...).
    Transport,
    /// The definition could not be executed (unknown fixture, bad placeholder, ...).
    Configuration,
    /// An unexpected fault such as a panicked task.
    Internal,
}

impl FailureKind {
    /// Short label for reports.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Assertion => "assertion",
            Self::Transport => "transport",
            Self::Configuration => "configuration",
            Self::Internal => "internal",
        }
    }
}

/// Result of one step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepResult {
    /// Step name.
    pub name: String,
    /// Request method.
    pub method: HttpMethod,
    /// Request URL after substitution (or the raw template if substitution failed).
    pub url: String,
    /// Whether the step passed.
    pub passed: bool,
    /// Failure category when the step failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_kind: Option<FailureKind>,
    /// Expected status.
    pub expected_status: StatusExpectation,
    /// Status received, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_status: Option<u16>,
    /// Whether the status matched the expectation.
    pub status_matched: bool,
    /// Rule outcomes, in contract order.
    #[serde(default)]
    pub rules: Vec<RuleOutcome>,
    /// Capture outcomes, in declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub captures: Vec<CaptureOutcome>,
    /// Transport or configuration error message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Request duration in milliseconds.
    pub duration_ms: u64,
}

impl StepResult {
    /// Result of validating a received response.
    #[must_use]
    pub fn validated(
        name: impl Into<String>,
        method: HttpMethod,
        url: impl Into<String>,
        expected_status: StatusExpectation,
        actual_status: u16,
        rules: Vec<RuleOutcome>,
        duration_ms: u64,
    ) -> Self {
        let status_matched = expected_status.matches(actual_status);
        let passed = status_matched && rules.iter().all(|r| r.passed);
        Self {
            name: name.into(),
            method,
            url: url.into(),
            passed,
            failure_kind: (!passed).then_some(FailureKind::Assertion),
            expected_status,
            actual_status: Some(actual_status),
            status_matched,
            rules,
            captures: Vec::new(),
            error: None,
            duration_ms,
        }
    }

    /// Result of a request that failed before a response arrived.
    #[must_use]
    pub fn transport_error(
        name: impl Into<String>,
        method: HttpMethod,
        url: impl Into<String>,
        expected_status: StatusExpectation,
        error: impl Into<String>,
        duration_ms: u64,
    ) -> Self {
        Self::errored(
            name,
            method,
            url,
            expected_status,
            FailureKind::Transport,
            error,
            duration_ms,
        )
    }

    /// Result of a step that could not be built, so nothing was sent.
    #[must_use]
    pub fn configuration_error(
        name: impl Into<String>,
        method: HttpMethod,
        url: impl Into<String>,
        expected_status: StatusExpectation,
        error: impl Into<String>,
    ) -> Self {
        Self::errored(
            name,
            method,
            url,
            expected_status,
            FailureKind::Configuration,
            error,
            0,
        )
    }

    fn errored(
        name: impl Into<String>,
        method: HttpMethod,
        url: impl Into<String>,
        expected_status: StatusExpectation,
        kind: FailureKind,
        error: impl Into<String>,
        duration_ms: u64,
    ) -> Self {
        Self {
            name: name.into(),
            method,
            url: url.into(),
            passed: false,
            failure_kind: Some(kind),
            expected_status,
            actual_status: None,
            status_matched: false,
            rules: Vec::new(),
            captures: Vec::new(),
            error: Some(error.into()),
            duration_ms,
        }
    }

    /// Attaches capture outcomes; a failed capture fails the step.
    #[must_use]
    pub fn with_captures(mut self, captures: Vec<CaptureOutcome>) -> Self {
        if self.passed && captures.iter().any(|c| !c.succeeded()) {
            self.passed = false;
            self.failure_kind = Some(FailureKind::Assertion);
        }
        self.captures = captures;
        self
    }

    /// Rules that failed.
    pub fn failed_rules(&self) -> impl Iterator<Item = &RuleOutcome> {
        self.rules.iter().filter(|r| !r.passed)
    }

    /// Captures that failed.
    pub fn failed_captures(&self) -> impl Iterator<Item = &CaptureOutcome> {
        self.captures.iter().filter(|c| !c.succeeded())
    }
}

/// Lifecycle of a scenario execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioState {
    /// Not started.
    #[default]
    Pending,
    /// Steps are being executed.
    Running,
    /// Every step passed.
    Passed,
    /// A step failed or the scenario could not run.
    Failed,
}

/// Result of one scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioResult {
    /// Scenario name.
    pub name: String,
    /// Final state.
    pub state: ScenarioState,
    /// Results of the steps that ran, in order.
    pub steps: Vec<StepResult>,
    /// Steps not attempted because an earlier one failed.
    pub skipped_steps: usize,
    /// Failure category when the scenario failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_kind: Option<FailureKind>,
    /// Scenario-level error (configuration or internal).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Wall time in milliseconds.
    pub duration_ms: u64,
}

impl ScenarioResult {
    /// A pending result with no steps.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: ScenarioState::Pending,
            steps: Vec::new(),
            skipped_steps: 0,
            failure_kind: None,
            error: None,
            duration_ms: 0,
        }
    }

    /// A scenario that failed before any step ran.
    #[must_use]
    pub fn aborted(
        name: impl Into<String>,
        kind: FailureKind,
        error: impl Into<String>,
        skipped_steps: usize,
    ) -> Self {
        Self {
            state: ScenarioState::Failed,
            skipped_steps,
            failure_kind: Some(kind),
            error: Some(error.into()),
            ..Self::new(name)
        }
    }

    /// Moves from `Pending` to `Running`.
    pub fn start(&mut self) {
        if self.state == ScenarioState::Pending {
            self.state = ScenarioState::Running;
        }
    }

    /// Records a step result.
    pub fn record(&mut self, step: StepResult) {
        self.steps.push(step);
    }

    /// Settles the final state from the recorded steps.
    pub fn finish(&mut self, skipped_steps: usize, duration_ms: u64) {
        self.skipped_steps = skipped_steps;
        self.duration_ms = duration_ms;
        match self.steps.iter().find(|s| !s.passed) {
            Some(failed) => {
                self.state = ScenarioState::Failed;
                self.failure_kind = failed.failure_kind;
            }
            None if self.error.is_some() => self.state = ScenarioState::Failed,
            None => self.state = ScenarioState::Passed,
        }
    }

    /// Whether the scenario passed.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.state == ScenarioState::Passed
    }
}

/// Aggregated results of one suite run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuiteReport {
    /// Run identifier.
    pub id: Uuid,
    /// Suite name.
    pub name: String,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// Wall time in milliseconds.
    pub duration_ms: u64,
    /// Scenario results, in declaration order.
    pub scenarios: Vec<ScenarioResult>,
    /// Number of scenarios.
    pub total: usize,
    /// Number of passed scenarios.
    pub passed: usize,
    /// Number of failed scenarios.
    pub failed: usize,
}

impl SuiteReport {
    /// Create a report from scenario results.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        started_at: DateTime<Utc>,
        scenarios: Vec<ScenarioResult>,
        duration_ms: u64,
    ) -> Self {
        let total = scenarios.len();
        let passed = scenarios.iter().filter(|s| s.passed()).count();
        Self {
            id: Uuid::now_v7(),
            name: name.into(),
            started_at,
            duration_ms,
            scenarios,
            total,
            passed,
            failed: total - passed,
        }
    }

    /// Check if every scenario passed.
    #[must_use]
    pub const fn all_passed(&self) -> bool {
        self.failed == 0
    }

    /// Get pass rate as percentage.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn pass_rate(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            (self.passed as f64 / self.total as f64) * 100.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn ok_step() -> StepResult {
        StepResult::validated(
            "get",
            HttpMethod::Get,
            "https://api.test/products/1",
            StatusExpectation::exact(200),
            200,
            vec![RuleOutcome::pass("$.id", "$.id equals 1", "equals 1", Some(json!(1)))],
            12,
        )
    }

    #[test]
    fn test_step_passes_when_rules_and_status_hold() {
        let step = ok_step();
        assert!(step.passed);
        assert!(step.status_matched);
        assert_eq!(step.failure_kind, None);
    }

    #[test]
    fn test_status_mismatch_fails_step() {
        let step = StepResult::validated(
            "get",
            HttpMethod::Get,
            "/x",
            StatusExpectation::exact(200),
            404,
            Vec::new(),
            3,
        );
        assert!(!step.passed);
        assert!(!step.status_matched);
        assert_eq!(step.failure_kind, Some(FailureKind::Assertion));
    }

    #[test]
    fn test_missing_capture_fails_step() {
        let step = ok_step().with_captures(vec![CaptureOutcome::missing("id", "$.id")]);
        assert!(!step.passed);
        assert_eq!(step.failed_captures().count(), 1);
    }

    #[test]
    fn test_scenario_lifecycle() {
        let mut scenario = ScenarioResult::new("crud");
        assert_eq!(scenario.state, ScenarioState::Pending);
        scenario.start();
        assert_eq!(scenario.state, ScenarioState::Running);
        scenario.record(ok_step());
        scenario.record(StepResult::transport_error(
            "update",
            HttpMethod::Put,
            "/x/1",
            StatusExpectation::exact(200),
            "timed out after 10ms",
            10,
        ));
        scenario.finish(1, 25);
        assert_eq!(scenario.state, ScenarioState::Failed);
        assert_eq!(scenario.failure_kind, Some(FailureKind::Transport));
        assert_eq!(scenario.skipped_steps, 1);
    }

    #[test]
    fn test_suite_report_counts() {
        let mut ok = ScenarioResult::new("ok");
        ok.record(ok_step());
        ok.finish(0, 1);
        let bad = ScenarioResult::aborted("bad", FailureKind::Configuration, "unknown fixture", 2);

        let report = SuiteReport::new("suite", Utc::now(), vec![ok, bad], 5);
        assert_eq!(report.total, 2);
        assert_eq!(report.passed, 1);
        assert_eq!(report.failed, 1);
        assert!(!report.all_passed());
        assert!((report.pass_rate() - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_report_passes() {
        let report = SuiteReport::new("empty", Utc::now(), Vec::new(), 0);
        assert!(report.all_passed());
        assert!((report.pass_rate() - 100.0).abs() < f64::EPSILON);
    }
}
