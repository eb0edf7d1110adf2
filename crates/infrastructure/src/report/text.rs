//! Plain-text report rendering.

use conform_domain::{FailureKind, ScenarioResult, StepResult, SuiteReport};

/// Renders a terminal summary of a suite run.
#[must_use]
pub fn render_text(report: &SuiteReport) -> String {
    let mut lines = vec![format!("Suite: {} (run {})", report.name, report.id)];

    for scenario in &report.scenarios {
        let verdict = if scenario.passed() { "PASS" } else { "FAIL" };
        lines.push(format!(
            "  {verdict}  {}  [{}, {}ms]",
            scenario.name,
            step_summary(scenario),
            scenario.duration_ms
        ));
    }

    let failures = failure_lines(report);
    if !failures.is_empty() {
        lines.push(String::new());
        lines.push("Failures:".to_string());
        lines.extend(failures.into_iter().map(|line| format!("  {line}")));
    }

    lines.push(String::new());
    lines.push(format!(
        "{} scenario{}: {} passed, {} failed ({:.1}%) in {}ms",
        report.total,
        if report.total == 1 { "" } else { "s" },
        report.passed,
        report.failed,
        report.pass_rate(),
        report.duration_ms
    ));

    let mut text = lines.join("\n");
    text.push('\n');
    text
}

/// One line per failure, attributed as `scenario > step > path`.
#[must_use]
pub fn failure_lines(report: &SuiteReport) -> Vec<String> {
    let mut lines = Vec::new();
    for scenario in report.scenarios.iter().filter(|s| !s.passed()) {
        if let Some(error) = &scenario.error {
            lines.push(format!(
                "{}: {} error: {error}",
                scenario.name,
                kind_label(scenario.failure_kind)
            ));
        }
        for step in scenario.steps.iter().filter(|s| !s.passed) {
            step_failures(&scenario.name, step, &mut lines);
        }
    }
    lines
}

fn step_failures(scenario: &str, step: &StepResult, lines: &mut Vec<String>) {
    let prefix = format!("{scenario} > {}", step.name);

    if let Some(error) = &step.error {
        lines.push(format!(
            "{prefix}: {} error: {error} ({} {})",
            kind_label(step.failure_kind),
            step.method,
            step.url
        ));
        return;
    }

    if let Some(actual) = step.actual_status
        && !step.status_matched
    {
        lines.push(format!(
            "{prefix}: status {actual}, expected {} ({} {})",
            step.expected_status, step.method, step.url
        ));
    }

    for rule in step.failed_rules() {
        lines.push(format!(
            "{prefix} > {}: {} (expected {})",
            rule.path,
            rule.detail.as_deref().unwrap_or("failed"),
            rule.expected
        ));
    }

    for capture in step.failed_captures() {
        lines.push(format!(
            "{prefix} > capture '{}' from {}: {}",
            capture.name,
            capture.path,
            capture.error.as_deref().unwrap_or("failed")
        ));
    }
}

fn step_summary(scenario: &ScenarioResult) -> String {
    let run = scenario.steps.len();
    let total = run + scenario.skipped_steps;
    let plural = if total == 1 { "" } else { "s" };
    if scenario.skipped_steps == 0 {
        format!("{run} step{plural}")
    } else {
        format!("{run}/{total} step{plural}, {} skipped", scenario.skipped_steps)
    }
}

fn kind_label(kind: Option<FailureKind>) -> &'static str {
    kind.map_or("unknown", FailureKind::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use conform_domain::{
        CaptureOutcome, HttpMethod, RuleOutcome, StatusExpectation,
    };
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn crud_failure() -> ScenarioResult {
        let mut result = ScenarioResult::new("product CRUD");
        result.start();
        result.record(
            StepResult::validated(
                "create",
                HttpMethod::Post,
                "https://api.test/products/add",
                StatusExpectation::exact(201),
                200,
                vec![
                    RuleOutcome::pass("$.title", "title", "equals \"X\"", Some(json!("X"))),
                    RuleOutcome::fail(
                        "$.id",
                        "id is numeric",
                        "is of type number",
                        None,
                        "path not found",
                    ),
                ],
                40,
            )
            .with_captures(vec![CaptureOutcome::missing("id", "$.id")]),
        );
        result.finish(2, 45);
        result
    }

    fn passing() -> ScenarioResult {
        let mut result = ScenarioResult::new("categories");
        result.start();
        result.record(StepResult::validated(
            "list",
            HttpMethod::Get,
            "https://api.test/products/categories",
            StatusExpectation::success(),
            200,
            Vec::new(),
            30,
        ));
        result.finish(0, 31);
        result
    }

    #[test]
    fn test_failure_lines_are_attributed() {
        let report = SuiteReport::new("catalog", Utc::now(), vec![passing(), crud_failure()], 80);
        assert_eq!(
            failure_lines(&report),
            vec![
                "product CRUD > create: status 200, expected 201 (POST https://api.test/products/add)",
                "product CRUD > create > $.id: path not found (expected is of type number)",
                "product CRUD > create > capture 'id' from $.id: path not found",
            ]
        );
    }

    #[test]
    fn test_transport_and_aborted_failures() {
        let mut timed_out = ScenarioResult::new("slow");
        timed_out.record(StepResult::transport_error(
            "read",
            HttpMethod::Get,
            "https://api.test/slow",
            StatusExpectation::success(),
            "request timed out after 100ms",
            100,
        ));
        timed_out.finish(0, 100);
        let aborted = ScenarioResult::aborted(
            "needs fixture",
            FailureKind::Configuration,
            "fixture not found: categories",
            1,
        );

        let report = SuiteReport::new("catalog", Utc::now(), vec![timed_out, aborted], 120);
        assert_eq!(
            failure_lines(&report),
            vec![
                "slow > read: transport error: request timed out after 100ms (GET https://api.test/slow)",
                "needs fixture: configuration error: fixture not found: categories",
            ]
        );
    }

    #[test]
    fn test_render_text_summary() {
        let report = SuiteReport::new("catalog", Utc::now(), vec![passing(), crud_failure()], 80);
        let text = render_text(&report);

        assert!(text.contains("  PASS  categories  [1 step, 31ms]"));
        assert!(text.contains("  FAIL  product CRUD  [1/3 steps, 2 skipped, 45ms]"));
        assert!(text.contains("Failures:\n  product CRUD > create: status 200"));
        assert!(text.ends_with("2 scenarios: 1 passed, 1 failed (50.0%) in 80ms\n"));
    }

    #[test]
    fn test_all_passing_has_no_failure_section() {
        let report = SuiteReport::new("catalog", Utc::now(), vec![passing()], 31);
        let text = render_text(&report);
        assert!(!text.contains("Failures:"));
        assert!(text.ends_with("1 scenario: 1 passed, 0 failed (100.0%) in 31ms\n"));
    }
}
