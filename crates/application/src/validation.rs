//! Response validator.
//!
//! Applies a contract to one response. Rules never raise: a path that does
//! not resolve is a failed rule with detail `"path not found"`.

use conform_domain::{
    Contract, Headers, HttpResponse, JsonPath, Matcher, PathRoot, Rule, RuleOutcome, Selection,
    StatusExpectation,
};
use serde_json::Value;

use crate::matching::evaluate;

const PATH_NOT_FOUND: &str = "path not found";

/// What a contract is checked against: a body plus, for whole responses,
/// the status and headers.
#[derive(Debug, Clone)]
pub struct ResponseView<'a> {
    body: &'a Value,
    status: Option<Value>,
    headers: Option<&'a Headers>,
}

impl<'a> ResponseView<'a> {
    /// A bare body, as seen by a `for_each` sub-contract.
    ///
    /// `@status` and `@headers` paths do not resolve against a bare body.
    #[must_use]
    pub const fn body(body: &'a Value) -> Self {
        Self {
            body,
            status: None,
            headers: None,
        }
    }

    /// A full response whose body has already been parsed.
    #[must_use]
    pub fn response(response: &'a HttpResponse, body: &'a Value) -> Self {
        Self {
            body,
            status: Some(Value::from(response.status)),
            headers: Some(&response.headers),
        }
    }
}

/// Result of validating one response.
#[derive(Debug, Clone, PartialEq)]
pub struct Validation {
    /// Whether the status matched the expectation.
    pub status_matched: bool,
    /// One outcome per rule, in contract order.
    pub rules: Vec<RuleOutcome>,
}

impl Validation {
    /// Whether the status matched and every rule passed.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.status_matched && self.rules.iter().all(|r| r.passed)
    }
}

/// Validates a response against a bound contract and a status expectation.
///
/// The status is always checked, even when rules fail.
#[must_use]
pub fn validate(
    contract: &Contract,
    expected_status: &StatusExpectation,
    response: &HttpResponse,
) -> Validation {
    let body = response.body_value();
    let view = ResponseView::response(response, &body);
    Validation {
        status_matched: expected_status.matches(response.status),
        rules: apply_contract(contract, &view),
    }
}

/// Applies every rule of a contract, in order.
#[must_use]
pub fn apply_contract(contract: &Contract, view: &ResponseView<'_>) -> Vec<RuleOutcome> {
    contract
        .rules()
        .iter()
        .map(|rule| apply_rule(rule, view))
        .collect()
}

/// Reads the single value a wildcard-free path addresses.
#[must_use]
pub fn lookup(path: &JsonPath, view: &ResponseView<'_>) -> Option<Value> {
    match path.path_root() {
        PathRoot::Body => path.select_one(view.body).cloned(),
        PathRoot::Status => view.status.clone(),
        PathRoot::Header(name) => view
            .headers
            .and_then(|h| h.get(name))
            .map(|v| Value::String(v.to_string())),
    }
}

fn apply_rule(rule: &Rule, view: &ResponseView<'_>) -> RuleOutcome {
    let label = rule.label();
    let expected = rule.matcher.description();

    let header_value;
    let root = match rule.path.path_root() {
        PathRoot::Body => Some(view.body),
        PathRoot::Status => view.status.as_ref(),
        PathRoot::Header(name) => {
            header_value = view
                .headers
                .and_then(|h| h.get(name))
                .map(|v| Value::String(v.to_string()));
            header_value.as_ref()
        }
    };

    let Some(root) = root else {
        return RuleOutcome::fail(rule.path.as_str(), label, expected, None, PATH_NOT_FOUND);
    };
    let selections = rule.path.select(root);

    if rule.path.has_wildcard() {
        return aggregate(rule.path.as_str(), label, expected, &rule.matcher, &selections);
    }

    match selections.into_iter().next() {
        Some(Selection {
            location,
            value: Some(value),
        }) => {
            let actual = Some(value.clone());
            match evaluate(&rule.matcher, value).detail {
                None => RuleOutcome::pass(location, label, expected, actual),
                Some(detail) => RuleOutcome::fail(location, label, expected, actual, detail),
            }
        }
        Some(Selection { location, .. }) => {
            RuleOutcome::fail(location, label, expected, None, PATH_NOT_FOUND)
        }
        None => RuleOutcome::fail(rule.path.as_str(), label, expected, None, PATH_NOT_FOUND),
    }
}

/// Folds the selections of a wildcard rule into one outcome whose `actual`
/// lists the failing values. A wildcard over an empty array passes.
fn aggregate(
    path: &str,
    label: String,
    expected: String,
    matcher: &Matcher,
    selections: &[Selection<'_>],
) -> RuleOutcome {
    let mut failing = Vec::new();
    let mut details = Vec::new();
    for selection in selections {
        match selection.value {
            Some(value) => {
                if let Some(detail) = evaluate(matcher, value).detail {
                    failing.push(value.clone());
                    details.push(format!("{}: {detail}", selection.location));
                }
            }
            None => {
                failing.push(Value::Null);
                details.push(format!("{}: {PATH_NOT_FOUND}", selection.location));
            }
        }
    }

    if details.is_empty() {
        RuleOutcome::pass(path, label, expected, None)
    } else {
        RuleOutcome::fail(
            path,
            label,
            expected,
            Some(Value::Array(failing)),
            details.join("; "),
        )
    }
}
