//! Value matcher evaluation.
//!
//! [`evaluate`] is pure and never fails: every mismatch, wrong type or
//! unbound reference becomes a failed [`MatchResult`] with a detail message.

mod collation;
mod equality;

use std::cmp::Ordering;

use conform_domain::{
    ComparisonOperator, Contract, Expected, JsonPath, JsonType, Matcher, Pattern, SortOrder,
};
use serde_json::Value;

use collation::Collation;
pub use equality::{contains_value, describe, json_eq};

use crate::validation::{ResponseView, apply_contract};

/// Outcome of evaluating one matcher against one value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    /// Whether the matcher passed.
    pub passed: bool,
    /// Why it failed.
    pub detail: Option<String>,
}

impl MatchResult {
    /// A passing result.
    #[must_use]
    pub const fn pass() -> Self {
        Self {
            passed: true,
            detail: None,
        }
    }

    /// A failing result.
    #[must_use]
    pub fn fail(detail: impl Into<String>) -> Self {
        Self {
            passed: false,
            detail: Some(detail.into()),
        }
    }

    fn check(passed: bool, detail: impl FnOnce() -> String) -> Self {
        if passed { Self::pass() } else { Self::fail(detail()) }
    }
}

/// Evaluates a matcher against a value.
#[must_use]
pub fn evaluate(matcher: &Matcher, value: &Value) -> MatchResult {
    match matcher {
        Matcher::IsType { json_type } => {
            let actual = JsonType::of(value);
            MatchResult::check(actual == *json_type, || {
                format!("expected {json_type}, got {}", describe(value))
            })
        }
        Matcher::MatchesRegex { pattern } => matches_regex(pattern, value),
        Matcher::InRange { min, max } => in_range(*min, *max, value),
        Matcher::OneOf { values } => with_array(values, |set| {
            MatchResult::check(contains_value(set, value), || {
                format!("{value} is not one of {}", Value::Array(set.to_vec()))
            })
        }),
        Matcher::HasExactKeys { keys } => with_array(keys, |keys| has_keys(keys, value, true)),
        Matcher::HasKeys { keys } => with_array(keys, |keys| has_keys(keys, value, false)),
        Matcher::Equals { value: expected } => with_literal(expected, |expected| {
            MatchResult::check(json_eq(value, expected), || {
                format!("expected {expected}, got {value}")
            })
        }),
        Matcher::IsSortedBy { key, order } => is_sorted_by(key.as_ref(), *order, value),
        Matcher::SetEquals { expected } => {
            with_array(expected, |expected| set_equals(expected, value))
        }
        Matcher::ForEach { contract } => for_each(contract, value),
        Matcher::Compare { op, value: expected } => {
            with_literal(expected, |expected| compare(*op, expected, value))
        }
        Matcher::NotEmpty => not_empty(value),
        Matcher::Contains {
            value: needle,
            ignore_case,
        } => with_literal(needle, |needle| contains(needle, *ignore_case, value)),
        Matcher::Length { matcher } => length(matcher, value),
        Matcher::AllOf { matchers } => {
            let failures: Vec<String> = matchers
                .iter()
                .map(|m| evaluate(m, value))
                .filter_map(|r| r.detail)
                .collect();
            MatchResult::check(failures.is_empty(), || failures.join("; "))
        }
    }
}

fn with_literal(expected: &Expected, f: impl FnOnce(&Value) -> MatchResult) -> MatchResult {
    match expected {
        Expected::Literal(value) => f(value),
        Expected::Fixture { fixture } => MatchResult::fail(format!("unresolved fixture '{fixture}'")),
        Expected::Capture { capture } => MatchResult::fail(format!("unresolved capture '{capture}'")),
    }
}

fn with_array(expected: &Expected, f: impl FnOnce(&[Value]) -> MatchResult) -> MatchResult {
    with_literal(expected, |value| match value {
        Value::Array(items) => f(items),
        other => MatchResult::fail(format!("expected set must be an array, got {}", describe(other))),
    })
}

fn matches_regex(pattern: &Pattern, value: &Value) -> MatchResult {
    match value {
        Value::String(text) => MatchResult::check(pattern.is_match(text), || {
            format!("{value} does not match /{}/", pattern.as_str())
        }),
        other => MatchResult::fail(format!(
            "expected a string matching /{}/, got {}",
            pattern.as_str(),
            describe(other)
        )),
    }
}

fn in_range(min: f64, max: f64, value: &Value) -> MatchResult {
    match value.as_f64() {
        Some(n) => MatchResult::check(n >= min && n <= max, || {
            format!("{value} is outside [{min}, {max}]")
        }),
        None => MatchResult::fail(format!("expected a number, got {}", describe(value))),
    }
}

fn has_keys(keys: &[Value], value: &Value, exact: bool) -> MatchResult {
    let Value::Object(object) = value else {
        return MatchResult::fail(format!("expected an object, got {}", describe(value)));
    };

    let expected: Vec<&str> = keys.iter().filter_map(Value::as_str).collect();
    let missing: Vec<&str> = expected
        .iter()
        .copied()
        .filter(|k| !object.contains_key(*k))
        .collect();
    let extra: Vec<&str> = if exact {
        object
            .keys()
            .map(String::as_str)
            .filter(|k| !expected.contains(k))
            .collect()
    } else {
        Vec::new()
    };

    let mut problems = Vec::new();
    if !missing.is_empty() {
        problems.push(format!("missing keys: {}", missing.join(", ")));
    }
    if !extra.is_empty() {
        problems.push(format!("extra keys: {}", extra.join(", ")));
    }
    MatchResult::check(problems.is_empty(), || problems.join("; "))
}

fn is_sorted_by(key: Option<&JsonPath>, order: SortOrder, value: &Value) -> MatchResult {
    let Value::Array(items) = value else {
        return MatchResult::fail("not an array");
    };

    let mut keys = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let extracted = match key {
            Some(path) => path.select_one(item),
            None => Some(item),
        };
        match extracted {
            Some(k) => keys.push(k),
            None => {
                let path = key.map_or_else(|| "$".to_string(), ToString::to_string);
                return MatchResult::fail(format!("element [{index}] has no value at {path}"));
            }
        }
    }

    let mut collation = Collation::new();
    for (index, pair) in keys.windows(2).enumerate() {
        let (left, right) = (pair[0], pair[1]);
        let ordering = match (left, right) {
            (Value::Number(_), Value::Number(_)) => left
                .as_f64()
                .zip(right.as_f64())
                .and_then(|(l, r)| l.partial_cmp(&r)),
            (Value::String(l), Value::String(r)) => Some(collation.compare(l, r)),
            _ => None,
        };
        let Some(ordering) = ordering else {
            return MatchResult::fail(format!(
                "cannot compare {} with {} at [{index}]",
                describe(left),
                describe(right)
            ));
        };
        let in_order = match order {
            SortOrder::Asc => ordering != Ordering::Greater,
            SortOrder::Desc => ordering != Ordering::Less,
        };
        if !in_order {
            return MatchResult::fail(format!(
                "element [{}] ({right}) is out of {} order after element [{index}]",
                index + 1,
                order.as_str(),
            ));
        }
    }

    MatchResult::pass()
}

fn set_equals(expected: &[Value], value: &Value) -> MatchResult {
    let Value::Array(actual) = value else {
        return MatchResult::fail("not an array");
    };

    let missing: Vec<&Value> = expected
        .iter()
        .filter(|e| !contains_value(actual, e))
        .collect();
    let extra: Vec<&Value> = actual
        .iter()
        .filter(|a| !contains_value(expected, a))
        .collect();

    let mut problems = Vec::new();
    if !missing.is_empty() {
        problems.push(format!("missing: {}", render_list(&missing)));
    }
    if !extra.is_empty() {
        problems.push(format!("extra: {}", render_list(&extra)));
    }
    if problems.is_empty() && actual.len() != expected.len() {
        problems.push(format!(
            "expected {} elements, got {}",
            expected.len(),
            actual.len()
        ));
    }
    MatchResult::check(problems.is_empty(), || problems.join("; "))
}

fn render_list(values: &[&Value]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn for_each(contract: &Contract, value: &Value) -> MatchResult {
    let Value::Array(items) = value else {
        return MatchResult::fail("not an array");
    };

    let mut failures = Vec::new();
    for (index, item) in items.iter().enumerate() {
        let view = ResponseView::body(item);
        for outcome in apply_contract(contract, &view) {
            if !outcome.passed {
                let detail = outcome.detail.unwrap_or_default();
                failures.push(format!("[{index}] {}: {detail}", outcome.path));
            }
        }
    }
    MatchResult::check(failures.is_empty(), || failures.join("; "))
}

fn compare(op: ComparisonOperator, expected: &Value, value: &Value) -> MatchResult {
    let Some(rhs) = expected.as_f64() else {
        return MatchResult::fail(format!("cannot compare against {}", describe(expected)));
    };
    match value.as_f64() {
        Some(lhs) => MatchResult::check(op.apply(lhs, rhs), || {
            format!("expected {value} {} {expected}", op.symbol())
        }),
        None => MatchResult::fail(format!("expected a number, got {}", describe(value))),
    }
}

fn not_empty(value: &Value) -> MatchResult {
    let empty = match value {
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        other => {
            return MatchResult::fail(format!(
                "expected a string, array or object, got {}",
                describe(other)
            ));
        }
    };
    MatchResult::check(!empty, || format!("{} is empty", JsonType::of(value)))
}

fn contains(needle: &Value, ignore_case: bool, value: &Value) -> MatchResult {
    match (value, needle) {
        (Value::String(haystack), Value::String(n)) => {
            let found = if ignore_case {
                haystack.to_lowercase().contains(&n.to_lowercase())
            } else {
                haystack.contains(n.as_str())
            };
            MatchResult::check(found, || format!("{value} does not contain {needle}"))
        }
        (Value::Array(items), _) => MatchResult::check(contains_value(items, needle), || {
            format!("array does not contain {needle}")
        }),
        (Value::String(_), _) => MatchResult::fail(format!(
            "cannot search a string for {}",
            describe(needle)
        )),
        (other, _) => MatchResult::fail(format!(
            "expected a string or array, got {}",
            describe(other)
        )),
    }
}

fn length(matcher: &Matcher, value: &Value) -> MatchResult {
    let len = match value {
        Value::String(s) => s.chars().count(),
        Value::Array(items) => items.len(),
        Value::Object(map) => map.len(),
        other => {
            return MatchResult::fail(format!(
                "expected a string, array or object, got {}",
                describe(other)
            ));
        }
    };
    let result = evaluate(matcher, &Value::from(len));
    MatchResult::check(result.passed, || {
        format!("length {len}: {}", result.detail.unwrap_or_default())
    })
}
