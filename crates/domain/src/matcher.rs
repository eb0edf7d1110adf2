//! Matcher expressions.
//!
//! A [`Matcher`] is a composable predicate over a JSON value. Matchers are
//! plain data here; evaluation lives in the application layer.

use std::collections::BTreeSet;
use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::contract::Contract;
use crate::error::{DomainError, DomainResult};
use crate::path::JsonPath;

/// Structural JSON type tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JsonType {
    /// Any JSON number.
    Number,
    /// A JSON string.
    String,
    /// `true` or `false`.
    Boolean,
    /// A JSON array.
    Array,
    /// A JSON object.
    Object,
    /// `null`.
    Null,
}

impl JsonType {
    /// Returns the type tag of a value.
    #[must_use]
    pub const fn of(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(_) => Self::Boolean,
            Value::Number(_) => Self::Number,
            Value::String(_) => Self::String,
            Value::Array(_) => Self::Array,
            Value::Object(_) => Self::Object,
        }
    }

    /// Returns the type name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Number => "number",
            Self::String => "string",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Object => "object",
            Self::Null => "null",
        }
    }
}

impl fmt::Display for JsonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sort direction for [`Matcher::IsSortedBy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Ascending.
    #[default]
    Asc,
    /// Descending.
    Desc,
}

impl SortOrder {
    /// Returns the order name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// Numeric comparison operators.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonOperator {
    /// Equal to.
    Equals,
    /// Not equal to.
    NotEquals,
    /// Greater than.
    GreaterThan,
    /// Greater than or equal to.
    GreaterThanOrEqual,
    /// Less than.
    LessThan,
    /// Less than or equal to.
    LessThanOrEqual,
}

impl ComparisonOperator {
    /// Get the symbol for this operator.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::Equals => "==",
            Self::NotEquals => "!=",
            Self::GreaterThan => ">",
            Self::GreaterThanOrEqual => ">=",
            Self::LessThan => "<",
            Self::LessThanOrEqual => "<=",
        }
    }

    /// Applies the operator to two numbers.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn apply(self, actual: f64, expected: f64) -> bool {
        match self {
            Self::Equals => actual == expected,
            Self::NotEquals => actual != expected,
            Self::GreaterThan => actual > expected,
            Self::GreaterThanOrEqual => actual >= expected,
            Self::LessThan => actual < expected,
            Self::LessThanOrEqual => actual <= expected,
        }
    }
}

/// A regular expression compiled when the matcher is built.
#[derive(Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    /// Compiles a pattern.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidPattern`] if the regex does not compile.
    pub fn new(source: impl Into<String>) -> DomainResult<Self> {
        let source = source.into();
        let regex = Regex::new(&source).map_err(|e| DomainError::InvalidPattern {
            pattern: source.clone(),
            reason: e.to_string(),
        })?;
        Ok(Self { source, regex })
    }

    /// The pattern as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Returns true if `text` matches.
    #[must_use]
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Pattern").field(&self.source).finish()
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl TryFrom<String> for Pattern {
    type Error = DomainError;

    fn try_from(value: String) -> DomainResult<Self> {
        Self::new(value)
    }
}

impl From<Pattern> for String {
    fn from(pattern: Pattern) -> Self {
        pattern.source
    }
}

/// An expected value: a literal, or a reference bound before validation.
///
/// Only an object whose single key is `$fixture` or `$capture` with a string
/// value is read as a reference; any other object is a literal.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Expected {
    /// A named fixture supplied by the fixture provider.
    Fixture {
        /// Fixture name.
        #[serde(rename = "$fixture")]
        fixture: String,
    },
    /// A value captured by an earlier step.
    Capture {
        /// Capture name.
        #[serde(rename = "$capture")]
        capture: String,
    },
    /// A literal JSON value.
    Literal(Value),
}

impl<'de> Deserialize<'de> for Expected {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        if let Value::Object(map) = &value
            && map.len() == 1
        {
            match map.iter().next() {
                Some((key, Value::String(name))) if key == "$fixture" => {
                    return Ok(Self::fixture(name.clone()));
                }
                Some((key, Value::String(name))) if key == "$capture" => {
                    return Ok(Self::capture(name.clone()));
                }
                _ => {}
            }
        }
        Ok(Self::Literal(value))
    }
}

impl Expected {
    /// Creates a literal expectation.
    #[must_use]
    pub fn literal(value: impl Into<Value>) -> Self {
        Self::Literal(value.into())
    }

    /// Creates a fixture reference.
    #[must_use]
    pub fn fixture(name: impl Into<String>) -> Self {
        Self::Fixture {
            fixture: name.into(),
        }
    }

    /// Creates a capture reference.
    #[must_use]
    pub fn capture(name: impl Into<String>) -> Self {
        Self::Capture {
            capture: name.into(),
        }
    }

    /// Returns the literal value, if bound.
    #[must_use]
    pub const fn as_literal(&self) -> Option<&Value> {
        match self {
            Self::Literal(value) => Some(value),
            Self::Fixture { .. } | Self::Capture { .. } => None,
        }
    }
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(value) => write!(f, "{value}"),
            Self::Fixture { fixture } => write!(f, "fixture '{fixture}'"),
            Self::Capture { capture } => write!(f, "capture '{capture}'"),
        }
    }
}

/// Fixture and capture names a matcher depends on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct References {
    /// Referenced fixtures.
    pub fixtures: BTreeSet<String>,
    /// Referenced captures.
    pub captures: BTreeSet<String>,
}

impl References {
    fn add(&mut self, expected: &Expected) {
        match expected {
            Expected::Fixture { fixture } => {
                self.fixtures.insert(fixture.clone());
            }
            Expected::Capture { capture } => {
                self.captures.insert(capture.clone());
            }
            Expected::Literal(_) => {}
        }
    }
}

/// Concrete values for references, used to bind a matcher before evaluation.
pub trait ReferenceValues {
    /// Looks up a resolved fixture.
    fn fixture(&self, name: &str) -> Option<&Value>;
    /// Looks up a captured value.
    fn capture(&self, name: &str) -> Option<&Value>;
}

/// A composable assertion over a JSON value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Matcher {
    /// The value has the given structural type.
    IsType {
        /// Expected type.
        json_type: JsonType,
    },
    /// The value is a string matching the pattern.
    MatchesRegex {
        /// Pattern to search for.
        pattern: Pattern,
    },
    /// The value is a number within `[min, max]`.
    InRange {
        /// Lower bound (inclusive).
        min: f64,
        /// Upper bound (inclusive).
        max: f64,
    },
    /// The value equals one member of the set.
    OneOf {
        /// Allowed values (an array).
        values: Expected,
    },
    /// The value is an object with exactly these keys.
    HasExactKeys {
        /// Required key set (an array of strings).
        keys: Expected,
    },
    /// The value is an object containing at least these keys.
    HasKeys {
        /// Required keys (an array of strings).
        keys: Expected,
    },
    /// The value equals the expected value.
    Equals {
        /// Expected value.
        value: Expected,
    },
    /// The value is an array sorted by `key`.
    IsSortedBy {
        /// Path to the sort key within each element; the element itself if absent.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        key: Option<JsonPath>,
        /// Direction.
        #[serde(default)]
        order: SortOrder,
    },
    /// The value and `expected` are equal as unordered collections.
    SetEquals {
        /// Expected members (an array).
        expected: Expected,
    },
    /// Every element of the array satisfies the nested contract.
    ForEach {
        /// Contract applied to each element, with `$` bound to the element.
        contract: Contract,
    },
    /// The value is a number comparing to `value` with `op`.
    Compare {
        /// Operator.
        op: ComparisonOperator,
        /// Right-hand side.
        value: Expected,
    },
    /// The value is a non-empty string, array or object.
    NotEmpty,
    /// The string contains a substring, or the array contains an element.
    Contains {
        /// Needle.
        value: Expected,
        /// Case-insensitive substring search.
        #[serde(default)]
        ignore_case: bool,
    },
    /// The length of the array, string or object satisfies the matcher.
    Length {
        /// Matcher applied to the length.
        matcher: Box<Matcher>,
    },
    /// Every child matcher passes.
    AllOf {
        /// Child matchers.
        matchers: Vec<Matcher>,
    },
}

impl Matcher {
    /// `is_type` matcher.
    #[must_use]
    pub const fn is_type(json_type: JsonType) -> Self {
        Self::IsType { json_type }
    }

    /// `matches_regex` matcher.
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern does not compile.
    pub fn matches_regex(pattern: &str) -> DomainResult<Self> {
        Ok(Self::MatchesRegex {
            pattern: Pattern::new(pattern)?,
        })
    }

    /// `in_range` matcher.
    ///
    /// # Errors
    ///
    /// Returns an error if `min > max` or a bound is not finite.
    pub fn in_range(min: f64, max: f64) -> DomainResult<Self> {
        let matcher = Self::InRange { min, max };
        matcher.validate()?;
        Ok(matcher)
    }

    /// `one_of` matcher over literal values.
    #[must_use]
    pub fn one_of(values: impl IntoIterator<Item = Value>) -> Self {
        Self::OneOf {
            values: Expected::Literal(Value::Array(values.into_iter().collect())),
        }
    }

    /// `has_exact_keys` matcher over literal keys.
    #[must_use]
    pub fn has_exact_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::HasExactKeys {
            keys: key_array(keys),
        }
    }

    /// `has_keys` matcher over literal keys.
    #[must_use]
    pub fn has_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::HasKeys {
            keys: key_array(keys),
        }
    }

    /// `equals` matcher.
    #[must_use]
    pub fn equals(value: impl Into<Value>) -> Self {
        Self::Equals {
            value: Expected::literal(value),
        }
    }

    /// `equals` matcher against a capture.
    #[must_use]
    pub fn equals_capture(name: impl Into<String>) -> Self {
        Self::Equals {
            value: Expected::capture(name),
        }
    }

    /// `is_sorted_by` matcher.
    ///
    /// # Errors
    ///
    /// Returns an error if `key` is not a valid path.
    pub fn is_sorted_by(key: &str, order: SortOrder) -> DomainResult<Self> {
        Ok(Self::IsSortedBy {
            key: Some(JsonPath::parse(key)?),
            order,
        })
    }

    /// `set_equals` matcher.
    #[must_use]
    pub const fn set_equals(expected: Expected) -> Self {
        Self::SetEquals { expected }
    }

    /// `for_each` matcher.
    #[must_use]
    pub const fn for_each(contract: Contract) -> Self {
        Self::ForEach { contract }
    }

    /// `compare` matcher against a literal number.
    #[must_use]
    pub fn compare(op: ComparisonOperator, value: impl Into<Value>) -> Self {
        Self::Compare {
            op,
            value: Expected::literal(value),
        }
    }

    /// `contains` matcher.
    #[must_use]
    pub fn contains(value: impl Into<Value>) -> Self {
        Self::Contains {
            value: Expected::literal(value),
            ignore_case: false,
        }
    }

    /// `length` matcher.
    #[must_use]
    pub fn length(matcher: Self) -> Self {
        Self::Length {
            matcher: Box::new(matcher),
        }
    }

    /// `all_of` matcher.
    #[must_use]
    pub const fn all_of(matchers: Vec<Self>) -> Self {
        Self::AllOf { matchers }
    }

    /// Human-readable description of what the matcher expects.
    #[must_use]
    pub fn description(&self) -> String {
        match self {
            Self::IsType { json_type } => format!("is of type {json_type}"),
            Self::MatchesRegex { pattern } => format!("matches /{}/", pattern.as_str()),
            Self::InRange { min, max } => format!("in range [{min}, {max}]"),
            Self::OneOf { values } => format!("one of {values}"),
            Self::HasExactKeys { keys } => format!("has exactly keys {keys}"),
            Self::HasKeys { keys } => format!("has keys {keys}"),
            Self::Equals { value } => format!("equals {value}"),
            Self::IsSortedBy { key: Some(key), order } => {
                format!("sorted by {key} ({})", order.as_str())
            }
            Self::IsSortedBy { key: None, order } => format!("sorted ({})", order.as_str()),
            Self::SetEquals { expected } => format!("has the same members as {expected}"),
            Self::ForEach { contract } => {
                format!("each element satisfies {} rule(s)", contract.len())
            }
            Self::Compare { op, value } => format!("{} {value}", op.symbol()),
            Self::NotEmpty => "is not empty".to_string(),
            Self::Contains {
                value,
                ignore_case: true,
            } => format!("contains {value} (ignoring case)"),
            Self::Contains { value, .. } => format!("contains {value}"),
            Self::Length { matcher } => format!("length {}", matcher.description()),
            Self::AllOf { matchers } => matchers
                .iter()
                .map(Self::description)
                .collect::<Vec<_>>()
                .join(" and "),
        }
    }

    /// Checks structural validity of the matcher and everything nested in it.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidMatcher`] for malformed literals or bounds.
    pub fn validate(&self) -> DomainResult<()> {
        match self {
            Self::InRange { min, max } => {
                if !min.is_finite() || !max.is_finite() {
                    return Err(DomainError::InvalidMatcher(
                        "in_range bounds must be finite".to_string(),
                    ));
                }
                if min > max {
                    return Err(DomainError::InvalidMatcher(format!(
                        "in_range lower bound {min} exceeds upper bound {max}"
                    )));
                }
                Ok(())
            }
            Self::OneOf { values } => validate_array("one_of", values),
            Self::SetEquals { expected } => validate_array("set_equals", expected),
            Self::HasExactKeys { keys } => validate_keys("has_exact_keys", keys),
            Self::HasKeys { keys } => validate_keys("has_keys", keys),
            Self::Compare { value, .. } => match value.as_literal() {
                Some(literal) if !literal.is_number() => Err(DomainError::InvalidMatcher(
                    format!("compare expects a number, got {literal}"),
                )),
                _ => Ok(()),
            },
            Self::IsSortedBy { key: Some(key), .. } if key.has_wildcard() => Err(
                DomainError::InvalidMatcher(format!("sort key '{key}' must not use a wildcard")),
            ),
            Self::ForEach { contract } => contract.validate(),
            Self::Length { matcher } => matcher.validate(),
            Self::AllOf { matchers } => {
                if matchers.is_empty() {
                    return Err(DomainError::InvalidMatcher(
                        "all_of needs at least one matcher".to_string(),
                    ));
                }
                matchers.iter().try_for_each(Self::validate)
            }
            Self::IsType { .. }
            | Self::MatchesRegex { .. }
            | Self::Equals { .. }
            | Self::IsSortedBy { .. }
            | Self::NotEmpty
            | Self::Contains { .. } => Ok(()),
        }
    }

    /// Collects fixture and capture references, including nested ones.
    pub fn collect_references(&self, out: &mut References) {
        match self {
            Self::OneOf { values } => out.add(values),
            Self::HasExactKeys { keys } | Self::HasKeys { keys } => out.add(keys),
            Self::Equals { value } | Self::Compare { value, .. } | Self::Contains { value, .. } => {
                out.add(value);
            }
            Self::SetEquals { expected } => out.add(expected),
            Self::ForEach { contract } => contract.collect_references(out),
            Self::Length { matcher } => matcher.collect_references(out),
            Self::AllOf { matchers } => {
                for matcher in matchers {
                    matcher.collect_references(out);
                }
            }
            Self::IsType { .. }
            | Self::MatchesRegex { .. }
            | Self::InRange { .. }
            | Self::IsSortedBy { .. }
            | Self::NotEmpty => {}
        }
    }

    /// Returns a copy with every reference replaced by its concrete value.
    ///
    /// References that `values` cannot supply are left in place; the
    /// evaluator reports them as unbound instead of failing here.
    #[must_use]
    pub fn bind(&self, values: &dyn ReferenceValues) -> Self {
        let bind = |expected: &Expected| -> Expected {
            let bound = match expected {
                Expected::Fixture { fixture } => values.fixture(fixture),
                Expected::Capture { capture } => values.capture(capture),
                Expected::Literal(_) => None,
            };
            bound.map_or_else(|| expected.clone(), |v| Expected::Literal(v.clone()))
        };

        match self {
            Self::OneOf { values: v } => Self::OneOf { values: bind(v) },
            Self::HasExactKeys { keys } => Self::HasExactKeys { keys: bind(keys) },
            Self::HasKeys { keys } => Self::HasKeys { keys: bind(keys) },
            Self::Equals { value } => Self::Equals { value: bind(value) },
            Self::SetEquals { expected } => Self::SetEquals {
                expected: bind(expected),
            },
            Self::Compare { op, value } => Self::Compare {
                op: *op,
                value: bind(value),
            },
            Self::Contains { value, ignore_case } => Self::Contains {
                value: bind(value),
                ignore_case: *ignore_case,
            },
            Self::ForEach { contract } => Self::ForEach {
                contract: contract.bind(values),
            },
            Self::Length { matcher } => Self::Length {
                matcher: Box::new(matcher.bind(values)),
            },
            Self::AllOf { matchers } => Self::AllOf {
                matchers: matchers.iter().map(|m| m.bind(values)).collect(),
            },
            Self::IsType { .. }
            | Self::MatchesRegex { .. }
            | Self::InRange { .. }
            | Self::IsSortedBy { .. }
            | Self::NotEmpty => self.clone(),
        }
    }
}

fn key_array<I, S>(keys: I) -> Expected
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Expected::Literal(Value::Array(
        keys.into_iter().map(|k| Value::String(k.into())).collect(),
    ))
}

fn validate_array(name: &str, expected: &Expected) -> DomainResult<()> {
    match expected.as_literal() {
        Some(Value::Array(_)) | None => Ok(()),
        Some(other) => Err(DomainError::InvalidMatcher(format!(
            "{name} expects an array, got {other}"
        ))),
    }
}

fn validate_keys(name: &str, expected: &Expected) -> DomainResult<()> {
    validate_array(name, expected)?;
    if let Some(Value::Array(keys)) = expected.as_literal() {
        if let Some(bad) = keys.iter().find(|k| !k.is_string()) {
            return Err(DomainError::InvalidMatcher(format!(
                "{name} expects string keys, got {bad}"
            )));
        }
    }
    Ok(())
}
