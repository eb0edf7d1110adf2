//! Contracts: ordered rules binding matchers to response paths.

use serde::{Deserialize, Serialize};

use crate::error::DomainResult;
use crate::matcher::{Matcher, ReferenceValues, References};
use crate::path::JsonPath;

/// One `(path, matcher, description)` triple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    /// Where in the response the matcher applies.
    pub path: JsonPath,
    /// The assertion.
    pub matcher: Matcher,
    /// Human-readable description; derived from path and matcher when empty.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

impl Rule {
    /// Builds a rule, parsing the path and validating the matcher.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is malformed or the matcher is invalid.
    pub fn new(path: &str, matcher: Matcher, description: impl Into<String>) -> DomainResult<Self> {
        let rule = Self {
            path: JsonPath::parse(path)?,
            matcher,
            description: description.into(),
        };
        rule.matcher.validate()?;
        Ok(rule)
    }

    /// Description shown in reports.
    #[must_use]
    pub fn label(&self) -> String {
        if self.description.is_empty() {
            format!("{} {}", self.path, self.matcher.description())
        } else {
            self.description.clone()
        }
    }
}

/// An ordered set of rules.
///
/// Deserialization validates every rule, so a malformed contract is
/// rejected when the suite is loaded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Rule>", into = "Vec<Rule>")]
pub struct Contract {
    rules: Vec<Rule>,
}

impl Contract {
    /// Creates an empty contract.
    #[must_use]
    pub const fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Creates a contract from rules, validating each.
    ///
    /// # Errors
    ///
    /// Returns the first validation error.
    pub fn from_rules(rules: Vec<Rule>) -> DomainResult<Self> {
        let contract = Self { rules };
        contract.validate()?;
        Ok(contract)
    }

    /// Adds a rule (builder pattern).
    ///
    /// # Errors
    ///
    /// Returns an error if the path is malformed or the matcher is invalid.
    pub fn rule(mut self, path: &str, matcher: Matcher) -> DomainResult<Self> {
        self.rules.push(Rule::new(path, matcher, "")?);
        Ok(self)
    }

    /// Adds a described rule (builder pattern).
    ///
    /// # Errors
    ///
    /// Returns an error if the path is malformed or the matcher is invalid.
    pub fn described(
        mut self,
        path: &str,
        matcher: Matcher,
        description: impl Into<String>,
    ) -> DomainResult<Self> {
        self.rules.push(Rule::new(path, matcher, description)?);
        Ok(self)
    }

    /// The rules, in declaration order.
    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true if there are no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Validates every matcher, recursively.
    ///
    /// # Errors
    ///
    /// Returns the first validation error.
    pub fn validate(&self) -> DomainResult<()> {
        self.rules.iter().try_for_each(|r| r.matcher.validate())
    }

    /// Collects fixture and capture references from every rule.
    pub fn collect_references(&self, out: &mut References) {
        for rule in &self.rules {
            rule.matcher.collect_references(out);
        }
    }

    /// Returns the references used by this contract.
    #[must_use]
    pub fn references(&self) -> References {
        let mut refs = References::default();
        self.collect_references(&mut refs);
        refs
    }

    /// Returns a copy with every reference bound to a concrete value.
    #[must_use]
    pub fn bind(&self, values: &dyn ReferenceValues) -> Self {
        Self {
            rules: self
                .rules
                .iter()
                .map(|rule| Rule {
                    path: rule.path.clone(),
                    matcher: rule.matcher.bind(values),
                    description: rule.description.clone(),
                })
                .collect(),
        }
    }
}

impl TryFrom<Vec<Rule>> for Contract {
    type Error = crate::error::DomainError;

    fn try_from(rules: Vec<Rule>) -> DomainResult<Self> {
        Self::from_rules(rules)
    }
}

impl From<Contract> for Vec<Rule> {
    fn from(contract: Contract) -> Self {
        contract.rules
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::matcher::{Expected, JsonType};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_builder() {
        let contract = Contract::new()
            .rule("$.id", Matcher::is_type(JsonType::Number))
            .unwrap()
            .described("$.title", Matcher::equals("Y"), "title was updated")
            .unwrap();

        assert_eq!(contract.len(), 2);
        assert_eq!(contract.rules()[0].label(), "$.id is of type number");
        assert_eq!(contract.rules()[1].label(), "title was updated");
    }

    #[test]
    fn test_rule_rejects_bad_path() {
        assert!(Rule::new("$.a[", Matcher::NotEmpty, "").is_err());
    }

    #[test]
    fn test_deserialize_validates_nested_contracts() {
        let bad = json!([{
            "path": "$.reviews",
            "matcher": {"type": "for_each", "contract": [
                {"path": "$.rating", "matcher": {"type": "in_range", "min": 5, "max": 1}}
            ]}
        }]);
        assert!(serde_json::from_value::<Contract>(bad).is_err());

        let good = json!([{
            "path": "$.reviews",
            "matcher": {"type": "for_each", "contract": [
                {"path": "$.rating", "matcher": {"type": "in_range", "min": 1, "max": 5}}
            ]}
        }]);
        let contract: Contract = serde_json::from_value(good).unwrap();
        assert_eq!(contract.len(), 1);
    }

    #[test]
    fn test_references() {
        let contract = Contract::new()
            .rule("$", Matcher::set_equals(Expected::fixture("categories")))
            .unwrap()
            .rule("$.id", Matcher::equals_capture("product_id"))
            .unwrap();
        let refs = contract.references();
        assert!(refs.fixtures.contains("categories"));
        assert!(refs.captures.contains("product_id"));
    }
}
