//! Suite definitions: suites, scenarios and steps.
//!
//! Definitions are validated before anything is sent. Validation walks the
//! steps in order and tracks which names are declared at each point, so a
//! placeholder or `$capture` reference to a name no earlier step captures is
//! rejected up front.

use std::collections::BTreeSet;
use std::path::PathBuf;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::contract::Contract;
use crate::error::{DomainError, DomainResult};
use crate::matcher::References;
use crate::path::JsonPath;
use crate::request::HttpMethod;
use crate::settings::RunSettings;
use crate::status::StatusExpectation;
use crate::template::{
    Placeholder, is_builtin, is_valid_variable_name, parse_placeholders, placeholders_in_value,
};

/// One request/validation step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    /// Step name, used in reports.
    pub name: String,
    /// HTTP method.
    #[serde(default)]
    pub method: HttpMethod,
    /// URL template; may contain `{{name}}` placeholders.
    pub url: String,
    /// Header templates; values may contain placeholders.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub headers: IndexMap<String, String>,
    /// JSON body template; strings may contain placeholders.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    /// Expected status; 2xx when omitted.
    #[serde(default)]
    pub expected_status: StatusExpectation,
    /// Rules applied to the response.
    #[serde(default)]
    pub contract: Contract,
    /// Values extracted from the response for later steps.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub captures: IndexMap<String, JsonPath>,
    /// Timeout override for this step.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

impl Step {
    /// Creates a step with an empty contract.
    #[must_use]
    pub fn new(name: impl Into<String>, method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            method,
            url: url.into(),
            headers: IndexMap::new(),
            body: None,
            expected_status: StatusExpectation::default(),
            contract: Contract::new(),
            captures: IndexMap::new(),
            timeout_ms: None,
        }
    }

    /// Sets the body template (builder pattern).
    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Adds a header template (builder pattern).
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Sets the expected status (builder pattern).
    #[must_use]
    pub fn expect_status(mut self, expected: impl Into<StatusExpectation>) -> Self {
        self.expected_status = expected.into();
        self
    }

    /// Sets the contract (builder pattern).
    #[must_use]
    pub fn with_contract(mut self, contract: Contract) -> Self {
        self.contract = contract;
        self
    }

    /// Declares a capture (builder pattern).
    ///
    /// # Errors
    ///
    /// Returns an error if `path` is malformed.
    pub fn capture(mut self, name: impl Into<String>, path: &str) -> DomainResult<Self> {
        self.captures.insert(name.into(), JsonPath::parse(path)?);
        Ok(self)
    }

    /// Every placeholder in the URL, header values and body.
    #[must_use]
    pub fn placeholders(&self) -> Vec<Placeholder> {
        let mut found = parse_placeholders(&self.url);
        for value in self.headers.values() {
            found.extend(parse_placeholders(value));
        }
        if let Some(body) = &self.body {
            found.extend(placeholders_in_value(body));
        }
        found
    }
}

/// An ordered sequence of dependent steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario name.
    pub name: String,
    /// Values seeded into the capture table before the first step.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub variables: IndexMap<String, Value>,
    /// Steps, run strictly in order.
    pub steps: Vec<Step>,
}

impl Scenario {
    /// Creates an empty scenario.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            variables: IndexMap::new(),
            steps: Vec::new(),
        }
    }

    /// Adds a step (builder pattern).
    #[must_use]
    pub fn with_step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    /// Adds a variable (builder pattern).
    #[must_use]
    pub fn with_variable(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.variables.insert(name.into(), value.into());
        self
    }

    /// Fixture names referenced anywhere in the scenario.
    #[must_use]
    pub fn fixture_names(&self) -> BTreeSet<String> {
        let mut refs = References::default();
        for step in &self.steps {
            step.contract.collect_references(&mut refs);
        }
        refs.fixtures
    }

    /// Validates the scenario definition.
    ///
    /// Only the scenario's own variables count as declared; suite variables
    /// are folded in by [`Suite::resolved_scenarios`] first.
    ///
    /// # Errors
    ///
    /// Returns the first definition error found.
    pub fn validate(&self) -> DomainResult<()> {
        if self.steps.is_empty() {
            return Err(DomainError::EmptyScenario(self.name.clone()));
        }

        let mut declared: BTreeSet<String> = BTreeSet::new();
        for name in self.variables.keys() {
            if !is_valid_variable_name(name) {
                return Err(DomainError::InvalidVariableName(name.clone()));
            }
            declared.insert(name.clone());
        }

        for step in &self.steps {
            step.expected_status.validate()?;
            for placeholder in step.placeholders() {
                let known = if placeholder.is_builtin {
                    is_builtin(&placeholder.name)
                } else {
                    declared.contains(&placeholder.name)
                };
                if !known {
                    return Err(DomainError::UndeclaredPlaceholder {
                        step: step.name.clone(),
                        name: placeholder.name,
                    });
                }
            }

            step.contract.validate()?;
            if let Some(name) = step
                .contract
                .references()
                .captures
                .into_iter()
                .find(|name| !declared.contains(name))
            {
                return Err(DomainError::UndeclaredCapture {
                    step: step.name.clone(),
                    name,
                });
            }

            for (name, path) in &step.captures {
                if !is_valid_variable_name(name) {
                    return Err(DomainError::InvalidVariableName(name.clone()));
                }
                if path.has_wildcard() {
                    return Err(DomainError::WildcardCapture {
                        step: step.name.clone(),
                        name: name.clone(),
                        path: path.to_string(),
                    });
                }
                if !declared.insert(name.clone()) {
                    return Err(DomainError::DuplicateCapture {
                        step: step.name.clone(),
                        name: name.clone(),
                    });
                }
            }
        }

        Ok(())
    }
}

/// A named group of independent scenarios plus run settings.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Suite {
    /// Suite name.
    pub name: String,
    /// Run settings.
    #[serde(default)]
    pub settings: RunSettings,
    /// Directory holding fixtures, relative to the suite file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixtures_dir: Option<PathBuf>,
    /// Variables visible to every scenario.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub variables: IndexMap<String, Value>,
    /// Scenarios.
    #[serde(default)]
    pub scenarios: Vec<Scenario>,
}

impl Suite {
    /// Creates an empty suite with default settings.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Adds a scenario (builder pattern).
    #[must_use]
    pub fn with_scenario(mut self, scenario: Scenario) -> Self {
        self.scenarios.push(scenario);
        self
    }

    /// Returns the scenarios with suite variables folded into each one.
    ///
    /// Scenario variables win over suite variables of the same name.
    #[must_use]
    pub fn resolved_scenarios(&self) -> Vec<Scenario> {
        self.scenarios
            .iter()
            .map(|scenario| {
                let mut variables = self.variables.clone();
                for (name, value) in &scenario.variables {
                    variables.insert(name.clone(), value.clone());
                }
                Scenario {
                    variables,
                    ..scenario.clone()
                }
            })
            .collect()
    }

    /// Validates every scenario, returning each failure with its scenario name.
    #[must_use]
    pub fn validation_errors(&self) -> Vec<(String, DomainError)> {
        self.resolved_scenarios()
            .iter()
            .filter_map(|s| s.validate().err().map(|e| (s.name.clone(), e)))
            .collect()
    }
}
