//! Scenario-scoped capture table.

use std::collections::HashMap;

use conform_domain::ReferenceValues;
use indexmap::IndexMap;
use serde_json::Value;

/// Values captured from responses, plus the scenario's seed variables.
///
/// Owned by one scenario execution and dropped when it finishes. Each name is
/// written at most once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CaptureTable {
    values: IndexMap<String, Value>,
}

impl CaptureTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a table seeded with scenario variables.
    #[must_use]
    pub fn seeded(variables: &IndexMap<String, Value>) -> Self {
        Self {
            values: variables.clone(),
        }
    }

    /// Writes a value. Returns `false` and leaves the table unchanged if the
    /// name was already written.
    pub fn insert(&mut self, name: impl Into<String>, value: Value) -> bool {
        match self.values.entry(name.into()) {
            indexmap::map::Entry::Occupied(_) => false,
            indexmap::map::Entry::Vacant(slot) => {
                slot.insert(value);
                true
            }
        }
    }

    /// Looks up a value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Resolved fixtures and the current capture table, used to bind contract
/// references before validation.
pub struct Bindings<'a> {
    fixtures: &'a HashMap<String, Value>,
    captures: &'a CaptureTable,
}

impl<'a> Bindings<'a> {
    /// Creates bindings over resolved fixtures and captures.
    #[must_use]
    pub const fn new(fixtures: &'a HashMap<String, Value>, captures: &'a CaptureTable) -> Self {
        Self { fixtures, captures }
    }
}

impl ReferenceValues for Bindings<'_> {
    fn fixture(&self, name: &str) -> Option<&Value> {
        self.fixtures.get(name)
    }

    fn capture(&self, name: &str) -> Option<&Value> {
        self.captures.get(name)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use conform_domain::{Contract, Expected, Matcher};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_write_once() {
        let mut table = CaptureTable::new();
        assert!(table.insert("id", json!(42)));
        assert!(!table.insert("id", json!(43)));
        assert_eq!(table.get("id"), Some(&json!(42)));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_seeded() {
        let mut vars = IndexMap::new();
        vars.insert("category".to_string(), json!("smartphones"));
        let table = CaptureTable::seeded(&vars);
        assert_eq!(table.get("category"), Some(&json!("smartphones")));
    }

    #[test]
    fn test_bindings_resolve_references() {
        let mut fixtures = HashMap::new();
        fixtures.insert("categories".to_string(), json!(["beauty", "fragrances"]));
        let mut captures = CaptureTable::new();
        captures.insert("id", json!(7));

        let contract = Contract::new()
            .rule("$", Matcher::set_equals(Expected::fixture("categories")))
            .unwrap()
            .rule("$.id", Matcher::equals_capture("id"))
            .unwrap();
        let bound = contract.bind(&Bindings::new(&fixtures, &captures));

        assert_eq!(
            bound.rules()[0].matcher,
            Matcher::set_equals(Expected::literal(json!(["beauty", "fragrances"])))
        );
        assert_eq!(bound.rules()[1].matcher, Matcher::equals(7));
    }
}
