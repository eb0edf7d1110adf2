//! Built-in dynamic placeholders
//!
//! Names start with `$` and produce a fresh value on every step.

use chrono::Utc;
use rand::Rng;
use serde_json::Value;
use uuid::Uuid;

/// Generates values for built-in placeholders.
pub struct BuiltinValues;

impl BuiltinValues {
    /// Resolves a built-in placeholder to a typed value.
    /// Returns None if the name is not a recognized built-in.
    #[must_use]
    pub fn resolve(name: &str) -> Option<Value> {
        match name {
            "$uuid" => Some(Value::String(Uuid::new_v4().to_string())),
            "$timestamp" => Some(Value::from(Utc::now().timestamp())),
            "$isoTimestamp" => Some(Value::String(Utc::now().to_rfc3339())),
            "$randomInt" => Some(Value::from(rand::rng().random_range(0..=1000))),
            _ => None,
        }
    }
}
