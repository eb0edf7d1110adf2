//! Structural JSON equality with numeric normalisation.

use serde_json::Value;

/// Compares two JSON values structurally.
///
/// Numbers compare by value, so `1` equals `1.0`. Objects compare by key set
/// regardless of key order.
#[must_use]
pub fn json_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x == y,
            _ => match (x.as_u64(), y.as_u64()) {
                (Some(x), Some(y)) => x == y,
                _ => x.as_f64() == y.as_f64(),
            },
        },
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| json_eq(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(key, x)| ys.get(key).is_some_and(|y| json_eq(x, y)))
        }
        _ => a == b,
    }
}

/// Whether `haystack` holds an element equal to `needle`.
#[must_use]
pub fn contains_value(haystack: &[Value], needle: &Value) -> bool {
    haystack.iter().any(|item| json_eq(item, needle))
}

/// Renders a value for failure details, prefixed with its type.
#[must_use]
pub fn describe(value: &Value) -> String {
    let kind = conform_domain::JsonType::of(value);
    match value {
        Value::Null => "null".to_string(),
        _ => format!("{kind} {value}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_numbers_compare_by_value() {
        assert!(json_eq(&json!(1), &json!(1.0)));
        assert!(json_eq(&json!(42), &json!(42)));
        assert!(!json_eq(&json!(1), &json!("1")));
        assert!(!json_eq(&json!(1), &json!(1.5)));
    }

    #[test]
    fn test_nested_structures() {
        assert!(json_eq(
            &json!({"a": [1, 2.0], "b": {"c": null}}),
            &json!({"b": {"c": null}, "a": [1.0, 2]})
        ));
        assert!(!json_eq(&json!({"a": 1}), &json!({"a": 1, "b": 2})));
        assert!(!json_eq(&json!([1, 2]), &json!([2, 1])));
    }

    #[test]
    fn test_describe() {
        assert_eq!(describe(&json!(5)), "number 5");
        assert_eq!(describe(&json!("x")), "string \"x\"");
        assert_eq!(describe(&Value::Null), "null");
    }
}
