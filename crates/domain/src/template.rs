//! Placeholder parsing for `{{name}}` templates.
//!
//! Step URLs, header values and body strings may reference captures and
//! variables with `{{name}}`. Names starting with `$` are built-in dynamic
//! values.

use std::ops::Range;

use serde_json::Value;

/// Built-in dynamic placeholders.
pub const BUILTIN_PLACEHOLDERS: &[&str] = &["$uuid", "$timestamp", "$isoTimestamp", "$randomInt"];

/// A placeholder found in a template string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    /// The referenced name (without braces).
    pub name: String,

    /// Whether this is a built-in placeholder (starts with `$`).
    pub is_builtin: bool,

    /// Byte range of `{{...}}` in the original string.
    pub span: Range<usize>,
}

impl Placeholder {
    /// Creates a new placeholder.
    #[must_use]
    pub fn new(name: impl Into<String>, span: Range<usize>) -> Self {
        let name = name.into();
        let is_builtin = name.starts_with('$');
        Self {
            name,
            is_builtin,
            span,
        }
    }
}

/// Parses a string and extracts all placeholders, in order of appearance.
///
/// ```
/// use conform_domain::template::parse_placeholders;
///
/// let found = parse_placeholders("/products/{{product_id}}?seed={{$uuid}}");
/// assert_eq!(found.len(), 2);
/// assert_eq!(found[0].name, "product_id");
/// assert!(found[1].is_builtin);
/// ```
#[must_use]
pub fn parse_placeholders(input: &str) -> Vec<Placeholder> {
    let mut found = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some((start, ch)) = chars.next() {
        if ch != '{' || !matches!(chars.peek(), Some((_, '{'))) {
            continue;
        }
        chars.next();

        let mut name = String::new();
        let mut closed = false;
        while let Some((_, ch)) = chars.next() {
            if ch == '}' {
                if let Some(&(end_idx, '}')) = chars.peek() {
                    chars.next();
                    let trimmed = name.trim();
                    if !trimmed.is_empty() {
                        found.push(Placeholder::new(trimmed, start..end_idx + 1));
                    }
                    closed = true;
                    break;
                }
            }
            name.push(ch);
        }

        if !closed {
            break;
        }
    }

    found
}

/// Returns the placeholder name if `input` consists of exactly one placeholder.
#[must_use]
pub fn sole_placeholder(input: &str) -> Option<String> {
    let found = parse_placeholders(input);
    match found.as_slice() {
        [only] if only.span == (0..input.len()) => Some(only.name.clone()),
        _ => None,
    }
}

/// Collects placeholders from every string inside a JSON value.
#[must_use]
pub fn placeholders_in_value(value: &Value) -> Vec<Placeholder> {
    let mut found = Vec::new();
    collect_from_value(value, &mut found);
    found
}

fn collect_from_value(value: &Value, found: &mut Vec<Placeholder>) {
    match value {
        Value::String(s) => found.extend(parse_placeholders(s)),
        Value::Array(items) => items.iter().for_each(|v| collect_from_value(v, found)),
        Value::Object(map) => map.values().for_each(|v| collect_from_value(v, found)),
        Value::Null | Value::Bool(_) | Value::Number(_) => {}
    }
}

/// Returns true if `name` is a known built-in placeholder.
#[must_use]
pub fn is_builtin(name: &str) -> bool {
    BUILTIN_PLACEHOLDERS.contains(&name)
}

/// Validates a variable or capture name.
///
/// Valid names start with a letter or underscore and continue with
/// alphanumerics, underscores or hyphens.
#[must_use]
pub fn is_valid_variable_name(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !first.is_alphabetic() && first != '_' {
        return false;
    }
    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '-')
}
