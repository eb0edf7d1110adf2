//! Template rendering engine
//!
//! Renders step templates into concrete requests. Strings get placeholders
//! interpolated; in a body, a string that is exactly one placeholder is
//! replaced by the typed value, so a captured numeric id stays numeric.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use conform_domain::template::{parse_placeholders, sole_placeholder};
use conform_domain::{HttpRequest, Step};
use serde_json::Value;

use super::builtins::BuiltinValues;
use crate::capture::CaptureTable;
use crate::error::{ApplicationError, ApplicationResult};

/// Renders templates against one capture table.
pub struct TemplateEngine<'a> {
    captures: &'a CaptureTable,
    /// Built-ins generated so far, so one step sees one value per built-in.
    builtin_cache: HashMap<String, Value>,
}

impl<'a> TemplateEngine<'a> {
    /// Creates an engine reading from `captures`.
    #[must_use]
    pub fn new(captures: &'a CaptureTable) -> Self {
        Self {
            captures,
            builtin_cache: HashMap::new(),
        }
    }

    /// Builds the request for a step.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::UnresolvedPlaceholders` naming every
    /// placeholder without a value.
    pub fn render_request(&mut self, step: &Step, default_timeout: Duration) -> ApplicationResult<HttpRequest> {
        let mut unresolved = Vec::new();

        let url = self.interpolate(&step.url, &mut unresolved);
        let mut request = HttpRequest::new(step.method, url);
        for (name, value) in &step.headers {
            let value = self.interpolate(value, &mut unresolved);
            request.headers.set(name.clone(), value);
        }
        request.body = step
            .body
            .as_ref()
            .map(|body| self.substitute(body, &mut unresolved));
        request.timeout = Some(step.timeout_ms.map_or(default_timeout, Duration::from_millis));

        if unresolved.is_empty() {
            Ok(request)
        } else {
            let mut seen = HashSet::new();
            unresolved.retain(|name| seen.insert(name.clone()));
            Err(ApplicationError::UnresolvedPlaceholders(unresolved))
        }
    }

    fn substitute(&mut self, value: &Value, unresolved: &mut Vec<String>) -> Value {
        match value {
            Value::String(s) => match sole_placeholder(s) {
                Some(name) => self.lookup(&name).unwrap_or_else(|| {
                    unresolved.push(name);
                    value.clone()
                }),
                None => Value::String(self.interpolate(s, unresolved)),
            },
            Value::Array(items) => Value::Array(
                items
                    .iter()
                    .map(|item| self.substitute(item, unresolved))
                    .collect(),
            ),
            Value::Object(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), self.substitute(v, unresolved)))
                    .collect(),
            ),
            Value::Null | Value::Bool(_) | Value::Number(_) => value.clone(),
        }
    }

    fn interpolate(&mut self, input: &str, unresolved: &mut Vec<String>) -> String {
        let placeholders = parse_placeholders(input);
        if placeholders.is_empty() {
            return input.to_string();
        }

        let mut result = String::with_capacity(input.len());
        let mut last_end = 0;
        for placeholder in &placeholders {
            result.push_str(&input[last_end..placeholder.span.start]);
            match self.lookup(&placeholder.name) {
                Some(Value::String(s)) => result.push_str(&s),
                Some(other) => result.push_str(&other.to_string()),
                None => {
                    result.push_str(&input[placeholder.span.clone()]);
                    unresolved.push(placeholder.name.clone());
                }
            }
            last_end = placeholder.span.end;
        }
        result.push_str(&input[last_end..]);
        result
    }

    fn lookup(&mut self, name: &str) -> Option<Value> {
        if name.starts_with('$') {
            if let Some(cached) = self.builtin_cache.get(name) {
                return Some(cached.clone());
            }
            let generated = BuiltinValues::resolve(name)?;
            self.builtin_cache.insert(name.to_string(), generated.clone());
            return Some(generated);
        }
        self.captures.get(name).cloned()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use conform_domain::HttpMethod;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const TIMEOUT: Duration = Duration::from_secs(5);

    fn render_url(engine: &mut TemplateEngine<'_>, url: &str) -> ApplicationResult<String> {
        let step = Step::new("read", HttpMethod::Get, url);
        engine.render_request(&step, TIMEOUT).map(|request| request.url)
    }

    fn render_body(engine: &mut TemplateEngine<'_>, body: Value) -> Value {
        let step = Step::new("write", HttpMethod::Post, "/products/add").with_body(body);
        engine.render_request(&step, TIMEOUT).unwrap().body.unwrap()
    }

    fn table() -> CaptureTable {
        let mut table = CaptureTable::new();
        table.insert("id", json!(42));
        table.insert("title", json!("Essence Mascara"));
        table.insert("tags", json!(["beauty", "mascara"]));
        table
    }

    #[test]
    fn test_url_interpolation() {
        let captures = table();
        let mut engine = TemplateEngine::new(&captures);
        assert_eq!(render_url(&mut engine, "/products/{{id}}").unwrap(), "/products/42");
        assert_eq!(
            render_url(&mut engine, "/search?q={{ title }}").unwrap(),
            "/search?q=Essence Mascara"
        );
        assert_eq!(
            render_url(&mut engine, "/t/{{tags}}").unwrap(),
            r#"/t/["beauty","mascara"]"#
        );
    }

    #[test]
    fn test_typed_body_substitution() {
        let captures = table();
        let mut engine = TemplateEngine::new(&captures);
        let body = json!({
            "id": "{{id}}",
            "label": "item {{id}}",
            "nested": [{"tags": "{{tags}}"}],
            "price": 123
        });
        assert_eq!(
            render_body(&mut engine, body),
            json!({
                "id": 42,
                "label": "item 42",
                "nested": [{"tags": ["beauty", "mascara"]}],
                "price": 123
            })
        );
    }

    #[test]
    fn test_unresolved_placeholders_are_reported() {
        let captures = CaptureTable::new();
        let mut engine = TemplateEngine::new(&captures);
        let err = render_url(&mut engine, "/products/{{id}}/{{other}}").unwrap_err();
        assert!(matches!(
            err,
            ApplicationError::UnresolvedPlaceholders(ref names) if names == &["id", "other"]
        ));
    }

    #[test]
    fn test_unresolved_placeholders_are_listed_once() {
        let captures = CaptureTable::new();
        let mut engine = TemplateEngine::new(&captures);
        let step = Step::new("read", HttpMethod::Get, "/{{a}}/{{b}}/{{a}}")
            .with_header("X-Trace", "{{b}}")
            .with_body(json!({"c": "{{c}}", "a": "{{a}}"}));
        let err = engine.render_request(&step, TIMEOUT).unwrap_err();
        assert!(matches!(
            err,
            ApplicationError::UnresolvedPlaceholders(ref names) if names == &["a", "b", "c"]
        ));
    }

    #[test]
    fn test_builtin_is_stable_within_one_engine() {
        let captures = CaptureTable::new();
        let mut engine = TemplateEngine::new(&captures);
        let body = render_body(
            &mut engine,
            json!({"a": "{{$uuid}}", "b": "{{$uuid}}", "n": "{{$randomInt}}"}),
        );
        assert_eq!(body["a"], body["b"]);
        assert!(body["n"].is_number());
    }

    #[test]
    fn test_render_request() {
        let captures = table();
        let mut engine = TemplateEngine::new(&captures);
        let step = Step::new("update", HttpMethod::Put, "/products/{{id}}")
            .with_header("X-Trace", "trace-{{id}}")
            .with_body(json!({"title": "{{title}}"}));

        let request = engine.render_request(&step, TIMEOUT).unwrap();
        assert_eq!(request.method, HttpMethod::Put);
        assert_eq!(request.url, "/products/42");
        assert_eq!(request.headers.get("x-trace"), Some("trace-42"));
        assert_eq!(request.body, Some(json!({"title": "Essence Mascara"})));
        assert_eq!(request.timeout, Some(TIMEOUT));
    }

    #[test]
    fn test_step_timeout_override() {
        let captures = CaptureTable::new();
        let mut engine = TemplateEngine::new(&captures);
        let mut step = Step::new("slow", HttpMethod::Get, "/slow");
        step.timeout_ms = Some(250);
        let request = engine.render_request(&step, TIMEOUT).unwrap();
        assert_eq!(request.timeout, Some(Duration::from_millis(250)));
    }
}
