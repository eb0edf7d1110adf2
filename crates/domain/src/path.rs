//! Path expressions into a response.
//!
//! Paths are parsed once, when a contract is built or deserialized, so a
//! malformed path is a configuration error and never a validation-time fault.
//!
//! Supported syntax:
//! - `$` - the response body (or the current element inside `for_each`)
//! - `$.products[0].id`, `$['odd.key']` - keys and numeric indices
//! - `$.products[*].title` - wildcard, one selection per array element
//! - `@status` - the response status code
//! - `@headers.content-type` - a response header (case-insensitive)
//!
//! A path that does not start with `$` or `@` is read as relative to `$`,
//! so `title` and `$.title` are equivalent.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{DomainError, DomainResult};

/// What a path is rooted at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathRoot {
    /// The JSON body.
    Body,
    /// The HTTP status code.
    Status,
    /// A response header, stored lowercase.
    Header(String),
}

/// One step of a body path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Object key.
    Key(String),
    /// Array index.
    Index(usize),
    /// Every element of an array.
    Wildcard,
}

/// A parsed path expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct JsonPath {
    raw: String,
    root: PathRoot,
    segments: Vec<Segment>,
}

/// One location a path selected.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection<'a> {
    /// Concrete location, with wildcards expanded to indices.
    pub location: String,
    /// The value found there, or `None` when the path does not resolve.
    pub value: Option<&'a Value>,
}

impl JsonPath {
    /// Parses a path expression.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidPath`] if the expression is malformed.
    pub fn parse(input: &str) -> DomainResult<Self> {
        let raw = input.trim();
        let invalid = |reason: &str| DomainError::InvalidPath {
            path: input.to_string(),
            reason: reason.to_string(),
        };

        if raw.is_empty() {
            return Err(invalid("path is empty"));
        }

        if let Some(reserved) = raw.strip_prefix('@') {
            let root = if reserved == "status" {
                PathRoot::Status
            } else if let Some(name) = reserved.strip_prefix("headers.") {
                if name.is_empty() {
                    return Err(invalid("header name is empty"));
                }
                PathRoot::Header(name.to_ascii_lowercase())
            } else {
                return Err(invalid("expected '@status' or '@headers.<name>'"));
            };
            return Ok(Self {
                raw: raw.to_string(),
                root,
                segments: Vec::new(),
            });
        }

        let body = match raw.strip_prefix('$') {
            Some(rest) => rest.to_string(),
            None => format!(".{raw}"),
        };
        let segments = parse_segments(&body).map_err(|reason| invalid(&reason))?;

        Ok(Self {
            raw: raw.to_string(),
            root: PathRoot::Body,
            segments,
        })
    }

    /// The body root path `$`.
    #[must_use]
    pub fn root() -> Self {
        Self {
            raw: "$".to_string(),
            root: PathRoot::Body,
            segments: Vec::new(),
        }
    }

    /// The expression as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// What the path is rooted at.
    #[must_use]
    pub const fn path_root(&self) -> &PathRoot {
        &self.root
    }

    /// Body segments following the root.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Returns true if the path can select more than one location.
    #[must_use]
    pub fn has_wildcard(&self) -> bool {
        self.segments.iter().any(|s| matches!(s, Segment::Wildcard))
    }

    /// Selects every location the path addresses under `root`.
    ///
    /// A path without wildcards always yields exactly one selection. A
    /// wildcard over an empty array yields none.
    #[must_use]
    pub fn select<'a>(&self, root: &'a Value) -> Vec<Selection<'a>> {
        let mut out = Vec::new();
        let start = match &self.root {
            PathRoot::Body => "$".to_string(),
            PathRoot::Status | PathRoot::Header(_) => self.raw.clone(),
        };
        walk(root, &self.segments, start, &mut out);
        out
    }

    /// Selects the single location of a wildcard-free path.
    #[must_use]
    pub fn select_one<'a>(&self, root: &'a Value) -> Option<&'a Value> {
        let mut current = root;
        for segment in &self.segments {
            current = match segment {
                Segment::Key(key) => current.get(key)?,
                Segment::Index(index) => current.get(*index)?,
                Segment::Wildcard => return None,
            };
        }
        Some(current)
    }
}

fn walk<'a>(value: &'a Value, segments: &[Segment], location: String, out: &mut Vec<Selection<'a>>) {
    let Some((segment, rest)) = segments.split_first() else {
        out.push(Selection {
            location,
            value: Some(value),
        });
        return;
    };

    match segment {
        Segment::Key(key) => match value.get(key) {
            Some(child) => walk(child, rest, format!("{location}{}", render(segment)), out),
            None => out.push(missing(location, segments)),
        },
        Segment::Index(index) => match value.get(*index) {
            Some(child) => walk(child, rest, format!("{location}[{index}]"), out),
            None => out.push(missing(location, segments)),
        },
        Segment::Wildcard => match value {
            Value::Array(items) => {
                for (index, child) in items.iter().enumerate() {
                    walk(child, rest, format!("{location}[{index}]"), out);
                }
            }
            _ => out.push(missing(location, segments)),
        },
    }
}

fn missing<'a>(location: String, remaining: &[Segment]) -> Selection<'a> {
    let mut location = location;
    for segment in remaining {
        location.push_str(&render(segment));
    }
    Selection {
        location,
        value: None,
    }
}

fn render(segment: &Segment) -> String {
    match segment {
        Segment::Key(key) if key.contains(['.', '[', ']']) => format!("['{key}']"),
        Segment::Key(key) => format!(".{key}"),
        Segment::Index(index) => format!("[{index}]"),
        Segment::Wildcard => "[*]".to_string(),
    }
}

fn parse_segments(input: &str) -> Result<Vec<Segment>, String> {
    let mut segments = Vec::new();
    let mut rest = input;

    while !rest.is_empty() {
        if let Some(after_dot) = rest.strip_prefix('.') {
            let end = after_dot.find(['.', '[']).unwrap_or(after_dot.len());
            let key = &after_dot[..end];
            if key.is_empty() {
                return Err("empty key segment".to_string());
            }
            segments.push(Segment::Key(key.to_string()));
            rest = &after_dot[end..];
        } else if let Some(after_bracket) = rest.strip_prefix('[') {
            let close = after_bracket
                .find(']')
                .ok_or_else(|| "unclosed '['".to_string())?;
            let inner = after_bracket[..close].trim();
            segments.push(parse_bracket(inner)?);
            rest = &after_bracket[close + 1..];
        } else {
            return Err(format!("unexpected '{rest}'"));
        }
    }

    Ok(segments)
}

fn parse_bracket(inner: &str) -> Result<Segment, String> {
    if inner == "*" {
        return Ok(Segment::Wildcard);
    }
    for quote in ['\'', '"'] {
        if let Some(key) = inner
            .strip_prefix(quote)
            .and_then(|s| s.strip_suffix(quote))
        {
            if key.is_empty() {
                return Err("empty quoted key".to_string());
            }
            return Ok(Segment::Key(key.to_string()));
        }
    }
    inner
        .parse::<usize>()
        .map(Segment::Index)
        .map_err(|_| format!("invalid array index '{inner}'"))
}

impl fmt::Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl TryFrom<String> for JsonPath {
    type Error = DomainError;

    fn try_from(value: String) -> DomainResult<Self> {
        Self::parse(&value)
    }
}

impl TryFrom<&str> for JsonPath {
    type Error = DomainError;

    fn try_from(value: &str) -> DomainResult<Self> {
        Self::parse(value)
    }
}

impl From<JsonPath> for String {
    fn from(path: JsonPath) -> Self {
        path.raw
    }
}
