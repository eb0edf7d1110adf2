//! HTTP response type returned by the HTTP client port

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::request::Headers;

/// An HTTP response as seen by the validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers
    #[serde(default)]
    pub headers: Headers,
    /// Response body as text
    #[serde(default)]
    pub body: String,
    /// Time from send to full body
    #[serde(default, with = "duration_millis")]
    pub duration: Duration,
}

impl HttpResponse {
    /// Creates a response.
    #[must_use]
    pub fn new(status: u16, headers: Headers, body: impl Into<String>, duration: Duration) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
            duration,
        }
    }

    /// Creates a response carrying a JSON body.
    #[must_use]
    pub fn json(status: u16, body: &Value) -> Self {
        let mut headers = Headers::new();
        headers.set("Content-Type", "application/json");
        Self::new(status, headers, body.to_string(), Duration::ZERO)
    }

    /// Returns a header value, ignoring case.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// The body as a JSON value.
    ///
    /// An empty body is `null`; a body that is not JSON is returned as a
    /// JSON string so text rules still apply.
    #[must_use]
    pub fn body_value(&self) -> Value {
        if self.body.trim().is_empty() {
            return Value::Null;
        }
        serde_json::from_str(&self.body).unwrap_or_else(|_| Value::String(self.body.clone()))
    }
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    #[allow(clippy::cast_possible_truncation)]
    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
