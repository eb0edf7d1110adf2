//! Run settings
//!
//! Settings come from the suite file and may be overridden by the
//! environment or the command line.

use std::time::Duration;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Default request timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Default number of scenarios run concurrently.
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Settings governing one suite run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSettings {
    /// Base URL that relative step URLs are resolved against.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Per-request timeout unless a step overrides it.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Maximum number of scenarios in flight.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Headers added to every request; step headers win on conflict.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub headers: IndexMap<String, String>,

    /// User-Agent sent with every request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

const fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

const fn default_concurrency() -> usize {
    DEFAULT_CONCURRENCY
}

impl RunSettings {
    /// Request timeout as a `Duration`.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Concurrency clamped to at least one worker.
    #[must_use]
    pub fn workers(&self) -> usize {
        self.concurrency.max(1)
    }
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_ms: default_timeout_ms(),
            concurrency: default_concurrency(),
            headers: IndexMap::new(),
            user_agent: None,
        }
    }
}
