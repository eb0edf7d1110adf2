//! Report renderers.
//!
//! The text form is for terminals: one line per scenario, then one
//! attributed line per failing rule, capture or step. The JSON form is the
//! full `SuiteReport`.

mod json;
mod text;

use std::fmt;
use std::str::FromStr;

use conform_domain::SuiteReport;

use crate::serialization::SerializationError;

pub use json::render_json;
pub use text::{failure_lines, render_text};

/// Output format for a rendered report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    /// Human-readable summary.
    #[default]
    Text,
    /// Pretty JSON.
    Json,
}

impl ReportFormat {
    /// Renders a report in this format.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render(self, report: &SuiteReport) -> Result<String, SerializationError> {
        match self {
            Self::Text => Ok(render_text(report)),
            Self::Json => render_json(report),
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Text => "text",
            Self::Json => "json",
        })
    }
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown report format '{other}' (expected text or json)")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_parsing() {
        assert_eq!("JSON".parse::<ReportFormat>(), Ok(ReportFormat::Json));
        assert_eq!("text".parse::<ReportFormat>(), Ok(ReportFormat::Text));
        assert!("xml".parse::<ReportFormat>().is_err());
        assert_eq!(ReportFormat::Json.to_string(), "json");
    }
}
