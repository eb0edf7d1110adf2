//! JSON report rendering.

use conform_domain::SuiteReport;

use crate::serialization::{SerializationError, to_json_stable};

/// Renders the full report as pretty JSON with a trailing newline.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn render_json(report: &SuiteReport) -> Result<String, SerializationError> {
    to_json_stable(report)
}
