//! JSON serialization helpers.
//!
//! Reports are written with 2-space indentation and a trailing newline, so
//! a saved report diffs cleanly against the previous run.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::ser::{PrettyFormatter, Serializer};

/// Error type for serialization operations.
#[derive(Debug, thiserror::Error)]
pub enum SerializationError {
    /// JSON serialization failed.
    #[error("JSON serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    /// JSON deserialization failed.
    #[error("JSON deserialization failed: {0}")]
    Deserialize(serde_json::Error),

    /// The serializer produced invalid UTF-8.
    #[error("UTF-8 encoding error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// Writing the output failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Serializes a value to pretty JSON with a trailing newline.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_json_stable<T: Serialize>(value: &T) -> Result<String, SerializationError> {
    let mut buffer = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(b"  "));
    value.serialize(&mut serializer)?;

    let mut json = String::from_utf8(buffer)?;
    json.push('\n');
    Ok(json)
}

/// Serializes a value and writes it to `path`, creating parent directories.
///
/// # Errors
///
/// Returns an error if serialization or the write fails.
pub async fn write_json_stable<T: Serialize>(
    path: &std::path::Path,
    value: &T,
) -> Result<(), SerializationError> {
    let json = to_json_stable(value)?;
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, json).await?;
    Ok(())
}

/// Deserializes JSON from a string.
///
/// # Errors
///
/// Returns an error if the JSON is invalid or doesn't match the expected type.
pub fn from_json<T: DeserializeOwned>(json: &str) -> Result<T, SerializationError> {
    serde_json::from_str(json).map_err(SerializationError::Deserialize)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_two_space_indent_and_trailing_newline() {
        let json = to_json_stable(&json!({"key": "value"})).unwrap();
        assert_eq!(json, "{\n  \"key\": \"value\"\n}\n");
    }

    #[test]
    fn test_from_json_rejects_invalid_input() {
        assert!(matches!(
            from_json::<serde_json::Value>(r#"{"invalid": }"#),
            Err(SerializationError::Deserialize(_))
        ));
    }

    #[tokio::test]
    async fn test_write_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("reports").join("run.json");

        write_json_stable(&path, &json!({"passed": 3})).await.unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(from_json::<serde_json::Value>(&written).unwrap(), json!({"passed": 3}));
    }
}
