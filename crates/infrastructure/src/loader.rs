//! Suite file loader.
//!
//! Suites are YAML or JSON documents; the format follows the file extension.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use conform_domain::Suite;
use thiserror::Error;
use tokio::fs;
use tracing::debug;

/// Errors that can occur while loading a suite file.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The suite file does not exist.
    #[error("suite file not found: {0}")]
    NotFound(PathBuf),

    /// The extension names no supported format.
    #[error("unsupported suite format: {0} (expected .yaml, .yml or .json)")]
    UnsupportedFormat(PathBuf),

    /// The file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// File being read.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The document is not a valid suite.
    #[error("failed to parse {path}: {message}")]
    Parse {
        /// File being parsed.
        path: PathBuf,
        /// Parser message, with location where available.
        message: String,
    },
}

/// Supported suite document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuiteFormat {
    /// YAML (`.yaml`, `.yml`).
    Yaml,
    /// JSON (`.json`).
    Json,
}

impl SuiteFormat {
    /// Detects the format from a file extension, ignoring case.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "yaml" | "yml" => Some(Self::Yaml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Parses a suite document.
///
/// # Errors
///
/// Returns `LoadError::Parse` if the text is not a valid suite.
pub fn parse_suite(text: &str, format: SuiteFormat, path: &Path) -> Result<Suite, LoadError> {
    let parsed = match format {
        SuiteFormat::Yaml => serde_yaml::from_str(text).map_err(|e| e.to_string()),
        SuiteFormat::Json => serde_json::from_str(text).map_err(|e| e.to_string()),
    };
    parsed.map_err(|message| LoadError::Parse {
        path: path.to_path_buf(),
        message,
    })
}

/// Loads a suite file.
///
/// A relative `fixtures_dir` is resolved against the directory holding the
/// suite file.
///
/// # Errors
///
/// Returns a `LoadError` if the file is missing, unreadable, of an unknown
/// format or not a valid suite.
pub async fn load_suite(path: &Path) -> Result<Suite, LoadError> {
    let format =
        SuiteFormat::from_path(path).ok_or_else(|| LoadError::UnsupportedFormat(path.to_path_buf()))?;

    let text = fs::read_to_string(path).await.map_err(|e| {
        if e.kind() == ErrorKind::NotFound {
            LoadError::NotFound(path.to_path_buf())
        } else {
            LoadError::Io {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })?;

    let mut suite = parse_suite(&text, format, path)?;
    let base = suite_dir(path);
    if let Some(dir) = suite.fixtures_dir.take() {
        suite.fixtures_dir = Some(if dir.is_relative() { base.join(dir) } else { dir });
    }

    debug!(
        path = %path.display(),
        suite = %suite.name,
        scenarios = suite.scenarios.len(),
        "Suite loaded"
    );
    Ok(suite)
}

/// Directory holding a suite file; `.` for a bare file name.
#[must_use]
pub fn suite_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
