//! Directory-backed fixture provider.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use conform_application::ports::{FixtureError, FixtureProvider};
use serde_json::Value;
use tokio::fs;
use tokio::sync::RwLock;
use tracing::debug;

/// File extensions tried, in order, for a fixture name.
pub const FIXTURE_EXTENSIONS: [&str; 3] = ["json", "yaml", "yml"];

/// Resolves fixture `name` to the first of `<dir>/name.json`,
/// `<dir>/name.yaml` and `<dir>/name.yml` that exists.
///
/// Parsed fixtures are cached, so concurrent scenarios referencing the same
/// fixture read the file once.
#[derive(Debug)]
pub struct DirectoryFixtureProvider {
    root: PathBuf,
    cache: RwLock<HashMap<String, Value>>,
}

impl DirectoryFixtureProvider {
    /// Creates a provider reading from `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Directory fixtures are read from.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    async fn load(&self, name: &str) -> Result<Value, FixtureError> {
        if name.is_empty() || name.starts_with('.') || name.contains(['/', '\\']) {
            return Err(FixtureError::NotFound(name.to_string()));
        }

        for extension in FIXTURE_EXTENSIONS {
            let path = self.root.join(format!("{name}.{extension}"));
            let text = match fs::read_to_string(&path).await {
                Ok(text) => text,
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(FixtureError::Io(e)),
            };
            debug!(fixture = name, path = %path.display(), "Loaded fixture file");
            return parse(name, extension, &text);
        }

        Err(FixtureError::NotFound(name.to_string()))
    }
}

fn parse(name: &str, extension: &str, text: &str) -> Result<Value, FixtureError> {
    let malformed = |message: String| FixtureError::Malformed {
        name: name.to_string(),
        message,
    };
    if extension == "json" {
        serde_json::from_str(text).map_err(|e| malformed(e.to_string()))
    } else {
        serde_yaml::from_str(text).map_err(|e| malformed(e.to_string()))
    }
}

#[async_trait]
impl FixtureProvider for DirectoryFixtureProvider {
    async fn resolve(&self, name: &str) -> Result<Value, FixtureError> {
        if let Some(value) = self.cache.read().await.get(name) {
            return Ok(value.clone());
        }
        let value = self.load(name).await?;
        self.cache
            .write()
            .await
            .insert(name.to_string(), value.clone());
        Ok(value)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_json_fixture() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("categories.json"),
            r#"[{"slug": "beauty", "name": "Beauty"}]"#,
        )
        .unwrap();

        let provider = DirectoryFixtureProvider::new(dir.path());
        assert_eq!(
            provider.resolve("categories").await.unwrap(),
            json!([{"slug": "beauty", "name": "Beauty"}])
        );
    }

    #[tokio::test]
    async fn test_yaml_fixture() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("productKeys.yml"), "- id\n- title\n- price\n").unwrap();

        let provider = DirectoryFixtureProvider::new(dir.path());
        assert_eq!(
            provider.resolve("productKeys").await.unwrap(),
            json!(["id", "title", "price"])
        );
    }

    #[tokio::test]
    async fn test_json_wins_over_yaml() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("limit.json"), "10").unwrap();
        std::fs::write(dir.path().join("limit.yaml"), "20").unwrap();

        let provider = DirectoryFixtureProvider::new(dir.path());
        assert_eq!(provider.resolve("limit").await.unwrap(), json!(10));
    }

    #[tokio::test]
    async fn test_missing_fixture() {
        let dir = TempDir::new().unwrap();
        let provider = DirectoryFixtureProvider::new(dir.path());
        let err = provider.resolve("nope").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_names_cannot_escape_the_directory() {
        let dir = TempDir::new().unwrap();
        let provider = DirectoryFixtureProvider::new(dir.path().join("fixtures"));
        std::fs::write(dir.path().join("secret.json"), "{}").unwrap();
        assert!(provider.resolve("../secret").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_malformed_fixture() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("broken.json"), "{not json").unwrap();

        let provider = DirectoryFixtureProvider::new(dir.path());
        let err = provider.resolve("broken").await.unwrap_err();
        assert!(matches!(err, FixtureError::Malformed { ref name, .. } if name == "broken"));
        assert!(!err.is_not_found());
    }

    #[tokio::test]
    async fn test_resolved_fixtures_are_cached() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("total.json");
        std::fs::write(&path, "194").unwrap();

        let provider = DirectoryFixtureProvider::new(dir.path());
        assert_eq!(provider.resolve("total").await.unwrap(), json!(194));
        std::fs::remove_file(&path).unwrap();
        assert_eq!(provider.resolve("total").await.unwrap(), json!(194));
    }
}
