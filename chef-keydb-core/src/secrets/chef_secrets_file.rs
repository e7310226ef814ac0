//! File-backed secrets store (`chef-secrets-file` provider).
//!
//! The backing file is a JSON object of namespaces, each an object of
//! string secrets:
//!
//! ```json
//! { "opscode_erchef": { "sql_password": "..." },
//!   "postgresql": { "sql_password": "..." } }
//! ```
//!
//! Non-string values are treated as absent. A missing file behaves like an
//! empty store so the caller can report which credential was unavailable.

use super::SecretsStore;
use serde_json::{Map, Value};
use std::cell::OnceCell;
use std::path::{Path, PathBuf};
use zeroize::Zeroizing;

/// Secrets store reading a `private-chef-secrets.json` style file.
///
/// The file is read at most once, on the first `exists` or `get`.
pub struct ChefSecretsFile {
    path: PathBuf,
    document: OnceCell<Map<String, Value>>,
}

impl std::fmt::Debug for ChefSecretsFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChefSecretsFile")
            .field("path", &self.path)
            .field("loaded", &self.document.get().is_some())
            .finish()
    }
}

impl ChefSecretsFile {
    /// Creates a store over `path` without touching the file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            document: OnceCell::new(),
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn document(&self) -> crate::Result<&Map<String, Value>> {
        if let Some(document) = self.document.get() {
            return Ok(document);
        }

        let document = self.load()?;
        Ok(self.document.get_or_init(|| document))
    }

    fn load(&self) -> crate::Result<Map<String, Value>> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => Zeroizing::new(contents),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(
                    "Secrets file {} not found, treating it as empty",
                    self.path.display()
                );
                return Ok(Map::new());
            }
            Err(e) => {
                return Err(crate::error::KeyDbError::secrets(format!(
                    "failed to read secrets file {}: {}",
                    self.path.display(),
                    e
                )));
            }
        };

        let value: Value = serde_json::from_str(&contents).map_err(|e| {
            crate::error::KeyDbError::secrets(format!(
                "secrets file {} is not valid JSON: {}",
                self.path.display(),
                e
            ))
        })?;

        match value {
            Value::Object(document) => {
                tracing::debug!("Loaded secrets file {}", self.path.display());
                Ok(document)
            }
            _ => Err(crate::error::KeyDbError::secrets(format!(
                "secrets file {} must contain a JSON object",
                self.path.display()
            ))),
        }
    }

    fn lookup<'a>(document: &'a Map<String, Value>, namespace: &str, key: &str) -> Option<&'a str> {
        document
            .get(namespace)
            .and_then(|section| section.get(key))
            .and_then(Value::as_str)
    }
}

impl SecretsStore for ChefSecretsFile {
    fn name(&self) -> &str {
        super::CHEF_SECRETS_FILE_PROVIDER
    }

    fn exists(&self, namespace: &str, key: &str) -> crate::Result<bool> {
        let document = self.document()?;
        Ok(Self::lookup(document, namespace, key).is_some())
    }

    fn get(&self, namespace: &str, key: &str) -> crate::Result<Zeroizing<String>> {
        let document = self.document()?;
        Self::lookup(document, namespace, key)
            .map(|value| Zeroizing::new(value.to_string()))
            .ok_or_else(|| {
                crate::error::KeyDbError::secrets(format!(
                    "no secret stored for {}/{}",
                    namespace, key
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn secrets_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_lookup_by_namespace_and_key() {
        let file = secrets_file(
            r#"{"opscode_erchef": {"sql_password": "secretA"}, "postgresql": {"sql_password": "secretB"}}"#,
        );
        let store = ChefSecretsFile::new(file.path());

        assert!(store.exists("opscode_erchef", "sql_password").unwrap());
        assert_eq!(
            store.get("opscode_erchef", "sql_password").unwrap().as_str(),
            "secretA"
        );
        assert_eq!(
            store.get("postgresql", "sql_password").unwrap().as_str(),
            "secretB"
        );
    }

    #[test]
    fn test_missing_secret() {
        let file = secrets_file(r#"{"postgresql": {"db_superuser_password": "x"}}"#);
        let store = ChefSecretsFile::new(file.path());

        assert!(!store.exists("postgresql", "sql_password").unwrap());
        assert!(!store.exists("opscode_erchef", "sql_password").unwrap());
        assert!(store.get("postgresql", "sql_password").is_err());
    }

    #[test]
    fn test_non_string_value_is_absent() {
        let file = secrets_file(r#"{"veil": {"credentials": {"a": 1}}, "postgresql": {"sql_password": 42}}"#);
        let store = ChefSecretsFile::new(file.path());

        assert!(!store.exists("postgresql", "sql_password").unwrap());
    }

    #[test]
    fn test_missing_file_is_empty() {
        let store = ChefSecretsFile::new("/nonexistent/private-chef-secrets.json");
        assert!(!store.exists("opscode_erchef", "sql_password").unwrap());
    }

    #[test]
    fn test_malformed_file_is_error() {
        let file = secrets_file("not json at all");
        let store = ChefSecretsFile::new(file.path());

        let error = store.exists("opscode_erchef", "sql_password").unwrap_err();
        assert!(error.to_string().contains("not valid JSON"));
    }

    #[test]
    fn test_file_read_once() {
        let file = secrets_file(r#"{"postgresql": {"sql_password": "first"}}"#);
        let store = ChefSecretsFile::new(file.path());
        assert!(store.exists("postgresql", "sql_password").unwrap());

        // Rewriting the file after the first lookup has no effect.
        std::fs::write(file.path(), r#"{"postgresql": {"sql_password": "second"}}"#).unwrap();

        assert_eq!(
            store.get("postgresql", "sql_password").unwrap().as_str(),
            "first"
        );
    }

    #[test]
    fn test_debug_does_not_dump_secrets() {
        let file = secrets_file(r#"{"postgresql": {"sql_password": "hidden"}}"#);
        let store = ChefSecretsFile::new(file.path());
        store.exists("postgresql", "sql_password").unwrap();

        let debug = format!("{:?}", store);
        assert!(debug.contains("loaded: true"));
        assert!(!debug.contains("hidden"));
    }
}
