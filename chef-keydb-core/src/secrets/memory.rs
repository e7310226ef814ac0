//! In-memory secrets store

use super::SecretsStore;
use std::collections::HashMap;
use zeroize::Zeroizing;

/// In-memory secrets store for tests and embedding.
///
/// # Example
///
/// ```
/// use chef_keydb_core::secrets::{MemorySecretsStore, SecretsStore};
///
/// let store = MemorySecretsStore::new().with_secret("postgresql", "sql_password", "pw");
/// assert!(store.exists("postgresql", "sql_password")?);
/// assert_eq!(store.get("postgresql", "sql_password")?.as_str(), "pw");
/// # Ok::<(), chef_keydb_core::KeyDbError>(())
/// ```
#[derive(Default)]
pub struct MemorySecretsStore {
    secrets: HashMap<(String, String), Zeroizing<String>>,
}

impl MemorySecretsStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method adding a secret
    pub fn with_secret(
        mut self,
        namespace: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.secrets.insert(
            (namespace.into(), key.into()),
            Zeroizing::new(value.into()),
        );
        self
    }
}

impl SecretsStore for MemorySecretsStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn exists(&self, namespace: &str, key: &str) -> crate::Result<bool> {
        Ok(self
            .secrets
            .contains_key(&(namespace.to_string(), key.to_string())))
    }

    fn get(&self, namespace: &str, key: &str) -> crate::Result<Zeroizing<String>> {
        self.secrets
            .get(&(namespace.to_string(), key.to_string()))
            .cloned()
            .ok_or_else(|| {
                crate::error::KeyDbError::secrets(format!(
                    "no secret stored for {}/{}",
                    namespace, key
                ))
            })
    }
}
