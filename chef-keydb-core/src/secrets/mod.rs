//! Secrets store abstraction.
//!
//! Chef Server keeps service passwords in a secrets file managed by Veil.
//! Lookups are addressed by a `(namespace, key)` pair, e.g.
//! `("opscode_erchef", "sql_password")`.
//!
//! # Module Structure
//! - `chef_secrets_file`: the `chef-secrets-file` provider backed by a JSON file
//! - `memory`: in-memory store for tests and embedding

mod chef_secrets_file;
mod memory;

pub use chef_secrets_file::ChefSecretsFile;
pub use memory::MemorySecretsStore;

use std::path::PathBuf;
use zeroize::Zeroizing;

/// Provider identifier of the file-backed secrets store
pub const CHEF_SECRETS_FILE_PROVIDER: &str = "chef-secrets-file";

/// Read access to a secrets store.
///
/// Implementations may open their backing storage lazily, which is why
/// `exists` can fail as well as `get`.
pub trait SecretsStore {
    /// Human-readable name of this store, used in logs
    fn name(&self) -> &str;

    /// Returns whether a secret is stored under `namespace`/`key`.
    ///
    /// # Errors
    /// Returns a `Secrets` error if the backing storage cannot be opened.
    fn exists(&self, namespace: &str, key: &str) -> crate::Result<bool>;

    /// Retrieves the secret stored under `namespace`/`key`.
    ///
    /// # Errors
    /// Returns a `Secrets` error if the backing storage cannot be opened or
    /// no such secret exists.
    fn get(&self, namespace: &str, key: &str) -> crate::Result<Zeroizing<String>>;
}

/// Settings used to open a secrets store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretsConfig {
    /// Provider identifier
    pub provider: String,
    /// Backing file
    pub path: PathBuf,
}

impl SecretsConfig {
    /// Configuration for the `chef-secrets-file` provider at `path`.
    pub fn chef_secrets_file(path: impl Into<PathBuf>) -> Self {
        Self {
            provider: CHEF_SECRETS_FILE_PROVIDER.to_string(),
            path: path.into(),
        }
    }

    /// Opens the configured store.
    ///
    /// Opening is cheap: the backing file is only read on first lookup.
    ///
    /// # Errors
    /// Returns a `Secrets` error for an unknown provider.
    pub fn open(&self) -> crate::Result<ChefSecretsFile> {
        if self.provider != CHEF_SECRETS_FILE_PROVIDER {
            return Err(crate::error::KeyDbError::secrets(format!(
                "unsupported secrets provider '{}'",
                self.provider
            )));
        }

        Ok(ChefSecretsFile::new(self.path.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chef_secrets_file_config() {
        let config = SecretsConfig::chef_secrets_file("/etc/opscode/private-chef-secrets.json");
        assert_eq!(config.provider, "chef-secrets-file");
        assert_eq!(
            config.path,
            PathBuf::from("/etc/opscode/private-chef-secrets.json")
        );
        assert!(config.open().is_ok());
    }

    #[test]
    fn test_unknown_provider_rejected() {
        let config = SecretsConfig {
            provider: "vault".to_string(),
            path: PathBuf::from("/tmp/secrets.json"),
        };
        let error = config.open().unwrap_err();
        assert!(error.to_string().contains("unsupported secrets provider 'vault'"));
    }
}
