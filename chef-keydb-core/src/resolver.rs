//! Database credential resolution.
//!
//! Fills in the SQL user and password that were not given on the command
//! line. The user comes from the running-system config; the password is
//! looked up in this order, first hit wins:
//!
//! 1. the `sql_password` option
//! 2. secrets store `opscode_erchef/sql_password`
//! 3. secrets store `postgresql/sql_password`
//! 4. `sql_password` from the running config, when it was loaded for the user
//!
//! Every secrets lookup is guarded by `exists`. Empty values never count as a
//! credential.

use crate::connection::ConnectionDescriptor;
use crate::error::KeyDbError;
use crate::options::ConfigOptions;
use crate::running_config::{FileReader, RUNNING_CONFIG_PATH, RunningServerConfig};
use crate::secrets::SecretsStore;
use crate::security::Credentials;
use std::path::{Path, PathBuf};
use zeroize::Zeroizing;

/// Secrets store namespaces probed for the SQL password, in order
pub const PASSWORD_NAMESPACES: [&str; 2] = ["opscode_erchef", "postgresql"];
/// Secrets store key holding the SQL password
pub const SQL_PASSWORD_KEY: &str = "sql_password";

/// Resolves the database user and password from the configured sources.
///
/// Collaborators are injected so the resolver performs no I/O of its own.
/// Per call to [`resolve`](Self::resolve) it reads at most one file and
/// fetches at most two secrets.
///
/// # Example
/// ```rust
/// use chef_keydb_core::{ConfigOptions, CredentialResolver};
/// use chef_keydb_core::running_config::FsFileReader;
/// use chef_keydb_core::secrets::MemorySecretsStore;
///
/// let secrets = MemorySecretsStore::new()
///     .with_secret("opscode_erchef", "sql_password", "secretA");
/// let resolver = CredentialResolver::new(&FsFileReader, &secrets);
///
/// let options = ConfigOptions::default().with_sql_user("opscode_chef");
/// let creds = resolver.resolve(&options)?;
/// assert_eq!(creds.username(), "opscode_chef");
/// assert_eq!(creds.password(), "secretA");
/// # Ok::<(), chef_keydb_core::KeyDbError>(())
/// ```
pub struct CredentialResolver<'a> {
    files: &'a dyn FileReader,
    secrets: &'a dyn SecretsStore,
    running_config_path: PathBuf,
}

impl<'a> CredentialResolver<'a> {
    /// Creates a resolver reading the running config from its fixed path.
    pub fn new(files: &'a dyn FileReader, secrets: &'a dyn SecretsStore) -> Self {
        Self {
            files,
            secrets,
            running_config_path: PathBuf::from(RUNNING_CONFIG_PATH),
        }
    }

    /// Overrides the running config location.
    pub fn with_running_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.running_config_path = path.into();
        self
    }

    /// Location the running config is read from
    pub fn running_config_path(&self) -> &Path {
        &self.running_config_path
    }

    /// Resolves the user and password.
    ///
    /// When both are already set in `options` they are returned unchanged
    /// without touching any file or the secrets store.
    ///
    /// # Errors
    /// - `MissingRunningConfig` if the user is unset and the running config
    ///   does not exist
    /// - `RunningConfigParse` if the running config is malformed
    /// - `Secrets` if the secrets store cannot be read
    /// - `CredentialsUnavailable` if no source yields a password
    pub fn resolve(&self, options: &ConfigOptions) -> crate::Result<Credentials> {
        let user = non_empty(options.sql_user.as_deref());
        let password = non_empty(options.sql_password.as_deref().map(String::as_str));

        if let (Some(user), Some(password)) = (user, password) {
            tracing::debug!("Using SQL user and password supplied as options");
            return Ok(Credentials::new(user, password));
        }

        let running_config = match user {
            Some(_) => None,
            None => Some(self.load_running_config()?),
        };

        let user = match (user, running_config.as_ref()) {
            (Some(user), _) => user.to_string(),
            (None, Some(config)) => {
                let user = config.sql_user()?;
                tracing::debug!(
                    "Using SQL user from running config namespace {}",
                    config.namespace()?
                );
                user.to_string()
            }
            (None, None) => {
                return Err(KeyDbError::credentials_unavailable("no sql_user available"));
            }
        };

        let password = self.resolve_password(password, running_config.as_ref())?;

        Ok(Credentials::new(user, password.as_str()))
    }

    /// Resolves the credentials and writes them back into `options`.
    ///
    /// # Errors
    /// Same as [`resolve`](Self::resolve).
    pub fn apply(&self, options: &mut ConfigOptions) -> crate::Result<ConnectionDescriptor> {
        let credentials = self.resolve(options)?;
        options.sql_user = Some(credentials.username().to_string());
        options.sql_password = Some(Zeroizing::new(credentials.password().to_string()));
        Ok(ConnectionDescriptor::from_options(options, credentials))
    }

    fn load_running_config(&self) -> crate::Result<RunningServerConfig> {
        tracing::debug!(
            "SQL user not provided, reading running config {}",
            self.running_config_path.display()
        );
        RunningServerConfig::load(self.files, &self.running_config_path)
    }

    fn resolve_password(
        &self,
        explicit: Option<&str>,
        running_config: Option<&RunningServerConfig>,
    ) -> crate::Result<Zeroizing<String>> {
        if let Some(password) = explicit {
            return Ok(Zeroizing::new(password.to_string()));
        }

        for namespace in PASSWORD_NAMESPACES {
            if !self.secrets.exists(namespace, SQL_PASSWORD_KEY)? {
                tracing::trace!("No {}/{} in secrets store", namespace, SQL_PASSWORD_KEY);
                continue;
            }

            let password = self.secrets.get(namespace, SQL_PASSWORD_KEY)?;
            if password.is_empty() {
                tracing::warn!(
                    "Secrets store holds an empty {}/{}, ignoring it",
                    namespace,
                    SQL_PASSWORD_KEY
                );
                continue;
            }

            tracing::debug!(
                "Using SQL password from {} namespace {}",
                self.secrets.name(),
                namespace
            );
            return Ok(password);
        }

        if let Some(password) = running_config.and_then(RunningServerConfig::sql_password) {
            tracing::debug!("Using SQL password from running config");
            return Ok(Zeroizing::new(password.to_string()));
        }

        Err(KeyDbError::credentials_unavailable(format!(
            "no sql_password given as option or found in the {} store under {}",
            self.secrets.name(),
            PASSWORD_NAMESPACES.join(" or ")
        )))
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
