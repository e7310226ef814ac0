//! Database configuration options.
//!
//! `ConfigOptions` is the typed bag of the eight knobs the command line can
//! set. Everything except the SQL user and password carries a default, so a
//! freshly constructed value is always ready for resolution.

use std::path::PathBuf;
use zeroize::Zeroizing;

/// Default PostgreSQL host
pub const DEFAULT_SQL_HOST: &str = "localhost";
/// Default PostgreSQL port
pub const DEFAULT_SQL_PORT: u16 = 5432;
/// Default Chef Server database name
pub const DEFAULT_SQL_DB: &str = "opscode_chef";
/// Default location of the secrets store backing file
pub const DEFAULT_SECRETS_FILE_PATH: &str = "/etc/opscode/private-chef-secrets.json";

/// User-supplied database configuration.
///
/// # Security
/// The password is held in a `Zeroizing` container and is never printed by
/// the `Debug` implementation.
///
/// # Example
/// ```rust
/// use chef_keydb_core::ConfigOptions;
///
/// let options = ConfigOptions::default()
///     .with_sql_host("db1")
///     .with_sql_port(5433)
///     .with_sql_user("opscode_chef");
///
/// assert_eq!(options.sql_db, "opscode_chef");
/// assert!(options.sql_password.is_none());
/// assert!(options.validate().is_ok());
/// ```
#[derive(Clone)]
pub struct ConfigOptions {
    /// PostgreSQL host name
    pub sql_host: String,
    /// PostgreSQL port
    pub sql_port: u16,
    /// Chef Server database name
    pub sql_db: String,
    /// Database user; resolved from the running config when unset
    pub sql_user: Option<String>,
    /// Database password; resolved from the secrets store when unset
    pub sql_password: Option<Zeroizing<String>>,
    /// Backing file for the secrets store
    pub secrets_file_path: PathBuf,
    /// Skip the Chef 12 keys table (consumed downstream)
    pub skip_keys_table: bool,
    /// Skip the users table (consumed downstream)
    pub skip_users_table: bool,
}

impl Default for ConfigOptions {
    fn default() -> Self {
        Self {
            sql_host: DEFAULT_SQL_HOST.to_string(),
            sql_port: DEFAULT_SQL_PORT,
            sql_db: DEFAULT_SQL_DB.to_string(),
            sql_user: None,
            sql_password: None,
            secrets_file_path: PathBuf::from(DEFAULT_SECRETS_FILE_PATH),
            skip_keys_table: false,
            skip_users_table: false,
        }
    }
}

impl std::fmt::Debug for ConfigOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigOptions")
            .field("sql_host", &self.sql_host)
            .field("sql_port", &self.sql_port)
            .field("sql_db", &self.sql_db)
            .field("sql_user", &self.sql_user)
            .field(
                "sql_password",
                &self.sql_password.as_ref().map(|_| "****"),
            )
            .field("secrets_file_path", &self.secrets_file_path)
            .field("skip_keys_table", &self.skip_keys_table)
            .field("skip_users_table", &self.skip_users_table)
            .finish()
    }
}

impl ConfigOptions {
    /// Validates the always-present options.
    ///
    /// # Errors
    /// Returns a configuration error if a defaulted value was overridden with
    /// something unusable.
    pub fn validate(&self) -> crate::Result<()> {
        if self.sql_host.trim().is_empty() {
            return Err(crate::error::KeyDbError::configuration(
                "sql_host cannot be empty",
            ));
        }

        if self.sql_port == 0 {
            return Err(crate::error::KeyDbError::configuration(
                "sql_port must be greater than 0",
            ));
        }

        if self.sql_db.trim().is_empty() {
            return Err(crate::error::KeyDbError::configuration(
                "sql_db cannot be empty",
            ));
        }

        if self.secrets_file_path.as_os_str().is_empty() {
            return Err(crate::error::KeyDbError::configuration(
                "secrets_file_path cannot be empty",
            ));
        }

        Ok(())
    }

    /// True when both user and password were supplied explicitly.
    pub fn has_credentials(&self) -> bool {
        self.sql_user.as_deref().is_some_and(|u| !u.is_empty())
            && self.sql_password.as_deref().is_some_and(|p| !p.is_empty())
    }

    /// Builder method to set the host.
    pub fn with_sql_host(mut self, host: impl Into<String>) -> Self {
        self.sql_host = host.into();
        self
    }

    /// Builder method to set the port.
    pub fn with_sql_port(mut self, port: u16) -> Self {
        self.sql_port = port;
        self
    }

    /// Builder method to set the database name.
    pub fn with_sql_db(mut self, db: impl Into<String>) -> Self {
        self.sql_db = db.into();
        self
    }

    /// Builder method to set the user.
    pub fn with_sql_user(mut self, user: impl Into<String>) -> Self {
        self.sql_user = Some(user.into());
        self
    }

    /// Builder method to set the password.
    pub fn with_sql_password(mut self, password: impl Into<String>) -> Self {
        self.sql_password = Some(Zeroizing::new(password.into()));
        self
    }

    /// Builder method to set the secrets file path.
    pub fn with_secrets_file_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.secrets_file_path = path.into();
        self
    }
}
