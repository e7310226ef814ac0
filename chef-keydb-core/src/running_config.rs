//! Running-system configuration of the local Chef Server.
//!
//! The server writes its effective configuration to a JSON file. Only the
//! database credentials under `private_chef.<namespace>` matter here, where
//! the namespace is `opscode-erchef` on current servers and `postgresql` on
//! older ones. Unknown keys are ignored.

use serde::Deserialize;
use std::path::Path;

/// Fixed location of the running-system config
pub const RUNNING_CONFIG_PATH: &str = "/etc/opscode/chef-server-running.json";

/// File system access used while resolving credentials.
///
/// Abstracted so resolution can be exercised without touching `/etc`.
pub trait FileReader {
    /// Returns true if a file exists at `path`.
    fn exists(&self, path: &Path) -> bool;

    /// Reads the whole file at `path` as UTF-8.
    fn read_to_string(&self, path: &Path) -> std::io::Result<String>;
}

/// `FileReader` backed by the local file system.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsFileReader;

impl FileReader for FsFileReader {
    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn read_to_string(&self, path: &Path) -> std::io::Result<String> {
        std::fs::read_to_string(path)
    }
}

/// Section of `private_chef` that carries the database credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunningNamespace {
    /// `opscode-erchef`, used by current Chef Server releases
    OpscodeErchef,
    /// `postgresql`, used by older releases
    Postgresql,
}

impl RunningNamespace {
    /// Key of this namespace inside `private_chef`.
    pub fn key(self) -> &'static str {
        match self {
            Self::OpscodeErchef => "opscode-erchef",
            Self::Postgresql => "postgresql",
        }
    }
}

impl std::fmt::Display for RunningNamespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Database settings found under one namespace.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SqlSection {
    /// Database user
    #[serde(default)]
    pub sql_user: Option<String>,
    /// Database password
    #[serde(default)]
    pub sql_password: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct PrivateChef {
    #[serde(rename = "opscode-erchef", default)]
    opscode_erchef: Option<SqlSection>,
    #[serde(default)]
    postgresql: Option<SqlSection>,
}

/// Parsed running-system config.
///
/// # Example
/// ```rust
/// use chef_keydb_core::running_config::{RunningNamespace, RunningServerConfig};
///
/// let config = RunningServerConfig::parse(
///     r#"{"private_chef": {"postgresql": {"sql_user": "pguser"}}}"#,
/// )?;
/// assert_eq!(config.namespace()?, RunningNamespace::Postgresql);
/// assert_eq!(config.sql_user()?, "pguser");
/// # Ok::<(), chef_keydb_core::KeyDbError>(())
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct RunningServerConfig {
    #[serde(default)]
    private_chef: Option<PrivateChef>,
}

impl RunningServerConfig {
    /// Parses the JSON contents of the running config.
    ///
    /// # Errors
    /// Returns `RunningConfigParse` if the contents are not a JSON object of
    /// the expected shape.
    pub fn parse(contents: &str) -> crate::Result<Self> {
        serde_json::from_str(contents).map_err(|e| {
            crate::error::KeyDbError::running_config_parse("invalid running config JSON", e)
        })
    }

    /// Reads and parses the running config at `path`.
    ///
    /// Existence is checked first; a missing file is reported without any
    /// read or parse attempt.
    ///
    /// # Errors
    /// - `MissingRunningConfig` if nothing exists at `path`
    /// - `Io` if the file cannot be read
    /// - `RunningConfigParse` if the contents are malformed
    pub fn load(reader: &dyn FileReader, path: &Path) -> crate::Result<Self> {
        if !reader.exists(path) {
            return Err(crate::error::KeyDbError::missing_running_config(path));
        }

        let contents = reader.read_to_string(path).map_err(|e| {
            crate::error::KeyDbError::io(
                format!("failed to read running config {}", path.display()),
                e,
            )
        })?;

        Self::parse(&contents)
    }

    /// Picks the authoritative namespace.
    ///
    /// `opscode-erchef` wins when it exists and carries `sql_user`; otherwise
    /// `postgresql` is used.
    ///
    /// # Errors
    /// Returns `RunningConfigParse` if `private_chef` is absent.
    pub fn namespace(&self) -> crate::Result<RunningNamespace> {
        let private_chef = self.private_chef()?;
        let erchef_has_user = private_chef
            .opscode_erchef
            .as_ref()
            .is_some_and(|section| section.sql_user.is_some());

        if erchef_has_user {
            Ok(RunningNamespace::OpscodeErchef)
        } else {
            Ok(RunningNamespace::Postgresql)
        }
    }

    /// Returns the section stored under `namespace`, if present.
    pub fn section(&self, namespace: RunningNamespace) -> Option<&SqlSection> {
        let private_chef = self.private_chef.as_ref()?;
        match namespace {
            RunningNamespace::OpscodeErchef => private_chef.opscode_erchef.as_ref(),
            RunningNamespace::Postgresql => private_chef.postgresql.as_ref(),
        }
    }

    /// Database user from the authoritative namespace.
    ///
    /// # Errors
    /// Returns `RunningConfigParse` if the namespace or its `sql_user` is
    /// missing or empty.
    pub fn sql_user(&self) -> crate::Result<&str> {
        let namespace = self.namespace()?;
        self.section(namespace)
            .and_then(|section| section.sql_user.as_deref())
            .filter(|user| !user.is_empty())
            .ok_or_else(|| {
                crate::error::KeyDbError::running_config_missing_key(&format!(
                    "private_chef.{}.sql_user",
                    namespace
                ))
            })
    }

    /// Database password from the authoritative namespace, if present.
    pub fn sql_password(&self) -> Option<&str> {
        let namespace = self.namespace().ok()?;
        self.section(namespace)
            .and_then(|section| section.sql_password.as_deref())
            .filter(|password| !password.is_empty())
    }

    fn private_chef(&self) -> crate::Result<&PrivateChef> {
        self.private_chef
            .as_ref()
            .ok_or_else(|| crate::error::KeyDbError::running_config_missing_key("private_chef"))
    }
}
