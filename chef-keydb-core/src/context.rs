//! Invocation-scoped resolution and connection state.
//!
//! An `Invocation` owns everything one command run needs: the options, the
//! collaborators used for resolution, the resolved descriptor and the lazily
//! opened database handle. Dropping it releases all of them.

use crate::connection::{ConnectionDescriptor, ConnectionFactory, DatabaseConnector, PgConnector};
use crate::error::KeyDbError;
use crate::options::ConfigOptions;
use crate::resolver::CredentialResolver;
use crate::running_config::{FileReader, FsFileReader, RUNNING_CONFIG_PATH};
use crate::secrets::{SecretsConfig, SecretsStore};
use std::path::PathBuf;

/// State of a single command invocation.
///
/// Credentials are resolved at most once; the database handle is opened on
/// first use and reused afterwards.
pub struct Invocation<C: DatabaseConnector = PgConnector> {
    options: ConfigOptions,
    files: Box<dyn FileReader>,
    secrets: Option<Box<dyn SecretsStore>>,
    running_config_path: PathBuf,
    descriptor: Option<ConnectionDescriptor>,
    factory: ConnectionFactory<C>,
}

impl Invocation<PgConnector> {
    /// Creates an invocation connecting through sqlx.
    pub fn new(options: ConfigOptions) -> Self {
        Self::with_connector(options, PgConnector)
    }
}

impl<C: DatabaseConnector> Invocation<C> {
    /// Creates an invocation with a custom connector.
    pub fn with_connector(options: ConfigOptions, connector: C) -> Self {
        Self::with_factory(options, ConnectionFactory::new(connector))
    }

    /// Creates an invocation around an existing connection factory.
    pub fn with_factory(options: ConfigOptions, factory: ConnectionFactory<C>) -> Self {
        Self {
            options,
            files: Box::new(FsFileReader),
            secrets: None,
            running_config_path: PathBuf::from(RUNNING_CONFIG_PATH),
            descriptor: None,
            factory,
        }
    }

    /// Replaces the file system used to read the running config.
    pub fn with_file_reader(mut self, files: impl FileReader + 'static) -> Self {
        self.files = Box::new(files);
        self
    }

    /// Uses `secrets` instead of opening the store at `secrets_file_path`.
    pub fn with_secrets_store(mut self, secrets: impl SecretsStore + 'static) -> Self {
        self.secrets = Some(Box::new(secrets));
        self
    }

    /// Overrides the running config location.
    pub fn with_running_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.running_config_path = path.into();
        self
    }

    /// Options as supplied, with credentials filled in once resolved.
    pub fn options(&self) -> &ConfigOptions {
        &self.options
    }

    /// Whether the Chef 12 keys table should be skipped downstream.
    pub fn skip_keys_table(&self) -> bool {
        self.options.skip_keys_table
    }

    /// Whether the users table should be skipped downstream.
    pub fn skip_users_table(&self) -> bool {
        self.options.skip_users_table
    }

    /// Resolves credentials on first call and returns the descriptor.
    ///
    /// # Errors
    /// Any resolution error; see [`CredentialResolver::resolve`].
    pub fn descriptor(&mut self) -> crate::Result<&ConnectionDescriptor> {
        let descriptor = match self.descriptor.take() {
            Some(descriptor) => descriptor,
            None => self.resolve()?,
        };
        Ok(self.descriptor.insert(descriptor))
    }

    /// Returns the database handle, resolving and connecting on first use.
    ///
    /// # Errors
    /// Any resolution error, or a `Connection` error from the connector.
    pub async fn db(&mut self) -> crate::Result<&C::Handle> {
        self.descriptor()?;
        let descriptor = self.descriptor.as_ref().ok_or_else(|| {
            KeyDbError::credentials_unavailable("credentials were not resolved")
        })?;
        self.factory.handle(descriptor).await
    }

    fn resolve(&mut self) -> crate::Result<ConnectionDescriptor> {
        self.options.validate()?;

        let opened;
        let secrets: &dyn SecretsStore = match &self.secrets {
            Some(secrets) => secrets.as_ref(),
            None => {
                opened = SecretsConfig::chef_secrets_file(&self.options.secrets_file_path).open()?;
                &opened
            }
        };

        let resolver = CredentialResolver::new(self.files.as_ref(), secrets)
            .with_running_config_path(&self.running_config_path);
        let descriptor = resolver.apply(&mut self.options)?;

        tracing::debug!("Resolved database connection {}", descriptor);
        Ok(descriptor)
    }
}
