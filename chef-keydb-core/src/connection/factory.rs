//! Lazily opened, memoized database handle.

use super::ConnectionDescriptor;
use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::OnceCell;

/// Options passed through to the SQL client.
///
/// Infinite timestamps need no option here: they are decoded per column
/// through [`PgTimestamp`](super::PgTimestamp).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectOptions {
    /// Maximum number of pooled connections
    pub max_connections: u32,
    /// Time allowed for establishing a connection
    pub connect_timeout: Duration,
    /// Reported to the server as `application_name`
    pub application_name: String,
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self {
            max_connections: 2,
            connect_timeout: Duration::from_secs(30),
            application_name: format!("chef-keydb-{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Opens a database handle from a connection locator.
///
/// This is the seam to the SQL client: the production implementation is
/// [`PgConnector`](super::PgConnector).
#[async_trait]
pub trait DatabaseConnector: Send + Sync {
    /// Handle type produced by this connector
    type Handle: Send + Sync;

    /// Opens a handle for `locator`.
    ///
    /// # Errors
    /// Returns a `Connection` error if the host is unreachable, the
    /// credentials are rejected or the locator is malformed.
    async fn connect(
        &self,
        locator: &str,
        options: &ConnectOptions,
    ) -> crate::Result<Self::Handle>;
}

/// Produces the database handle for one invocation.
///
/// The handle is created on the first call to [`handle`](Self::handle) and
/// returned for every later call; the connector is never asked twice once a
/// handle exists. A failed attempt leaves the factory empty and is not
/// retried here.
pub struct ConnectionFactory<C: DatabaseConnector> {
    connector: C,
    options: ConnectOptions,
    handle: OnceCell<C::Handle>,
}

impl<C: DatabaseConnector> ConnectionFactory<C> {
    /// Creates a factory with default connect options.
    pub fn new(connector: C) -> Self {
        Self::with_options(connector, ConnectOptions::default())
    }

    /// Creates a factory with custom connect options.
    pub fn with_options(connector: C, options: ConnectOptions) -> Self {
        Self {
            connector,
            options,
            handle: OnceCell::new(),
        }
    }

    /// Connect options passed to the connector
    pub fn options(&self) -> &ConnectOptions {
        &self.options
    }

    /// True once a handle has been opened.
    pub fn is_connected(&self) -> bool {
        self.handle.initialized()
    }

    /// Returns the handle, opening it on first use.
    ///
    /// The handle is bound to the descriptor of the first successful call.
    ///
    /// # Errors
    /// Returns a `Connection` error if the handle cannot be opened.
    pub async fn handle(&self, descriptor: &ConnectionDescriptor) -> crate::Result<&C::Handle> {
        self.handle
            .get_or_try_init(|| async {
                let locator = descriptor.locator()?;
                tracing::debug!(
                    "Opening database connection to {}",
                    descriptor.redacted_locator()
                );
                let handle = self.connector.connect(&locator, &self.options).await?;
                tracing::info!(
                    "Connected to {}:{}/{}",
                    descriptor.host(),
                    descriptor.port(),
                    descriptor.database()
                );
                Ok::<_, crate::error::KeyDbError>(handle)
            })
            .await
    }

    /// Takes the handle out of the factory, if one was opened.
    pub fn into_handle(self) -> Option<C::Handle> {
        self.handle.into_inner()
    }
}
