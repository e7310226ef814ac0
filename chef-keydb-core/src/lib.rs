//! Credential resolution and database connection setup for Chef Server
//! key and user tooling.
//!
//! Given command-line options that may omit the SQL user and password, this
//! crate resolves them from the running server's own configuration and its
//! secrets store, then opens a PostgreSQL handle to the Chef Server database.
//!
//! # Security Guarantees
//! - Passwords are held in `Zeroizing` containers and never logged
//! - Connection locators are redacted in logs and error messages
//! - Resolution fails fast; no empty or default password is ever substituted
//!
//! # Architecture
//! - `ConfigOptions` carries the user-supplied knobs
//! - `CredentialResolver` fills in what is missing from injected collaborators
//! - `ConnectionFactory` turns the resolved descriptor into a memoized handle
//! - `Invocation` composes the above for a single command run

pub mod connection;
pub mod context;
pub mod error;
pub mod logging;
pub mod options;
pub mod resolver;
pub mod running_config;
pub mod secrets;
pub mod security;

// Re-export commonly used types
pub use connection::{
    ConnectOptions, ConnectionDescriptor, ConnectionFactory, DatabaseConnector, PgConnector,
    PgTimestamp,
};
pub use context::Invocation;
pub use error::{KeyDbError, Result};
pub use logging::init_logging;
pub use options::ConfigOptions;
pub use resolver::CredentialResolver;
pub use running_config::{FileReader, FsFileReader, RunningNamespace, RunningServerConfig};
pub use secrets::{ChefSecretsFile, SecretsConfig, SecretsStore};
