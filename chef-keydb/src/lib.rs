//! Command-line surface of chef-keydb.
//!
//! The CLI types live here so they can be tested without spawning the
//! binary. `main.rs` only wires them to the core library.

use chef_keydb_core::ConfigOptions;
use chef_keydb_core::options::{
    DEFAULT_SECRETS_FILE_PATH, DEFAULT_SQL_DB, DEFAULT_SQL_HOST, DEFAULT_SQL_PORT,
};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use zeroize::Zeroizing;

/// CLI argument structure
#[derive(Parser, Debug)]
#[command(name = "chef-keydb")]
#[command(about = "Chef Server key and user database connection tool")]
#[command(version)]
#[command(long_about = "
chef-keydb - Chef Server database connection helper

Resolves the credentials for the Chef Server PostgreSQL database and opens a
connection. Missing values are looked up in this order:

  SQL user:      --sql-user, then /etc/opscode/chef-server-running.json
  SQL password:  --sql-password, then the secrets file (opscode_erchef,
                 then postgresql), then the running config

EXAMPLES:
  chef-keydb check
  chef-keydb --sql-host db1 --sql-user opscode_chef show-config
  chef-keydb --secrets-file /tmp/private-chef-secrets.json check
")]
pub struct Cli {
    /// Logging flags
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Database connection flags
    #[command(flatten)]
    pub database: DatabaseArgs,

    /// Command to run, `check` when omitted
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Resolve credentials, connect and run a connectivity probe
    Check,
    /// Print the resolved connection settings (password omitted)
    ShowConfig,
}

/// Logging flags
#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Increase verbosity
    #[arg(
        short,
        long,
        global = true,
        action = clap::ArgAction::Count,
        help = "Increase verbosity (-v, -vv, -vvv)"
    )]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, global = true, help = "Suppress all output except errors")]
    pub quiet: bool,
}

/// Database connection flags
#[derive(Args)]
pub struct DatabaseArgs {
    /// PostgreSQL database hostname
    #[arg(long, value_name = "HOSTNAME", default_value = DEFAULT_SQL_HOST)]
    pub sql_host: String,

    /// PostgreSQL database port
    #[arg(long, value_name = "PORT", default_value_t = DEFAULT_SQL_PORT)]
    pub sql_port: u16,

    /// PostgreSQL Chef Server database name
    #[arg(long, value_name = "DBNAME", default_value = DEFAULT_SQL_DB)]
    pub sql_db: String,

    /// User used to connect to the PostgreSQL database
    #[arg(long, value_name = "USERNAME")]
    pub sql_user: Option<String>,

    /// Password used to connect to the PostgreSQL database
    #[arg(
        long,
        value_name = "PASSWORD",
        env = "CHEF_KEYDB_SQL_PASSWORD",
        hide_env_values = true
    )]
    pub sql_password: Option<String>,

    /// Path to a valid private-chef-secrets.json file
    #[arg(
        long = "secrets-file",
        value_name = "PATH",
        default_value = DEFAULT_SECRETS_FILE_PATH
    )]
    pub secrets_file_path: PathBuf,

    /// Skip Chef 12-only keys table
    #[arg(long)]
    pub skip_keys_table: bool,

    /// Skip users table
    #[arg(long)]
    pub skip_users_table: bool,
}

impl std::fmt::Debug for DatabaseArgs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseArgs")
            .field("sql_host", &self.sql_host)
            .field("sql_port", &self.sql_port)
            .field("sql_db", &self.sql_db)
            .field("sql_user", &self.sql_user)
            .field("sql_password", &self.sql_password.as_ref().map(|_| "****"))
            .field("secrets_file_path", &self.secrets_file_path)
            .field("skip_keys_table", &self.skip_keys_table)
            .field("skip_users_table", &self.skip_users_table)
            .finish()
    }
}

impl DatabaseArgs {
    /// Converts the parsed flags into core options.
    pub fn into_options(self) -> ConfigOptions {
        ConfigOptions {
            sql_host: self.sql_host,
            sql_port: self.sql_port,
            sql_db: self.sql_db,
            sql_user: self.sql_user,
            sql_password: self.sql_password.map(Zeroizing::new),
            secrets_file_path: self.secrets_file_path,
            skip_keys_table: self.skip_keys_table,
            skip_users_table: self.skip_users_table,
        }
    }
}

/// Resolved settings printed by `show-config`.
///
/// Deliberately has no password field.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ResolvedConfig {
    /// PostgreSQL host
    pub sql_host: String,
    /// PostgreSQL port
    pub sql_port: u16,
    /// Chef Server database name
    pub sql_db: String,
    /// Resolved database user
    pub sql_user: String,
    /// Secrets file consulted for the password
    pub secrets_file_path: PathBuf,
    /// Skip the Chef 12 keys table
    pub skip_keys_table: bool,
    /// Skip the users table
    pub skip_users_table: bool,
}

impl ResolvedConfig {
    /// Builds the printable view from resolved options.
    pub fn new(
        options: &ConfigOptions,
        descriptor: &chef_keydb_core::ConnectionDescriptor,
    ) -> Self {
        Self {
            sql_host: descriptor.host().to_string(),
            sql_port: descriptor.port(),
            sql_db: descriptor.database().to_string(),
            sql_user: descriptor.credentials().username().to_string(),
            secrets_file_path: options.secrets_file_path.clone(),
            skip_keys_table: options.skip_keys_table,
            skip_users_table: options.skip_users_table,
        }
    }
}
