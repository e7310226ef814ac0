//! PostgreSQL connector built on sqlx.
//!
//! # Security Features
//! - Connection locators are redacted in every error and log line
//! - Connection limits and acquire timeouts come from `ConnectOptions`

use super::{ConnectOptions, DatabaseConnector};
use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use std::str::FromStr;

/// Opens `PgPool` handles for the connection factory.
///
/// The pool is connected eagerly so that unreachable hosts and rejected
/// credentials surface when the handle is first requested.
#[derive(Debug, Clone, Copy, Default)]
pub struct PgConnector;

#[async_trait]
impl DatabaseConnector for PgConnector {
    type Handle = PgPool;

    async fn connect(&self, locator: &str, options: &ConnectOptions) -> crate::Result<PgPool> {
        let connect_options = PgConnectOptions::from_str(locator)
            .map_err(|e| {
                crate::error::KeyDbError::connection_failed(
                    format!(
                        "malformed connection locator {}",
                        crate::error::redact_database_url(locator)
                    ),
                    e,
                )
            })?
            .application_name(&options.application_name);

        PgPoolOptions::new()
            .max_connections(options.max_connections.max(1))
            .acquire_timeout(options.connect_timeout)
            .connect_with(connect_options)
            .await
            .map_err(|e| {
                crate::error::KeyDbError::connection_failed(
                    format!(
                        "failed to connect to {}",
                        crate::error::redact_database_url(locator)
                    ),
                    e,
                )
            })
    }
}

/// Checks that the pool can run a trivial query.
///
/// # Errors
/// Returns a `Connection` error if the query fails or returns an unexpected
/// value.
pub async fn probe(pool: &PgPool) -> crate::Result<()> {
    let result: i32 = sqlx::query_scalar("SELECT 1")
        .fetch_one(pool)
        .await
        .map_err(|e| crate::error::KeyDbError::connection_failed("connectivity probe failed", e))?;

    if result != 1 {
        return Err(crate::error::KeyDbError::Connection {
            context: "connectivity probe failed".to_string(),
            source: format!("unexpected probe result {}", result).into(),
        });
    }

    Ok(())
}
