//! Database connection construction.
//!
//! # Module Structure
//! - `descriptor`: the resolved connection tuple and its locator
//! - `factory`: lazily opened, memoized handle and the connector seam
//! - `postgres`: sqlx-backed PostgreSQL connector
//! - `timestamp`: `PgTimestamp`, which returns `infinity` and `-infinity` as
//!   their string forms instead of failing to decode
//!
//! # Security Guarantees
//! - Locators are redacted before they reach logs or error messages
//! - A failed connection is surfaced to the caller, never retried here

mod descriptor;
mod factory;
mod postgres;
mod timestamp;

pub use descriptor::{ConnectionDescriptor, LOCATOR_SCHEME};
pub use factory::{ConnectOptions, ConnectionFactory, DatabaseConnector};
pub use postgres::{PgConnector, probe};
pub use timestamp::{PgTimestamp, TimestampParseError};
