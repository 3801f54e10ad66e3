//! SQLite catalog store for the orders MCP server.
//!
//! Holds four tables (regions, customers, products, orders) with no behavior
//! beyond storage and referential lookups. Connections are pooled; foreign
//! keys are enforced per connection; callers issue one statement per call.

use orders_core::DatabaseConfig;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

pub mod bootstrap;
pub mod shape;

pub use bootstrap::{create_tables, seed, SeedSummary};
pub use shape::{round2, round_currency_fields, row_to_json, rows_to_json};

/// Open a connection pool against the configured database file.
///
/// The file is created if missing; `PRAGMA foreign_keys` is enabled on every
/// connection so invalid references fail the write instead of being dropped.
pub async fn connect(config: &DatabaseConfig) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(&format!("sqlite://{}", config.path))?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    tracing::info!(path = %config.path, "connected to catalog store");
    Ok(pool)
}

/// Open an in-memory database with the schema created.
///
/// A single-connection pool: each SQLite `:memory:` connection is its own
/// database, so more than one connection would see different data.
pub async fn connect_in_memory() -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;
    bootstrap::create_tables(&pool).await?;
    Ok(pool)
}
