//! SQLite persistence.
//!
//! Repository functions take a `&mut SqliteConnection` so the same code
//! runs on a pooled connection or inside the batch transaction.

pub mod batches;
pub mod reference;
mod rows;
pub mod shifts;

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::info;

use crate::error::EngineResult;

pub use shifts::NewShift;

/// Opens (creating if needed) the database at `database_url` and applies migrations.
pub async fn connect(database_url: &str) -> EngineResult<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    migrate(&pool).await?;
    info!(database_url, "Database ready");
    Ok(pool)
}

/// A migrated in-memory database.
///
/// The pool holds a single connection that never expires, since every new
/// connection to `sqlite::memory:` would see an empty database.
pub async fn connect_in_memory() -> EngineResult<SqlitePool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;

    migrate(&pool).await?;
    Ok(pool)
}

async fn migrate(pool: &SqlitePool) -> EngineResult<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}
