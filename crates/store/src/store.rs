//! Store handle and connection setup.

use std::path::Path;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::info;

use ledgerly_core::DomainResult;

use crate::error::map_sqlx_error;
use crate::schema;

/// SQLite-backed store. Cheap to clone; clones share the pool.
#[derive(Debug, Clone)]
pub struct Store {
    pub(crate) pool: SqlitePool,
}

impl Store {
    /// Open (creating if missing) a database file and run schema bootstrap.
    pub async fn open(path: impl AsRef<Path>) -> DomainResult<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path.as_ref())
            .create_if_missing(true)
            .foreign_keys(true);
        let store = Self::connect(options).await?;
        info!(path = %path.as_ref().display(), "store opened");
        Ok(store)
    }

    /// Open a fresh in-memory database. Used by tests.
    pub async fn open_in_memory() -> DomainResult<Self> {
        let options = SqliteConnectOptions::new().in_memory(true).foreign_keys(true);
        Self::connect(options).await
    }

    async fn connect(options: SqliteConnectOptions) -> DomainResult<Self> {
        // Single connection: SQLite is single-writer, and an in-memory
        // database exists per connection.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        schema::migrate(&pool).await?;
        Ok(Self { pool })
    }
}
