// SQLite Connection Pool Setup

use crate::map_sqlx_error;
use ripley_core::error::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;

/// Create SQLite connection pool with WAL mode
///
/// `database_url` is a file path or `sqlite::memory:`. An in-memory database
/// lives inside a single connection, so the pool is capped at one.
pub async fn create_pool(database_url: &str) -> Result<SqlitePool> {
    let in_memory = database_url.contains(":memory:");

    let mut options = SqliteConnectOptions::from_str(database_url)
        .map_err(map_sqlx_error)?
        .busy_timeout(Duration::from_secs(5))
        .create_if_missing(true);
    if !in_memory {
        options = options.journal_mode(SqliteJournalMode::Wal);
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(if in_memory { 1 } else { 4 })
        .connect_with(options)
        .await
        .map_err(map_sqlx_error)?;

    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_pool() {
        let pool = create_pool("sqlite::memory:").await.unwrap();
        assert!(pool.acquire().await.is_ok());
    }

    #[tokio::test]
    async fn test_create_pool_creates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ripley.db");

        let pool = create_pool(path.to_str().unwrap()).await.unwrap();
        assert!(pool.acquire().await.is_ok());
        assert!(path.exists());
    }
}
