// Outcome store schema migrations

use crate::map_sqlx_error;
use ripley_core::error::Result;
use sqlx::SqlitePool;
use tracing::info;

/// Ordered (version, description, sql). Each script records its own version row.
const MIGRATIONS: &[(i64, &str, &str)] = &[(
    1,
    "outcomes table",
    include_str!("../migrations/001_initial_schema.sql"),
)];

/// Bring the outcome store up to the latest schema. Safe to call on every start.
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    let current = schema_version(pool).await?;
    info!(current_version = current, "Checking outcome store schema");

    for (version, description, sql) in MIGRATIONS.iter().filter(|(v, _, _)| *v > current) {
        info!(version, description, "Applying migration");
        apply_migration(pool, sql).await?;
    }

    Ok(())
}

/// Highest applied version, 0 for a fresh database
async fn schema_version(pool: &SqlitePool) -> Result<i64> {
    let tracked: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='schema_version'",
    )
    .fetch_one(pool)
    .await
    .map_err(map_sqlx_error)?;

    if tracked == 0 {
        return Ok(0);
    }

    let version: Option<i64> = sqlx::query_scalar("SELECT MAX(version) FROM schema_version")
        .fetch_one(pool)
        .await
        .map_err(map_sqlx_error)?;
    Ok(version.unwrap_or(0))
}

/// Run one script atomically, statement by statement
async fn apply_migration(pool: &SqlitePool, sql: &str) -> Result<()> {
    let mut tx = pool.begin().await.map_err(map_sqlx_error)?;

    for statement in sql.split(';') {
        let statement: String = statement
            .lines()
            .filter(|line| !line.trim_start().starts_with("--"))
            .collect::<Vec<_>>()
            .join("\n");
        let statement = statement.trim();

        if !statement.is_empty() {
            sqlx::query(statement)
                .execute(&mut *tx)
                .await
                .map_err(map_sqlx_error)?;
        }
    }

    tx.commit().await.map_err(map_sqlx_error)?;
    Ok(())
}
