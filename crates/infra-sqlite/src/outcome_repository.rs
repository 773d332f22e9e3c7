// SQLite OutcomeRepository Implementation

use crate::map_sqlx_error;
use async_trait::async_trait;
use ripley_core::domain::{Outcome, OutcomeSample};
use ripley_core::error::Result;
use ripley_core::port::OutcomeRepository;
use sqlx::SqlitePool;
use tracing::debug;

pub struct SqliteOutcomeRepository {
    pool: SqlitePool,
}

impl SqliteOutcomeRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OutcomeRepository for SqliteOutcomeRepository {
    async fn insert(&self, outcome: &Outcome) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO outcomes (
                probe_name, passed, tokens_used, duration_ms,
                effort, quote, output, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&outcome.probe_name)
        .bind(outcome.passed)
        .bind(outcome.tokens_used as i64)
        .bind(outcome.duration_ms())
        .bind(outcome.effort.as_str())
        .bind(&outcome.quote)
        .bind(&outcome.output)
        .bind(outcome.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        debug!(probe = %outcome.probe_name, "Outcome recorded");
        Ok(())
    }

    async fn query_recent(&self, probe_name: &str, limit: usize) -> Result<Vec<OutcomeSample>> {
        // id breaks ties between rows created in the same millisecond
        let rows: Vec<SampleRow> = sqlx::query_as(
            r#"
            SELECT tokens_used, duration_ms, passed
            FROM outcomes
            WHERE probe_name = ?
            ORDER BY created_at DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(probe_name)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(SampleRow::into_sample).collect())
    }
}

/// SQLite row projection used for rolling statistics
#[derive(Debug, sqlx::FromRow)]
struct SampleRow {
    tokens_used: i64,
    duration_ms: i64,
    passed: bool, // SQLite boolean as integer
}

impl SampleRow {
    fn into_sample(self) -> OutcomeSample {
        OutcomeSample {
            tokens_used: self.tokens_used.max(0) as u64,
            duration_ms: self.duration_ms.max(0),
            passed: self.passed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{create_pool, run_migrations};
    use ripley_core::domain::EffortTier;
    use std::time::Duration;

    async fn setup_test_db() -> SqlitePool {
        let pool = create_pool("sqlite::memory:").await.unwrap();
        run_migrations(&pool).await.unwrap();
        pool
    }

    fn outcome(name: &str, tokens_used: u64, passed: bool, created_at: i64) -> Outcome {
        Outcome {
            probe_name: name.to_string(),
            passed,
            tokens_used,
            duration: Duration::from_millis(1_500),
            effort: if passed {
                EffortTier::Good
            } else {
                EffortTier::Poor
            },
            quote: "You followed procedure. I approve.".to_string(),
            output: "5050".to_string(),
            created_at,
        }
    }

    #[tokio::test]
    async fn test_insert_and_query() {
        let pool = setup_test_db().await;
        let repo = SqliteOutcomeRepository::new(pool.clone());

        tokio_test::assert_ok!(repo.insert(&outcome("Sum1to100", 1, true, 1_000)).await);

        let samples = repo.query_recent("Sum1to100", 10).await.unwrap();
        assert_eq!(
            samples,
            vec![OutcomeSample {
                tokens_used: 1,
                duration_ms: 1_500,
                passed: true,
            }]
        );

        let (effort, quote, output): (String, String, String) =
            sqlx::query_as("SELECT effort, quote, output FROM outcomes")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(effort, "good");
        assert_eq!(quote, "You followed procedure. I approve.");
        assert_eq!(output, "5050");
    }

    #[tokio::test]
    async fn test_query_recent_newest_first_and_limited() {
        let repo = SqliteOutcomeRepository::new(setup_test_db().await);

        for (i, tokens) in [1u64, 2, 3, 4, 5].iter().enumerate() {
            repo.insert(&outcome("Bench", *tokens, true, 1_000 + i as i64))
                .await
                .unwrap();
        }

        let samples = repo.query_recent("Bench", 3).await.unwrap();
        let tokens: Vec<u64> = samples.iter().map(|s| s.tokens_used).collect();
        assert_eq!(tokens, vec![5, 4, 3]);
    }

    #[tokio::test]
    async fn test_same_timestamp_uses_insertion_order() {
        let repo = SqliteOutcomeRepository::new(setup_test_db().await);

        repo.insert(&outcome("Bench", 1, false, 5_000)).await.unwrap();
        repo.insert(&outcome("Bench", 2, true, 5_000)).await.unwrap();

        let samples = repo.query_recent("Bench", 1).await.unwrap();
        assert_eq!(samples[0].tokens_used, 2);
    }

    #[tokio::test]
    async fn test_unknown_probe_is_empty() {
        let repo = SqliteOutcomeRepository::new(setup_test_db().await);
        repo.insert(&outcome("Bench", 1, true, 1)).await.unwrap();

        let samples = repo.query_recent("Missing", 10).await.unwrap();
        assert!(samples.is_empty());
    }

    #[tokio::test]
    async fn test_insert_without_schema_fails() {
        let pool = create_pool("sqlite::memory:").await.unwrap();
        let repo = SqliteOutcomeRepository::new(pool);

        let result = repo.insert(&outcome("Bench", 1, true, 1)).await;
        assert!(matches!(
            result,
            Err(ripley_core::error::AppError::Database(_))
        ));
    }
}
