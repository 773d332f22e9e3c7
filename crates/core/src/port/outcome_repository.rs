// Outcome Repository Port (Interface)

use crate::domain::{Outcome, OutcomeSample};
use crate::error::Result;
use async_trait::async_trait;

/// Append-only persistence for probe outcomes
#[async_trait]
pub trait OutcomeRepository: Send + Sync {
    /// Record a new outcome
    async fn insert(&self, outcome: &Outcome) -> Result<()>;

    /// Most recent outcomes for a probe, newest first, at most `limit` rows.
    /// Unknown probe names yield an empty list.
    async fn query_recent(&self, probe_name: &str, limit: usize) -> Result<Vec<OutcomeSample>>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::error::AppError;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    /// In-memory repository with optional write failures
    #[derive(Default)]
    pub struct InMemoryOutcomeRepository {
        outcomes: Mutex<Vec<Outcome>>,
        fail_inserts: AtomicBool,
    }

    impl InMemoryOutcomeRepository {
        pub fn new() -> Self {
            Self::default()
        }

        /// Make every subsequent insert fail (simulates a broken database)
        pub fn failing() -> Self {
            let repo = Self::default();
            repo.fail_inserts.store(true, Ordering::SeqCst);
            repo
        }

        pub fn outcomes(&self) -> Vec<Outcome> {
            self.outcomes.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl OutcomeRepository for InMemoryOutcomeRepository {
        async fn insert(&self, outcome: &Outcome) -> Result<()> {
            if self.fail_inserts.load(Ordering::SeqCst) {
                return Err(AppError::Database("disk I/O error".to_string()));
            }
            self.outcomes.lock().unwrap().push(outcome.clone());
            Ok(())
        }

        async fn query_recent(&self, probe_name: &str, limit: usize) -> Result<Vec<OutcomeSample>> {
            let outcomes = self.outcomes.lock().unwrap();

            // Insertion index breaks timestamp ties, newest first
            let mut matching: Vec<(usize, &Outcome)> = outcomes
                .iter()
                .enumerate()
                .filter(|(_, o)| o.probe_name == probe_name)
                .collect();
            matching.sort_by(|(ia, a), (ib, b)| {
                b.created_at.cmp(&a.created_at).then_with(|| ib.cmp(ia))
            });

            Ok(matching
                .into_iter()
                .take(limit)
                .map(|(_, o)| OutcomeSample::from(o))
                .collect())
        }
    }
}
