// Statistics Aggregator
// Recency-windowed averages over recorded outcomes

use crate::domain::RollingAggregate;
use crate::error::{AppError, Result};
use crate::port::OutcomeRepository;
use std::sync::Arc;
use tracing::debug;

pub struct StatisticsAggregator {
    source: Arc<dyn OutcomeRepository>,
}

impl StatisticsAggregator {
    pub fn new(source: Arc<dyn OutcomeRepository>) -> Self {
        Self { source }
    }

    /// Aggregate over the `window` most recent outcomes of `probe_name`.
    ///
    /// Fewer than `window` outcomes are averaged over however many exist;
    /// none at all yields an all-zero aggregate.
    ///
    /// # Errors
    /// - AppError::Validation if `window` is zero
    /// - AppError::Database if the source query fails
    pub async fn rolling_stats(&self, probe_name: &str, window: usize) -> Result<RollingAggregate> {
        if window == 0 {
            return Err(AppError::Validation(
                "rolling window must be at least 1".to_string(),
            ));
        }

        let samples = self.source.query_recent(probe_name, window).await?;
        let aggregate = RollingAggregate::from_samples(&samples);

        debug!(
            probe = %probe_name,
            window,
            samples = aggregate.sample_count,
            pass_rate = aggregate.pass_rate,
            "Computed rolling statistics"
        );

        Ok(aggregate)
    }
}
