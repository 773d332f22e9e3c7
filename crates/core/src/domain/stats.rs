// Rolling Aggregate (derived, never stored)

use super::outcome::OutcomeSample;
use serde::{Deserialize, Serialize};

/// Means over the most recent window of outcomes for one probe
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RollingAggregate {
    pub avg_tokens: f64,
    pub avg_duration_secs: f64,
    /// 0.0 - 1.0
    pub pass_rate: f64,
    pub sample_count: usize,
}

impl RollingAggregate {
    /// Average over exactly the given samples. An empty slice yields all zeros.
    pub fn from_samples(samples: &[OutcomeSample]) -> Self {
        if samples.is_empty() {
            return Self::default();
        }

        let n = samples.len() as f64;
        let total_tokens: f64 = samples.iter().map(|s| s.tokens_used as f64).sum();
        let total_ms: f64 = samples.iter().map(|s| s.duration_ms as f64).sum();
        let passed = samples.iter().filter(|s| s.passed).count() as f64;

        Self {
            avg_tokens: total_tokens / n,
            avg_duration_secs: total_ms / n / 1000.0,
            pass_rate: passed / n,
            sample_count: samples.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sample_count == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(tokens_used: u64, secs: i64, passed: bool) -> OutcomeSample {
        OutcomeSample {
            tokens_used,
            duration_ms: secs * 1000,
            passed,
        }
    }

    #[test]
    fn test_empty_is_all_zero() {
        let agg = RollingAggregate::from_samples(&[]);
        assert_eq!(agg.avg_tokens, 0.0);
        assert_eq!(agg.avg_duration_secs, 0.0);
        assert_eq!(agg.pass_rate, 0.0);
        assert!(agg.is_empty());
    }

    #[test]
    fn test_mixed_samples() {
        let samples = [
            sample(10, 1, true),
            sample(12, 2, true),
            sample(20, 3, false),
            sample(8, 1, true),
        ];

        let agg = RollingAggregate::from_samples(&samples);
        assert!((agg.avg_tokens - 12.5).abs() < 1e-9);
        assert!((agg.avg_duration_secs - 1.75).abs() < 1e-9);
        assert!((agg.pass_rate - 0.75).abs() < 1e-9);
        assert_eq!(agg.sample_count, 4);
    }

    #[test]
    fn test_sub_second_durations_keep_precision() {
        let samples = [
            OutcomeSample {
                tokens_used: 1,
                duration_ms: 250,
                passed: false,
            },
            OutcomeSample {
                tokens_used: 2,
                duration_ms: 500,
                passed: false,
            },
        ];

        let agg = RollingAggregate::from_samples(&samples);
        assert!((agg.avg_duration_secs - 0.375).abs() < 1e-9);
        assert_eq!(agg.pass_rate, 0.0);
    }
}
