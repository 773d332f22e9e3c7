// Outcome Domain Model

use super::effort::EffortTier;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Output recorded when the agent did not finish within its budget
pub const TIMED_OUT_OUTPUT: &str = "Timed out";

/// Result of one probe execution. Created once, never mutated after recording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    pub probe_name: String,
    pub passed: bool,
    pub tokens_used: u64,
    pub duration: Duration,
    pub effort: EffortTier,
    pub quote: String,
    pub output: String,
    pub created_at: i64, // epoch ms
}

impl Outcome {
    pub fn duration_ms(&self) -> i64 {
        self.duration.as_millis() as i64
    }
}

/// Projection of an outcome used for rolling statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutcomeSample {
    pub tokens_used: u64,
    pub duration_ms: i64,
    pub passed: bool,
}

impl From<&Outcome> for OutcomeSample {
    fn from(outcome: &Outcome) -> Self {
        Self {
            tokens_used: outcome.tokens_used,
            duration_ms: outcome.duration_ms(),
            passed: outcome.passed,
        }
    }
}

/// Approximate token count: number of whitespace-separated words.
/// This is not the agent's own token accounting.
pub fn count_tokens(output: &str) -> u64 {
    output.split_whitespace().count() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_tokens_splits_on_any_whitespace() {
        assert_eq!(count_tokens(""), 0);
        assert_eq!(count_tokens("   \n\t "), 0);
        assert_eq!(count_tokens("5050"), 1);
        assert_eq!(count_tokens("[5, 4, 3, 2, 1]\n"), 5);
        assert_eq!(count_tokens("  a\tb\nc  d "), 4);
    }

    #[test]
    fn test_sample_converts_duration_to_millis() {
        let outcome = Outcome {
            probe_name: "p".to_string(),
            passed: true,
            tokens_used: 3,
            duration: Duration::from_millis(1_250),
            effort: EffortTier::Good,
            quote: String::new(),
            output: "a b c".to_string(),
            created_at: 0,
        };

        let sample = OutcomeSample::from(&outcome);
        assert_eq!(sample.duration_ms, 1_250);
        assert_eq!(sample.tokens_used, 3);
        assert!(sample.passed);
    }
}
