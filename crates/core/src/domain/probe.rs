// Probe Definition Table

use super::error::{DomainError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A deterministic prompt with the resource budgets the agent must respect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeDefinition {
    pub name: String,
    pub prompt: String,
    pub max_tokens: u64,
    pub max_duration_secs: u64,
}

impl ProbeDefinition {
    /// Create a validated probe definition
    ///
    /// # Errors
    /// - DomainError::InvalidProbe if the name or prompt is blank, or a budget is zero
    pub fn new(
        name: impl Into<String>,
        prompt: impl Into<String>,
        max_tokens: u64,
        max_duration_secs: u64,
    ) -> Result<Self> {
        let probe = Self {
            name: name.into(),
            prompt: prompt.into(),
            max_tokens,
            max_duration_secs,
        };
        probe.validate()?;
        Ok(probe)
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::InvalidProbe("name is empty".to_string()));
        }
        if self.prompt.trim().is_empty() {
            return Err(DomainError::InvalidProbe(format!(
                "{}: prompt is empty",
                self.name
            )));
        }
        if self.max_tokens == 0 {
            return Err(DomainError::InvalidProbe(format!(
                "{}: max_tokens must be positive",
                self.name
            )));
        }
        if self.max_duration_secs == 0 {
            return Err(DomainError::InvalidProbe(format!(
                "{}: max_duration_secs must be positive",
                self.name
            )));
        }
        Ok(())
    }

    /// Hard deadline for a single execution
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.max_duration_secs)
    }

    /// True if both token count and elapsed time fit the budgets scaled by `factor`.
    /// Duration is compared in fractional seconds.
    pub fn within_budget(&self, tokens_used: u64, elapsed: Duration, factor: u64) -> bool {
        tokens_used <= self.max_tokens.saturating_mul(factor)
            && elapsed.as_secs_f64() <= self.max_duration_secs as f64 * factor as f64
    }
}

/// The fixed probe set exercised on every cycle.
/// Simple, deterministic tasks that verify liveness and effort.
pub fn builtin_probes() -> Result<Vec<ProbeDefinition>> {
    [
        (
            "Sum1to100",
            "Calculate the sum of integers from 1 to 100. Respond with only the number, no explanation.",
            10,
            5,
        ),
        (
            "PalindromeCheck",
            "Is 'racecar' a palindrome? Answer with only 'true' or 'false'.",
            5,
            5,
        ),
        (
            "SimpleArithmetic",
            "What is 15 * 7? Respond with only the number.",
            5,
            5,
        ),
        (
            "ListReverse",
            "Reverse this list: [1, 2, 3, 4, 5]. Respond with only the reversed list in the same format.",
            15,
            5,
        ),
    ]
    .into_iter()
    .map(|(name, prompt, max_tokens, max_duration_secs)| {
        ProbeDefinition::new(name, prompt, max_tokens, max_duration_secs)
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_builtin_probes_are_valid() {
        let probes = builtin_probes().unwrap();
        assert_eq!(probes.len(), 4);

        for probe in &probes {
            assert!(probe.validate().is_ok(), "{} is invalid", probe.name);
        }
    }

    #[test]
    fn test_builtin_probe_names_unique() {
        let probes = builtin_probes().unwrap();
        let names: HashSet<_> = probes.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names.len(), probes.len());
    }

    #[test]
    fn test_new_rejects_zero_budgets() {
        assert!(matches!(
            ProbeDefinition::new("p", "prompt", 0, 5),
            Err(DomainError::InvalidProbe(_))
        ));
        assert!(matches!(
            ProbeDefinition::new("p", "prompt", 5, 0),
            Err(DomainError::InvalidProbe(_))
        ));
        assert!(ProbeDefinition::new("  ", "prompt", 5, 5).is_err());
        assert!(ProbeDefinition::new("p", "", 5, 5).is_err());
    }

    #[test]
    fn test_within_budget_uses_fractional_seconds() {
        let probe = ProbeDefinition::new("p", "prompt", 10, 5).unwrap();

        assert!(probe.within_budget(10, Duration::from_secs(5), 1));
        // 5.001s must not be truncated to 5s
        assert!(!probe.within_budget(10, Duration::from_millis(5001), 1));
        assert!(!probe.within_budget(11, Duration::from_secs(1), 1));
        assert!(probe.within_budget(20, Duration::from_secs(10), 2));
    }

    #[test]
    fn test_within_budget_handles_huge_duration_budget() {
        let probe = ProbeDefinition::new("p", "prompt", 10, u64::MAX / 2 + 1).unwrap();

        assert!(probe.within_budget(10, Duration::from_secs(1), 1));
        // 15 tokens is over 1x but within 2x; scaling the duration must not overflow
        assert!(!probe.within_budget(15, Duration::from_secs(1), 1));
        assert!(probe.within_budget(15, Duration::from_secs(1), 2));
    }
}
