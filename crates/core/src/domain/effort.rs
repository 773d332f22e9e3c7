// Effort Classifier

use super::probe::ProbeDefinition;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Three-tier label describing how well a run respected its budgets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EffortTier {
    Good,
    Medium,
    Poor,
}

impl EffortTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            EffortTier::Good => "good",
            EffortTier::Medium => "medium",
            EffortTier::Poor => "poor",
        }
    }
}

impl std::fmt::Display for EffortTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw measurements of a single run, before tiering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Measurement {
    pub passed: bool,
    pub tokens_used: u64,
    pub duration: Duration,
}

/// Derive the effort tier for a measurement. First match wins:
/// failed => poor, within budgets => good, within 2x budgets => medium, else poor.
pub fn classify(measurement: &Measurement, probe: &ProbeDefinition) -> EffortTier {
    if !measurement.passed {
        return EffortTier::Poor;
    }

    if probe.within_budget(measurement.tokens_used, measurement.duration, 1) {
        EffortTier::Good
    } else if probe.within_budget(measurement.tokens_used, measurement.duration, 2) {
        EffortTier::Medium
    } else {
        EffortTier::Poor
    }
}
