// Execution Engine
// Turns one agent invocation into a classified, recorded Outcome

use crate::application::quotes::QuoteSelector;
use crate::domain::{
    classify, count_tokens, Measurement, Outcome, ProbeDefinition, TIMED_OUT_OUTPUT,
};
use crate::port::{AgentInvoker, InvocationError, OutcomeRepository, TimeProvider};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// Runs probes one at a time and records every outcome
pub struct ExecutionEngine {
    invoker: Arc<dyn AgentInvoker>,
    recorder: Arc<dyn OutcomeRepository>,
    time_provider: Arc<dyn TimeProvider>,
    quotes: QuoteSelector,
}

impl ExecutionEngine {
    pub fn new(
        invoker: Arc<dyn AgentInvoker>,
        recorder: Arc<dyn OutcomeRepository>,
        time_provider: Arc<dyn TimeProvider>,
        quotes: QuoteSelector,
    ) -> Self {
        Self {
            invoker,
            recorder,
            time_provider,
            quotes,
        }
    }

    /// Execute a probe and derive its outcome (no persistence)
    pub async fn execute(&self, probe: &ProbeDefinition) -> Outcome {
        info!(
            probe = %probe.name,
            max_tokens = probe.max_tokens,
            max_duration_secs = probe.max_duration_secs,
            "Executing probe"
        );

        let (measurement, output) = match self.invoker.invoke(probe).await {
            Err(InvocationError::LaunchFailed(message)) => {
                error!(probe = %probe.name, error = %message, "Agent launch failed");
                (
                    Measurement {
                        passed: false,
                        tokens_used: 0,
                        duration: Duration::ZERO,
                    },
                    message,
                )
            }
            Err(InvocationError::TimedOut { elapsed }) => {
                warn!(
                    probe = %probe.name,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Agent timed out and was killed"
                );
                (
                    Measurement {
                        passed: false,
                        tokens_used: 0,
                        duration: elapsed,
                    },
                    TIMED_OUT_OUTPUT.to_string(),
                )
            }
            Ok(run) => {
                let tokens_used = count_tokens(&run.output);
                let within_budget = probe.within_budget(tokens_used, run.elapsed, 1);

                if let Some(exit_error) = &run.exit_error {
                    warn!(probe = %probe.name, error = %exit_error, "Agent exited with error");
                }

                (
                    Measurement {
                        passed: within_budget && run.exit_error.is_none(),
                        tokens_used,
                        duration: run.elapsed,
                    },
                    run.output.trim().to_string(),
                )
            }
        };

        let effort = classify(&measurement, probe);
        let quote = self.quotes.pick(effort);

        let outcome = Outcome {
            probe_name: probe.name.clone(),
            passed: measurement.passed,
            tokens_used: measurement.tokens_used,
            duration: measurement.duration,
            effort,
            quote: quote.to_string(),
            output,
            created_at: self.time_provider.now_millis(),
        };

        info!(
            probe = %outcome.probe_name,
            passed = outcome.passed,
            tokens_used = outcome.tokens_used,
            duration_ms = outcome.duration_ms(),
            effort = %outcome.effort,
            "Probe executed"
        );

        outcome
    }

    /// Execute a probe and hand the outcome to the recorder.
    /// A recording failure is logged; the outcome is still returned.
    pub async fn execute_and_record(&self, probe: &ProbeDefinition) -> Outcome {
        let outcome = self.execute(probe).await;

        if let Err(e) = self.recorder.insert(&outcome).await {
            error!(probe = %outcome.probe_name, error = %e, "Failed to record outcome");
        }

        outcome
    }

    /// Run every probe strictly in order
    pub async fn run_all(&self, probes: &[ProbeDefinition]) -> Vec<Outcome> {
        let mut outcomes = Vec::with_capacity(probes.len());
        for probe in probes {
            outcomes.push(self.execute_and_record(probe).await);
        }
        outcomes
    }
}
