// Agent Invoker Port
// Abstraction for running the external AI agent against one probe

use crate::domain::ProbeDefinition;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// A run where the agent process exited on its own before the deadline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedRun {
    /// Combined stdout and stderr, untrimmed
    pub output: String,
    /// Wall time from launch to exit
    pub elapsed: Duration,
    /// Set when the process exited unsuccessfully or could not be waited on
    pub exit_error: Option<String>,
}

/// Invocation errors (both are terminal for the execution, never retried)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvocationError {
    /// Process could not be started. Carries the launch error text.
    #[error("{0}")]
    LaunchFailed(String),

    /// Deadline fired first and the process was killed
    #[error("Process timed out after {elapsed:?}")]
    TimedOut { elapsed: Duration },
}

/// Agent Invoker trait
///
/// Implementations:
/// - SubprocessAgentInvoker: spawns the agent CLI and races it against the probe deadline
#[async_trait]
pub trait AgentInvoker: Send + Sync {
    /// Deliver the probe prompt to the agent and wait at most `probe.timeout()`
    ///
    /// # Errors
    /// - InvocationError::LaunchFailed if the process cannot be started
    /// - InvocationError::TimedOut if the deadline fires before the process exits
    async fn invoke(&self, probe: &ProbeDefinition) -> Result<CompletedRun, InvocationError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    /// Mock invoker behavior
    #[derive(Debug, Clone)]
    pub enum MockBehavior {
        /// Exit normally with output after `elapsed`
        Reply { output: String, elapsed: Duration },
        /// Exit with an error status
        ExitError {
            output: String,
            elapsed: Duration,
            error: String,
        },
        /// Fail to launch with message
        LaunchFail(String),
        /// Time out after `elapsed`
        Timeout(Duration),
    }

    impl MockBehavior {
        pub fn reply(output: impl Into<String>, elapsed_ms: u64) -> Self {
            MockBehavior::Reply {
                output: output.into(),
                elapsed: Duration::from_millis(elapsed_ms),
            }
        }
    }

    /// Mock Agent Invoker for testing
    pub struct MockAgentInvoker {
        default: MockBehavior,
        per_probe: Arc<Mutex<HashMap<String, MockBehavior>>>,
        calls: Arc<Mutex<Vec<String>>>,
    }

    impl MockAgentInvoker {
        pub fn new(default: MockBehavior) -> Self {
            Self {
                default,
                per_probe: Arc::new(Mutex::new(HashMap::new())),
                calls: Arc::new(Mutex::new(Vec::new())),
            }
        }

        pub fn with_behavior(self, probe_name: impl Into<String>, behavior: MockBehavior) -> Self {
            self.per_probe
                .lock()
                .unwrap()
                .insert(probe_name.into(), behavior);
            self
        }

        /// Probe names in invocation order
        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl AgentInvoker for MockAgentInvoker {
        async fn invoke(&self, probe: &ProbeDefinition) -> Result<CompletedRun, InvocationError> {
            self.calls.lock().unwrap().push(probe.name.clone());

            let behavior = self
                .per_probe
                .lock()
                .unwrap()
                .get(&probe.name)
                .cloned()
                .unwrap_or_else(|| self.default.clone());

            match behavior {
                MockBehavior::Reply { output, elapsed } => Ok(CompletedRun {
                    output,
                    elapsed,
                    exit_error: None,
                }),
                MockBehavior::ExitError {
                    output,
                    elapsed,
                    error,
                } => Ok(CompletedRun {
                    output,
                    elapsed,
                    exit_error: Some(error),
                }),
                MockBehavior::LaunchFail(msg) => Err(InvocationError::LaunchFailed(msg)),
                MockBehavior::Timeout(elapsed) => Err(InvocationError::TimedOut { elapsed }),
            }
        }
    }
}
