// Domain Layer - Pure business logic and entities

pub mod effort;
pub mod error;
pub mod outcome;
pub mod probe;
pub mod stats;

// Re-exports
pub use effort::{classify, EffortTier, Measurement};
pub use error::DomainError;
pub use outcome::{count_tokens, Outcome, OutcomeSample, TIMED_OUT_OUTPUT};
pub use probe::{builtin_probes, ProbeDefinition};
pub use stats::RollingAggregate;
