// Port Layer - Interfaces for external dependencies

pub mod agent_invoker;
pub mod outcome_repository;
pub mod time_provider;

// Re-exports
pub use agent_invoker::{AgentInvoker, CompletedRun, InvocationError};
pub use outcome_repository::OutcomeRepository;
pub use time_provider::{SystemTimeProvider, TimeProvider};
