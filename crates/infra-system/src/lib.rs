// Ripley Infrastructure - System Adapters
// Implements: AgentInvoker

pub mod subprocess_invoker;

pub use subprocess_invoker::{AgentCommand, SubprocessAgentInvoker, MAX_TOKENS_FLAG};
