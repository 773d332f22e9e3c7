// Application Layer - Use Cases and Business Logic

pub mod engine;
pub mod monitor;
pub mod quotes;
pub mod stats;

// Re-exports
pub use engine::ExecutionEngine;
pub use monitor::{
    shutdown_channel, CycleReport, Monitor, MonitorSettings, ProbeHealth, ShutdownSender,
    ShutdownToken,
};
pub use quotes::QuoteSelector;
pub use stats::StatisticsAggregator;
