// Monitor - fixed-interval probe cycles

mod shutdown;

pub use shutdown::{shutdown_channel, ShutdownSender, ShutdownToken};

use crate::application::engine::ExecutionEngine;
use crate::application::stats::StatisticsAggregator;
use crate::domain::{Outcome, ProbeDefinition, RollingAggregate};
use crate::error::{AppError, Result};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, info, warn};

/// Loop settings (validated by the configuration layer)
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorSettings {
    pub interval: Duration,
    pub rolling_window: usize,
    /// Pass rate below this marks a probe as degraded
    pub warning_threshold: f64,
}

/// Rolling health of one probe after a cycle
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeHealth {
    pub probe_name: String,
    pub aggregate: RollingAggregate,
    pub degraded: bool,
}

/// Everything produced by one cycle
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    pub cycle: u64,
    pub outcomes: Vec<Outcome>,
    pub health: Vec<ProbeHealth>,
}

impl CycleReport {
    pub fn degraded(&self) -> impl Iterator<Item = &ProbeHealth> {
        self.health.iter().filter(|h| h.degraded)
    }
}

pub struct Monitor {
    engine: Arc<ExecutionEngine>,
    aggregator: StatisticsAggregator,
    probes: Vec<ProbeDefinition>,
    settings: MonitorSettings,
}

impl Monitor {
    /// # Errors
    /// - AppError::Validation if there are no probes or two share a name
    /// - AppError::Domain if a probe definition is invalid
    pub fn new(
        engine: Arc<ExecutionEngine>,
        aggregator: StatisticsAggregator,
        probes: Vec<ProbeDefinition>,
        settings: MonitorSettings,
    ) -> Result<Self> {
        if probes.is_empty() {
            return Err(AppError::Validation("no probes to run".to_string()));
        }

        let mut names = HashSet::with_capacity(probes.len());
        for probe in &probes {
            probe.validate()?;
            if !names.insert(probe.name.as_str()) {
                return Err(AppError::Validation(format!(
                    "duplicate probe name: {}",
                    probe.name
                )));
            }
        }

        Ok(Self {
            engine,
            aggregator,
            probes,
            settings,
        })
    }

    /// Run every probe once, then compute rolling health for each.
    /// A failed statistics query is logged and that probe is left out.
    pub async fn run_cycle(&self, cycle: u64) -> CycleReport {
        info!(cycle, probes = self.probes.len(), "Starting probe cycle");

        let outcomes = self.engine.run_all(&self.probes).await;

        let mut health = Vec::with_capacity(self.probes.len());
        for probe in &self.probes {
            match self
                .aggregator
                .rolling_stats(&probe.name, self.settings.rolling_window)
                .await
            {
                Ok(aggregate) => {
                    let degraded = aggregate.pass_rate < self.settings.warning_threshold;
                    if degraded {
                        warn!(
                            probe = %probe.name,
                            pass_rate = aggregate.pass_rate,
                            threshold = self.settings.warning_threshold,
                            "Probe pass rate below warning threshold"
                        );
                    }
                    health.push(ProbeHealth {
                        probe_name: probe.name.clone(),
                        aggregate,
                        degraded,
                    });
                }
                Err(e) => {
                    error!(probe = %probe.name, error = %e, "Failed to compute rolling statistics");
                }
            }
        }

        CycleReport {
            cycle,
            outcomes,
            health,
        }
    }

    /// Repeat cycles every `interval` until shutdown is signalled.
    /// An in-flight cycle always runs to completion.
    pub async fn run<F>(&self, mut shutdown: ShutdownToken, mut on_cycle: F)
    where
        F: FnMut(&CycleReport),
    {
        info!(
            interval_secs = self.settings.interval.as_secs_f64(),
            rolling_window = self.settings.rolling_window,
            "Monitor started"
        );

        let mut cycle = 0u64;
        loop {
            if shutdown.is_shutdown() {
                break;
            }

            cycle += 1;
            let report = self.run_cycle(cycle).await;
            on_cycle(&report);

            tokio::select! {
                _ = sleep(self.settings.interval) => {},
                _ = shutdown.wait() => {
                    info!("Monitor interrupted during sleep");
                    break;
                }
            }
        }

        info!(cycles = cycle, "Monitor stopped");
    }
}
