//! Ripley - Main Entry Point
//! Periodically probes a coding agent CLI and tracks effort over time

mod config;
mod report;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::RipleyConfig;
use ripley_core::application::{
    shutdown_channel, ExecutionEngine, Monitor, QuoteSelector, StatisticsAggregator,
};
use ripley_core::domain::builtin_probes;
use ripley_core::port::SystemTimeProvider;
use ripley_infra_sqlite::{create_pool, run_migrations, SqliteOutcomeRepository};
use ripley_infra_system::SubprocessAgentInvoker;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "ripley")]
#[command(about = "Watches a coding agent for declining effort", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to YAML configuration (default: ./config.yaml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Run a single probe cycle and exit
    #[arg(long)]
    once: bool,
}

fn init_logging() -> Result<()> {
    let log_format = std::env::var("RIPLEY_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("ripley=info"))
        .context("Failed to create env filter")?;

    // Logs go to stderr; stdout carries the report
    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().pretty().with_writer(std::io::stderr))
                .init();
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1. Logging
    init_logging()?;
    info!("Ripley v{} starting...", VERSION);

    // 2. Configuration
    let (cfg, source) = RipleyConfig::load(cli.config.as_deref())?;
    let settings = cfg.monitor_settings()?;
    let db_path = cfg.db_path();
    info!(source = %source, db_path = %db_path, model = %cfg.claude.model, "Configuration loaded");

    // 3. Database
    let pool = create_pool(&db_path)
        .await
        .map_err(|e| anyhow::anyhow!("DB pool creation failed: {}", e))?;
    run_migrations(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;

    // 4. Wiring
    let repo = Arc::new(SqliteOutcomeRepository::new(pool.clone()));
    let invoker = Arc::new(SubprocessAgentInvoker::new(cfg.agent_command()));
    let engine = Arc::new(ExecutionEngine::new(
        invoker,
        repo.clone(),
        Arc::new(SystemTimeProvider),
        QuoteSelector::from_entropy(),
    ));
    let probes = builtin_probes().context("Built-in probe table is invalid")?;
    let monitor = Monitor::new(
        engine,
        StatisticsAggregator::new(repo),
        probes,
        settings.clone(),
    )
    .map_err(|e| anyhow::anyhow!("Monitor setup failed: {}", e))?;

    println!(
        "{} model={} interval={} window={} db={}",
        "Ripley is watching.".green().bold(),
        cfg.claude.model,
        cfg.daemon.interval,
        settings.rolling_window,
        db_path
    );

    // 5. Run
    if cli.once {
        let cycle_report = monitor.run_cycle(1).await;
        report::print_cycle(&cycle_report, settings.rolling_window);
        pool.close().await;
        return Ok(());
    }

    info!("Press Ctrl+C to shutdown");
    let (shutdown_tx, shutdown_rx) = shutdown_channel();
    let window = settings.rolling_window;
    let run = monitor.run(shutdown_rx, |cycle| report::print_cycle(cycle, window));
    tokio::pin!(run);

    tokio::select! {
        _ = &mut run => {}
        signal = tokio::signal::ctrl_c() => {
            signal?;
            info!("Shutdown signal received. Finishing current cycle...");
            shutdown_tx.shutdown();
            run.await;
        }
    }

    pool.close().await;
    info!("Shutdown complete.");

    Ok(())
}
