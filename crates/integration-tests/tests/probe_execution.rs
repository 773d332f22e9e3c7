//! End-to-end probe execution against a real subprocess
//!
//! `sh -c` stands in for the agent CLI so no external tool is needed.
#![cfg(unix)]

use std::sync::Arc;
use std::time::Duration;

use ripley_core::application::{
    ExecutionEngine, Monitor, MonitorSettings, QuoteSelector, StatisticsAggregator,
};
use ripley_core::application::quotes::quotes_for;
use ripley_core::domain::{EffortTier, ProbeDefinition, TIMED_OUT_OUTPUT};
use ripley_core::port::SystemTimeProvider;
use ripley_infra_sqlite::{create_pool, run_migrations, SqliteOutcomeRepository};
use ripley_infra_system::{AgentCommand, SubprocessAgentInvoker};

fn agent(script: &str) -> Arc<SubprocessAgentInvoker> {
    Arc::new(SubprocessAgentInvoker::new(AgentCommand::new(
        "sh",
        vec!["-c".to_string(), script.to_string(), "sh".to_string()],
    )))
}

async fn engine_with(invoker: Arc<SubprocessAgentInvoker>) -> (ExecutionEngine, Arc<SqliteOutcomeRepository>) {
    let pool = create_pool("sqlite::memory:").await.unwrap();
    run_migrations(&pool).await.unwrap();
    let repo = Arc::new(SqliteOutcomeRepository::new(pool));

    let engine = ExecutionEngine::new(
        invoker,
        repo.clone(),
        Arc::new(SystemTimeProvider),
        QuoteSelector::seeded(7),
    );
    (engine, repo)
}

#[tokio::test]
async fn test_concise_answer_is_good_effort() {
    let (engine, _) = engine_with(agent("cat > /dev/null; echo 5050")).await;
    let probe = ProbeDefinition::new("Sum1to100", "Sum 1 to 100", 10, 5).unwrap();

    let outcome = engine.execute_and_record(&probe).await;

    assert!(outcome.passed);
    assert_eq!(outcome.tokens_used, 1);
    assert_eq!(outcome.output, "5050");
    assert_eq!(outcome.effort, EffortTier::Good);
    assert!(quotes_for(EffortTier::Good).contains(&outcome.quote.as_str()));
}

#[tokio::test]
async fn test_verbose_answer_fails_budget() {
    let (engine, _) = engine_with(agent("echo the answer is one hundred and five")).await;
    let probe = ProbeDefinition::new("Verbose", "What is 15 * 7?", 2, 5).unwrap();

    let outcome = engine.execute(&probe).await;

    assert!(!outcome.passed);
    assert_eq!(outcome.tokens_used, 7);
    assert_eq!(outcome.effort, EffortTier::Poor);
}

#[tokio::test]
async fn test_hung_agent_times_out() {
    let (engine, _) = engine_with(agent("sleep 30")).await;
    let probe = ProbeDefinition::new("Hang", "Say hi", 5, 1).unwrap();

    let outcome = engine.execute(&probe).await;

    assert!(!outcome.passed);
    assert_eq!(outcome.tokens_used, 0);
    assert_eq!(outcome.output, TIMED_OUT_OUTPUT);
    assert_eq!(outcome.effort, EffortTier::Poor);
    assert!(outcome.duration >= Duration::from_secs(1));
    assert!(outcome.duration < Duration::from_secs(10));
}

#[tokio::test]
async fn test_missing_agent_binary() {
    let invoker = Arc::new(SubprocessAgentInvoker::new(AgentCommand::new(
        "/nonexistent/agent-cli",
        vec![],
    )));
    let (engine, _) = engine_with(invoker).await;
    let probe = ProbeDefinition::new("Missing", "Say hi", 5, 5).unwrap();

    let outcome = engine.execute(&probe).await;

    assert!(!outcome.passed);
    assert_eq!(outcome.tokens_used, 0);
    assert_eq!(outcome.duration, Duration::ZERO);
    assert_eq!(outcome.effort, EffortTier::Poor);
    assert!(!outcome.output.is_empty());
}

#[tokio::test]
async fn test_failing_exit_code_fails_probe() {
    let (engine, _) = engine_with(agent("echo 105; exit 1")).await;
    let probe = ProbeDefinition::new("Arith", "What is 15 * 7?", 5, 5).unwrap();

    let outcome = engine.execute(&probe).await;

    assert!(!outcome.passed);
    assert_eq!(outcome.output, "105");
    assert_eq!(outcome.effort, EffortTier::Poor);
}

/// A full monitor cycle records outcomes and reports rolling health
#[tokio::test]
async fn test_monitor_cycle_end_to_end() {
    let (engine, repo) = engine_with(agent("cat > /dev/null; echo ok")).await;
    let probes = vec![
        ProbeDefinition::new("First", "Reply ok", 5, 5).unwrap(),
        ProbeDefinition::new("Second", "Reply ok", 5, 5).unwrap(),
    ];
    let monitor = Monitor::new(
        Arc::new(engine),
        StatisticsAggregator::new(repo),
        probes,
        MonitorSettings {
            interval: Duration::from_secs(60),
            rolling_window: 10,
            warning_threshold: 0.7,
        },
    )
    .unwrap();

    monitor.run_cycle(1).await;
    let report = monitor.run_cycle(2).await;

    assert_eq!(report.outcomes.len(), 2);
    assert!(report.outcomes.iter().all(|o| o.passed));
    assert_eq!(report.health.len(), 2);
    for health in &report.health {
        assert_eq!(health.aggregate.sample_count, 2);
        assert_eq!(health.aggregate.pass_rate, 1.0);
        assert!(!health.degraded);
    }
}
