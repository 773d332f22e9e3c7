// Terminal report for a probe cycle

use colored::Colorize;
use ripley_core::application::{CycleReport, ProbeHealth};
use ripley_core::domain::Outcome;
use tabled::{Table, Tabled};

#[derive(Tabled)]
struct HealthRow {
    #[tabled(rename = "")]
    status: String,
    #[tabled(rename = "Probe")]
    probe: String,
    #[tabled(rename = "Avg Tokens")]
    avg_tokens: String,
    #[tabled(rename = "Avg Duration")]
    avg_duration: String,
    #[tabled(rename = "Pass Rate")]
    pass_rate: String,
    #[tabled(rename = "Runs")]
    runs: usize,
}

impl From<&ProbeHealth> for HealthRow {
    fn from(health: &ProbeHealth) -> Self {
        let stats = &health.aggregate;
        Self {
            status: if health.degraded { "⚠" } else { "✓" }.to_string(),
            probe: health.probe_name.clone(),
            avg_tokens: format!("{:.1}", stats.avg_tokens),
            avg_duration: format!("{:.2}s", stats.avg_duration_secs),
            pass_rate: format!("{:.0}%", stats.pass_rate * 100.0),
            runs: stats.sample_count,
        }
    }
}

pub fn format_outcome(outcome: &Outcome) -> String {
    let status = if outcome.passed {
        "[PASS]".green().bold()
    } else {
        "[FAIL]".red().bold()
    };

    format!(
        "{} {} | Effort: {} | Tokens: {} | Duration: {:.2}s\n  Quote: {}\n  Output: {}",
        status,
        outcome.probe_name,
        outcome.effort,
        outcome.tokens_used,
        outcome.duration.as_secs_f64(),
        outcome.quote.italic(),
        outcome.output
    )
}

pub fn format_health(health: &[ProbeHealth]) -> String {
    let rows: Vec<HealthRow> = health.iter().map(HealthRow::from).collect();
    Table::new(rows).to_string()
}

pub fn print_cycle(report: &CycleReport, rolling_window: usize) {
    println!(
        "{}",
        format!("Cycle {} results", report.cycle).cyan().bold()
    );
    for outcome in &report.outcomes {
        println!("{}", format_outcome(outcome));
    }

    println!();
    println!(
        "{}",
        format!("Rolling statistics (last {} runs)", rolling_window)
            .cyan()
            .bold()
    );
    println!("{}", format_health(&report.health));

    let degraded: Vec<&str> = report.degraded().map(|h| h.probe_name.as_str()).collect();
    if !degraded.is_empty() {
        println!(
            "{} {}",
            "⚠ Degraded:".yellow().bold(),
            degraded.join(", ")
        );
    }
    println!();
}
