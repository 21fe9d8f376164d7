//! Command-line runner for the bundled falsify property suite.

mod suite;

use clap::Parser;
use falsify_check::{
    Adjustment, BudgetPolicy, CancelToken, CheckError, RunConfig, RunReport, Runner, Status,
    TracingObserver,
};
use falsify_gen::GenError;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("invalid budget: {value} seconds")]
    InvalidBudget { value: f64 },

    #[error("no spec matches filter {filter:?}")]
    NoSpecs { filter: String },

    #[error("generator error: {0}")]
    Gen(#[from] GenError),

    #[error("check error: {0}")]
    Check(#[from] CheckError),
}

type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "falsify", version)]
#[command(about = "Budgeted property-based testing with shrinking", long_about = None)]
struct Cli {
    /// Wall-clock budget in seconds, shared by all properties
    #[arg(long, default_value = "10")]
    budget: f64,

    /// Seed for the random state (default: from entropy)
    #[arg(long)]
    seed: Option<u64>,

    /// Attempts per property used to measure its cost
    #[arg(long, default_value = "10")]
    calibration: u64,

    /// Maximum attempts for properties over infinite domains
    #[arg(long, default_value = "10000")]
    ceiling: u64,

    /// Only run specs whose name contains this substring
    #[arg(long)]
    filter: Option<String>,

    /// Show debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();

    match cmd_run(&cli) {
        Ok(report) => {
            print_report(&report);
            if !report.success() {
                std::process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    }
}

fn cmd_run(cli: &Cli) -> CliResult<RunReport> {
    let budget = Duration::try_from_secs_f64(cli.budget)
        .map_err(|_| CliError::InvalidBudget { value: cli.budget })?;
    let config = RunConfig {
        budget,
        seed: cli.seed,
        policy: BudgetPolicy {
            calibration_attempts: cli.calibration,
            infinite_ceiling: cli.ceiling,
            ..BudgetPolicy::default()
        },
        ..RunConfig::default()
    };

    let mut runner = Runner::new(config);
    for (name, spec) in suite::demo()? {
        if cli.filter.as_deref().map_or(true, |f| name.contains(f)) {
            runner.add(name, spec)?;
        }
    }
    if runner.is_empty() {
        return Err(CliError::NoSpecs {
            filter: cli.filter.clone().unwrap_or_default(),
        });
    }

    // Shrinking may run past the budget; stop hard at twice the budget.
    let mut cancel = CancelToken::new();
    if let Some(deadline) = budget.checked_mul(2).and_then(|d| Instant::now().checked_add(d)) {
        cancel = cancel.with_deadline(deadline);
    }
    info!(seed = ?cli.seed, budget_secs = cli.budget, "running demo suite");
    Ok(runner.run(&mut TracingObserver, &cancel)?)
}

fn print_report(report: &RunReport) {
    if let Some(adjustment) = &report.adjustment {
        println!("Budget: {}", describe(adjustment));
        for entry in &report.budgets {
            println!(
                "  {:<28} {:<9} ideal {:>6}  allocated {:>6}  ~{:.1?}",
                entry.name,
                entry.class.to_string(),
                entry.ideal,
                entry.allocated,
                entry.estimated_time()
            );
        }
    }

    println!();
    println!("Properties:");
    for outcome in &report.properties {
        println!(
            "  {:<14} {:<28} {:>6} attempts  {:.1?}",
            outcome.status.label().to_uppercase(),
            outcome.name,
            outcome.attempts,
            outcome.elapsed
        );
        if let Status::Failed {
            counterexample: Some(cx),
        } = &outcome.status
        {
            println!("      counterexample: {}", cx);
            println!("      shrink steps:   {}", cx.shrink_steps);
        }
    }

    println!();
    println!("Specs:");
    for spec in &report.specs {
        println!("  {:<14} {}", spec.status.label().to_uppercase(), spec.name);
    }

    println!();
    println!(
        "Result: {} ({} passed, {} failed, {} undeterminable, {} skipped) in {:.2?}",
        if report.success() { "OK" } else { "FAILED" },
        report.count("passed"),
        report.count("failed"),
        report.count("undeterminable"),
        report.count("skipped"),
        report.elapsed
    );
    if report.cancelled {
        println!("Run was cancelled before completion.");
    }
}

fn describe(adjustment: &Adjustment) -> String {
    match adjustment {
        Adjustment::Boosted { slack, spent } => {
            format!("fits, {:.2?} of {:.2?} slack spent on infinite domains", spent, slack)
        }
        Adjustment::Scaled { factor } => format!("overrun, attempts scaled by {:.3}", factor),
    }
}
