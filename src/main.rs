use std::io::{self, BufRead};
use std::sync::mpsc;
use std::thread;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use ucb_experiment::TrialPlan;
use ucb_timing::MonotonicClock;

mod app;
mod cli;

use app::App;
use cli::{Cli, Commands, PlanArgs, RunArgs};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level)?;

    match cli.command {
        Commands::Run(args) => run(args),
        Commands::Plan(args) => plan(args),
    }
}

fn init_tracing(level: &str) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level).context("invalid --log-level")?,
    };
    // Logs go to stderr so they never interleave with caregiver prompts.
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
    Ok(())
}

fn run(args: RunArgs) -> Result<()> {
    let config = args.session.to_config()?;
    info!(mode = %config.mode, trials = config.trial_count, "universal call bell test");

    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });

    let out_dir = (!args.no_export).then_some(args.out_dir);
    let app = App::new(config, MonotonicClock::new(), rx, io::stdout(), out_dir)?;
    let outcome = app.run()?;
    if let Some(report) = &outcome.report {
        info!(
            rows = report.rows().len(),
            files = outcome.files.len(),
            stem = %report.file_stem(),
            "session finished"
        );
    }
    if !outcome.status.is_passed() {
        std::process::exit(1);
    }
    Ok(())
}

fn plan(args: PlanArgs) -> Result<()> {
    let config = args.session.to_config()?;
    let plan = TrialPlan::generate_seeded(config.trial_count, config.odd_split, config.seed)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }
    for (i, label) in plan.iter().enumerate() {
        println!("{:>2}  {:<8} {}", i + 1, label.as_str(), label.instruction());
    }
    Ok(())
}
