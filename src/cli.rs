use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use ucb_core::AdvancementMode;
use ucb_experiment::{OddSplit, SessionConfig};

#[derive(Parser)]
#[command(name = "ucb-test", version, about = "Universal call bell activation test")]
pub struct Cli {
    /// Log filter used when RUST_LOG is unset.
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Guide a caregiver through one session in the terminal.
    Run(RunArgs),
    /// Print a trial plan without running it.
    Plan(PlanArgs),
}

#[derive(Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub session: SessionArgs,
    /// Directory for the exported CSV, JSON and text files.
    #[arg(long, default_value = ".")]
    pub out_dir: PathBuf,
    /// Show the results without writing any files.
    #[arg(long)]
    pub no_export: bool,
}

#[derive(Args)]
pub struct PlanArgs {
    #[command(flatten)]
    pub session: SessionArgs,
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct SessionArgs {
    /// JSON session config; flags below override its fields.
    #[arg(long)]
    pub config: Option<PathBuf>,
    #[arg(long, value_enum)]
    pub mode: Option<ModeArg>,
    #[arg(long)]
    pub trials: Option<usize>,
    /// Stage window for timed sessions.
    #[arg(long)]
    pub window_secs: Option<f64>,
    #[arg(long, value_enum)]
    pub odd_split: Option<OddSplitArg>,
    #[arg(long)]
    pub seed: Option<u64>,
    #[arg(long)]
    pub subject: Option<String>,
    #[arg(long)]
    pub require_subject: bool,
    /// File-name suffix identifying the test variant.
    #[arg(long)]
    pub suffix: Option<String>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ModeArg {
    #[value(name = "manual")]
    Manual,
    #[value(name = "timed")]
    Timed,
}

impl From<ModeArg> for AdvancementMode {
    fn from(value: ModeArg) -> Self {
        match value {
            ModeArg::Manual => AdvancementMode::Manual,
            ModeArg::Timed => AdvancementMode::Timed,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OddSplitArg {
    #[value(name = "reject")]
    Reject,
    #[value(name = "extra_press")]
    ExtraPress,
    #[value(name = "extra_no_press")]
    ExtraNoPress,
}

impl From<OddSplitArg> for OddSplit {
    fn from(value: OddSplitArg) -> Self {
        match value {
            OddSplitArg::Reject => OddSplit::Reject,
            OddSplitArg::ExtraPress => OddSplit::ExtraPress,
            OddSplitArg::ExtraNoPress => OddSplit::ExtraNoPress,
        }
    }
}

impl SessionArgs {
    pub fn to_config(&self) -> Result<SessionConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let file = File::open(path)
                    .with_context(|| format!("failed to open config {}", path.display()))?;
                serde_json::from_reader(BufReader::new(file))
                    .with_context(|| format!("failed to parse config {}", path.display()))?
            }
            None => SessionConfig::default(),
        };

        if let Some(mode) = self.mode {
            config.mode = mode.into();
        }
        if let Some(trials) = self.trials {
            config.trial_count = trials;
        }
        if let Some(secs) = self.window_secs {
            anyhow::ensure!(
                secs.is_finite() && secs > 0.0,
                "window must be a positive number of seconds"
            );
            config.window_ms = (secs * 1000.0).round() as u64;
        }
        if let Some(split) = self.odd_split {
            config.odd_split = split.into();
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if let Some(subject) = &self.subject {
            config.subject = Some(subject.clone());
        }
        if self.require_subject {
            config.require_subject = true;
        }
        if let Some(suffix) = &self.suffix {
            config.variant_suffix = suffix.clone();
        }

        config.validate()?;
        Ok(config)
    }
}
