use std::io::Write;
use std::path::PathBuf;
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::Duration;

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use tracing::{debug, info};
use ucb_core::{AdvancementMode, Outcome};
use ucb_experiment::{FinalStatus, SessionConfig, SessionController, SessionError};
use ucb_report::{document, export_all, Report, ReportBuilder};
use ucb_timing::{sleep, Clock};

const BRIEFING: &str = "This test aims to check if the call bell works every time it should. \
Please get ready to follow the instructions at each stage!";

const PROMPT: &str = "Enter T if the bell activated, F otherwise (A abandons the test):";

/// Upper bound between ticks; the controller needs at least 1 Hz.
const TICK_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Answer(Outcome),
    Abandon,
}

fn parse_command(line: &str) -> Option<Command> {
    match line.trim() {
        "a" | "A" | "abandon" => Some(Command::Abandon),
        other => other.parse().ok().map(Command::Answer),
    }
}

/// How a terminal run ended.
#[derive(Debug)]
pub struct RunOutcome {
    pub status: FinalStatus,
    pub report: Option<Report>,
    pub files: Vec<PathBuf>,
}

/// Terminal host: owns one controller, feeds it input lines and clock
/// readings, and prints what the caregiver needs to see.
pub struct App<C: Clock, W: Write> {
    controller: SessionController<StdRng>,
    builder: ReportBuilder,
    clock: C,
    input: Receiver<String>,
    input_closed: bool,
    out: W,
    out_dir: Option<PathBuf>,
}

impl<C: Clock, W: Write> App<C, W> {
    pub fn new(
        config: SessionConfig,
        clock: C,
        input: Receiver<String>,
        out: W,
        out_dir: Option<PathBuf>,
    ) -> Result<Self> {
        let builder = ReportBuilder::from_config(&config);
        let controller =
            SessionController::from_config(config).context("failed to configure session")?;
        Ok(Self {
            controller,
            builder,
            clock,
            input,
            input_closed: false,
            out,
            out_dir,
        })
    }

    pub fn run(mut self) -> Result<RunOutcome> {
        writeln!(self.out, "{BRIEFING}\n")?;
        self.controller
            .start(self.clock.now_ms())
            .context("failed to start session")?;

        match self.controller.mode() {
            AdvancementMode::Manual => self.run_manual()?,
            AdvancementMode::Timed => self.run_timed()?,
        }
        self.finish()
    }

    fn run_manual(&mut self) -> Result<()> {
        while self.controller.session().state().is_running() {
            self.show_stage()?;
            match self.input.recv() {
                Ok(line) => self.handle_input(&line)?,
                Err(_) => {
                    info!("input closed; abandoning session");
                    self.controller.abandon()?;
                }
            }
        }
        Ok(())
    }

    fn run_timed(&mut self) -> Result<()> {
        let mut shown = None;
        while self.controller.session().state().is_running() {
            self.controller.tick(self.clock.now_ms())?;
            let now = self.clock.now_ms();
            let Some(view) = self.controller.view(now) else {
                break;
            };
            if shown != Some(view.stage) {
                self.show_stage()?;
                shown = Some(view.stage);
            }

            let wait = view
                .remaining_ms
                .map(Duration::from_millis)
                .unwrap_or(TICK_INTERVAL)
                .clamp(Duration::from_millis(1), TICK_INTERVAL);
            if self.input_closed {
                sleep(wait);
                continue;
            }
            match self.input.recv_timeout(wait) {
                Ok(line) => {
                    // Close any window that lapsed while we were waiting
                    // before the answer is applied to the open stage.
                    self.controller.tick(self.clock.now_ms())?;
                    if self.controller.session().state().is_running() {
                        self.handle_input(&line)?;
                    }
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    debug!("input closed; windows will lapse on their own");
                    self.input_closed = true;
                }
            }
        }
        Ok(())
    }

    fn handle_input(&mut self, line: &str) -> Result<()> {
        let Some(stage) = self.controller.session().stage() else {
            return Ok(());
        };
        match parse_command(line) {
            Some(Command::Abandon) => {
                self.controller.abandon()?;
            }
            Some(Command::Answer(outcome)) => {
                let result = self.controller.set_outcome(stage, outcome).and_then(|_| {
                    match self.controller.mode() {
                        AdvancementMode::Manual => self.controller.advance(),
                        AdvancementMode::Timed => Ok(Vec::new()),
                    }
                });
                match result {
                    Ok(_) => {
                        if self.controller.mode() == AdvancementMode::Timed {
                            writeln!(self.out, "Recorded {outcome} for stage {stage}.")?;
                        }
                    }
                    Err(SessionError::GuardViolation(guard)) => {
                        writeln!(self.out, "Not accepted: {guard}")?;
                    }
                    Err(other) => return Err(other.into()),
                }
            }
            None => writeln!(self.out, "{PROMPT}")?,
        }
        Ok(())
    }

    fn show_stage(&mut self) -> Result<()> {
        let Some(view) = self.controller.view(self.clock.now_ms()) else {
            return Ok(());
        };
        writeln!(self.out, "## {}", view.heading())?;
        writeln!(self.out, "{}", view.instruction())?;
        if let Some(ms) = view.remaining_ms {
            writeln!(self.out, "({} seconds for this stage)", ms.div_ceil(1000))?;
        }
        let step = if view.is_last() { "finish" } else { "continue" };
        writeln!(self.out, "{PROMPT} [{step}]")?;
        self.out.flush()?;
        Ok(())
    }

    fn finish(mut self) -> Result<RunOutcome> {
        let status = self
            .controller
            .final_status()
            .context("session stopped before reaching a terminal state")?;
        if let Some(started) = self.controller.session().started_at_ms() {
            info!(elapsed_ms = self.clock.elapsed_ms(started), ?status, "session ended");
        }
        writeln!(self.out, "\n{}", status.message())?;

        let mut outcome = RunOutcome {
            status,
            report: None,
            files: Vec::new(),
        };
        if !status.is_passed() {
            if let FinalStatus::Incomplete { first_unset } = status {
                writeln!(self.out, "Stage {first_unset} has no result.")?;
            }
            return Ok(outcome);
        }

        let report = self
            .builder
            .build(self.controller.session())
            .context("failed to build report")?;
        write!(self.out, "\n{}", document::render(&report))?;

        let summary = report.summary();
        writeln!(
            self.out,
            "Missed activations: {}  False triggers: {}",
            summary.missed_activations, summary.false_triggers
        )?;

        if let Some(dir) = &self.out_dir {
            outcome.files = export_all(&report, dir)
                .with_context(|| format!("failed to export results to {}", dir.display()))?;
            for path in &outcome.files {
                writeln!(self.out, "Saved {}", path.display())?;
            }
        }
        outcome.report = Some(report);
        Ok(outcome)
    }
}
