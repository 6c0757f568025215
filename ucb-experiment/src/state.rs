use chrono::Local;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{info, warn};
use ucb_core::{AdvancementMode, Outcome, TrialLabel};
use ucb_timing::session_bound_ms;

use super::config::SessionConfig;
use super::error::{Guard, SessionError};
use super::plan::TrialPlan;
use super::session::TestSession;
use super::strategy::{Advancement, ManualAdvancement, TimedAdvancement};
use super::trial::StageView;
use super::validate::{FinalStatus, final_status};

/// Inputs accepted from the host.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Start { now_ms: u64 },
    SetOutcome { stage: usize, outcome: Outcome },
    Advance,
    Abandon,
    Tick { now_ms: u64 },
}

/// What an accepted input caused, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerEvent {
    Started { total: usize },
    StageOpened { stage: usize, label: TrialLabel },
    OutcomeSelected { stage: usize, outcome: Outcome },
    StageClosed { stage: usize, outcome: Outcome },
    Completed,
    Abandoned { stage: usize },
}

/// Drives one [`TestSession`] from `Idle` to a terminal state.
///
/// Pure reducer: it never reads a clock or sleeps. Every input either
/// returns the events it caused or is rejected with the session untouched.
pub struct SessionController<R: Rng> {
    config: SessionConfig,
    rng: R,
    strategy: Box<dyn Advancement>,
    session: TestSession,
}

impl SessionController<StdRng> {
    /// Seeds from `config.seed`, or from the thread RNG when unset.
    pub fn from_config(config: SessionConfig) -> Result<Self, SessionError> {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        };
        Self::new(config, rng)
    }
}

impl<R: Rng> SessionController<R> {
    pub fn new(config: SessionConfig, rng: R) -> Result<Self, SessionError> {
        config.validate()?;
        let strategy: Box<dyn Advancement> = match config.mode {
            AdvancementMode::Manual => Box::new(ManualAdvancement),
            AdvancementMode::Timed => Box::new(TimedAdvancement::new(config.window_ms)),
        };
        let subject = config
            .subject
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        let session = TestSession::new(config.trial_count, config.mode, subject);
        Ok(Self {
            config,
            rng,
            strategy,
            session,
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn session(&self) -> &TestSession {
        &self.session
    }

    pub fn into_session(self) -> TestSession {
        self.session
    }

    pub fn mode(&self) -> AdvancementMode {
        self.strategy.mode()
    }

    /// Records the subject; only possible before start.
    pub fn set_subject(&mut self, subject: &str) -> Result<(), SessionError> {
        if self.session.state.is_running() || self.session.state.is_terminal() {
            return Err(self.reject(Guard::AlreadyStarted));
        }
        let subject = subject.trim();
        self.session.subject = (!subject.is_empty()).then(|| subject.to_string());
        Ok(())
    }

    /// `Idle → Running(1)`: draws the plan once and clears the ledger.
    pub fn start(&mut self, now_ms: u64) -> Result<Vec<ControllerEvent>, SessionError> {
        self.check_startable()?;
        let plan = TrialPlan::generate(self.config.trial_count, self.config.odd_split, &mut self.rng)?;
        Ok(self.begin(plan, now_ms))
    }

    /// Starts with a fixed plan instead of drawing one.
    pub fn start_with_plan(
        &mut self,
        plan: TrialPlan,
        now_ms: u64,
    ) -> Result<Vec<ControllerEvent>, SessionError> {
        self.check_startable()?;
        if plan.len() != self.session.total {
            return Err(self.reject(Guard::PlanLength {
                got: plan.len(),
                expected: self.session.total,
            }));
        }
        let (press, _) = self.config.odd_split.counts(self.session.total)?;
        if plan.count(TrialLabel::Press) != press {
            return Err(self.reject(Guard::PlanSplit {
                got: plan.count(TrialLabel::Press),
                expected: press,
            }));
        }
        Ok(self.begin(plan, now_ms))
    }

    pub fn set_outcome(
        &mut self,
        stage: usize,
        outcome: Outcome,
    ) -> Result<Vec<ControllerEvent>, SessionError> {
        if !outcome.is_set() {
            return Err(self.reject(Guard::UnsetValue));
        }
        if let Err(guard) = self.session.check_open(stage) {
            return Err(self.reject(guard));
        }
        self.strategy
            .select(&mut self.session, stage, outcome)
            .map_err(|guard| self.reject(guard))
    }

    pub fn advance(&mut self) -> Result<Vec<ControllerEvent>, SessionError> {
        if let Err(guard) = self.session.require_running() {
            return Err(self.reject(guard));
        }
        self.strategy
            .advance(&mut self.session)
            .map_err(|guard| self.reject(guard))
    }

    /// Accepted from any running stage; keeps the partial ledger.
    pub fn abandon(&mut self) -> Result<Vec<ControllerEvent>, SessionError> {
        if let Err(guard) = self.session.require_running() {
            return Err(self.reject(guard));
        }
        Ok(vec![self.session.abandon()])
    }

    pub fn tick(&mut self, now_ms: u64) -> Result<Vec<ControllerEvent>, SessionError> {
        if let Err(guard) = self.session.require_running() {
            return Err(self.reject(guard));
        }
        Ok(self.strategy.tick(&mut self.session, now_ms))
    }

    pub fn handle_event(
        &mut self,
        event: SessionEvent,
    ) -> Result<Vec<ControllerEvent>, SessionError> {
        match event {
            SessionEvent::Start { now_ms } => self.start(now_ms),
            SessionEvent::SetOutcome { stage, outcome } => self.set_outcome(stage, outcome),
            SessionEvent::Advance => self.advance(),
            SessionEvent::Abandon => self.abandon(),
            SessionEvent::Tick { now_ms } => self.tick(now_ms),
        }
    }

    /// Display data for the open stage.
    pub fn view(&self, now_ms: u64) -> Option<StageView> {
        let stage = self.session.stage()?;
        let label = self.session.current_label()?;
        Some(StageView {
            stage,
            total: self.session.total,
            label,
            remaining_ms: self.strategy.remaining_ms(&self.session, now_ms),
        })
    }

    pub fn final_status(&self) -> Option<FinalStatus> {
        final_status(&self.session)
    }

    /// Clock reading after which a timed session must have completed.
    pub fn deadline_ms(&self) -> Option<u64> {
        if self.mode() != AdvancementMode::Timed {
            return None;
        }
        let started = self.session.started_at_ms?;
        Some(started.saturating_add(session_bound_ms(
            self.session.total,
            self.config.window_ms,
        )))
    }

    fn check_startable(&self) -> Result<(), SessionError> {
        if !self.session.state.is_idle() {
            return Err(self.reject(Guard::AlreadyStarted));
        }
        if self.config.require_subject && self.session.subject.is_none() {
            return Err(self.reject(Guard::SubjectRequired));
        }
        Ok(())
    }

    fn begin(&mut self, plan: TrialPlan, now_ms: u64) -> Vec<ControllerEvent> {
        if self.mode() == AdvancementMode::Timed {
            info!(
                window_ms = self.config.window_ms,
                bound_ms = session_bound_ms(plan.len(), self.config.window_ms),
                "timed session armed"
            );
        }
        self.session.begin(plan, now_ms, Local::now())
    }

    fn reject(&self, guard: Guard) -> SessionError {
        warn!(state = %self.session.state, reason = %guard, "input rejected");
        SessionError::GuardViolation(guard)
    }
}
