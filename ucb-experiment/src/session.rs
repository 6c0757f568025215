use chrono::{DateTime, Local};
use tracing::{info, warn};
use ucb_core::{AdvancementMode, Outcome, SessionState, TrialLabel};

use crate::error::Guard;
use crate::ledger::OutcomeLedger;
use crate::plan::TrialPlan;
use crate::state::ControllerEvent;

/// Everything known about one test run.
///
/// Owned by a [`SessionController`](crate::SessionController); strategies
/// mutate it only through the crate-private transition helpers below.
#[derive(Debug, Clone, PartialEq)]
pub struct TestSession {
    pub(crate) total: usize,
    pub(crate) mode: AdvancementMode,
    pub(crate) state: SessionState,
    pub(crate) plan: Option<TrialPlan>,
    pub(crate) ledger: OutcomeLedger,
    /// Manual mode: selection for the open stage, committed on advance.
    pub(crate) pending: Option<Outcome>,
    pub(crate) subject: Option<String>,
    pub(crate) started_at_ms: Option<u64>,
    pub(crate) started_wall: Option<DateTime<Local>>,
}

impl TestSession {
    pub(crate) fn new(total: usize, mode: AdvancementMode, subject: Option<String>) -> Self {
        Self {
            total,
            mode,
            state: SessionState::Idle,
            plan: None,
            ledger: OutcomeLedger::default(),
            pending: None,
            subject,
            started_at_ms: None,
            started_wall: None,
        }
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn mode(&self) -> AdvancementMode {
        self.mode
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Open stage, if the session is running.
    pub fn stage(&self) -> Option<usize> {
        self.state.stage()
    }

    /// Frozen plan; `None` before start.
    pub fn plan(&self) -> Option<&TrialPlan> {
        self.plan.as_ref()
    }

    pub fn ledger(&self) -> &OutcomeLedger {
        &self.ledger
    }

    pub fn pending(&self) -> Option<Outcome> {
        self.pending
    }

    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    pub fn started_at_ms(&self) -> Option<u64> {
        self.started_at_ms
    }

    pub fn started_wall(&self) -> Option<DateTime<Local>> {
        self.started_wall
    }

    pub fn current_label(&self) -> Option<TrialLabel> {
        let stage = self.stage()?;
        self.plan.as_ref()?.label(stage)
    }

    /// Rows accumulated so far as `(stage, label, outcome)`.
    pub fn rows(&self) -> impl Iterator<Item = (usize, TrialLabel, Outcome)> + '_ {
        self.plan
            .iter()
            .flat_map(|plan| plan.iter())
            .zip(self.ledger.iter())
            .enumerate()
            .map(|(i, (label, outcome))| (i + 1, label, outcome))
    }

    /// Resolves `stage` against the open one.
    pub(crate) fn check_open(&self, stage: usize) -> Result<(), Guard> {
        let current = self.require_running()?;
        if stage == 0 || stage > self.total {
            return Err(Guard::IndexOutOfRange {
                index: stage,
                total: self.total,
            });
        }
        if stage < current {
            return Err(Guard::StageClosed { stage });
        }
        if stage > current {
            return Err(Guard::StageNotOpen { stage, current });
        }
        Ok(())
    }

    pub(crate) fn require_running(&self) -> Result<usize, Guard> {
        self.state
            .stage()
            .ok_or(Guard::NotRunning { state: self.state })
    }

    pub(crate) fn begin(
        &mut self,
        plan: TrialPlan,
        now_ms: u64,
        wall: DateTime<Local>,
    ) -> Vec<ControllerEvent> {
        self.ledger = OutcomeLedger::new(plan.len());
        self.plan = Some(plan);
        self.pending = None;
        self.started_at_ms = Some(now_ms);
        self.started_wall = Some(wall);
        if let Some(next) = self.state.next(self.total) {
            self.state = next;
        }
        info!(
            total = self.total,
            mode = %self.mode,
            subject = self.subject.as_deref().unwrap_or("-"),
            "session started"
        );

        let mut events = vec![ControllerEvent::Started { total: self.total }];
        events.extend(self.opened_event());
        events
    }

    /// Freezes the open stage and moves to the next one or to `Completed`.
    pub(crate) fn close_open_stage(&mut self) -> Vec<ControllerEvent> {
        let Some(stage) = self.state.stage() else {
            return Vec::new();
        };
        let outcome = self.ledger.get(stage).unwrap_or_default();
        self.ledger.seal_through(stage);
        self.pending = None;
        if outcome.is_set() {
            info!(stage, %outcome, "stage closed");
        } else {
            warn!(stage, "stage closed without an outcome");
        }

        let mut events = vec![ControllerEvent::StageClosed { stage, outcome }];
        if let Some(next) = self.state.next(self.total) {
            self.state = next;
        }
        match self.state {
            SessionState::Completed => {
                info!(complete = self.ledger.is_complete(), "session completed");
                events.push(ControllerEvent::Completed);
            }
            _ => events.extend(self.opened_event()),
        }
        events
    }

    pub(crate) fn abandon(&mut self) -> ControllerEvent {
        let stage = self.state.stage().unwrap_or_default();
        self.state = SessionState::Abandoned;
        self.pending = None;
        info!(stage, recorded = self.ledger.sealed(), "session abandoned");
        ControllerEvent::Abandoned { stage }
    }

    fn opened_event(&self) -> Option<ControllerEvent> {
        let stage = self.state.stage()?;
        let label = self.current_label()?;
        info!(stage, total = self.total, %label, "stage opened");
        Some(ControllerEvent::StageOpened { stage, label })
    }
}
