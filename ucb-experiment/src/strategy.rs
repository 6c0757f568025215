//! Advancement disciplines: caregiver-paced and wall-clock-paced.

use std::fmt;

use tracing::debug;
use ucb_core::{AdvancementMode, Outcome};
use ucb_timing::{stage_at, stage_deadline};

use crate::error::Guard;
use crate::session::TestSession;
use crate::state::ControllerEvent;

/// Rule for when the open stage closes.
///
/// The controller has already checked that the session is running and that
/// `stage` is the open stage before calling `select`.
pub trait Advancement: fmt::Debug + Send + Sync {
    fn mode(&self) -> AdvancementMode;

    fn select(
        &self,
        session: &mut TestSession,
        stage: usize,
        outcome: Outcome,
    ) -> Result<Vec<ControllerEvent>, Guard>;

    fn advance(&self, session: &mut TestSession) -> Result<Vec<ControllerEvent>, Guard>;

    fn tick(&self, session: &mut TestSession, now_ms: u64) -> Vec<ControllerEvent>;

    fn remaining_ms(&self, session: &TestSession, now_ms: u64) -> Option<u64>;
}

/// Waits indefinitely for a selection and an explicit advance.
#[derive(Debug, Clone, Copy, Default)]
pub struct ManualAdvancement;

impl Advancement for ManualAdvancement {
    fn mode(&self) -> AdvancementMode {
        AdvancementMode::Manual
    }

    fn select(
        &self,
        session: &mut TestSession,
        stage: usize,
        outcome: Outcome,
    ) -> Result<Vec<ControllerEvent>, Guard> {
        session.pending = Some(outcome);
        debug!(stage, %outcome, "outcome selected");
        Ok(vec![ControllerEvent::OutcomeSelected { stage, outcome }])
    }

    fn advance(&self, session: &mut TestSession) -> Result<Vec<ControllerEvent>, Guard> {
        let stage = session.require_running()?;
        let outcome = session.pending.ok_or(Guard::OutcomeUnset { stage })?;
        session.ledger.set(stage, outcome)?;
        Ok(session.close_open_stage())
    }

    fn tick(&self, _session: &mut TestSession, _now_ms: u64) -> Vec<ControllerEvent> {
        Vec::new()
    }

    fn remaining_ms(&self, _session: &TestSession, _now_ms: u64) -> Option<u64> {
        None
    }
}

/// Closes each stage when its fixed window lapses, set or not.
#[derive(Debug, Clone, Copy)]
pub struct TimedAdvancement {
    pub window_ms: u64,
}

impl TimedAdvancement {
    pub fn new(window_ms: u64) -> Self {
        Self { window_ms }
    }
}

impl Advancement for TimedAdvancement {
    fn mode(&self) -> AdvancementMode {
        AdvancementMode::Timed
    }

    /// Last write before expiry wins.
    fn select(
        &self,
        session: &mut TestSession,
        stage: usize,
        outcome: Outcome,
    ) -> Result<Vec<ControllerEvent>, Guard> {
        let previous = session.ledger.set(stage, outcome)?;
        debug!(stage, %outcome, %previous, "outcome recorded");
        Ok(vec![ControllerEvent::OutcomeSelected { stage, outcome }])
    }

    fn advance(&self, _session: &mut TestSession) -> Result<Vec<ControllerEvent>, Guard> {
        Err(Guard::WrongMode {
            action: "advance",
            mode: AdvancementMode::Timed,
        })
    }

    /// Closes every stage whose window ended at or before `now_ms`; a late
    /// tick catches up several stages at once.
    fn tick(&self, session: &mut TestSession, now_ms: u64) -> Vec<ControllerEvent> {
        let Some(started) = session.started_at_ms else {
            return Vec::new();
        };
        let due = stage_at(now_ms.saturating_sub(started), self.window_ms);
        debug!(now_ms, due, "tick");

        let mut events = Vec::new();
        while let Some(stage) = session.stage() {
            if stage >= due {
                break;
            }
            events.extend(session.close_open_stage());
        }
        events
    }

    fn remaining_ms(&self, session: &TestSession, now_ms: u64) -> Option<u64> {
        let started = session.started_at_ms?;
        let stage = session.stage()?;
        let elapsed = now_ms.saturating_sub(started);
        Some(stage_deadline(stage, self.window_ms).saturating_sub(elapsed))
    }
}
