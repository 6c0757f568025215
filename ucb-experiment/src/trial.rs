use serde::Serialize;
use ucb_core::TrialLabel;

/// What the host shows for the open stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StageView {
    pub stage: usize,
    pub total: usize,
    pub label: TrialLabel,
    /// Time left in the stage window; `None` for caregiver-paced sessions.
    pub remaining_ms: Option<u64>,
}

impl StageView {
    pub fn instruction(&self) -> &'static str {
        self.label.instruction()
    }

    pub fn heading(&self) -> String {
        format!("Stage {}/{}", self.stage, self.total)
    }

    pub fn is_last(&self) -> bool {
        self.stage == self.total
    }
}
