use serde::{Deserialize, Serialize};
use std::fmt;

/// What the caregiver is told to do during a trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrialLabel {
    /// The patient presses the bell; it should activate.
    Press,
    /// The patient moves naturally without pressing; it should stay silent.
    NoPress,
}

impl TrialLabel {
    pub const ALL: [TrialLabel; 2] = [TrialLabel::Press, TrialLabel::NoPress];

    /// Caregiver-facing instruction shown while the stage is open.
    pub fn instruction(&self) -> &'static str {
        match self {
            TrialLabel::Press => "Ask the patient to activate the bell now.",
            TrialLabel::NoPress => {
                "Ask the patient to lie down, then sit back up naturally now."
            }
        }
    }

    /// Whether a correctly working bell is expected to fire.
    pub fn expects_activation(&self) -> bool {
        matches!(self, TrialLabel::Press)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TrialLabel::Press => "Press",
            TrialLabel::NoPress => "NoPress",
        }
    }
}

impl fmt::Display for TrialLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
