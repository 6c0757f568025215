use serde::{Deserialize, Serialize};
use std::fmt;

/// Session lifecycle.
///
/// `Idle` is initial; `Completed` and `Abandoned` are terminal.
#[derive(Copy, Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SessionState {
    #[default]
    Idle,
    /// Stage is 1-based.
    Running { stage: usize },
    Completed,
    Abandoned,
}

impl SessionState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running { .. })
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Abandoned)
    }

    /// Open stage, if any.
    pub fn stage(&self) -> Option<usize> {
        match self {
            Self::Running { stage } => Some(*stage),
            _ => None,
        }
    }

    /// State after closing the open stage of a plan with `total` trials.
    pub fn next(&self, total: usize) -> Option<Self> {
        match self {
            Self::Idle => Some(Self::Running { stage: 1 }),
            Self::Running { stage } if *stage < total => Some(Self::Running { stage: stage + 1 }),
            Self::Running { .. } => Some(Self::Completed),
            Self::Completed | Self::Abandoned => None,
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Running { stage } => write!(f, "running:{stage}"),
            Self::Completed => write!(f, "completed"),
            Self::Abandoned => write!(f, "abandoned"),
        }
    }
}

/// How the controller moves from one stage to the next.
#[derive(Copy, Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdvancementMode {
    /// Caregiver-paced: each stage waits for an explicit advance.
    #[default]
    Manual,
    /// Wall-clock-paced: each stage closes when its window lapses.
    Timed,
}

impl fmt::Display for AdvancementMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Manual => write!(f, "manual"),
            Self::Timed => write!(f, "timed"),
        }
    }
}
