use thiserror::Error;
use ucb_core::{AdvancementMode, SessionState};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// Bad trial count, ratio or window. Fatal at construction.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    /// Action rejected; the session is unchanged.
    #[error("rejected: {0}")]
    GuardViolation(#[from] Guard),
    /// A report was requested too early or from an abandoned session.
    #[error("report not ready: {0}")]
    NotReady(#[from] NotReadyReason),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Guard {
    #[error("stage {index} is outside 1..={total}")]
    IndexOutOfRange { index: usize, total: usize },
    #[error("stage {stage} has no outcome selected")]
    OutcomeUnset { stage: usize },
    #[error("Unset cannot be recorded as an outcome")]
    UnsetValue,
    #[error("stage {stage} is already closed")]
    StageClosed { stage: usize },
    #[error("stage {stage} is not open yet (current stage {current})")]
    StageNotOpen { stage: usize, current: usize },
    #[error("session is {state}, not running")]
    NotRunning { state: SessionState },
    #[error("session has already started")]
    AlreadyStarted,
    #[error("{action} is not available in {mode} mode")]
    WrongMode {
        action: &'static str,
        mode: AdvancementMode,
    },
    #[error("a subject identifier is required before starting")]
    SubjectRequired,
    #[error("plan has {got} trials, expected {expected}")]
    PlanLength { got: usize, expected: usize },
    #[error("plan has {got} Press trials, expected {expected}")]
    PlanSplit { got: usize, expected: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotReadyReason {
    #[error("session was abandoned")]
    Abandoned,
    #[error("session is {0}, not completed")]
    NotCompleted(SessionState),
    #[error("stage {first_unset} has no outcome")]
    Incomplete { first_unset: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_lifts_into_session_error() {
        let err: SessionError = Guard::OutcomeUnset { stage: 1 }.into();
        assert_eq!(err.to_string(), "rejected: stage 1 has no outcome selected");
    }

    #[test]
    fn not_ready_names_the_gap() {
        let err: SessionError = NotReadyReason::Incomplete { first_unset: 4 }.into();
        assert_eq!(err.to_string(), "report not ready: stage 4 has no outcome");
    }
}
