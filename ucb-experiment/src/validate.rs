use serde::Serialize;
use ucb_core::SessionState;

use crate::session::TestSession;

/// Whether every ledger slot holds an observed outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Completeness {
    Complete,
    Incomplete { first_unset: usize },
}

impl Completeness {
    pub fn is_complete(&self) -> bool {
        matches!(self, Completeness::Complete)
    }
}

/// Checks the ledger only; a `Completed` lifecycle does not imply a
/// complete ledger because timed windows can lapse unset.
pub fn validate(session: &TestSession) -> Completeness {
    if session.ledger().is_empty() {
        return Completeness::Incomplete { first_unset: 1 };
    }
    match session.ledger().first_unset() {
        Some(first_unset) => Completeness::Incomplete { first_unset },
        None => Completeness::Complete,
    }
}

/// Terminal verdict shown to the caregiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FinalStatus {
    Passed,
    Incomplete { first_unset: usize },
    Abandoned,
}

impl FinalStatus {
    pub fn message(&self) -> &'static str {
        match self {
            FinalStatus::Passed => "The test is complete. Please download the results.",
            FinalStatus::Incomplete { .. } => {
                "The test failed: at least one stage is missing a result. Please run the test again."
            }
            FinalStatus::Abandoned => "The test was abandoned. No results were saved.",
        }
    }

    pub fn is_passed(&self) -> bool {
        matches!(self, FinalStatus::Passed)
    }
}

/// `None` while the session can still change.
pub fn final_status(session: &TestSession) -> Option<FinalStatus> {
    match session.state() {
        SessionState::Idle | SessionState::Running { .. } => None,
        SessionState::Abandoned => Some(FinalStatus::Abandoned),
        SessionState::Completed => Some(match validate(session) {
            Completeness::Complete => FinalStatus::Passed,
            Completeness::Incomplete { first_unset } => FinalStatus::Incomplete { first_unset },
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{SessionConfig, SessionController};
    use ucb_core::Outcome;

    #[test]
    fn idle_session_is_incomplete_at_one() {
        let controller = SessionController::from_config(SessionConfig::default()).unwrap();
        assert_eq!(
            validate(controller.session()),
            Completeness::Incomplete { first_unset: 1 }
        );
    }

    #[test]
    fn validation_is_repeatable() {
        let mut controller = SessionController::from_config(SessionConfig {
            seed: Some(11),
            ..SessionConfig::timed(1_000)
        })
        .unwrap();
        controller.start(0).unwrap();
        controller.set_outcome(1, Outcome::Activated).unwrap();
        controller.tick(6_000).unwrap();

        let first = validate(controller.session());
        let snapshot = controller.session().clone();
        assert_eq!(validate(controller.session()), first);
        assert_eq!(controller.session(), &snapshot);
        assert_eq!(first, Completeness::Incomplete { first_unset: 2 });
        assert_eq!(
            controller.final_status(),
            Some(FinalStatus::Incomplete { first_unset: 2 })
        );
    }

    #[test]
    fn failure_message_asks_for_a_rerun() {
        let message = FinalStatus::Incomplete { first_unset: 4 }.message();
        assert!(message.contains("run the test again"));
    }
}
