//! End-to-end walks through the controller under both advancement modes.

use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use ucb_core::TrialLabel::{NoPress, Press};
use ucb_core::{Outcome, SessionState};
use ucb_experiment::{
    Completeness, ControllerEvent, FinalStatus, Guard, SessionConfig, SessionController,
    SessionError, SessionEvent, TrialPlan, validate,
};
use ucb_timing::{Clock, ManualClock};

const WINDOW_MS: u64 = 10_000;

fn plan() -> TrialPlan {
    TrialPlan::from_labels(vec![Press, NoPress, Press, Press, NoPress, NoPress]).unwrap()
}

#[test]
fn manual_run_records_every_answer_in_plan_order() {
    let mut controller = SessionController::new(SessionConfig::manual(), StdRng::seed_from_u64(5))
        .unwrap();
    controller.start(0).unwrap();
    let frozen = controller.session().plan().cloned().unwrap();

    let answers = [
        Outcome::Activated,
        Outcome::NotActivated,
        Outcome::Activated,
        Outcome::NotActivated,
        Outcome::NotActivated,
        Outcome::Activated,
    ];
    for (i, outcome) in answers.iter().enumerate() {
        let stage = i + 1;
        let view = controller.view(0).unwrap();
        assert_eq!(view.stage, stage);
        assert_eq!(Some(view.label), frozen.label(stage));
        controller.set_outcome(stage, *outcome).unwrap();
        controller.advance().unwrap();
    }

    let session = controller.session();
    assert_eq!(session.state(), SessionState::Completed);
    assert_eq!(session.plan(), Some(&frozen));
    assert_eq!(validate(session), Completeness::Complete);
    assert_eq!(session.ledger().as_slice(), &answers);
}

#[test]
fn advance_at_stage_one_without_answer_changes_nothing() {
    let mut controller = SessionController::from_config(SessionConfig::manual()).unwrap();
    controller.start(0).unwrap();
    let err = controller.advance().unwrap_err();
    assert_eq!(
        err,
        SessionError::GuardViolation(Guard::OutcomeUnset { stage: 1 })
    );
    assert_eq!(controller.session().stage(), Some(1));
    assert!(
        controller
            .session()
            .ledger()
            .iter()
            .all(|o| o == Outcome::Unset)
    );
}

#[test]
fn timed_run_with_silent_tail_completes_but_is_incomplete_at_four() {
    let clock = ManualClock::new(0);
    let mut controller =
        SessionController::from_config(SessionConfig::timed(WINDOW_MS)).unwrap();
    controller.start_with_plan(plan(), clock.now_ms()).unwrap();

    // The host ticks once a second; answers arrive for the first three stages.
    let mut completed = false;
    while controller.session().state().is_running() {
        clock.advance(std::time::Duration::from_secs(1));
        let events = controller.tick(clock.now_ms()).unwrap();
        completed |= events.contains(&ControllerEvent::Completed);
        if let Some(stage) = controller.session().stage() {
            if stage <= 3 && controller.session().ledger().get(stage) == Some(Outcome::Unset) {
                controller.set_outcome(stage, Outcome::Activated).unwrap();
            }
        }
    }

    assert!(completed);
    assert_eq!(clock.now_ms(), 60_000);
    let session = controller.session();
    assert_eq!(session.state(), SessionState::Completed);
    assert_eq!(validate(session), Completeness::Incomplete { first_unset: 4 });
    assert_eq!(
        controller.final_status(),
        Some(FinalStatus::Incomplete { first_unset: 4 })
    );
}

#[test]
fn abandon_at_stage_three_is_terminal() {
    let mut controller = SessionController::from_config(SessionConfig::manual()).unwrap();
    controller.handle_event(SessionEvent::Start { now_ms: 0 }).unwrap();
    for stage in 1..=2 {
        controller
            .handle_event(SessionEvent::SetOutcome {
                stage,
                outcome: Outcome::Activated,
            })
            .unwrap();
        controller.handle_event(SessionEvent::Advance).unwrap();
    }
    assert_eq!(controller.session().stage(), Some(3));
    controller.handle_event(SessionEvent::Abandon).unwrap();

    assert_eq!(controller.session().state(), SessionState::Abandoned);
    assert_eq!(controller.final_status(), Some(FinalStatus::Abandoned));
    assert!(controller.handle_event(SessionEvent::Advance).is_err());
    assert_eq!(controller.session().ledger().sealed(), 2);
}

fn arb_input() -> impl Strategy<Value = (u8, usize, bool)> {
    (0u8..4, 0usize..9, any::<bool>())
}

proptest! {
    /// Random caregiver input never breaks the stage/ledger invariants.
    #[test]
    fn manual_controller_invariants(seed in any::<u64>(), inputs in prop::collection::vec(arb_input(), 0..64)) {
        let mut controller = SessionController::new(
            SessionConfig::manual(),
            StdRng::seed_from_u64(seed),
        ).unwrap();
        controller.start(0).unwrap();

        for (kind, stage, activated) in inputs {
            let before = controller.session().clone();
            let outcome = if activated { Outcome::Activated } else { Outcome::NotActivated };
            let result = match kind {
                0 | 1 => controller.set_outcome(stage, outcome),
                2 => controller.advance(),
                _ => controller.tick(stage as u64 * 1_000),
            };
            let after = controller.session();
            if result.is_err() {
                prop_assert_eq!(after, &before);
            }
            let sealed = after.ledger().sealed();
            for index in 1..=6 {
                let slot = after.ledger().get(index).unwrap();
                prop_assert_eq!(slot.is_set(), index <= sealed);
                if index <= before.ledger().sealed() {
                    prop_assert_eq!(Some(slot), before.ledger().get(index));
                }
            }
            match after.state() {
                SessionState::Running { stage } => prop_assert_eq!(stage, sealed + 1),
                SessionState::Completed => prop_assert_eq!(sealed, 6),
                other => prop_assert!(false, "unexpected state {other}"),
            }
        }
    }
}
