use chrono::{Local, TimeZone};
use rand::SeedableRng;
use rand::rngs::StdRng;
use ucb_core::Outcome::{self, Activated, NotActivated};
use ucb_core::TrialLabel::{self, NoPress, Press};
use ucb_experiment::{
    NotReadyReason, SessionConfig, SessionController, SessionError, TestSession, TrialPlan,
};
use ucb_report::{ReportBuilder, ReportRow, build, document, read_csv, write_csv, write_json};

const PLAN: [TrialLabel; 6] = [Press, NoPress, Press, Press, NoPress, NoPress];
const ANSWERS: [Outcome; 6] = [
    Activated,
    NotActivated,
    Activated,
    NotActivated,
    NotActivated,
    Activated,
];

fn manual_session(answers: &[Outcome]) -> TestSession {
    let mut controller = SessionController::from_config(SessionConfig {
        subject: Some("room 4".to_string()),
        ..SessionConfig::manual()
    })
    .unwrap();
    controller
        .start_with_plan(TrialPlan::from_labels(PLAN.to_vec()).unwrap(), 0)
        .unwrap();
    for (i, outcome) in answers.iter().enumerate() {
        controller.set_outcome(i + 1, *outcome).unwrap();
        controller.advance().unwrap();
    }
    controller.into_session()
}

fn builder() -> ReportBuilder {
    ReportBuilder::new("ucb-test-1")
}

fn noon() -> chrono::DateTime<Local> {
    Local.with_ymd_and_hms(2025, 6, 1, 12, 30, 0).unwrap()
}

#[test]
fn worked_example_flags_the_missed_activation() {
    let report = builder().build_at(&manual_session(&ANSWERS), noon()).unwrap();
    assert_eq!(
        report.rows()[3],
        ReportRow {
            index: 4,
            label: Press,
            outcome: NotActivated
        }
    );
    let labels: Vec<TrialLabel> = report.rows().iter().map(|r| r.label).collect();
    assert_eq!(labels, PLAN.to_vec());

    let summary = report.summary();
    assert_eq!(summary.missed_activations, 1);
    assert_eq!(summary.false_triggers, 1);
    assert_eq!(report.subject(), Some("room 4"));
}

#[test]
fn abandoned_session_never_yields_a_report() {
    let mut controller = SessionController::from_config(SessionConfig::manual()).unwrap();
    controller.start(0).unwrap();
    for stage in 1..=2 {
        controller.set_outcome(stage, Activated).unwrap();
        controller.advance().unwrap();
    }
    controller.abandon().unwrap();

    for _ in 0..2 {
        assert_eq!(
            build(controller.session()),
            Err(SessionError::NotReady(NotReadyReason::Abandoned))
        );
    }
}

#[test]
fn lapsed_timed_window_blocks_the_report() {
    let mut controller = SessionController::new(
        SessionConfig::timed(10_000),
        StdRng::seed_from_u64(8),
    )
    .unwrap();
    controller.start(0).unwrap();
    for stage in 1..=3 {
        controller.set_outcome(stage, NotActivated).unwrap();
        controller.tick(stage as u64 * 10_000).unwrap();
    }
    controller.tick(60_000).unwrap();

    assert_eq!(
        builder().build(controller.session()),
        Err(SessionError::NotReady(NotReadyReason::Incomplete {
            first_unset: 4
        }))
    );
}

#[test]
fn csv_round_trip_reproduces_rows_in_order() {
    let session = manual_session(&ANSWERS);
    let report = builder().build_at(&session, noon()).unwrap();

    let mut buf = Vec::new();
    write_csv(&report, &mut buf).unwrap();
    let text = String::from_utf8(buf.clone()).unwrap();
    assert!(text.starts_with("Index,TrialLabel,Outcome\n1,Press,Activated\n"));

    let rows = read_csv(buf.as_slice()).unwrap();
    let expected: Vec<(usize, TrialLabel, Outcome)> = session.rows().collect();
    let actual: Vec<(usize, TrialLabel, Outcome)> = rows
        .iter()
        .map(|r| (r.index, r.label, r.outcome))
        .collect();
    assert_eq!(actual, expected);
}

#[test]
fn json_carries_metadata_and_rows() {
    let report = builder().build_at(&manual_session(&ANSWERS), noon()).unwrap();
    let mut buf = Vec::new();
    write_json(&report, &mut buf).unwrap();
    let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();

    assert_eq!(value["variant"], "ucb-test-1");
    assert_eq!(value["mode"], "manual");
    assert_eq!(value["subject"], "room 4");
    assert!(value["started_at"].is_string());
    assert_eq!(value["rows"][5]["Index"], 6);
    assert_eq!(value["rows"][5]["TrialLabel"], "NoPress");
    assert_eq!(value["rows"][5]["Outcome"], "Activated");
}

#[test]
fn document_lists_rows_under_the_title() {
    let report = builder().build_at(&manual_session(&ANSWERS), noon()).unwrap();
    let text = document::render(&report);
    assert!(text.contains(document::TITLE));
    assert!(text.contains("Subject: room 4"));
    let body: Vec<&str> = text.lines().filter(|l| l.starts_with('|')).collect();
    assert_eq!(body.len(), 7);
    assert!(body[4].contains("Press") && body[4].contains("NotActivated"));
}

#[test]
fn export_writes_three_files_named_by_time() {
    let dir = std::env::temp_dir().join(format!("ucb_export_test_{}", std::process::id()));
    let report = builder().build_at(&manual_session(&ANSWERS), noon()).unwrap();
    let paths = ucb_report::export_all(&report, &dir).unwrap();

    let names: Vec<String> = paths
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(
        names,
        vec!["1230-ucb-test-1.csv", "1230-ucb-test-1.json", "1230-ucb-test-1.pdf"]
    );
    let csv = std::fs::read(&paths[0]).unwrap();
    assert_eq!(read_csv(csv.as_slice()).unwrap().len(), 6);
    let pdf = std::fs::read(&paths[2]).unwrap();
    assert!(pdf.starts_with(b"%PDF"));
    let _ = std::fs::remove_dir_all(dir);
}
