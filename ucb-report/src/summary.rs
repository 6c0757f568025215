use serde::Serialize;
use ucb_core::Outcome;

use crate::report::ReportRow;

/// Confusion counts and rates for one report.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct OutcomeSummary {
    pub true_activations: usize,
    /// Press trials where the bell stayed silent.
    pub missed_activations: usize,
    /// NoPress trials where the bell fired anyway.
    pub false_triggers: usize,
    pub correct_rejections: usize,
    pub sensitivity: Option<f64>,
    pub specificity: Option<f64>,
}

impl OutcomeSummary {
    pub fn from_rows(rows: &[ReportRow]) -> Self {
        let mut summary = Self::default();
        for row in rows {
            match (row.label.expects_activation(), row.outcome) {
                (true, Outcome::Activated) => summary.true_activations += 1,
                (true, Outcome::NotActivated) => summary.missed_activations += 1,
                (false, Outcome::Activated) => summary.false_triggers += 1,
                (false, Outcome::NotActivated) => summary.correct_rejections += 1,
                (_, Outcome::Unset) => {}
            }
        }
        summary.sensitivity = rate(
            summary.true_activations,
            summary.true_activations + summary.missed_activations,
        );
        summary.specificity = rate(
            summary.correct_rejections,
            summary.correct_rejections + summary.false_triggers,
        );
        summary
    }

    /// Every trial behaved as the label predicts.
    pub fn all_correct(&self) -> bool {
        self.missed_activations == 0 && self.false_triggers == 0
    }
}

fn rate(hits: usize, total: usize) -> Option<f64> {
    (total > 0).then(|| hits as f64 / total as f64)
}
