use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use tracing::info;
use ucb_core::{AdvancementMode, Outcome, SessionState, TrialLabel};
use ucb_experiment::{
    Completeness, NotReadyReason, SessionConfig, SessionError, TestSession, validate,
};

use crate::summary::OutcomeSummary;

/// One exported row. Field names are the exported column names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRow {
    #[serde(rename = "Index")]
    pub index: usize,
    #[serde(rename = "TrialLabel")]
    pub label: TrialLabel,
    #[serde(rename = "Outcome")]
    pub outcome: Outcome,
}

/// Immutable projection of a completed, validated session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    generated_at: DateTime<Local>,
    started_at: Option<DateTime<Local>>,
    variant: String,
    subject: Option<String>,
    mode: AdvancementMode,
    rows: Vec<ReportRow>,
}

impl Report {
    /// Rows in trial order.
    pub fn rows(&self) -> &[ReportRow] {
        &self.rows
    }

    pub fn generated_at(&self) -> DateTime<Local> {
        self.generated_at
    }

    /// Wall-clock time the session started.
    pub fn started_at(&self) -> Option<DateTime<Local>> {
        self.started_at
    }

    pub fn variant(&self) -> &str {
        &self.variant
    }

    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    pub fn mode(&self) -> AdvancementMode {
        self.mode
    }

    /// `HHMM-<variant>`, stamped with the local time of generation.
    pub fn file_stem(&self) -> String {
        format!("{}-{}", self.generated_at.format("%H%M"), self.variant)
    }

    pub fn summary(&self) -> OutcomeSummary {
        OutcomeSummary::from_rows(&self.rows)
    }
}

/// Builds reports stamped with a fixed variant suffix.
#[derive(Debug, Clone)]
pub struct ReportBuilder {
    variant: String,
}

impl ReportBuilder {
    pub fn new(variant: impl Into<String>) -> Self {
        Self {
            variant: variant.into(),
        }
    }

    pub fn from_config(config: &SessionConfig) -> Self {
        Self::new(config.variant_suffix.clone())
    }

    pub fn build(&self, session: &TestSession) -> Result<Report, SessionError> {
        self.build_at(session, Local::now())
    }

    pub fn build_at(
        &self,
        session: &TestSession,
        generated_at: DateTime<Local>,
    ) -> Result<Report, SessionError> {
        match session.state() {
            SessionState::Completed => {}
            SessionState::Abandoned => return Err(NotReadyReason::Abandoned.into()),
            other => return Err(NotReadyReason::NotCompleted(other).into()),
        }
        if let Completeness::Incomplete { first_unset } = validate(session) {
            return Err(NotReadyReason::Incomplete { first_unset }.into());
        }

        let rows: Vec<ReportRow> = session
            .rows()
            .map(|(index, label, outcome)| ReportRow {
                index,
                label,
                outcome,
            })
            .collect();
        info!(rows = rows.len(), variant = %self.variant, "report built");

        Ok(Report {
            generated_at,
            started_at: session.started_wall(),
            variant: self.variant.clone(),
            subject: session.subject().map(str::to_string),
            mode: session.mode(),
            rows,
        })
    }
}

/// Builds with the default variant suffix and the current time.
pub fn build(session: &TestSession) -> Result<Report, SessionError> {
    ReportBuilder::from_config(&SessionConfig::default()).build(session)
}
