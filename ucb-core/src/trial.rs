use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Caregiver-observed result of one trial.
///
/// `Unset` is the initial value of every ledger slot and is never a valid
/// negative result; it must not reach a finalized report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Outcome {
    #[default]
    Unset,
    Activated,
    NotActivated,
}

impl Outcome {
    pub fn is_set(&self) -> bool {
        !matches!(self, Outcome::Unset)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Unset => "Unset",
            Outcome::Activated => "Activated",
            Outcome::NotActivated => "NotActivated",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown outcome {0:?}; expected T (activated) or F (not activated)")]
pub struct ParseOutcomeError(pub String);

impl FromStr for Outcome {
    type Err = ParseOutcomeError;

    /// Parses caregiver input (`T`/`F`) or a report column value.
    ///
    /// `Unset` is deliberately not parseable: it can only arise from a slot
    /// nobody wrote.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "T" | "t" | "Activated" => Ok(Outcome::Activated),
            "F" | "f" | "NotActivated" => Ok(Outcome::NotActivated),
            other => Err(ParseOutcomeError(other.to_string())),
        }
    }
}
