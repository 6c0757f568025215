use serde::{Deserialize, Serialize};
use ucb_core::AdvancementMode;

use crate::error::SessionError;
use crate::plan::OddSplit;

pub const DEFAULT_TRIAL_COUNT: usize = 6;
pub const DEFAULT_WINDOW_MS: u64 = 10_000;
pub const DEFAULT_VARIANT_SUFFIX: &str = "ucb-test-1";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub trial_count: usize,
    pub odd_split: OddSplit,
    /// Per-stage window for timed sessions.
    pub window_ms: u64,
    pub mode: AdvancementMode,
    pub subject: Option<String>,
    /// When set, `start` is refused until a non-empty subject is known.
    pub require_subject: bool,
    /// Fixed seed for reproducible plans; `None` draws from the OS.
    pub seed: Option<u64>,
    /// Identifies the test variant in exported file names.
    pub variant_suffix: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            trial_count: DEFAULT_TRIAL_COUNT,
            odd_split: OddSplit::default(),
            window_ms: DEFAULT_WINDOW_MS,
            mode: AdvancementMode::default(),
            subject: None,
            require_subject: false,
            seed: None,
            variant_suffix: DEFAULT_VARIANT_SUFFIX.to_string(),
        }
    }
}

impl SessionConfig {
    pub fn manual() -> Self {
        Self::default()
    }

    pub fn timed(window_ms: u64) -> Self {
        Self {
            mode: AdvancementMode::Timed,
            window_ms,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), SessionError> {
        self.odd_split.counts(self.trial_count)?;
        if self.mode == AdvancementMode::Timed && self.window_ms == 0 {
            return Err(SessionError::InvalidConfiguration(
                "timed sessions need a non-zero stage window".to_string(),
            ));
        }
        if self.variant_suffix.trim().is_empty() {
            return Err(SessionError::InvalidConfiguration(
                "variant suffix must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
