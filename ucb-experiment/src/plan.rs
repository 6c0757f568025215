use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use ucb_core::TrialLabel;

use crate::error::SessionError;

/// Rounding rule for plans with an odd number of trials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OddSplit {
    /// Odd trial counts are a configuration error.
    #[default]
    Reject,
    /// The extra trial is a `Press`.
    ExtraPress,
    /// The extra trial is a `NoPress`.
    ExtraNoPress,
}

impl OddSplit {
    /// `(press, no_press)` label counts for a plan of `n` trials.
    pub fn counts(&self, n: usize) -> Result<(usize, usize), SessionError> {
        if n == 0 {
            return Err(SessionError::InvalidConfiguration(
                "trial count must be positive".to_string(),
            ));
        }
        let half = n / 2;
        if n % 2 == 0 {
            return Ok((half, half));
        }
        match self {
            OddSplit::Reject => Err(SessionError::InvalidConfiguration(format!(
                "{n} trials cannot be split evenly between Press and NoPress"
            ))),
            OddSplit::ExtraPress => Ok((half + 1, half)),
            OddSplit::ExtraNoPress => Ok((half, half + 1)),
        }
    }
}

/// Balanced, shuffled sequence of trial labels. Frozen once generated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialPlan {
    labels: Vec<TrialLabel>,
}

impl TrialPlan {
    /// Uniformly random arrangement of the label multiset chosen by `split`.
    pub fn generate<R: Rng + ?Sized>(
        n: usize,
        split: OddSplit,
        rng: &mut R,
    ) -> Result<Self, SessionError> {
        let (press, no_press) = split.counts(n)?;
        let mut labels = Vec::with_capacity(n);
        labels.extend(std::iter::repeat_n(TrialLabel::Press, press));
        labels.extend(std::iter::repeat_n(TrialLabel::NoPress, no_press));
        labels.shuffle(rng);
        Ok(Self { labels })
    }

    pub fn generate_seeded(
        n: usize,
        split: OddSplit,
        seed: Option<u64>,
    ) -> Result<Self, SessionError> {
        match seed {
            Some(seed) => Self::generate(n, split, &mut StdRng::seed_from_u64(seed)),
            None => Self::generate(n, split, &mut rand::rng()),
        }
    }

    /// Wraps a fixed label sequence, e.g. to replay a recorded session.
    ///
    /// The sequence must be non-empty and balanced to within one label.
    pub fn from_labels(labels: Vec<TrialLabel>) -> Result<Self, SessionError> {
        if labels.is_empty() {
            return Err(SessionError::InvalidConfiguration(
                "trial plan must not be empty".to_string(),
            ));
        }
        let press = labels.iter().filter(|l| **l == TrialLabel::Press).count();
        let no_press = labels.len() - press;
        if press.abs_diff(no_press) > 1 {
            return Err(SessionError::InvalidConfiguration(format!(
                "unbalanced plan: {press} Press vs {no_press} NoPress"
            )));
        }
        Ok(Self { labels })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Label of a 1-based stage.
    pub fn label(&self, stage: usize) -> Option<TrialLabel> {
        stage
            .checked_sub(1)
            .and_then(|i| self.labels.get(i))
            .copied()
    }

    pub fn labels(&self) -> &[TrialLabel] {
        &self.labels
    }

    pub fn count(&self, label: TrialLabel) -> usize {
        self.labels.iter().filter(|l| **l == label).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = TrialLabel> + '_ {
        self.labels.iter().copied()
    }
}
