use serde::{Deserialize, Serialize};
use ucb_core::Outcome;

use crate::error::Guard;

/// Per-trial outcome record, index-aligned with the trial plan.
///
/// Slots `1..=sealed` are frozen; writes to them are refused.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OutcomeLedger {
    slots: Vec<Outcome>,
    sealed: usize,
}

impl OutcomeLedger {
    pub fn new(len: usize) -> Self {
        Self {
            slots: vec![Outcome::Unset; len],
            sealed: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Outcome> {
        index
            .checked_sub(1)
            .and_then(|i| self.slots.get(i))
            .copied()
    }

    /// Writes `outcome` at a 1-based index, returning the value it replaced.
    pub fn set(&mut self, index: usize, outcome: Outcome) -> Result<Outcome, Guard> {
        self.check_index(index)?;
        if !outcome.is_set() {
            return Err(Guard::UnsetValue);
        }
        if self.is_sealed(index) {
            return Err(Guard::StageClosed { stage: index });
        }
        Ok(std::mem::replace(&mut self.slots[index - 1], outcome))
    }

    /// Freezes every slot up to and including `index`.
    pub fn seal_through(&mut self, index: usize) {
        self.sealed = self.sealed.max(index.min(self.slots.len()));
    }

    pub fn sealed(&self) -> usize {
        self.sealed
    }

    pub fn is_sealed(&self, index: usize) -> bool {
        index <= self.sealed
    }

    pub fn is_complete(&self) -> bool {
        self.slots.iter().all(Outcome::is_set)
    }

    /// Lowest 1-based index still `Unset`.
    pub fn first_unset(&self) -> Option<usize> {
        self.slots.iter().position(|o| !o.is_set()).map(|i| i + 1)
    }

    pub fn as_slice(&self) -> &[Outcome] {
        &self.slots
    }

    pub fn iter(&self) -> impl Iterator<Item = Outcome> + '_ {
        self.slots.iter().copied()
    }

    fn check_index(&self, index: usize) -> Result<(), Guard> {
        if index == 0 || index > self.slots.len() {
            return Err(Guard::IndexOutOfRange {
                index,
                total: self.slots.len(),
            });
        }
        Ok(())
    }
}
