pub mod label;
pub mod phase;
pub mod trial;

pub use label::TrialLabel;
pub use phase::{AdvancementMode, SessionState};
pub use trial::{Outcome, ParseOutcomeError};
