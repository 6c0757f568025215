pub mod config;
pub mod error;
pub mod ledger;
pub mod plan;
pub mod session;
pub mod state;
pub mod strategy;
pub mod trial;
pub mod validate;

pub use config::SessionConfig;
pub use error::{Guard, NotReadyReason, SessionError};
pub use ledger::OutcomeLedger;
pub use plan::{OddSplit, TrialPlan};
pub use session::TestSession;
pub use state::{ControllerEvent, SessionController, SessionEvent};
pub use strategy::{Advancement, ManualAdvancement, TimedAdvancement};
pub use trial::StageView;
pub use validate::{Completeness, FinalStatus, final_status, validate};
