pub mod timer;
pub mod window;

pub use timer::{sleep, Clock, ManualClock, MonotonicClock};
pub use window::{session_bound_ms, stage_at, stage_deadline};
