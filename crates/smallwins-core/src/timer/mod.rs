mod engine;
mod mode;

pub use engine::{FocusTimer, TimerSettings};
pub use mode::{format_clock, TimerMode, REST_SECS, WORK_SECS};
