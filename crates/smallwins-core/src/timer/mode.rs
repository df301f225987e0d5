use serde::{Deserialize, Serialize};

/// Length of a focus interval (25 minutes).
pub const WORK_SECS: u64 = 25 * 60;
/// Length of a rest interval (5 minutes).
pub const REST_SECS: u64 = 5 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerMode {
    Work,
    Rest,
}

impl TimerMode {
    pub fn label(&self) -> &'static str {
        match self {
            TimerMode::Work => "Focus time",
            TimerMode::Rest => "Rest time",
        }
    }
}

/// Render seconds as `M:SS`.
pub fn format_clock(secs: u64) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_pads_seconds_only() {
        assert_eq!(format_clock(1500), "25:00");
        assert_eq!(format_clock(299), "4:59");
        assert_eq!(format_clock(65), "1:05");
        assert_eq!(format_clock(0), "0:00");
    }
}
