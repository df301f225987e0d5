//! Activity history shown as a rolling daily average.
//!
//! The recent samples are static; logging an activity only produces a
//! notification.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::events::Event;

/// Number of trailing daily samples that make up the average.
pub const WINDOW_DAYS: usize = 7;

/// Activities offered as log buttons.
pub const LOGGABLE: [&str; 4] = ["study", "walk", "outing", "stretching"];

/// Minutes per day for one activity, oldest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityHistory {
    pub name: String,
    pub daily_minutes: Vec<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivitySummary {
    pub name: String,
    pub average_minutes: u64,
}

/// Rounded mean of the last [`WINDOW_DAYS`] samples, halves rounding up.
///
/// Fewer samples are averaged over what is there; no samples average to 0.
pub fn average_of(samples: &[u64]) -> u64 {
    let window = &samples[samples.len().saturating_sub(WINDOW_DAYS)..];
    if window.is_empty() {
        return 0;
    }
    // Widened so any u64 samples sum without overflow; the mean never
    // exceeds the largest sample, so it narrows back losslessly.
    let n = window.len() as u128;
    let sum: u128 = window.iter().map(|&m| u128::from(m)).sum();
    u64::try_from((2 * sum + n) / (2 * n)).unwrap_or(u64::MAX)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityLog {
    histories: Vec<ActivityHistory>,
}

impl Default for ActivityLog {
    fn default() -> Self {
        Self {
            histories: vec![
                ActivityHistory {
                    name: "study".into(),
                    daily_minutes: vec![10, 20, 15, 30, 0, 0, 10],
                },
                ActivityHistory {
                    name: "walk".into(),
                    daily_minutes: vec![5, 0, 10, 5, 5, 0, 0],
                },
            ],
        }
    }
}

impl ActivityLog {
    pub fn histories(&self) -> &[ActivityHistory] {
        &self.histories
    }

    pub fn summaries(&self) -> Vec<ActivitySummary> {
        self.histories
            .iter()
            .map(|h| ActivitySummary {
                name: h.name.clone(),
                average_minutes: average_of(&h.daily_minutes),
            })
            .collect()
    }

    /// Acknowledge an activity. Nothing is recorded.
    pub fn log_activity(&self, name: &str) -> Result<Event, ValidationError> {
        let name = name.trim();
        if !LOGGABLE.contains(&name) {
            return Err(ValidationError::UnknownActivity { name: name.into() });
        }
        Ok(Event::ActivityLogged {
            name: name.into(),
            at: Utc::now(),
        })
    }
}
