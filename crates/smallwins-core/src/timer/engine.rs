//! Focus timer implementation.
//!
//! The focus timer is a second-granular state machine. It does not own a
//! clock - the caller is responsible for calling `tick()` once per elapsed
//! second while the timer runs.
//!
//! ## Transitions
//!
//! ```text
//! Work(running) --0s, +XP--> Rest(running) --0s--> Work(stopped)
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut timer = FocusTimer::default();
//! timer.toggle();
//! // Once per second:
//! timer.tick(&mut rewards); // Returns the events of a phase change
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::mode::{format_clock, TimerMode, REST_SECS, WORK_SECS};
use crate::events::Event;
use crate::reward::RewardSink;

/// Durations and rewards for one timer instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSettings {
    pub work_secs: u64,
    pub rest_secs: u64,
    /// Experience paid when a work interval runs out.
    pub work_reward_xp: u64,
    /// Participants already shown in the rival room.
    pub rival_participants: u32,
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self {
            work_secs: WORK_SECS,
            rest_secs: REST_SECS,
            work_reward_xp: 50,
            rival_participants: 2,
        }
    }
}

impl TimerSettings {
    fn duration_of(&self, mode: TimerMode) -> u64 {
        match mode {
            TimerMode::Work => self.work_secs,
            TimerMode::Rest => self.rest_secs,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FocusTimer {
    settings: TimerSettings,
    mode: TimerMode,
    remaining_secs: u64,
    running: bool,
    /// Local counter for the rival room placeholder.
    rival_participants: u32,
}

impl Default for FocusTimer {
    fn default() -> Self {
        Self::new(TimerSettings::default())
    }
}

impl FocusTimer {
    /// Create a stopped timer at the start of a work interval.
    pub fn new(settings: TimerSettings) -> Self {
        Self {
            settings,
            mode: TimerMode::Work,
            remaining_secs: settings.work_secs,
            running: false,
            rival_participants: settings.rival_participants,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn mode(&self) -> TimerMode {
        self.mode
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn rival_participants(&self) -> u32 {
        self.rival_participants
    }

    pub fn settings(&self) -> &TimerSettings {
        &self.settings
    }

    /// Remaining time as `M:SS`.
    pub fn display(&self) -> String {
        format_clock(self.remaining_secs)
    }

    /// Caption of the start/pause control.
    pub fn toggle_label(&self) -> &'static str {
        match (self.running, self.mode) {
            (true, _) => "pause",
            (false, TimerMode::Work) => "start work",
            (false, TimerMode::Rest) => "start rest",
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start or pause. Never touches the remaining time.
    pub fn toggle(&mut self) -> Event {
        self.running = !self.running;
        if self.running {
            Event::TimerStarted {
                mode: self.mode,
                remaining_secs: self.remaining_secs,
                at: Utc::now(),
            }
        } else {
            Event::TimerPaused {
                mode: self.mode,
                remaining_secs: self.remaining_secs,
                at: Utc::now(),
            }
        }
    }

    /// Advance by one second. Returns the events of a phase change, if any.
    pub fn tick(&mut self, sink: &mut impl RewardSink) -> Vec<Event> {
        if !self.running {
            return Vec::new();
        }
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs > 0 {
            return Vec::new();
        }

        match self.mode {
            TimerMode::Work => {
                let reward = self.settings.work_reward_xp;
                let mut events = sink.award_experience(reward);
                self.switch_to(TimerMode::Rest);
                tracing::info!(reward, "work interval completed, resting");
                events.push(Event::WorkSessionCompleted {
                    experience_reward: reward,
                    rest_secs: self.remaining_secs,
                    at: Utc::now(),
                });
                events
            }
            TimerMode::Rest => {
                self.switch_to(TimerMode::Work);
                self.running = false;
                tracing::info!("rest interval ended, timer stopped");
                vec![Event::RestSessionEnded {
                    work_secs: self.remaining_secs,
                    at: Utc::now(),
                }]
            }
        }
    }

    /// Bump the rival room counter. No other participant is contacted.
    pub fn join_rival_room(&mut self) -> Event {
        self.rival_participants += 1;
        Event::RivalRoomJoined {
            participants: self.rival_participants,
            at: Utc::now(),
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn switch_to(&mut self, mode: TimerMode) {
        self.mode = mode;
        self.remaining_secs = self.settings.duration_of(mode);
    }
}
