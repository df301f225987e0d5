//! Experience, level and streak bookkeeping.
//!
//! `RewardState` is the only state shared across components. Goals and the
//! focus timer never own it; they receive it as a [`RewardSink`] when they
//! need to pay out.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::events::Event;

/// Experience needed per level with the default configuration.
pub const DEFAULT_XP_PER_LEVEL: u64 = 100;

/// The mutators a component may call on the reward state.
pub trait RewardSink {
    /// Add `amount` experience and recompute the level.
    fn award_experience(&mut self, amount: u64) -> Vec<Event>;

    /// Add one to the streak.
    fn increment_streak(&mut self) -> Event;
}

/// Snapshot of the player's progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub experience: u64,
    pub level: u64,
    pub streak: u64,
}

impl Default for Progress {
    fn default() -> Self {
        Self {
            experience: 0,
            level: 1,
            streak: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewardState {
    progress: Progress,
    xp_per_level: u64,
}

impl Default for RewardState {
    fn default() -> Self {
        Self::new(DEFAULT_XP_PER_LEVEL)
    }
}

impl RewardState {
    /// A fresh state at level 1. `xp_per_level` of zero is treated as one.
    pub fn new(xp_per_level: u64) -> Self {
        Self {
            progress: Progress::default(),
            xp_per_level: xp_per_level.max(1),
        }
    }

    pub fn progress(&self) -> Progress {
        self.progress
    }

    pub fn experience(&self) -> u64 {
        self.progress.experience
    }

    pub fn level(&self) -> u64 {
        self.progress.level
    }

    pub fn streak(&self) -> u64 {
        self.progress.streak
    }

    pub fn xp_per_level(&self) -> u64 {
        self.xp_per_level
    }

    /// Experience earned inside the current level.
    pub fn xp_into_level(&self) -> u64 {
        self.progress.experience % self.xp_per_level
    }

    /// 0.0 .. 100.0 fill of the bar towards the next level.
    pub fn level_progress_pct(&self) -> f64 {
        self.xp_into_level() as f64 / self.xp_per_level as f64 * 100.0
    }

    fn level_for(&self, experience: u64) -> u64 {
        experience / self.xp_per_level + 1
    }
}

impl RewardSink for RewardState {
    fn award_experience(&mut self, amount: u64) -> Vec<Event> {
        let before = self.progress.level;
        self.progress.experience = self.progress.experience.saturating_add(amount);
        self.progress.level = self.level_for(self.progress.experience);

        let mut events = vec![Event::ExperienceAwarded {
            amount,
            experience: self.progress.experience,
            at: Utc::now(),
        }];
        if self.progress.level != before {
            tracing::info!(level = self.progress.level, "level up");
            events.push(Event::LevelUp {
                level: self.progress.level,
                at: Utc::now(),
            });
        }
        events
    }

    fn increment_streak(&mut self) -> Event {
        self.progress.streak += 1;
        tracing::info!(streak = self.progress.streak, "streak incremented");
        Event::StreakIncremented {
            streak: self.progress.streak,
            at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn starts_at_level_one() {
        let state = RewardState::default();
        assert_eq!(state.progress(), Progress { experience: 0, level: 1, streak: 0 });
    }

    #[test]
    fn level_up_is_reported_once_per_boundary() {
        let mut state = RewardState::default();
        let events = state.award_experience(90);
        assert_eq!(events.len(), 1);
        assert_eq!(state.level(), 1);

        let events = state.award_experience(10);
        assert_eq!(state.level(), 2);
        assert!(matches!(events[1], Event::LevelUp { level: 2, .. }));

        let events = state.award_experience(50);
        assert_eq!(events.len(), 1);
        assert_eq!(state.xp_into_level(), 50);
        assert_eq!(state.level_progress_pct(), 50.0);
    }

    #[test]
    fn large_award_skips_levels() {
        let mut state = RewardState::default();
        let events = state.award_experience(350);
        assert_eq!(state.level(), 4);
        assert!(matches!(events.last(), Some(Event::LevelUp { level: 4, .. })));
    }

    #[test]
    fn streak_counts_up() {
        let mut state = RewardState::default();
        state.increment_streak();
        let event = state.increment_streak();
        assert_eq!(state.streak(), 2);
        assert!(matches!(event, Event::StreakIncremented { streak: 2, .. }));
    }

    proptest! {
        #[test]
        fn level_tracks_total_experience(awards in proptest::collection::vec(1u64..500, 0..40)) {
            let mut state = RewardState::default();
            let mut total = 0;
            for amount in awards {
                state.award_experience(amount);
                total += amount;
                prop_assert_eq!(state.experience(), total);
                prop_assert_eq!(state.level(), total / 100 + 1);
            }
        }
    }
}
