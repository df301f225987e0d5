use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::board::{CallKind, ChatMode, MessageKind};
use crate::timer::TimerMode;

/// Every observable state change in a session produces an Event.
/// The CLI prints them; tests assert on them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    ExperienceAwarded {
        amount: u64,
        experience: u64,
        at: DateTime<Utc>,
    },
    /// The recomputed level differs from the previous one.
    LevelUp {
        level: u64,
        at: DateTime<Utc>,
    },
    StreakIncremented {
        streak: u64,
        at: DateTime<Utc>,
    },
    GoalCompleted {
        goal_id: u32,
        title: String,
        experience_reward: u64,
        at: DateTime<Utc>,
    },
    /// Every goal in the catalog is done.
    AllGoalsCompleted {
        at: DateTime<Utc>,
    },
    TimerStarted {
        mode: TimerMode,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        mode: TimerMode,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    /// Work interval ran out; the rest interval starts automatically.
    WorkSessionCompleted {
        experience_reward: u64,
        rest_secs: u64,
        at: DateTime<Utc>,
    },
    /// Rest interval ran out; the timer stops on a fresh work interval.
    RestSessionEnded {
        work_secs: u64,
        at: DateTime<Utc>,
    },
    RivalRoomJoined {
        participants: u32,
        at: DateTime<Utc>,
    },
    ActivityLogged {
        name: String,
        at: DateTime<Utc>,
    },
    MessagePosted {
        author: String,
        text: String,
        kind: MessageKind,
        at: DateTime<Utc>,
    },
    ChatModeSwitched {
        mode: ChatMode,
        at: DateTime<Utc>,
    },
    CallRequested {
        kind: CallKind,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        experience: u64,
        xp_into_level: u64,
        xp_per_level: u64,
        level: u64,
        streak: u64,
        goals_done: usize,
        goals_total: usize,
        timer_mode: TimerMode,
        timer_display: String,
        timer_running: bool,
        rival_participants: u32,
        chat_mode: ChatMode,
        messages: usize,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// One-line human rendering used by the interactive CLI.
    pub fn describe(&self) -> String {
        match self {
            Event::ExperienceAwarded { amount, experience, .. } => {
                format!("+{amount} XP (total {experience})")
            }
            Event::LevelUp { level, .. } => format!("Congratulations! You reached level {level}!"),
            Event::StreakIncremented { streak, .. } => format!("Streak is now {streak}"),
            Event::GoalCompleted { title, experience_reward, .. } => {
                format!("Goal done: {title} (+{experience_reward} XP)")
            }
            Event::AllGoalsCompleted { .. } => "All of today's goals are done!".to_string(),
            Event::TimerStarted { mode, remaining_secs, .. } => format!(
                "{} started with {} left",
                mode.label(),
                crate::timer::format_clock(*remaining_secs)
            ),
            Event::TimerPaused { mode, remaining_secs, .. } => format!(
                "{} paused at {}",
                mode.label(),
                crate::timer::format_clock(*remaining_secs)
            ),
            Event::WorkSessionCompleted { experience_reward, rest_secs, .. } => format!(
                "Focus session complete! +{experience_reward} XP. {} of rest starts now",
                crate::timer::format_clock(*rest_secs)
            ),
            Event::RestSessionEnded { .. } => {
                "Rest is over! Start again or call it a day.".to_string()
            }
            Event::RivalRoomJoined { participants, .. } => {
                format!("Joined the rival room ({participants} participants)")
            }
            Event::ActivityLogged { name, .. } => format!("Logged activity: {name}"),
            Event::MessagePosted { author, text, .. } => format!("{author}: {text}"),
            Event::ChatModeSwitched { mode, .. } => format!("Chat mode: {}", mode.label()),
            Event::CallRequested { kind, .. } => {
                format!("Starting {} (not available yet)", kind.label())
            }
            Event::StateSnapshot {
                xp_into_level,
                xp_per_level,
                level,
                streak,
                goals_done,
                goals_total,
                timer_mode,
                timer_display,
                timer_running,
                rival_participants,
                ..
            } => format!(
                "level {level} | streak {streak} | XP {xp_into_level} / {xp_per_level} | goals {goals_done}/{goals_total} | {} {timer_display}{} | rivals {rival_participants}",
                timer_mode.label(),
                if *timer_running { " (running)" } else { "" },
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_type_tag() {
        let event = Event::LevelUp {
            level: 2,
            at: Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "LevelUp");
        assert_eq!(json["level"], 2);
    }

    #[test]
    fn describe_work_completion_mentions_rest() {
        let event = Event::WorkSessionCompleted {
            experience_reward: 50,
            rest_secs: 300,
            at: Utc::now(),
        };
        assert_eq!(
            event.describe(),
            "Focus session complete! +50 XP. 5:00 of rest starts now"
        );
    }

    #[test]
    fn describe_timer_start_and_pause_show_clock() {
        let started = Event::TimerStarted {
            mode: TimerMode::Work,
            remaining_secs: 1500,
            at: Utc::now(),
        };
        assert_eq!(started.describe(), "Focus time started with 25:00 left");
        let paused = Event::TimerPaused {
            mode: TimerMode::Rest,
            remaining_secs: 65,
            at: Utc::now(),
        };
        assert_eq!(paused.describe(), "Rest time paused at 1:05");
    }
}
