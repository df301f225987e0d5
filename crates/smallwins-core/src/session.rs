//! One page load worth of state.
//!
//! A [`Session`] owns the reward state and every panel, and hands the reward
//! state down to goals and the timer when they pay out. Nothing here is
//! global; dropping the session discards everything.

use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::activity::{ActivityLog, ActivitySummary};
use crate::board::{AnonymousBoard, CallKind, ChatMode, Message};
use crate::error::Result;
use crate::events::Event;
use crate::goals::{Goal, MicroGoalList};
use crate::reward::RewardState;
use crate::storage::Config;
use crate::timer::FocusTimer;

/// A user interaction with one of the panels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    CompleteGoal { id: u32 },
    ToggleTimer,
    JoinRivalRoom,
    LogActivity { name: String },
    SwitchChatMode { mode: ChatMode },
    SendMessage { text: String },
    RequestCall { kind: CallKind },
}

/// Work the runtime has to schedule on behalf of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowUp {
    BotReply { after: Duration },
}

/// What a command produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reaction {
    pub events: Vec<Event>,
    pub follow_ups: Vec<FollowUp>,
}

impl From<Vec<Event>> for Reaction {
    fn from(events: Vec<Event>) -> Self {
        Self {
            events,
            follow_ups: Vec::new(),
        }
    }
}

impl From<Event> for Reaction {
    fn from(event: Event) -> Self {
        vec![event].into()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Session {
    rewards: RewardState,
    goals: MicroGoalList,
    timer: FocusTimer,
    activities: ActivityLog,
    board: AnonymousBoard,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            rewards: RewardState::new(config.reward.xp_per_level),
            goals: MicroGoalList::daily(),
            timer: FocusTimer::new(config.timer_settings()),
            activities: ActivityLog::default(),
            board: AnonymousBoard::new(config.reply_delay()),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn rewards(&self) -> &RewardState {
        &self.rewards
    }

    pub fn goals(&self) -> &[Goal] {
        self.goals.goals()
    }

    pub fn timer(&self) -> &FocusTimer {
        &self.timer
    }

    pub fn activity_summaries(&self) -> Vec<ActivitySummary> {
        self.activities.summaries()
    }

    pub fn board(&self) -> &AnonymousBoard {
        &self.board
    }

    pub fn history(&self) -> &[Message] {
        self.board.history()
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        let progress = self.rewards.progress();
        Event::StateSnapshot {
            experience: progress.experience,
            xp_into_level: self.rewards.xp_into_level(),
            xp_per_level: self.rewards.xp_per_level(),
            level: progress.level,
            streak: progress.streak,
            goals_done: self.goals.done_count(),
            goals_total: self.goals.goals().len(),
            timer_mode: self.timer.mode(),
            timer_display: self.timer.display(),
            timer_running: self.timer.is_running(),
            rival_participants: self.timer.rival_participants(),
            chat_mode: self.board.mode(),
            messages: self.board.history().len(),
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn apply(&mut self, command: Command) -> Result<Reaction> {
        tracing::debug!(?command, "applying command");
        let reaction: Reaction = match command {
            Command::CompleteGoal { id } => self.goals.complete_goal(id, &mut self.rewards)?.into(),
            Command::ToggleTimer => self.timer.toggle().into(),
            Command::JoinRivalRoom => self.timer.join_rival_room().into(),
            Command::LogActivity { name } => self.activities.log_activity(&name)?.into(),
            Command::SwitchChatMode { mode } => self.board.switch_mode(mode).into(),
            Command::SendMessage { text } => match self.board.send(&text) {
                Some(sent) => Reaction {
                    events: vec![sent.event],
                    follow_ups: sent
                        .reply_after
                        .map(|after| FollowUp::BotReply { after })
                        .into_iter()
                        .collect(),
                },
                None => Reaction::default(),
            },
            Command::RequestCall { kind } => self.board.request_call(kind).into(),
        };
        Ok(reaction)
    }

    /// One elapsed second of the focus timer.
    pub fn tick(&mut self) -> Vec<Event> {
        self.timer.tick(&mut self.rewards)
    }

    pub fn deliver_bot_reply(&mut self) -> Event {
        self.board.deliver_bot_reply()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::TimerMode;

    #[test]
    fn goals_and_timer_share_rewards() {
        let mut session = Session::new();
        for id in 1..=3 {
            session.apply(Command::CompleteGoal { id }).unwrap();
        }
        assert_eq!(session.rewards().experience(), 60);
        assert_eq!(session.rewards().streak(), 1);

        session.apply(Command::ToggleTimer).unwrap();
        for _ in 0..1500 {
            session.tick();
        }
        assert_eq!(session.timer().mode(), TimerMode::Rest);
        assert_eq!(session.rewards().experience(), 110);
        assert_eq!(session.rewards().level(), 2);
    }

    #[test]
    fn activity_and_board_leave_rewards_alone() {
        let mut session = Session::new();
        session
            .apply(Command::LogActivity { name: "study".into() })
            .unwrap();
        session.apply(Command::JoinRivalRoom).unwrap();
        session
            .apply(Command::SendMessage { text: "cheer up".into() })
            .unwrap();
        assert_eq!(session.rewards().experience(), 0);
        assert_eq!(session.timer().rival_participants(), 3);
    }

    #[test]
    fn chatbot_send_asks_for_reply() {
        let mut session = Session::new();
        session
            .apply(Command::SwitchChatMode { mode: ChatMode::Chatbot })
            .unwrap();
        let reaction = session
            .apply(Command::SendMessage { text: "hello".into() })
            .unwrap();
        assert_eq!(reaction.events.len(), 1);
        assert_eq!(
            reaction.follow_ups,
            vec![FollowUp::BotReply { after: Duration::from_millis(500) }]
        );

        let reaction = session
            .apply(Command::SendMessage { text: "  ".into() })
            .unwrap();
        assert_eq!(reaction, Reaction::default());
    }

    #[test]
    fn unknown_goal_surfaces_as_error() {
        let mut session = Session::new();
        assert!(session.apply(Command::CompleteGoal { id: 42 }).is_err());
    }

    #[test]
    fn snapshot_reflects_state() {
        let mut session = Session::new();
        session.apply(Command::CompleteGoal { id: 2 }).unwrap();
        match session.snapshot() {
            Event::StateSnapshot {
                experience,
                level,
                goals_done,
                goals_total,
                timer_display,
                messages,
                ..
            } => {
                assert_eq!(experience, 30);
                assert_eq!(level, 1);
                assert_eq!(goals_done, 1);
                assert_eq!(goals_total, 3);
                assert_eq!(timer_display, "25:00");
                assert_eq!(messages, 2);
            }
            _ => panic!("Expected StateSnapshot"),
        }
    }
}
