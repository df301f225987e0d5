//! Daily micro goals.
//!
//! A fixed catalog of small goals. Each one pays its experience exactly once,
//! and finishing the last open goal bumps the streak.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::events::Event;
use crate::reward::RewardSink;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goal {
    pub id: u32,
    pub title: String,
    pub experience_reward: u64,
    #[serde(default)]
    pub done: bool,
}

impl Goal {
    fn new(id: u32, title: &str, experience_reward: u64) -> Self {
        Self {
            id,
            title: title.into(),
            experience_reward,
            done: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MicroGoalList {
    goals: Vec<Goal>,
}

impl Default for MicroGoalList {
    fn default() -> Self {
        Self::daily()
    }
}

impl MicroGoalList {
    /// Today's catalog, all open.
    pub fn daily() -> Self {
        Self {
            goals: vec![
                Goal::new(1, "Drink a glass of water", 10),
                Goal::new(2, "Study for 20 minutes", 30),
                Goal::new(3, "Write down three things to do", 20),
            ],
        }
    }

    pub fn goals(&self) -> &[Goal] {
        &self.goals
    }

    pub fn done_count(&self) -> usize {
        self.goals.iter().filter(|g| g.done).count()
    }

    pub fn all_done(&self) -> bool {
        self.goals.iter().all(|g| g.done)
    }

    /// Mark a goal done and pay out through `sink`.
    ///
    /// Completing a goal that is already done does nothing. The streak is
    /// bumped only by the completion that closes the catalog.
    pub fn complete_goal(
        &mut self,
        id: u32,
        sink: &mut impl RewardSink,
    ) -> Result<Vec<Event>, ValidationError> {
        let goal = self
            .goals
            .iter_mut()
            .find(|g| g.id == id)
            .ok_or(ValidationError::UnknownGoal { id })?;
        if goal.done {
            return Ok(Vec::new());
        }
        goal.done = true;

        let mut events = vec![Event::GoalCompleted {
            goal_id: goal.id,
            title: goal.title.clone(),
            experience_reward: goal.experience_reward,
            at: Utc::now(),
        }];
        let reward = goal.experience_reward;
        tracing::debug!(goal_id = id, reward, "goal completed");
        events.extend(sink.award_experience(reward));

        if self.all_done() {
            events.push(Event::AllGoalsCompleted { at: Utc::now() });
            events.push(sink.increment_streak());
        }
        Ok(events)
    }
}
