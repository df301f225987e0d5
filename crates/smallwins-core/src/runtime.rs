//! Drives a [`Session`] against real time.
//!
//! Scheduled work never touches the session directly. Spawned tasks only
//! post a [`Wakeup`] into a channel and [`SessionRuntime`] applies wakeups
//! one at a time, so every mutation runs to completion before the next.
//!
//! Must be used from within a tokio runtime.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};

use crate::error::Result;
use crate::events::Event;
use crate::session::{Command, FollowUp, Session};

/// Period of the focus timer tick.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Message posted by a scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wakeup {
    /// One second elapsed for the ticker of the given generation.
    TimerTick { generation: u64 },
    /// A chatbot reply is due.
    BotReply { id: u64 },
}

/// Owned handle to a scheduled task. Cancels the task when dropped.
#[derive(Debug)]
pub struct TaskHandle {
    handle: JoinHandle<()>,
}

impl TaskHandle {
    pub fn cancel(self) {
        drop(self);
    }

    /// True once the task has run to completion. A repeating task never does.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for TaskHandle {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Spawns timed tasks that report back through a channel.
#[derive(Debug, Clone)]
pub struct Scheduler {
    tx: mpsc::UnboundedSender<Wakeup>,
}

impl Scheduler {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Wakeup>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Post `wakeup` every `period`, first after one full period.
    pub fn every(&self, period: Duration, wakeup: Wakeup) -> TaskHandle {
        let tx = self.tx.clone();
        let handle = tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            loop {
                interval.tick().await;
                if tx.send(wakeup).is_err() {
                    break;
                }
            }
        });
        TaskHandle { handle }
    }

    /// Post `wakeup` once after `delay`.
    pub fn after(&self, delay: Duration, wakeup: Wakeup) -> TaskHandle {
        let tx = self.tx.clone();
        let handle = tokio::spawn(async move {
            time::sleep(delay).await;
            let _ = tx.send(wakeup);
        });
        TaskHandle { handle }
    }
}

pub struct SessionRuntime {
    session: Session,
    scheduler: Scheduler,
    wakeups: Option<mpsc::UnboundedReceiver<Wakeup>>,
    ticker: Option<TaskHandle>,
    tick_generation: u64,
    pending_replies: HashMap<u64, TaskHandle>,
    next_reply_id: u64,
}

impl SessionRuntime {
    pub fn new(session: Session) -> Self {
        let (scheduler, wakeups) = Scheduler::channel();
        Self {
            session,
            scheduler,
            wakeups: Some(wakeups),
            ticker: None,
            tick_generation: 0,
            pending_replies: HashMap::new(),
            next_reply_id: 0,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn is_ticking(&self) -> bool {
        self.ticker.is_some()
    }

    pub fn pending_replies(&self) -> usize {
        self.pending_replies.len()
    }

    pub fn is_torn_down(&self) -> bool {
        self.wakeups.is_none()
    }

    /// Apply a user command and schedule whatever it asked for.
    pub fn dispatch(&mut self, command: Command) -> Result<Vec<Event>> {
        let reaction = self.session.apply(command)?;
        for follow_up in reaction.follow_ups {
            match follow_up {
                FollowUp::BotReply { after } => self.schedule_reply(after),
            }
        }
        self.sync_ticker();
        Ok(reaction.events)
    }

    /// Wait for the next scheduled wakeup and apply it.
    ///
    /// Returns `None` once the runtime is torn down. A stale tick from a
    /// cancelled ticker yields an empty batch.
    pub async fn next_events(&mut self) -> Option<Vec<Event>> {
        let wakeup = self.wakeups.as_mut()?.recv().await?;
        Some(self.handle_wakeup(wakeup))
    }

    /// Cancel every scheduled task and stop accepting wakeups.
    pub fn teardown(&mut self) {
        self.stop_ticker();
        let pending = self.pending_replies.len();
        self.pending_replies.clear();
        self.wakeups = None;
        tracing::debug!(pending, "session torn down");
    }

    fn handle_wakeup(&mut self, wakeup: Wakeup) -> Vec<Event> {
        match wakeup {
            Wakeup::TimerTick { generation } => {
                if generation != self.tick_generation || self.ticker.is_none() {
                    tracing::debug!(generation, "dropping stale tick");
                    return Vec::new();
                }
                let events = self.session.tick();
                self.sync_ticker();
                events
            }
            Wakeup::BotReply { id } => match self.pending_replies.remove(&id) {
                Some(_) => vec![self.session.deliver_bot_reply()],
                None => Vec::new(),
            },
        }
    }

    fn schedule_reply(&mut self, after: Duration) {
        let id = self.next_reply_id;
        self.next_reply_id += 1;
        let handle = self.scheduler.after(after, Wakeup::BotReply { id });
        self.pending_replies.insert(id, handle);
        tracing::debug!(id, ?after, "bot reply scheduled");
    }

    /// Keep exactly one ticker alive while the timer runs.
    fn sync_ticker(&mut self) {
        match (self.session.timer().is_running(), self.ticker.is_some()) {
            (true, false) => {
                self.tick_generation += 1;
                let wakeup = Wakeup::TimerTick {
                    generation: self.tick_generation,
                };
                self.ticker = Some(self.scheduler.every(TICK_PERIOD, wakeup));
                tracing::debug!(generation = self.tick_generation, "ticker started");
            }
            (false, true) => self.stop_ticker(),
            _ => {}
        }
    }

    fn stop_ticker(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.cancel();
            tracing::debug!(generation = self.tick_generation, "ticker stopped");
        }
    }
}

impl Drop for SessionRuntime {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn after_fires_once() {
        let (scheduler, mut rx) = Scheduler::channel();
        let handle = scheduler.after(Duration::from_millis(500), Wakeup::BotReply { id: 7 });
        assert!(!handle.is_finished());
        assert_eq!(rx.recv().await, Some(Wakeup::BotReply { id: 7 }));
        tokio::task::yield_now().await;
        assert!(handle.is_finished());
        time::sleep(Duration::from_secs(2)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_handle_cancels() {
        let (scheduler, mut rx) = Scheduler::channel();
        let handle = scheduler.after(Duration::from_millis(500), Wakeup::BotReply { id: 1 });
        handle.cancel();
        time::sleep(Duration::from_secs(2)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn every_waits_one_period_first() {
        let (scheduler, mut rx) = Scheduler::channel();
        let start = Instant::now();
        let handle = scheduler.every(TICK_PERIOD, Wakeup::TimerTick { generation: 1 });
        rx.recv().await;
        assert_eq!(start.elapsed(), TICK_PERIOD);
        rx.recv().await;
        assert_eq!(start.elapsed(), TICK_PERIOD * 2);
        assert!(!handle.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn stale_tick_is_ignored() {
        let mut runtime = SessionRuntime::new(Session::new());
        runtime.dispatch(Command::ToggleTimer).unwrap();
        let stale = Wakeup::TimerTick { generation: 0 };
        assert!(runtime.handle_wakeup(stale).is_empty());
        assert_eq!(runtime.session().timer().remaining_secs(), 1500);
    }

    #[tokio::test(start_paused = true)]
    async fn teardown_ends_event_stream() {
        let mut runtime = SessionRuntime::new(Session::new());
        runtime.dispatch(Command::ToggleTimer).unwrap();
        assert!(runtime.is_ticking());
        runtime.teardown();
        assert!(!runtime.is_ticking());
        assert!(runtime.is_torn_down());
        assert_eq!(runtime.next_events().await, None);
    }
}
