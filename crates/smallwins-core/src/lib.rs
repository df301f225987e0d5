//! # Small Wins Core Library
//!
//! This library provides the core logic of Small Wins, a motivational
//! session built from small rewarded steps. Every panel is a plain state
//! machine; the CLI binary is a thin interactive layer over the same types.
//!
//! ## Architecture
//!
//! - **Rewards**: experience, derived level and streak, shared by the panels
//!   that pay out through [`RewardSink`]
//! - **Micro goals**: a fixed daily checklist that pays once per goal
//! - **Focus timer**: a tick-driven work/rest state machine
//! - **Activity log** and **anonymous board**: self-contained panels
//! - **Runtime**: schedules the one-second tick and the delayed chatbot reply
//!   as cancellable tasks around a [`Session`]
//!
//! All session state is in memory and disappears with the [`Session`]; only
//! the [`Config`] tunables live on disk.

pub mod activity;
pub mod board;
pub mod error;
pub mod events;
pub mod goals;
pub mod reward;
pub mod runtime;
pub mod session;
pub mod storage;
pub mod timer;

pub use activity::{average_of, ActivityLog, ActivitySummary};
pub use board::{AnonymousBoard, CallKind, ChatMode, Message, MessageKind};
pub use error::{ConfigError, CoreError, ValidationError};
pub use events::Event;
pub use goals::{Goal, MicroGoalList};
pub use reward::{Progress, RewardSink, RewardState};
pub use runtime::{Scheduler, SessionRuntime, TaskHandle, Wakeup};
pub use session::{Command, Session};
pub use storage::Config;
pub use timer::{FocusTimer, TimerMode, TimerSettings};
