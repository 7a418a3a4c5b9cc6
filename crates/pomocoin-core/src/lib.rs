//! # Pomocoin Core Library
//!
//! This library provides the core business logic for Pomocoin, a Pomodoro
//! timer with a coin economy. Everything is available to a standalone CLI
//! binary; any richer front end is a thin layer over the same library.
//!
//! ## Architecture
//!
//! - **Timer Controller**: a tick-driven work/break state machine that turns
//!   commands into [`Event`]s, plus an async runtime that ticks it once per second
//! - **Rewards**: idempotent coin credits for pomodoros, tasks and progress notes
//! - **Storage**: SQLite persistence for tasks, the wallet, daily statistics and
//!   shop ownership; TOML configuration
//! - **Catalogs**: built-in music tracks and room decorations
//! - **Statistics**: streaks, weekly summaries and achievements
//!
//! ## Key Components
//!
//! - [`TimerController`]: Core timer state machine
//! - [`RewardDispatcher`]: Coin and counter bookkeeping
//! - [`Database`]: Persistence for everything except configuration
//! - [`Config`]: Application configuration management

pub mod catalog;
pub mod error;
pub mod events;
pub mod format;
pub mod notify;
pub mod repository;
pub mod rewards;
pub mod stats;
pub mod storage;
pub mod task;
pub mod timer;

pub use error::{ConfigError, CoreError, DatabaseError, Result, ValidationError};
pub use events::Event;
pub use notify::{completion_message, LogNotifier, Notifier, RecordingNotifier};
pub use repository::{CreditOutcome, StatsDelta, StatsRepository, TaskRepository, Wallet, WalletRepository};
pub use rewards::{RewardDispatcher, RewardEvent, RewardKind};
pub use storage::{Config, Database, ImportOutcome, ImportedMusic, MusicConfig, PurchaseOutcome};
pub use task::{ProgressNote, Task};
pub use timer::{
    Clock, SessionType, SystemClock, TimerController, TimerHandle, TimerSettings, TimerSnapshot,
    TimerState, TokioClock,
};
