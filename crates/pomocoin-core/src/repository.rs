//! Storage seams used by the timer controller and the reward dispatcher.
//!
//! [`crate::Database`] implements all three; tests swap in failing or
//! recording doubles.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::rewards::RewardEvent;
use crate::task::{ProgressNote, Task};

/// Task-like records the controller reads and writes.
pub trait TaskRepository {
    fn get(&self, id: i64) -> Result<Option<Task>>;
    fn update(&self, task: &Task) -> Result<()>;
    fn append_note(&self, id: i64, note: &ProgressNote) -> Result<()>;
}

/// The single user's coin balance and lifetime counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wallet {
    pub coins: u32,
    pub total_pomodoros: u32,
    pub total_tasks_completed: u32,
    pub total_notes_written: u32,
}

/// Outcome of a credit attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreditOutcome {
    Applied,
    /// The event id was already in the ledger.
    Duplicate,
    /// No user row to credit.
    NoUser,
}

/// Currency and counters.
pub trait WalletRepository {
    /// Credit the event's coins and bump its counter, once per event id.
    fn credit(&self, event: &RewardEvent) -> Result<CreditOutcome>;
    /// Take `amount` coins. Returns `false` if the balance is too low.
    fn debit(&self, amount: u32) -> Result<bool>;
    fn read(&self) -> Result<Option<Wallet>>;
}

/// Increments applied to one day's statistics row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsDelta {
    pub pomodoros: u32,
    pub tasks: u32,
    pub notes: u32,
    pub time_worked_secs: u32,
}

impl StatsDelta {
    pub fn pomodoro() -> Self {
        Self {
            pomodoros: 1,
            ..Self::default()
        }
    }

    pub fn task() -> Self {
        Self {
            tasks: 1,
            ..Self::default()
        }
    }

    pub fn note() -> Self {
        Self {
            notes: 1,
            ..Self::default()
        }
    }

    pub fn time_worked(secs: u32) -> Self {
        Self {
            time_worked_secs: secs,
            ..Self::default()
        }
    }
}

/// Daily statistics sink.
pub trait StatsRepository {
    fn record(&self, day: NaiveDate, delta: StatsDelta) -> Result<()>;
}
