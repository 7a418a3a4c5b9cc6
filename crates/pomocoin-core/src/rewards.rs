//! Coin rewards for completed pomodoros, completed tasks and progress notes.
//!
//! Every credit is a [`RewardEvent`] with its own id. The wallet records the
//! id in a ledger in the same transaction as the balance change, so handing
//! the same event to `credit` twice never pays out twice.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Result, ValidationError};
use crate::repository::{
    CreditOutcome, StatsDelta, StatsRepository, TaskRepository, WalletRepository,
};
use crate::task::ProgressNote;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardKind {
    PomodoroCompleted,
    TaskCompleted,
    NoteWritten,
}

impl RewardKind {
    /// Coins credited for this kind of event.
    pub fn amount(self) -> u32 {
        match self {
            RewardKind::PomodoroCompleted => 5,
            RewardKind::TaskCompleted => 20,
            RewardKind::NoteWritten => 10,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RewardKind::PomodoroCompleted => "pomodoro_completed",
            RewardKind::TaskCompleted => "task_completed",
            RewardKind::NoteWritten => "note_written",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            RewardKind::PomodoroCompleted => "Pomodoro completed",
            RewardKind::TaskCompleted => "Task completed",
            RewardKind::NoteWritten => "Progress note",
        }
    }

    fn stats_delta(self) -> StatsDelta {
        match self {
            RewardKind::PomodoroCompleted => StatsDelta::pomodoro(),
            RewardKind::TaskCompleted => StatsDelta::task(),
            RewardKind::NoteWritten => StatsDelta::note(),
        }
    }
}

/// A discrete, transient credit notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardEvent {
    pub id: Uuid,
    pub kind: RewardKind,
    pub amount: u32,
}

impl RewardEvent {
    pub fn new(kind: RewardKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            amount: kind.amount(),
        }
    }
}

/// Applies the three reward paths against a store.
pub struct RewardDispatcher<'a, S> {
    store: &'a S,
}

impl<'a, S> RewardDispatcher<'a, S>
where
    S: TaskRepository + WalletRepository + StatsRepository,
{
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// A work session finished while `task_id` was active.
    ///
    /// Returns the event when coins were actually credited.
    pub fn pomodoro_completed(&self, task_id: i64) -> Result<Option<RewardEvent>> {
        let event = RewardEvent::new(RewardKind::PomodoroCompleted);
        let outcome = self.store.credit(&event)?;
        if outcome == CreditOutcome::Duplicate {
            return Ok(None);
        }
        if let Some(mut task) = self.store.get(task_id)? {
            task.pomodoros_completed += 1;
            self.store.update(&task)?;
        }
        self.record_today(event.kind.stats_delta())?;
        Ok(applied(event, outcome))
    }

    /// The user marked `task_id` done. Completing a completed task pays nothing.
    pub fn task_completed(&self, task_id: i64) -> Result<Option<RewardEvent>> {
        let mut task = self.store.get(task_id)?.ok_or(ValidationError::NotFound {
            entity: "task".into(),
            id: task_id,
        })?;
        if task.is_completed {
            return Ok(None);
        }
        task.is_completed = true;
        task.completed_at = Some(Utc::now());
        self.store.update(&task)?;

        let event = RewardEvent::new(RewardKind::TaskCompleted);
        let outcome = self.store.credit(&event)?;
        if outcome == CreditOutcome::Duplicate {
            return Ok(None);
        }
        self.record_today(event.kind.stats_delta())?;
        Ok(applied(event, outcome))
    }

    /// A progress note was written for `task_id`. Blank notes are ignored.
    pub fn note_written(
        &self,
        task_id: i64,
        text: &str,
        session_secs: u32,
    ) -> Result<Option<RewardEvent>> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }
        self.store
            .append_note(task_id, &ProgressNote::new(text, session_secs))?;

        let event = RewardEvent::new(RewardKind::NoteWritten);
        let outcome = self.store.credit(&event)?;
        if outcome == CreditOutcome::Duplicate {
            return Ok(None);
        }
        self.record_today(event.kind.stats_delta())?;
        Ok(applied(event, outcome))
    }

    /// Focused seconds to attribute to a task and to today's total.
    pub fn work_time(&self, task_id: Option<i64>, secs: u32) -> Result<()> {
        if secs == 0 {
            return Ok(());
        }
        if let Some(id) = task_id {
            if let Some(mut task) = self.store.get(id)? {
                task.time_spent_secs += u64::from(secs);
                self.store.update(&task)?;
            }
        }
        self.record_today(StatsDelta::time_worked(secs))
    }

    fn record_today(&self, delta: StatsDelta) -> Result<()> {
        self.store.record(Utc::now().date_naive(), delta)
    }
}

fn applied(event: RewardEvent, outcome: CreditOutcome) -> Option<RewardEvent> {
    match outcome {
        CreditOutcome::Applied => {
            tracing::info!(kind = event.kind.as_str(), amount = event.amount, "coins credited");
            Some(event)
        }
        CreditOutcome::NoUser => {
            tracing::debug!(kind = event.kind.as_str(), "no user row; reward skipped");
            None
        }
        CreditOutcome::Duplicate => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Database;
    use crate::task::Task;

    fn db_with_task() -> (Database, i64) {
        let db = Database::open_memory().unwrap();
        let id = db.insert_task(&Task::new("Write report", "")).unwrap();
        (db, id)
    }

    #[test]
    fn amounts() {
        assert_eq!(RewardKind::PomodoroCompleted.amount(), 5);
        assert_eq!(RewardKind::TaskCompleted.amount(), 20);
        assert_eq!(RewardKind::NoteWritten.amount(), 10);
    }

    #[test]
    fn pomodoro_reward_updates_task_wallet_and_stats() {
        let (db, id) = db_with_task();
        let event = RewardDispatcher::new(&db).pomodoro_completed(id).unwrap();
        assert_eq!(event.map(|e| e.amount), Some(5));

        let wallet = db.read().unwrap().unwrap();
        assert_eq!(wallet.coins, 5);
        assert_eq!(wallet.total_pomodoros, 1);
        assert_eq!(db.get(id).unwrap().unwrap().pomodoros_completed, 1);
        assert_eq!(db.totals().unwrap().total_pomodoros, 1);
    }

    #[test]
    fn completing_twice_pays_once() {
        let (db, id) = db_with_task();
        let dispatcher = RewardDispatcher::new(&db);
        assert!(dispatcher.task_completed(id).unwrap().is_some());
        assert!(dispatcher.task_completed(id).unwrap().is_none());

        let wallet = db.read().unwrap().unwrap();
        assert_eq!(wallet.coins, 20);
        assert_eq!(wallet.total_tasks_completed, 1);
        let task = db.get(id).unwrap().unwrap();
        assert!(task.is_completed);
        assert!(task.completed_at.is_some());
    }

    #[test]
    fn completing_missing_task_is_an_error() {
        let db = Database::open_memory().unwrap();
        assert!(RewardDispatcher::new(&db).task_completed(99).is_err());
    }

    #[test]
    fn blank_note_earns_nothing() {
        let (db, id) = db_with_task();
        let event = RewardDispatcher::new(&db).note_written(id, "   ", 60).unwrap();
        assert!(event.is_none());
        assert!(db.get(id).unwrap().unwrap().notes().is_empty());
        assert_eq!(db.read().unwrap().unwrap().coins, 0);
    }

    #[test]
    fn note_is_stored_and_credited() {
        let (db, id) = db_with_task();
        let event = RewardDispatcher::new(&db)
            .note_written(id, "  finished the outline  ", 1500)
            .unwrap();
        assert_eq!(event.map(|e| e.kind), Some(RewardKind::NoteWritten));

        let notes = db.get(id).unwrap().unwrap().notes();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].text, "finished the outline");
        assert_eq!(notes[0].session_duration, 1500);
        let wallet = db.read().unwrap().unwrap();
        assert_eq!(wallet.coins, 10);
        assert_eq!(wallet.total_notes_written, 1);
    }

    #[test]
    fn missing_user_is_a_silent_no_op() {
        let (db, id) = db_with_task();
        db.conn().execute("DELETE FROM users", []).unwrap();
        let event = RewardDispatcher::new(&db).pomodoro_completed(id).unwrap();
        assert!(event.is_none());
        assert!(db.read().unwrap().is_none());
        // The session still counts against the task.
        assert_eq!(db.get(id).unwrap().unwrap().pomodoros_completed, 1);
    }

    #[test]
    fn work_time_goes_to_task_and_today() {
        let (db, id) = db_with_task();
        RewardDispatcher::new(&db).work_time(Some(id), 90).unwrap();
        RewardDispatcher::new(&db).work_time(None, 30).unwrap();
        assert_eq!(db.get(id).unwrap().unwrap().time_spent_secs, 90);
        assert_eq!(db.totals().unwrap().total_time_worked_secs, 120);
    }
}
