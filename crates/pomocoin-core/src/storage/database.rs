//! SQLite-backed persistence.
//!
//! Provides persistent storage for:
//! - The single user's wallet and lifetime counters
//! - Tasks and their progress notes (see `tasks.rs`)
//! - Daily statistics (see `stats.rs`)
//! - Unlocked music, room items and imported tracks (see `shop.rs`)

use std::path::Path;
use std::time::Duration;

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

use super::{data_dir, migrations};
use crate::error::{DatabaseError, Result};
use crate::repository::{CreditOutcome, Wallet, WalletRepository};
use crate::rewards::{RewardEvent, RewardKind};

/// SQLite database for all application data.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `~/.config/pomocoin/pomocoin.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        Self::open_at(&data_dir()?.join("pomocoin.db"))
    }

    /// Open (or create) the database file at `path`.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        conn.busy_timeout(Duration::from_secs(5))?;
        Self::init(conn)
    }

    /// Open an in-memory database (for tests and dry runs).
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self> {
        migrations::migrate(&conn)
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        let db = Self { conn };
        db.ensure_user()?;
        Ok(db)
    }

    /// Create the user row with an empty wallet if it is missing.
    pub fn ensure_user(&self) -> Result<()> {
        self.conn
            .execute("INSERT OR IGNORE INTO users (id, coins) VALUES (1, 0)", [])?;
        Ok(())
    }

    /// Current balance, 0 when there is no user row.
    pub fn coins(&self) -> Result<u32> {
        Ok(self.read()?.map(|w| w.coins).unwrap_or(0))
    }
}

fn counter_column(kind: RewardKind) -> &'static str {
    match kind {
        RewardKind::PomodoroCompleted => "total_pomodoros",
        RewardKind::TaskCompleted => "total_tasks_completed",
        RewardKind::NoteWritten => "total_notes_written",
    }
}

impl WalletRepository for Database {
    fn credit(&self, event: &RewardEvent) -> Result<CreditOutcome> {
        let tx = self
            .conn
            .unchecked_transaction()?;

        let has_user: bool = tx
            .query_row("SELECT COUNT(*) FROM users WHERE id = 1", [], |row| {
                row.get::<_, i64>(0)
            })?
            > 0;
        if !has_user {
            return Ok(CreditOutcome::NoUser);
        }

        let inserted = tx
            .execute(
                "INSERT OR IGNORE INTO reward_ledger (event_id, kind, amount, credited_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    event.id.to_string(),
                    event.kind.as_str(),
                    event.amount,
                    Utc::now().to_rfc3339(),
                ],
            )?;
        if inserted == 0 {
            return Ok(CreditOutcome::Duplicate);
        }

        let column = counter_column(event.kind);
        tx.execute(
            &format!("UPDATE users SET coins = coins + ?1, {column} = {column} + 1 WHERE id = 1"),
            params![event.amount],
        )?;
        tx.commit()?;
        Ok(CreditOutcome::Applied)
    }

    fn debit(&self, amount: u32) -> Result<bool> {
        let changed = self
            .conn
            .execute(
                "UPDATE users SET coins = coins - ?1 WHERE id = 1 AND coins >= ?1",
                params![amount],
            )?;
        Ok(changed == 1)
    }

    fn read(&self) -> Result<Option<Wallet>> {
        let wallet = self
            .conn
            .query_row(
                "SELECT coins, total_pomodoros, total_tasks_completed, total_notes_written
                 FROM users WHERE id = 1",
                [],
                |row| {
                    Ok(Wallet {
                        coins: row.get(0)?,
                        total_pomodoros: row.get(1)?,
                        total_tasks_completed: row.get(2)?,
                        total_notes_written: row.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(wallet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_database_has_empty_wallet() {
        let db = Database::open_memory().unwrap();
        assert_eq!(db.read().unwrap(), Some(Wallet::default()));
    }

    #[test]
    fn credit_is_idempotent_per_event() {
        let db = Database::open_memory().unwrap();
        let event = RewardEvent::new(RewardKind::NoteWritten);
        assert_eq!(db.credit(&event).unwrap(), CreditOutcome::Applied);
        assert_eq!(db.credit(&event).unwrap(), CreditOutcome::Duplicate);

        let wallet = db.read().unwrap().unwrap();
        assert_eq!(wallet.coins, 10);
        assert_eq!(wallet.total_notes_written, 1);
    }

    #[test]
    fn distinct_events_both_pay() {
        let db = Database::open_memory().unwrap();
        db.credit(&RewardEvent::new(RewardKind::PomodoroCompleted)).unwrap();
        db.credit(&RewardEvent::new(RewardKind::PomodoroCompleted)).unwrap();
        let wallet = db.read().unwrap().unwrap();
        assert_eq!(wallet.coins, 10);
        assert_eq!(wallet.total_pomodoros, 2);
    }

    #[test]
    fn credit_without_user_is_no_op() {
        let db = Database::open_memory().unwrap();
        db.conn().execute("DELETE FROM users", []).unwrap();
        let outcome = db.credit(&RewardEvent::new(RewardKind::TaskCompleted)).unwrap();
        assert_eq!(outcome, CreditOutcome::NoUser);
        let ledger: i64 = db
            .conn()
            .query_row("SELECT COUNT(*) FROM reward_ledger", [], |row| row.get(0))
            .unwrap();
        assert_eq!(ledger, 0);
    }

    #[test]
    fn debit_refuses_overdraft() {
        let db = Database::open_memory().unwrap();
        db.credit(&RewardEvent::new(RewardKind::TaskCompleted)).unwrap();
        assert!(!db.debit(21).unwrap());
        assert!(db.debit(15).unwrap());
        assert_eq!(db.coins().unwrap(), 5);
    }

    #[test]
    fn reopening_a_file_keeps_the_wallet() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pomocoin.db");
        {
            let db = Database::open_at(&path).unwrap();
            db.credit(&RewardEvent::new(RewardKind::TaskCompleted)).unwrap();
        }
        let db = Database::open_at(&path).unwrap();
        assert_eq!(db.coins().unwrap(), 20);
    }
}
