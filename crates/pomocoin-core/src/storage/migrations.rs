//! Database schema migrations for pomocoin.
//!
//! Migrations are versioned and applied automatically when opening the database.
//! The `schema_version` table tracks the current migration version.

use rusqlite::{Connection, Result as SqliteResult};

/// Current schema version.
///
/// Increment this when adding new migrations.
pub const SCHEMA_VERSION: i32 = 4;

/// Apply all pending migrations to bring the database to the current schema version.
///
/// # Errors
/// Returns an error if migration fails.
pub fn migrate(conn: &Connection) -> SqliteResult<()> {
    create_schema_version_table(conn)?;

    let current_version = get_schema_version(conn);

    if current_version < 1 {
        migrate_v1(conn)?;
    }
    if current_version < 2 {
        migrate_v2(conn)?;
    }
    if current_version < 3 {
        migrate_v3(conn)?;
    }
    if current_version < 4 {
        migrate_v4(conn)?;
    }

    Ok(())
}

fn create_schema_version_table(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        );",
    )
}

/// Returns 0 if no version is set (fresh database).
pub fn get_schema_version(conn: &Connection) -> i32 {
    conn.query_row("SELECT version FROM schema_version", [], |row| {
        row.get::<_, i32>(0)
    })
    .unwrap_or_else(|e| {
        if !matches!(e, rusqlite::Error::QueryReturnedNoRows) {
            tracing::warn!(error = %e, "failed to read schema_version");
        }
        0
    })
}

fn set_schema_version(tx: &Connection, version: i32) -> SqliteResult<()> {
    tx.execute("DELETE FROM schema_version", [])?;
    tx.execute("INSERT INTO schema_version (version) VALUES (?1)", [version])?;
    Ok(())
}

/// Migration v1: the single user row and the task list.
fn migrate_v1(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS users (
            id                    INTEGER PRIMARY KEY CHECK (id = 1),
            coins                 INTEGER NOT NULL DEFAULT 0,
            total_pomodoros       INTEGER NOT NULL DEFAULT 0,
            total_tasks_completed INTEGER NOT NULL DEFAULT 0,
            total_notes_written   INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS tasks (
            id                  INTEGER PRIMARY KEY AUTOINCREMENT,
            title               TEXT NOT NULL,
            description         TEXT NOT NULL DEFAULT '',
            is_completed        INTEGER NOT NULL DEFAULT 0,
            pomodoros_completed INTEGER NOT NULL DEFAULT 0,
            created_at          TEXT NOT NULL,
            completed_at        TEXT,
            progress_notes      TEXT NOT NULL DEFAULT ''
        );

        CREATE INDEX IF NOT EXISTS idx_tasks_is_completed ON tasks(is_completed);",
    )?;
    set_schema_version(&tx, 1)?;
    tx.commit()
}

/// Migration v2: per-task focused time.
fn migrate_v2(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;
    let has_column: bool = tx
        .query_row(
            "SELECT COUNT(*) FROM pragma_table_info('tasks') WHERE name = 'time_spent_secs'",
            [],
            |row| row.get::<_, i32>(0),
        )
        .unwrap_or(0)
        > 0;
    if !has_column {
        tx.execute_batch(
            "ALTER TABLE tasks ADD COLUMN time_spent_secs INTEGER NOT NULL DEFAULT 0;",
        )?;
    }
    set_schema_version(&tx, 2)?;
    tx.commit()
}

/// Migration v3: economy and daily statistics.
fn migrate_v3(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS unlocked_music (
            track_id INTEGER PRIMARY KEY
        );

        CREATE TABLE IF NOT EXISTS purchased_room_items (
            item_id INTEGER PRIMARY KEY
        );

        CREATE TABLE IF NOT EXISTS daily_stats (
            date                TEXT PRIMARY KEY,
            pomodoros_completed INTEGER NOT NULL DEFAULT 0,
            tasks_completed     INTEGER NOT NULL DEFAULT 0,
            notes_written       INTEGER NOT NULL DEFAULT 0,
            time_worked_secs    INTEGER NOT NULL DEFAULT 0
        );",
    )?;
    set_schema_version(&tx, 3)?;
    tx.commit()
}

/// Migration v4: imported music and the reward ledger.
fn migrate_v4(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS imported_music (
            id                 INTEGER PRIMARY KEY AUTOINCREMENT,
            display_name       TEXT NOT NULL,
            original_file_name TEXT NOT NULL,
            internal_path      TEXT NOT NULL,
            session_type       TEXT NOT NULL,
            is_purchased       INTEGER NOT NULL DEFAULT 0,
            duration_secs      INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS reward_ledger (
            event_id    TEXT PRIMARY KEY,
            kind        TEXT NOT NULL,
            amount      INTEGER NOT NULL,
            credited_at TEXT NOT NULL
        );",
    )?;
    set_schema_version(&tx, 4)?;
    tx.commit()
}
