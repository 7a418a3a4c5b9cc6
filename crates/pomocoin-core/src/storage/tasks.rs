//! Task storage.

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row};

use super::Database;
use crate::error::{Result, ValidationError};
use crate::repository::TaskRepository;
use crate::task::{ProgressNote, Task};

const TASK_COLUMNS: &str = "id, title, description, is_completed, pomodoros_completed,
     time_spent_secs, created_at, completed_at, progress_notes";

/// Parse datetime from RFC3339 string with fallback to current time
fn parse_datetime_fallback(dt_str: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(dt_str)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

fn row_to_task(row: &Row) -> Result<Task, rusqlite::Error> {
    let created_at: String = row.get(6)?;
    let completed_at: Option<String> = row.get(7)?;
    Ok(Task {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        is_completed: row.get(3)?,
        pomodoros_completed: row.get(4)?,
        time_spent_secs: row.get::<_, i64>(5)?.max(0) as u64,
        created_at: parse_datetime_fallback(&created_at),
        completed_at: completed_at.as_deref().map(parse_datetime_fallback),
        progress_notes: row.get(8)?,
    })
}

impl Database {
    /// Insert a task and return its new id. The `id` field of `task` is ignored.
    pub fn insert_task(&self, task: &Task) -> Result<i64> {
        if task.title.trim().is_empty() {
            return Err(ValidationError::Empty("title".into()).into());
        }
        self.conn().execute(
            "INSERT INTO tasks (title, description, is_completed, pomodoros_completed,
                                time_spent_secs, created_at, completed_at, progress_notes)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                task.title.trim(),
                task.description,
                task.is_completed,
                task.pomodoros_completed,
                task.time_spent_secs as i64,
                task.created_at.to_rfc3339(),
                task.completed_at.map(|t| t.to_rfc3339()),
                task.progress_notes,
            ],
        )?;
        Ok(self.conn().last_insert_rowid())
    }

    /// Open tasks, newest first.
    pub fn active_tasks(&self) -> Result<Vec<Task>> {
        self.query_tasks(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE is_completed = 0 ORDER BY created_at DESC, id DESC"
        ))
    }

    /// Finished tasks, most recently completed first.
    pub fn completed_tasks(&self) -> Result<Vec<Task>> {
        self.query_tasks(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE is_completed = 1 ORDER BY completed_at DESC, id DESC"
        ))
    }

    fn query_tasks(&self, sql: &str) -> Result<Vec<Task>> {
        let mut stmt = self.conn().prepare(sql)?;
        let tasks = stmt
            .query_map([], row_to_task)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tasks)
    }

    /// Delete a task. Returns `false` when no such task exists.
    pub fn delete_task(&self, id: i64) -> Result<bool> {
        let deleted = self
            .conn()
            .execute("DELETE FROM tasks WHERE id = ?1", params![id])?;
        Ok(deleted > 0)
    }

    /// Delete every completed task, returning how many were removed.
    pub fn delete_completed_tasks(&self) -> Result<usize> {
        Ok(self
            .conn()
            .execute("DELETE FROM tasks WHERE is_completed = 1", [])?)
    }
}

impl TaskRepository for Database {
    fn get(&self, id: i64) -> Result<Option<Task>> {
        let task = self
            .conn()
            .query_row(
                &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"),
                params![id],
                row_to_task,
            )
            .optional()?;
        Ok(task)
    }

    fn update(&self, task: &Task) -> Result<()> {
        let changed = self.conn().execute(
            "UPDATE tasks SET title = ?2, description = ?3, is_completed = ?4,
                    pomodoros_completed = ?5, time_spent_secs = ?6, completed_at = ?7,
                    progress_notes = ?8
             WHERE id = ?1",
            params![
                task.id,
                task.title,
                task.description,
                task.is_completed,
                task.pomodoros_completed,
                task.time_spent_secs as i64,
                task.completed_at.map(|t| t.to_rfc3339()),
                task.progress_notes,
            ],
        )?;
        if changed == 0 {
            return Err(ValidationError::NotFound {
                entity: "task".into(),
                id: task.id,
            }
            .into());
        }
        Ok(())
    }

    fn append_note(&self, id: i64, note: &ProgressNote) -> Result<()> {
        let task = self.get(id)?.ok_or(ValidationError::NotFound {
            entity: "task".into(),
            id,
        })?;
        let updated = task.with_note(note.clone())?;
        self.conn().execute(
            "UPDATE tasks SET progress_notes = ?2 WHERE id = ?1",
            params![id, updated.progress_notes],
        )?;
        Ok(())
    }
}
