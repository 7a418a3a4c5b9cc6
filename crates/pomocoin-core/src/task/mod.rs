//! To-do items the timer accumulates work time and progress notes against.
//!
//! Progress notes are stored on the task as a JSON array so the whole note
//! history travels with a single row.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A to-do item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default)]
    pub pomodoros_completed: u32,
    /// Total focused time recorded against the task, in seconds.
    #[serde(default)]
    pub time_spent_secs: u64,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    /// JSON-encoded `Vec<ProgressNote>`; empty string means no notes.
    #[serde(default)]
    pub progress_notes: String,
}

impl Task {
    /// A fresh, unsaved task. `id` is assigned by storage on insert.
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: 0,
            title: title.into(),
            description: description.into(),
            is_completed: false,
            pomodoros_completed: 0,
            time_spent_secs: 0,
            created_at: Utc::now(),
            completed_at: None,
            progress_notes: String::new(),
        }
    }

    /// Decoded note history. Malformed JSON yields an empty list.
    pub fn notes(&self) -> Vec<ProgressNote> {
        parse_notes(&self.progress_notes)
    }

    /// Return a copy with `note` appended to the history.
    pub fn with_note(&self, note: ProgressNote) -> Result<Self, serde_json::Error> {
        let mut notes = self.notes();
        notes.push(note);
        Ok(Self {
            progress_notes: serde_json::to_string(&notes)?,
            ..self.clone()
        })
    }
}

/// A free-text note written after a work session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressNote {
    pub text: String,
    /// Epoch milliseconds.
    pub timestamp: i64,
    /// Focused seconds covered by this note.
    pub session_duration: u32,
}

impl ProgressNote {
    pub fn new(text: impl Into<String>, session_duration: u32) -> Self {
        Self {
            text: text.into(),
            timestamp: Utc::now().timestamp_millis(),
            session_duration,
        }
    }
}

/// Lenient decode: empty or unparseable input becomes an empty list.
pub fn parse_notes(json: &str) -> Vec<ProgressNote> {
    if json.trim().is_empty() {
        return Vec::new();
    }
    match serde_json::from_str::<Vec<ProgressNote>>(json) {
        Ok(notes) => notes,
        Err(e) => {
            tracing::warn!(error = %e, "discarding unreadable progress notes");
            Vec::new()
        }
    }
}
