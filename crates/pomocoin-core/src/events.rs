use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::rewards::RewardEvent;
use crate::timer::SessionType;

/// Every state change of the timer controller produces an Event.
/// The CLI prints them; UIs render toasts and dialogs from them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    TimerStarted {
        session_type: SessionType,
        seconds_remaining: u32,
        at: DateTime<Utc>,
    },
    TimerPaused {
        session_type: SessionType,
        seconds_remaining: u32,
        at: DateTime<Utc>,
    },
    TimerSkipped {
        session_type: SessionType,
        seconds_remaining: u32,
        at: DateTime<Utc>,
    },
    TimerReset {
        session_type: SessionType,
        seconds_remaining: u32,
        at: DateTime<Utc>,
    },
    /// The countdown hit zero (or the session was skipped).
    SessionCompleted {
        session_type: SessionType,
        at: DateTime<Utc>,
    },
    /// A work session with an active task ended; waiting for a progress note.
    NoteRequested {
        task_id: i64,
        at: DateTime<Utc>,
    },
    NoteSaved {
        task_id: i64,
        bonus_secs: u32,
        at: DateTime<Utc>,
    },
    SessionChanged {
        from: SessionType,
        to: SessionType,
        seconds_remaining: u32,
        completed_work_sessions_in_cycle: u32,
        at: DateTime<Utc>,
    },
    RewardGranted {
        reward: RewardEvent,
        at: DateTime<Utc>,
    },
    WorkTimeSaved {
        task_id: Option<i64>,
        seconds: u32,
        at: DateTime<Utc>,
    },
    TaskChanged {
        task_id: Option<i64>,
        at: DateTime<Utc>,
    },
    SettingsChanged {
        seconds_remaining: u32,
        at: DateTime<Utc>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rewards::RewardKind;

    #[test]
    fn events_serialize_with_type_tag() {
        let event = Event::SessionCompleted {
            session_type: SessionType::ShortBreak,
            at: Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "session_completed");
        assert_eq!(json["session_type"], "short_break");
    }

    #[test]
    fn reward_event_nests_kind_and_amount() {
        let event = Event::RewardGranted {
            reward: RewardEvent::new(RewardKind::NoteWritten),
            at: Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["reward"]["kind"], "note_written");
        assert_eq!(json["reward"]["amount"], 10);
    }
}
