use serde::{Deserialize, Serialize};

/// Kind of interval the timer is counting down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionType {
    Work,
    ShortBreak,
    LongBreak,
}

impl SessionType {
    pub const ALL: [SessionType; 3] = [
        SessionType::Work,
        SessionType::ShortBreak,
        SessionType::LongBreak,
    ];

    pub fn is_break(self) -> bool {
        !matches!(self, SessionType::Work)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SessionType::Work => "work",
            SessionType::ShortBreak => "short_break",
            SessionType::LongBreak => "long_break",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "work" => Some(SessionType::Work),
            "short_break" | "short" => Some(SessionType::ShortBreak),
            "long_break" | "long" => Some(SessionType::LongBreak),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SessionType::Work => "Work",
            SessionType::ShortBreak => "Short Break",
            SessionType::LongBreak => "Long Break",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    Idle,
    Running,
    Paused,
}

/// Timer preferences. Durations are in minutes.
///
/// Stored as the `[timer]` table of `config.toml`; the controller reads it and
/// accepts a replacement at any time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSettings {
    #[serde(default = "default_work_minutes")]
    pub work_minutes: u32,
    #[serde(default = "default_short_break_minutes")]
    pub short_break_minutes: u32,
    #[serde(default = "default_long_break_minutes")]
    pub long_break_minutes: u32,
    #[serde(default = "default_pomodoros_until_long_break")]
    pub pomodoros_until_long_break: u32,
    #[serde(default)]
    pub auto_start_breaks: bool,
    #[serde(default)]
    pub auto_start_work: bool,
    #[serde(default = "default_true")]
    pub sound_enabled: bool,
    #[serde(default = "default_true")]
    pub vibration_enabled: bool,
    /// Hold the work->break transition until a progress note is written
    /// (or dismissed) when a task is active.
    #[serde(default = "default_true")]
    pub prompt_note_after_work: bool,
}

fn default_work_minutes() -> u32 {
    25
}
fn default_short_break_minutes() -> u32 {
    5
}
fn default_long_break_minutes() -> u32 {
    15
}
fn default_pomodoros_until_long_break() -> u32 {
    4
}
fn default_true() -> bool {
    true
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self {
            work_minutes: default_work_minutes(),
            short_break_minutes: default_short_break_minutes(),
            long_break_minutes: default_long_break_minutes(),
            pomodoros_until_long_break: default_pomodoros_until_long_break(),
            auto_start_breaks: false,
            auto_start_work: false,
            sound_enabled: true,
            vibration_enabled: true,
            prompt_note_after_work: true,
        }
    }
}

impl TimerSettings {
    /// Base duration of a session in seconds.
    ///
    /// Zero-minute values are treated as one minute so a misconfigured
    /// session never completes instantly.
    pub fn base_secs(&self, session: SessionType) -> u32 {
        let minutes = match session {
            SessionType::Work => self.work_minutes,
            SessionType::ShortBreak => self.short_break_minutes,
            SessionType::LongBreak => self.long_break_minutes,
        };
        minutes.max(1).saturating_mul(60)
    }

    /// Work sessions per cycle, never less than one.
    pub fn long_break_threshold(&self) -> u32 {
        self.pomodoros_until_long_break.max(1)
    }

    pub fn auto_starts(&self, session: SessionType) -> bool {
        if session.is_break() {
            self.auto_start_breaks
        } else {
            self.auto_start_work
        }
    }
}

/// Read-only view of the controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub session_type: SessionType,
    pub timer_state: TimerState,
    pub seconds_remaining: u32,
    pub completed_work_sessions_in_cycle: u32,
    pub bonus_seconds_pending_for_next_break: u32,
    pub current_task_id: Option<i64>,
    pub awaiting_note: bool,
    pub unsaved_work_secs: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_durations_follow_settings() {
        let settings = TimerSettings::default();
        assert_eq!(settings.base_secs(SessionType::Work), 25 * 60);
        assert_eq!(settings.base_secs(SessionType::ShortBreak), 5 * 60);
        assert_eq!(settings.base_secs(SessionType::LongBreak), 15 * 60);
    }

    #[test]
    fn zero_minutes_is_treated_as_one() {
        let settings = TimerSettings {
            short_break_minutes: 0,
            pomodoros_until_long_break: 0,
            ..TimerSettings::default()
        };
        assert_eq!(settings.base_secs(SessionType::ShortBreak), 60);
        assert_eq!(settings.long_break_threshold(), 1);
    }

    #[test]
    fn auto_start_flag_depends_on_category() {
        let settings = TimerSettings {
            auto_start_breaks: true,
            ..TimerSettings::default()
        };
        assert!(settings.auto_starts(SessionType::ShortBreak));
        assert!(settings.auto_starts(SessionType::LongBreak));
        assert!(!settings.auto_starts(SessionType::Work));
    }

    #[test]
    fn session_type_string_forms_round_trip() {
        for session in SessionType::ALL {
            assert_eq!(SessionType::parse(session.as_str()), Some(session));
        }
        assert_eq!(SessionType::parse("nap"), None);
    }

    #[test]
    fn settings_fill_missing_fields_from_defaults() {
        let parsed: TimerSettings = toml::from_str("work_minutes = 50").unwrap();
        assert_eq!(parsed.work_minutes, 50);
        assert_eq!(parsed.short_break_minutes, 5);
        assert!(parsed.prompt_note_after_work);
    }
}
