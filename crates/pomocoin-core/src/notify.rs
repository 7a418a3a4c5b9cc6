//! Session-completion triggers.
//!
//! Presenting the notification (desktop toast, phone buzz, terminal bell) is
//! up to the implementor; the controller only pulls the trigger.

use crate::timer::SessionType;

pub trait Notifier {
    /// Called once for every completed or skipped session.
    fn session_completed(&mut self, session: SessionType);
    /// Called after `session_completed` when vibration is enabled.
    fn vibrate(&mut self);
}

/// Writes triggers to the tracing log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

/// User-facing text announcing the end of `session`.
pub fn completion_message(session: SessionType) -> &'static str {
    match session {
        SessionType::Work => "Work session complete. Time for a break!",
        SessionType::ShortBreak => "Short break over. Back to work!",
        SessionType::LongBreak => "Long break over. Ready for a new cycle?",
    }
}

impl Notifier for LogNotifier {
    fn session_completed(&mut self, session: SessionType) {
        tracing::info!(session = session.as_str(), "{}", completion_message(session));
    }

    fn vibrate(&mut self) {
        tracing::debug!("vibrate");
    }
}

/// Remembers every trigger; useful for tests and headless embedding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordingNotifier {
    pub completed: Vec<SessionType>,
    pub vibrations: usize,
}

impl Notifier for RecordingNotifier {
    fn session_completed(&mut self, session: SessionType) {
        self.completed.push(session);
    }

    fn vibrate(&mut self) {
        self.vibrations += 1;
    }
}
