//! Timer/session controller.
//!
//! Owns the countdown, the work/break sequencer, pending note bonuses and
//! work-time accounting. It has no thread of its own: the caller drives it
//! with `tick()` once per second while it is running (see [`super::runtime`]
//! for the tokio driver).
//!
//! ## Session sequence
//!
//! ```text
//! Work -> ShortBreak -> Work -> ... -> Work -> LongBreak -> Work
//!         (cycle < threshold)             (cycle reaches threshold)
//! ```
//!
//! Every command returns the events it produced, in order.

use chrono::Utc;

use super::bonus::bonus_secs_for_text;
use super::clock::Clock;
use super::session::{SessionType, TimerSettings, TimerSnapshot, TimerState};
use crate::events::Event;
use crate::notify::Notifier;
use crate::repository::{StatsRepository, TaskRepository, WalletRepository};
use crate::rewards::{RewardDispatcher, RewardEvent};

pub struct TimerController<S, N, C> {
    store: S,
    notifier: N,
    clock: C,
    settings: TimerSettings,
    session_type: SessionType,
    state: TimerState,
    seconds_remaining: u32,
    cycle: u32,
    bonus_pending: u32,
    current_task_id: Option<i64>,
    /// Task whose finished work session is waiting for a progress note.
    note_task_id: Option<i64>,
    /// The current session has not been started since it was set up.
    untouched: bool,
    /// Clock reading when the running work segment began.
    segment_started_ms: Option<u64>,
    /// Closed work time not yet written to storage.
    unsaved_work_ms: u64,
    /// Work time covered by the next progress note.
    since_note_ms: u64,
    disposed: bool,
}

impl<S, N, C> TimerController<S, N, C>
where
    S: TaskRepository + WalletRepository + StatsRepository,
    N: Notifier,
    C: Clock,
{
    /// A fresh controller, idle at the start of a work session.
    pub fn new(store: S, notifier: N, clock: C, settings: TimerSettings) -> Self {
        let seconds_remaining = settings.base_secs(SessionType::Work);
        Self {
            store,
            notifier,
            clock,
            settings,
            session_type: SessionType::Work,
            state: TimerState::Idle,
            seconds_remaining,
            cycle: 0,
            bonus_pending: 0,
            current_task_id: None,
            note_task_id: None,
            untouched: true,
            segment_started_ms: None,
            unsaved_work_ms: 0,
            since_note_ms: 0,
            disposed: false,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            session_type: self.session_type,
            timer_state: self.state,
            seconds_remaining: self.seconds_remaining,
            completed_work_sessions_in_cycle: self.cycle,
            bonus_seconds_pending_for_next_break: self.bonus_pending,
            current_task_id: self.current_task_id,
            awaiting_note: self.note_task_id.is_some(),
            unsaved_work_secs: ((self.unsaved_work_ms + self.open_segment_ms()) / 1000) as u32,
        }
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn settings(&self) -> &TimerSettings {
        &self.settings
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start or resume the countdown. No-op while running.
    pub fn start(&mut self) -> Vec<Event> {
        if self.disposed || self.note_task_id.is_some() || self.state == TimerState::Running {
            return Vec::new();
        }
        self.state = TimerState::Running;
        self.untouched = false;
        if self.session_type == SessionType::Work {
            self.segment_started_ms = Some(self.clock.now_ms());
        }
        vec![Event::TimerStarted {
            session_type: self.session_type,
            seconds_remaining: self.seconds_remaining,
            at: Utc::now(),
        }]
    }

    pub fn pause(&mut self) -> Vec<Event> {
        if self.disposed || self.state != TimerState::Running {
            return Vec::new();
        }
        self.close_segment();
        self.state = TimerState::Paused;
        vec![Event::TimerPaused {
            session_type: self.session_type,
            seconds_remaining: self.seconds_remaining,
            at: Utc::now(),
        }]
    }

    /// One second of countdown. Completes the session on reaching zero.
    pub fn tick(&mut self) -> Vec<Event> {
        if self.disposed || self.state != TimerState::Running {
            return Vec::new();
        }
        self.seconds_remaining = self.seconds_remaining.saturating_sub(1);
        if self.seconds_remaining == 0 {
            return self.complete_session();
        }
        Vec::new()
    }

    /// End the current session now, as if it had run out.
    ///
    /// While a note is pending this dismisses it instead.
    pub fn skip(&mut self) -> Vec<Event> {
        if self.disposed {
            return Vec::new();
        }
        if self.note_task_id.is_some() {
            return self.dismiss_note();
        }
        let mut events = vec![Event::TimerSkipped {
            session_type: self.session_type,
            seconds_remaining: self.seconds_remaining,
            at: Utc::now(),
        }];
        events.extend(self.complete_session());
        events
    }

    /// Restart the current session type at its full duration.
    pub fn reset(&mut self) -> Vec<Event> {
        if self.disposed || self.note_task_id.is_some() {
            return Vec::new();
        }
        let mut events = Vec::new();
        self.close_segment();
        self.flush_work_time(&mut events);
        self.state = TimerState::Idle;
        self.untouched = true;
        self.seconds_remaining = self.full_secs(self.session_type);
        events.push(Event::TimerReset {
            session_type: self.session_type,
            seconds_remaining: self.seconds_remaining,
            at: Utc::now(),
        });
        events
    }

    /// Switch the active task. Work time so far goes to the previous task.
    pub fn set_task(&mut self, task_id: Option<i64>) -> Vec<Event> {
        if self.disposed || task_id == self.current_task_id {
            return Vec::new();
        }
        let mut events = Vec::new();
        self.split_segment();
        self.flush_work_time(&mut events);
        self.current_task_id = task_id;
        events.push(Event::TaskChanged {
            task_id,
            at: Utc::now(),
        });
        events
    }

    /// Record a progress note for the active task and bank its break bonus.
    ///
    /// The bonus replaces any earlier pending bonus. When the note answers a
    /// finished work session, the held transition to the break completes.
    pub fn submit_note(&mut self, text: &str) -> Vec<Event> {
        if self.disposed {
            return Vec::new();
        }
        let Some(task_id) = self.note_task_id.or(self.current_task_id) else {
            return Vec::new();
        };
        let text = text.trim();
        if text.is_empty() {
            return self.dismiss_note();
        }

        let mut events = Vec::new();
        self.split_segment();
        let covered_secs = (self.since_note_ms / 1000) as u32;
        match RewardDispatcher::new(&self.store).note_written(task_id, text, covered_secs) {
            Ok(reward) => {
                self.since_note_ms = 0;
                push_reward(&mut events, reward);
            }
            Err(e) => tracing::warn!(task_id, "failed to save progress note: {e}"),
        }

        self.bonus_pending = bonus_secs_for_text(text);
        events.push(Event::NoteSaved {
            task_id,
            bonus_secs: self.bonus_pending,
            at: Utc::now(),
        });

        if self.note_task_id.is_some() {
            events.extend(self.finish_completion());
        } else if self.session_type.is_break() {
            let full = self.full_secs(self.session_type);
            self.seconds_remaining = if self.state == TimerState::Idle && self.untouched {
                full
            } else {
                self.seconds_remaining.min(full)
            };
        }
        events
    }

    /// Skip writing the pending progress note and move on.
    pub fn dismiss_note(&mut self) -> Vec<Event> {
        if self.disposed || self.note_task_id.is_none() {
            return Vec::new();
        }
        self.finish_completion()
    }

    /// Replace the settings. An idle session picks up the new duration; a
    /// started one keeps its remaining time, clamped to the new maximum.
    pub fn update_settings(&mut self, settings: TimerSettings) -> Vec<Event> {
        if self.disposed {
            return Vec::new();
        }
        self.settings = settings;
        if self.note_task_id.is_none() {
            let full = self.full_secs(self.session_type);
            self.seconds_remaining = if self.state == TimerState::Idle {
                full
            } else {
                self.seconds_remaining.min(full)
            };
        }
        vec![Event::SettingsChanged {
            seconds_remaining: self.seconds_remaining,
            at: Utc::now(),
        }]
    }

    /// Stop for good: save unsaved work time and any pending pomodoro reward.
    pub fn shutdown(&mut self) -> Vec<Event> {
        if self.disposed {
            return Vec::new();
        }
        let mut events = Vec::new();
        self.close_segment();
        self.flush_work_time(&mut events);
        if let Some(task_id) = self.note_task_id.take() {
            self.reward_pomodoro(task_id, &mut events);
        }
        self.state = TimerState::Idle;
        self.disposed = true;
        tracing::debug!("timer controller disposed");
        events
    }

    // ── Internals ────────────────────────────────────────────────────

    /// Base duration plus the pending bonus for breaks.
    fn full_secs(&self, session: SessionType) -> u32 {
        let base = self.settings.base_secs(session);
        if session.is_break() {
            base.saturating_add(self.bonus_pending)
        } else {
            base
        }
    }

    fn open_segment_ms(&self) -> u64 {
        self.segment_started_ms
            .map(|start| self.clock.now_ms().saturating_sub(start))
            .unwrap_or(0)
    }

    fn close_segment(&mut self) {
        let elapsed = self.open_segment_ms();
        self.segment_started_ms = None;
        self.unsaved_work_ms += elapsed;
        self.since_note_ms += elapsed;
    }

    /// Close the running segment and immediately open a new one.
    fn split_segment(&mut self) {
        let running = self.segment_started_ms.is_some();
        self.close_segment();
        if running {
            self.segment_started_ms = Some(self.clock.now_ms());
        }
    }

    /// Write whole unsaved seconds against the active task. The sub-second
    /// remainder carries over. Failures drop the time rather than retrying.
    fn flush_work_time(&mut self, events: &mut Vec<Event>) {
        let secs = (self.unsaved_work_ms / 1000) as u32;
        if secs == 0 {
            return;
        }
        self.unsaved_work_ms %= 1000;
        let task_id = self.current_task_id;
        match RewardDispatcher::new(&self.store).work_time(task_id, secs) {
            Ok(()) => events.push(Event::WorkTimeSaved {
                task_id,
                seconds: secs,
                at: Utc::now(),
            }),
            Err(e) => tracing::warn!(?task_id, secs, "failed to save work time: {e}"),
        }
    }

    fn reward_pomodoro(&self, task_id: i64, events: &mut Vec<Event>) {
        match RewardDispatcher::new(&self.store).pomodoro_completed(task_id) {
            Ok(reward) => push_reward(events, reward),
            Err(e) => tracing::warn!(task_id, "failed to reward pomodoro: {e}"),
        }
    }

    fn complete_session(&mut self) -> Vec<Event> {
        let finished = self.session_type;
        let mut events = Vec::new();
        self.close_segment();
        self.flush_work_time(&mut events);
        self.state = TimerState::Idle;

        events.push(Event::SessionCompleted {
            session_type: finished,
            at: Utc::now(),
        });
        self.notifier.session_completed(finished);
        if self.settings.vibration_enabled {
            self.notifier.vibrate();
        }

        if finished == SessionType::Work && self.settings.prompt_note_after_work {
            if let Some(task_id) = self.current_task_id {
                self.note_task_id = Some(task_id);
                self.seconds_remaining = 0;
                events.push(Event::NoteRequested {
                    task_id,
                    at: Utc::now(),
                });
                return events;
            }
        }

        if finished == SessionType::Work {
            if let Some(task_id) = self.current_task_id {
                self.reward_pomodoro(task_id, &mut events);
            }
        }
        events.extend(self.transition());
        events
    }

    /// Second half of a held work completion.
    fn finish_completion(&mut self) -> Vec<Event> {
        let mut events = Vec::new();
        if let Some(task_id) = self.note_task_id.take() {
            self.reward_pomodoro(task_id, &mut events);
        }
        events.extend(self.transition());
        events
    }

    fn transition(&mut self) -> Vec<Event> {
        let from = self.session_type;
        let to = match from {
            SessionType::Work => {
                self.cycle += 1;
                if self.cycle >= self.settings.long_break_threshold() {
                    self.cycle = 0;
                    SessionType::LongBreak
                } else {
                    SessionType::ShortBreak
                }
            }
            SessionType::ShortBreak | SessionType::LongBreak => {
                self.bonus_pending = 0;
                SessionType::Work
            }
        };

        self.session_type = to;
        self.state = TimerState::Idle;
        self.untouched = true;
        self.seconds_remaining = self.full_secs(to);
        tracing::debug!(from = from.as_str(), to = to.as_str(), "session changed");

        let mut events = vec![Event::SessionChanged {
            from,
            to,
            seconds_remaining: self.seconds_remaining,
            completed_work_sessions_in_cycle: self.cycle,
            at: Utc::now(),
        }];
        if self.settings.auto_starts(to) {
            events.extend(self.start());
        }
        events
    }
}

fn push_reward(events: &mut Vec<Event>, reward: Option<RewardEvent>) {
    if let Some(reward) = reward {
        events.push(Event::RewardGranted {
            reward,
            at: Utc::now(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CoreError, Result};
    use crate::notify::RecordingNotifier;
    use crate::repository::{CreditOutcome, StatsDelta, Wallet};
    use crate::storage::Database;
    use crate::task::{ProgressNote, Task};
    use crate::timer::ManualClock;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    type TestController = TimerController<Database, RecordingNotifier, ManualClock>;

    fn settings() -> TimerSettings {
        TimerSettings {
            prompt_note_after_work: false,
            ..TimerSettings::default()
        }
    }

    fn controller_with(settings: TimerSettings) -> (TestController, ManualClock) {
        let clock = ManualClock::new(1_000_000);
        let db = Database::open_memory().unwrap();
        let ctl = TimerController::new(db, RecordingNotifier::default(), clock.clone(), settings);
        (ctl, clock)
    }

    fn controller() -> (TestController, ManualClock) {
        controller_with(settings())
    }

    fn add_task(ctl: &TestController, title: &str) -> i64 {
        ctl.store().insert_task(&Task::new(title, "")).unwrap()
    }

    /// Advance the clock and tick once per second.
    fn run_for(ctl: &mut TestController, clock: &ManualClock, secs: u32) -> Vec<Event> {
        let mut events = Vec::new();
        for _ in 0..secs {
            clock.advance_secs(1);
            events.extend(ctl.tick());
        }
        events
    }

    fn run_to_end(ctl: &mut TestController, clock: &ManualClock) -> Vec<Event> {
        let remaining = ctl.snapshot().seconds_remaining;
        run_for(ctl, clock, remaining)
    }

    fn work_time_saved(events: &[Event]) -> Vec<u32> {
        events
            .iter()
            .filter_map(|e| match e {
                Event::WorkTimeSaved { seconds, .. } => Some(*seconds),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn starts_idle_at_full_work_duration() {
        let (ctl, _) = controller();
        let snap = ctl.snapshot();
        assert_eq!(snap.session_type, SessionType::Work);
        assert_eq!(snap.timer_state, TimerState::Idle);
        assert_eq!(snap.seconds_remaining, 25 * 60);
        assert_eq!(snap.completed_work_sessions_in_cycle, 0);
    }

    #[test]
    fn ticks_decrement_exactly_once_each() {
        let (mut ctl, clock) = controller();
        ctl.start();
        run_for(&mut ctl, &clock, 37);
        assert_eq!(ctl.snapshot().seconds_remaining, 25 * 60 - 37);
    }

    #[test]
    fn ticks_are_ignored_unless_running() {
        let (mut ctl, _) = controller();
        assert!(ctl.tick().is_empty());
        assert_eq!(ctl.snapshot().seconds_remaining, 25 * 60);
    }

    #[test]
    fn start_while_running_is_a_no_op() {
        let (mut ctl, clock) = controller();
        assert_eq!(ctl.start().len(), 1);
        run_for(&mut ctl, &clock, 5);
        assert!(ctl.start().is_empty());
        assert_eq!(ctl.snapshot().seconds_remaining, 25 * 60 - 5);
    }

    #[test]
    fn pause_and_resume_keep_remaining_time() {
        let (mut ctl, clock) = controller();
        ctl.start();
        run_for(&mut ctl, &clock, 100);
        ctl.pause();
        clock.advance_secs(600);
        assert!(ctl.tick().is_empty());
        assert_eq!(ctl.snapshot().timer_state, TimerState::Paused);
        assert_eq!(ctl.snapshot().seconds_remaining, 25 * 60 - 100);

        ctl.start();
        run_for(&mut ctl, &clock, 50);
        assert_eq!(ctl.snapshot().seconds_remaining, 25 * 60 - 150);
        // Paused wall time is not work time.
        assert_eq!(ctl.snapshot().unsaved_work_secs, 150);
    }

    #[test]
    fn work_completion_moves_to_short_break() {
        let (mut ctl, clock) = controller();
        ctl.start();
        let events = run_to_end(&mut ctl, &clock);
        let snap = ctl.snapshot();
        assert_eq!(snap.session_type, SessionType::ShortBreak);
        assert_eq!(snap.timer_state, TimerState::Idle);
        assert_eq!(snap.seconds_remaining, 5 * 60);
        assert_eq!(snap.completed_work_sessions_in_cycle, 1);
        assert!(events.iter().any(|e| matches!(
            e,
            Event::SessionChanged { from: SessionType::Work, to: SessionType::ShortBreak, .. }
        )));
        assert_eq!(ctl.notifier().completed, vec![SessionType::Work]);
        assert_eq!(ctl.notifier().vibrations, 1);
    }

    #[test]
    fn threshold_reached_moves_to_long_break_and_resets_cycle() {
        let (mut ctl, clock) = controller();
        for _ in 0..3 {
            ctl.skip();
            ctl.skip();
        }
        assert_eq!(ctl.snapshot().completed_work_sessions_in_cycle, 3);
        assert_eq!(ctl.snapshot().session_type, SessionType::Work);

        ctl.start();
        run_to_end(&mut ctl, &clock);
        let snap = ctl.snapshot();
        assert_eq!(snap.session_type, SessionType::LongBreak);
        assert_eq!(snap.completed_work_sessions_in_cycle, 0);
        assert_eq!(snap.seconds_remaining, 15 * 60);
    }

    #[test]
    fn threshold_of_one_always_long_breaks() {
        let (mut ctl, _) = controller_with(TimerSettings {
            pomodoros_until_long_break: 1,
            ..settings()
        });
        ctl.skip();
        assert_eq!(ctl.snapshot().session_type, SessionType::LongBreak);
        ctl.skip();
        ctl.skip();
        assert_eq!(ctl.snapshot().session_type, SessionType::LongBreak);
    }

    #[test]
    fn break_completion_returns_to_work_and_clears_bonus() {
        let (mut ctl, clock) = controller();
        let task = add_task(&ctl, "essay");
        ctl.set_task(Some(task));
        ctl.skip();
        ctl.submit_note("a note that is long enough to earn thirty");
        assert_eq!(ctl.snapshot().bonus_seconds_pending_for_next_break, 30);
        assert_eq!(ctl.snapshot().seconds_remaining, 5 * 60 + 30);

        ctl.start();
        run_to_end(&mut ctl, &clock);
        let snap = ctl.snapshot();
        assert_eq!(snap.session_type, SessionType::Work);
        assert_eq!(snap.bonus_seconds_pending_for_next_break, 0);
        assert_eq!(snap.seconds_remaining, 25 * 60);
    }

    #[test]
    fn note_prompt_holds_transition_until_answered() {
        let (mut ctl, clock) = controller_with(TimerSettings::default());
        let task = add_task(&ctl, "thesis");
        ctl.set_task(Some(task));
        ctl.start();
        let events = run_to_end(&mut ctl, &clock);
        assert!(events.iter().any(|e| matches!(e, Event::NoteRequested { task_id, .. } if *task_id == task)));

        let snap = ctl.snapshot();
        assert!(snap.awaiting_note);
        assert_eq!(snap.session_type, SessionType::Work);
        assert_eq!(snap.timer_state, TimerState::Idle);
        assert_eq!(snap.seconds_remaining, 0);
        // Held: start and reset do nothing, no reward yet.
        assert!(ctl.start().is_empty());
        assert!(ctl.reset().is_empty());
        assert_eq!(ctl.store().coins().unwrap(), 0);

        // 55 characters earn 60 seconds on the following break.
        let note = "x".repeat(55);
        let events = ctl.submit_note(&note);
        assert!(events.iter().any(|e| matches!(e, Event::NoteSaved { bonus_secs: 60, .. })));
        let snap = ctl.snapshot();
        assert!(!snap.awaiting_note);
        assert_eq!(snap.session_type, SessionType::ShortBreak);
        assert_eq!(snap.seconds_remaining, 5 * 60 + 60);
        assert_eq!(snap.completed_work_sessions_in_cycle, 1);

        // 5 for the pomodoro, 10 for the note.
        assert_eq!(ctl.store().coins().unwrap(), 15);
        let stored = ctl.store().get(task).unwrap().unwrap();
        assert_eq!(stored.pomodoros_completed, 1);
        assert_eq!(stored.notes()[0].session_duration, 25 * 60);
        assert_eq!(stored.time_spent_secs, 25 * 60);
    }

    #[test]
    fn dismissing_the_note_still_pays_the_pomodoro() {
        let (mut ctl, _) = controller_with(TimerSettings::default());
        let task = add_task(&ctl, "thesis");
        ctl.set_task(Some(task));
        ctl.skip();
        assert!(ctl.snapshot().awaiting_note);
        // A second skip dismisses.
        ctl.skip();
        let snap = ctl.snapshot();
        assert!(!snap.awaiting_note);
        assert_eq!(snap.session_type, SessionType::ShortBreak);
        assert_eq!(snap.bonus_seconds_pending_for_next_break, 0);
        assert_eq!(ctl.store().coins().unwrap(), 5);
    }

    #[test]
    fn blank_note_counts_as_dismissal() {
        let (mut ctl, _) = controller_with(TimerSettings::default());
        let task = add_task(&ctl, "thesis");
        ctl.set_task(Some(task));
        ctl.skip();
        ctl.submit_note("   ");
        assert_eq!(ctl.snapshot().session_type, SessionType::ShortBreak);
        assert!(ctl.store().get(task).unwrap().unwrap().notes().is_empty());
    }

    #[test]
    fn later_note_replaces_pending_bonus() {
        let (mut ctl, _) = controller();
        let task = add_task(&ctl, "code");
        ctl.set_task(Some(task));
        ctl.submit_note(&"y".repeat(250));
        assert_eq!(ctl.snapshot().bonus_seconds_pending_for_next_break, 120);
        ctl.submit_note(&"y".repeat(25));
        assert_eq!(ctl.snapshot().bonus_seconds_pending_for_next_break, 30);
        // Work sessions never include the bonus.
        assert_eq!(ctl.snapshot().seconds_remaining, 25 * 60);
    }

    #[test]
    fn smaller_bonus_clamps_a_started_break() {
        let (mut ctl, clock) = controller();
        let task = add_task(&ctl, "code");
        ctl.set_task(Some(task));
        ctl.submit_note(&"y".repeat(250));
        ctl.skip();
        assert_eq!(ctl.snapshot().session_type, SessionType::ShortBreak);
        assert_eq!(ctl.snapshot().seconds_remaining, 5 * 60 + 120);

        ctl.start();
        run_for(&mut ctl, &clock, 5);
        ctl.pause();
        ctl.submit_note(&"y".repeat(25));
        assert_eq!(ctl.snapshot().bonus_seconds_pending_for_next_break, 30);
        assert_eq!(ctl.snapshot().seconds_remaining, 5 * 60 + 30);

        // A larger bonus never extends a break that already started.
        ctl.submit_note(&"y".repeat(250));
        assert_eq!(ctl.snapshot().seconds_remaining, 5 * 60 + 30);
    }

    #[test]
    fn note_without_task_is_ignored() {
        let (mut ctl, _) = controller();
        assert!(ctl.submit_note(&"z".repeat(80)).is_empty());
        assert_eq!(ctl.snapshot().bonus_seconds_pending_for_next_break, 0);
    }

    #[test]
    fn skip_work_flushes_elapsed_time_exactly_once() {
        let (mut ctl, clock) = controller();
        let task = add_task(&ctl, "report");
        ctl.set_task(Some(task));
        ctl.start();
        run_for(&mut ctl, &clock, 25 * 60 - 10);
        assert_eq!(ctl.snapshot().seconds_remaining, 10);

        let mut events = ctl.skip();
        events.extend(ctl.reset());
        events.extend(ctl.shutdown());
        assert_eq!(work_time_saved(&events), vec![25 * 60 - 10]);

        let stored = ctl.store().get(task).unwrap().unwrap();
        assert_eq!(stored.time_spent_secs, u64::from(25u32 * 60 - 10));
        assert_eq!(ctl.store().totals().unwrap().total_time_worked_secs, u64::from(25u32 * 60 - 10));
        assert_eq!(ctl.notifier().completed, vec![SessionType::Work]);
    }

    #[test]
    fn break_time_is_not_work_time() {
        let (mut ctl, clock) = controller();
        ctl.skip();
        ctl.start();
        let events = run_for(&mut ctl, &clock, 60);
        assert!(work_time_saved(&events).is_empty());
        assert_eq!(ctl.snapshot().unsaved_work_secs, 0);
    }

    #[test]
    fn sub_second_remainders_carry_over() {
        let (mut ctl, clock) = controller();
        ctl.start();
        clock.advance_ms(1_600);
        ctl.pause();
        let first = ctl.reset();
        assert_eq!(work_time_saved(&first), vec![1]);
        ctl.start();
        clock.advance_ms(1_500);
        let second = ctl.reset();
        // 0.6 s carried + 1.5 s = 2.1 s
        assert_eq!(work_time_saved(&second), vec![2]);
    }

    #[test]
    fn changing_task_credits_time_to_previous_task() {
        let (mut ctl, clock) = controller();
        let a = add_task(&ctl, "a");
        let b = add_task(&ctl, "b");
        ctl.set_task(Some(a));
        ctl.start();
        run_for(&mut ctl, &clock, 40);
        ctl.set_task(Some(b));
        run_for(&mut ctl, &clock, 20);
        ctl.shutdown();

        assert_eq!(ctl.store().get(a).unwrap().unwrap().time_spent_secs, 40);
        assert_eq!(ctl.store().get(b).unwrap().unwrap().time_spent_secs, 20);
    }

    #[test]
    fn auto_start_breaks_and_work() {
        let (mut ctl, _) = controller_with(TimerSettings {
            auto_start_breaks: true,
            ..settings()
        });
        let events = ctl.skip();
        assert!(matches!(events.last(), Some(Event::TimerStarted { session_type: SessionType::ShortBreak, .. })));
        assert_eq!(ctl.state(), TimerState::Running);

        ctl.skip();
        assert_eq!(ctl.snapshot().session_type, SessionType::Work);
        assert_eq!(ctl.state(), TimerState::Idle);
    }

    #[test]
    fn settings_update_rederives_idle_and_clamps_running() {
        let (mut ctl, clock) = controller();
        ctl.update_settings(TimerSettings {
            work_minutes: 50,
            ..settings()
        });
        assert_eq!(ctl.snapshot().seconds_remaining, 50 * 60);

        ctl.start();
        run_for(&mut ctl, &clock, 60);
        ctl.update_settings(TimerSettings {
            work_minutes: 10,
            ..settings()
        });
        assert_eq!(ctl.snapshot().seconds_remaining, 10 * 60);
        ctl.update_settings(TimerSettings {
            work_minutes: 90,
            ..settings()
        });
        assert_eq!(ctl.snapshot().seconds_remaining, 10 * 60);
    }

    #[test]
    fn vibration_follows_setting() {
        let (mut ctl, _) = controller_with(TimerSettings {
            vibration_enabled: false,
            ..settings()
        });
        ctl.skip();
        assert_eq!(ctl.notifier().completed.len(), 1);
        assert_eq!(ctl.notifier().vibrations, 0);
    }

    #[test]
    fn shutdown_pays_pending_pomodoro_and_disables_commands() {
        let (mut ctl, _) = controller_with(TimerSettings::default());
        let task = add_task(&ctl, "t");
        ctl.set_task(Some(task));
        ctl.skip();
        let events = ctl.shutdown();
        assert!(events.iter().any(|e| matches!(e, Event::RewardGranted { .. })));
        assert_eq!(ctl.store().coins().unwrap(), 5);
        assert!(ctl.is_disposed());

        assert!(ctl.start().is_empty());
        assert!(ctl.skip().is_empty());
        assert!(ctl.submit_note("anything at all").is_empty());
        assert!(ctl.shutdown().is_empty());
    }

    /// A store whose every write fails.
    struct BrokenStore;

    fn broken() -> CoreError {
        CoreError::Custom("disk on fire".into())
    }

    impl TaskRepository for BrokenStore {
        fn get(&self, _id: i64) -> Result<Option<Task>> {
            Err(broken())
        }
        fn update(&self, _task: &Task) -> Result<()> {
            Err(broken())
        }
        fn append_note(&self, _id: i64, _note: &ProgressNote) -> Result<()> {
            Err(broken())
        }
    }

    impl WalletRepository for BrokenStore {
        fn credit(&self, _event: &RewardEvent) -> Result<CreditOutcome> {
            Err(broken())
        }
        fn debit(&self, _amount: u32) -> Result<bool> {
            Err(broken())
        }
        fn read(&self) -> Result<Option<Wallet>> {
            Err(broken())
        }
    }

    impl StatsRepository for BrokenStore {
        fn record(&self, _day: NaiveDate, _delta: StatsDelta) -> Result<()> {
            Err(broken())
        }
    }

    #[test]
    fn persistence_failures_never_stall_the_timer() {
        let clock = ManualClock::new(0);
        let mut ctl = TimerController::new(
            BrokenStore,
            RecordingNotifier::default(),
            clock.clone(),
            TimerSettings::default(),
        );
        ctl.set_task(Some(1));
        ctl.start();
        for _ in 0..25 * 60 {
            clock.advance_secs(1);
            ctl.tick();
        }
        assert!(ctl.snapshot().awaiting_note);
        let events = ctl.submit_note("this note will not be saved anywhere");
        assert!(!events.iter().any(|e| matches!(e, Event::RewardGranted { .. })));
        assert_eq!(ctl.snapshot().session_type, SessionType::ShortBreak);
        assert_eq!(ctl.snapshot().unsaved_work_secs, 0);
    }

    proptest! {
        #[test]
        fn countdown_matches_ticks_across_pauses(
            runs in proptest::collection::vec((1u32..120, 0u64..600), 1..8)
        ) {
            let long_work = TimerSettings {
                work_minutes: 60,
                ..settings()
            };
            let (mut ctl, clock) = controller_with(long_work);
            let task_id = add_task(&ctl, "prop");
            ctl.set_task(Some(task_id));

            let mut ticked = 0;
            for (secs, paused) in runs {
                ctl.start();
                run_for(&mut ctl, &clock, secs);
                ticked += secs;
                ctl.pause();
                clock.advance_secs(paused);
            }
            prop_assert_eq!(ctl.snapshot().seconds_remaining, 60 * 60 - ticked);
            prop_assert_eq!(ctl.snapshot().unsaved_work_secs, ticked);

            ctl.shutdown();
            let task = ctl.store().get(task_id).unwrap().unwrap();
            prop_assert_eq!(task.time_spent_secs, u64::from(ticked));
        }
    }
}
