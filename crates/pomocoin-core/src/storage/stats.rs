//! Daily statistics storage.

use chrono::NaiveDate;
use rusqlite::{params, OptionalExtension, Row};

use super::Database;
use crate::error::Result;
use crate::repository::{StatsDelta, StatsRepository};
use crate::stats::{current_streak, AchievementProgress, DailyStats, TotalStats};

const DATE_FORMAT: &str = "%Y-%m-%d";

fn row_to_daily(row: &Row) -> Result<DailyStats, rusqlite::Error> {
    let date: String = row.get(0)?;
    let date = NaiveDate::parse_from_str(&date, DATE_FORMAT).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(DailyStats {
        date,
        pomodoros_completed: row.get(1)?,
        tasks_completed: row.get(2)?,
        notes_written: row.get(3)?,
        time_worked_secs: row.get(4)?,
    })
}

impl Database {
    /// Counters for one day, zeroed when nothing was recorded.
    pub fn stats_for(&self, day: NaiveDate) -> Result<DailyStats> {
        let stats = self
            .conn()
            .query_row(
                "SELECT date, pomodoros_completed, tasks_completed, notes_written, time_worked_secs
                 FROM daily_stats WHERE date = ?1",
                params![day.format(DATE_FORMAT).to_string()],
                row_to_daily,
            )
            .optional()?;
        Ok(stats.unwrap_or_else(|| DailyStats::empty(day)))
    }

    /// The `limit` most recent recorded days, newest first.
    pub fn recent_days(&self, limit: u32) -> Result<Vec<DailyStats>> {
        let mut stmt = self.conn().prepare(
            "SELECT date, pomodoros_completed, tasks_completed, notes_written, time_worked_secs
             FROM daily_stats ORDER BY date DESC LIMIT ?1",
        )?;
        let days = stmt
            .query_map(params![limit], row_to_daily)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(days)
    }

    /// Lifetime sums across every recorded day.
    pub fn totals(&self) -> Result<TotalStats> {
        let totals = self.conn().query_row(
            "SELECT COALESCE(SUM(pomodoros_completed), 0), COALESCE(SUM(tasks_completed), 0),
                    COALESCE(SUM(notes_written), 0), COALESCE(SUM(time_worked_secs), 0)
             FROM daily_stats",
            [],
            |row| {
                Ok(TotalStats {
                    total_pomodoros: row.get(0)?,
                    total_tasks: row.get(1)?,
                    total_notes: row.get(2)?,
                    total_time_worked_secs: row.get::<_, i64>(3)?.max(0) as u64,
                })
            },
        )?;
        Ok(totals)
    }

    /// Days with at least one pomodoro, newest first.
    pub fn active_days(&self) -> Result<Vec<NaiveDate>> {
        let mut stmt = self.conn().prepare(
            "SELECT date FROM daily_stats WHERE pomodoros_completed > 0 ORDER BY date DESC",
        )?;
        let days = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(days
            .iter()
            .filter_map(|d| NaiveDate::parse_from_str(d, DATE_FORMAT).ok())
            .collect())
    }

    /// Counters every achievement is measured against, as of `today`.
    pub fn achievement_progress(&self, today: NaiveDate) -> Result<AchievementProgress> {
        let totals = self.totals()?;
        Ok(AchievementProgress {
            pomodoros: totals.total_pomodoros,
            tasks: totals.total_tasks,
            notes: totals.total_notes,
            streak: current_streak(&self.active_days()?, today),
            music_unlocked: self.music_unlocked_count()?,
            rooms_completed: self.rooms_summary()?.completed_rooms,
        })
    }
}

impl StatsRepository for Database {
    fn record(&self, day: NaiveDate, delta: StatsDelta) -> Result<()> {
        self.conn().execute(
            "INSERT INTO daily_stats (date, pomodoros_completed, tasks_completed, notes_written, time_worked_secs)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(date) DO UPDATE SET
                 pomodoros_completed = pomodoros_completed + excluded.pomodoros_completed,
                 tasks_completed = tasks_completed + excluded.tasks_completed,
                 notes_written = notes_written + excluded.notes_written,
                 time_worked_secs = time_worked_secs + excluded.time_worked_secs",
            params![
                day.format(DATE_FORMAT).to_string(),
                delta.pomodoros,
                delta.tasks,
                delta.notes,
                delta.time_worked_secs,
            ],
        )?;
        Ok(())
    }
}
