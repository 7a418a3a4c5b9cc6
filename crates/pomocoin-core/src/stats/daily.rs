//! Per-day activity counters and the summaries derived from them.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// One row of `daily_stats`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyStats {
    pub date: NaiveDate,
    pub pomodoros_completed: u32,
    pub tasks_completed: u32,
    pub notes_written: u32,
    pub time_worked_secs: u32,
}

impl DailyStats {
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            pomodoros_completed: 0,
            tasks_completed: 0,
            notes_written: 0,
            time_worked_secs: 0,
        }
    }
}

/// All-time sums over `daily_stats`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TotalStats {
    pub total_pomodoros: u32,
    pub total_tasks: u32,
    pub total_notes: u32,
    pub total_time_worked_secs: u64,
}

/// Sums over the most recent week of rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyComparison {
    pub this_week_pomodoros: u32,
    pub this_week_tasks: u32,
    pub this_week_time_secs: u64,
    pub avg_pomodoros_per_day: u32,
}

/// Decoration progress across every room.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomsSummary {
    pub completed_rooms: u32,
    pub total_rooms: u32,
    pub purchased_items: u32,
    pub total_items: u32,
    pub total_percentage: u32,
}

/// Consecutive days with at least one pomodoro, counting back from `today`.
///
/// `active_days` must be sorted newest first. A streak that ended yesterday
/// counts as broken.
pub fn current_streak(active_days: &[NaiveDate], today: NaiveDate) -> u32 {
    let mut expected = today;
    let mut streak = 0;
    for day in active_days {
        if *day != expected {
            break;
        }
        streak += 1;
        expected = expected - Duration::days(1);
    }
    streak
}

/// Summary of the given rows (normally the last seven).
pub fn weekly_comparison(days: &[DailyStats]) -> Option<WeeklyComparison> {
    if days.is_empty() {
        return None;
    }
    let pomodoros: u32 = days.iter().map(|d| d.pomodoros_completed).sum();
    Some(WeeklyComparison {
        this_week_pomodoros: pomodoros,
        this_week_tasks: days.iter().map(|d| d.tasks_completed).sum(),
        this_week_time_secs: days.iter().map(|d| u64::from(d.time_worked_secs)).sum(),
        avg_pomodoros_per_day: pomodoros / days.len() as u32,
    })
}

/// The row with the most pomodoros; the earliest listed wins a tie.
pub fn best_day(days: &[DailyStats]) -> Option<&DailyStats> {
    days.iter().fold(None, |best: Option<&DailyStats>, day| match best {
        Some(b) if b.pomodoros_completed >= day.pomodoros_completed => Some(b),
        _ => Some(day),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn day(s: &str, pomodoros: u32) -> DailyStats {
        DailyStats {
            pomodoros_completed: pomodoros,
            ..DailyStats::empty(date(s))
        }
    }

    #[test]
    fn streak_counts_consecutive_days_ending_today() {
        let days = [date("2024-12-11"), date("2024-12-10"), date("2024-12-09"), date("2024-12-07")];
        assert_eq!(current_streak(&days, date("2024-12-11")), 3);
    }

    #[test]
    fn streak_is_zero_without_activity_today() {
        let days = [date("2024-12-10"), date("2024-12-09")];
        assert_eq!(current_streak(&days, date("2024-12-11")), 0);
        assert_eq!(current_streak(&[], date("2024-12-11")), 0);
    }

    #[test]
    fn streak_crosses_month_boundary() {
        let days = [date("2024-03-01"), date("2024-02-29"), date("2024-02-28")];
        assert_eq!(current_streak(&days, date("2024-03-01")), 3);
    }

    #[test]
    fn weekly_comparison_sums_and_averages() {
        let mut a = day("2024-12-11", 5);
        a.tasks_completed = 2;
        a.time_worked_secs = 3000;
        let mut b = day("2024-12-10", 2);
        b.time_worked_secs = 1200;
        let summary = weekly_comparison(&[a, b]).unwrap();
        assert_eq!(summary.this_week_pomodoros, 7);
        assert_eq!(summary.this_week_tasks, 2);
        assert_eq!(summary.this_week_time_secs, 4200);
        assert_eq!(summary.avg_pomodoros_per_day, 3);
    }

    #[test]
    fn weekly_comparison_of_nothing_is_none() {
        assert!(weekly_comparison(&[]).is_none());
    }

    #[test]
    fn best_day_prefers_most_pomodoros() {
        let days = [day("2024-12-11", 3), day("2024-12-10", 6), day("2024-12-09", 6)];
        assert_eq!(best_day(&days).map(|d| d.date), Some(date("2024-12-10")));
        assert!(best_day(&[]).is_none());
    }
}
