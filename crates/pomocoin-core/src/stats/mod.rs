//! Statistics module for Pomocoin
//!
//! Daily counters are written by the reward paths; this module turns them
//! into totals, streaks, weekly summaries and unlocked achievements.

mod achievements;
mod daily;

pub use achievements::{
    Achievement, AchievementCategory, AchievementProgress, AchievementStatus, ACHIEVEMENTS,
};
pub use daily::{
    best_day, current_streak, weekly_comparison, DailyStats, RoomsSummary, TotalStats,
    WeeklyComparison,
};
