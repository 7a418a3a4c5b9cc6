//! Achievement catalog and unlock evaluation.
//!
//! Achievements are never stored; they are recomputed from lifetime totals,
//! the current streak and shop progress each time they are shown.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AchievementCategory {
    Pomodoros,
    Tasks,
    Notes,
    Streak,
    Music,
    Rooms,
}

impl AchievementCategory {
    pub fn label(self) -> &'static str {
        match self {
            AchievementCategory::Pomodoros => "Pomodoros",
            AchievementCategory::Tasks => "Tasks",
            AchievementCategory::Notes => "Notes",
            AchievementCategory::Streak => "Streak",
            AchievementCategory::Music => "Music",
            AchievementCategory::Rooms => "Rooms",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Achievement {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub emoji: &'static str,
    /// Threshold the category's counter must reach.
    pub requirement: u32,
    pub category: AchievementCategory,
}

const fn achievement(
    id: &'static str,
    title: &'static str,
    description: &'static str,
    emoji: &'static str,
    requirement: u32,
    category: AchievementCategory,
) -> Achievement {
    Achievement {
        id,
        title,
        description,
        emoji,
        requirement,
        category,
    }
}

use AchievementCategory::*;

pub const ACHIEVEMENTS: &[Achievement] = &[
    achievement("first_pomodoro", "First Step", "Complete your first pomodoro", "🍅", 1, Pomodoros),
    achievement("pomodoro_10", "Focused", "Complete 10 pomodoros", "🔟", 10, Pomodoros),
    achievement("pomodoro_50", "Productive", "Complete 50 pomodoros", "⭐", 50, Pomodoros),
    achievement("pomodoro_100", "Master", "Complete 100 pomodoros", "👑", 100, Pomodoros),
    achievement("pomodoro_500", "Legend", "Complete 500 pomodoros", "🏆", 500, Pomodoros),
    achievement("task_1", "Organizer", "Complete your first task", "✅", 1, Tasks),
    achievement("task_25", "Efficient", "Complete 25 tasks", "📋", 25, Tasks),
    achievement("task_100", "Unstoppable", "Complete 100 tasks", "🚀", 100, Tasks),
    achievement("note_1", "Writer", "Write your first note", "📝", 1, Notes),
    achievement("note_20", "Journal", "Write 20 notes", "📖", 20, Notes),
    achievement("note_100", "Author", "Write 100 notes", "✍️", 100, Notes),
    achievement("streak_3", "Consistent", "3-day streak", "🔥", 3, Streak),
    achievement("streak_7", "Dedicated", "7-day streak", "💪", 7, Streak),
    achievement("streak_30", "Disciplined", "30-day streak", "🌟", 30, Streak),
    achievement("music_5", "Music Lover", "Unlock 5 tracks", "🎵", 5, Music),
    achievement("music_15", "Collector", "Unlock 15 tracks", "🎶", 15, Music),
    achievement("music_all", "DJ Master", "Unlock 30 tracks", "🎧", 30, Music),
    achievement("room_1", "Decorator", "Complete your first room", "🏡", 1, Rooms),
    achievement("room_all", "Architect", "Complete every room", "🏛️", 3, Rooms),
];

/// Counters achievements are measured against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievementProgress {
    pub pomodoros: u32,
    pub tasks: u32,
    pub notes: u32,
    pub streak: u32,
    /// Unlocked catalog tracks plus purchased imports.
    pub music_unlocked: u32,
    pub rooms_completed: u32,
}

impl AchievementProgress {
    pub fn value_for(&self, category: AchievementCategory) -> u32 {
        match category {
            Pomodoros => self.pomodoros,
            Tasks => self.tasks,
            Notes => self.notes,
            Streak => self.streak,
            Music => self.music_unlocked,
            Rooms => self.rooms_completed,
        }
    }

    /// Every achievement with its unlock state, in catalog order.
    pub fn evaluate(&self) -> Vec<AchievementStatus> {
        ACHIEVEMENTS
            .iter()
            .map(|a| {
                let current = self.value_for(a.category);
                AchievementStatus {
                    achievement: *a,
                    current: current.min(a.requirement),
                    unlocked: current >= a.requirement,
                }
            })
            .collect()
    }

    pub fn unlocked(&self) -> Vec<Achievement> {
        self.evaluate()
            .into_iter()
            .filter(|s| s.unlocked)
            .map(|s| s.achievement)
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AchievementStatus {
    pub achievement: Achievement,
    /// Progress toward the requirement, capped at it.
    pub current: u32,
    pub unlocked: bool,
}
