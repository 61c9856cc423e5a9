use serde::{Deserialize, Serialize};

use crate::models::{Day, HabitId};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Streak {
    pub current: u32,
    pub longest: u32,
}

/// Distinct habits completed on one day, out of all tracked habits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayBucket {
    pub day: Day,
    pub completed: u32,
    pub total: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayFlag {
    pub day: Day,
    pub completed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_habits: u32,
    pub completed_today: u32,
    pub completion_percentage_today: u32,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub total_completions: u32,
    pub weekly_progress: Vec<DayBucket>,
}

impl DashboardStats {
    /// Days in the window on which every habit was done.
    pub fn perfect_days(&self) -> u32 {
        self.weekly_progress
            .iter()
            .filter(|d| d.total > 0 && d.completed >= d.total)
            .count() as u32
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitProgress {
    pub total_completions: u32,
    pub current_streak: u32,
    pub days_since_creation: u32,
    pub completion_rate: u32,
    pub weekly_progress: Vec<DayFlag>,
    pub all_completed_dates: Vec<Day>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitToday {
    pub habit_id: HabitId,
    pub completed_today: bool,
}
