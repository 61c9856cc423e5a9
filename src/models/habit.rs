use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::Day;

pub type HabitId = i64;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    pub id: HabitId,
    pub title: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub is_active: bool,
}

/// A habit marked done on a day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Completion {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub habit_id: HabitId,
    pub day: Day,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logged_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
impl Completion {
    pub fn new(habit_id: HabitId, day: Day) -> Self {
        Self {
            id: None,
            habit_id,
            day,
            logged_at: None,
        }
    }
}
