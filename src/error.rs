use thiserror::Error;

use crate::models::{Day, HabitId};

pub const TITLE_MAX: usize = 100;
pub const DESCRIPTION_MAX: usize = 500;

#[derive(Debug, Error)]
pub enum TrackError {
    #[error("Habit '{0}' not found")]
    HabitNotFound(String),

    #[error("Habit {id} ('{title}') already completed for {day}")]
    AlreadyCompleted { id: HabitId, title: String, day: Day },

    #[error("Invalid day '{0}': expected YYYY-MM-DD")]
    InvalidDay(String),

    #[error("Cannot complete a habit on {day}, which is after today ({today})")]
    FutureDay { day: Day, today: Day },

    #[error("Invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },
}

/// Trim and check a habit title, returning the stored form.
pub fn validate_title(title: &str) -> Result<String, TrackError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(TrackError::Validation {
            field: "title",
            message: "Title is required".to_string(),
        });
    }
    if title.chars().count() > TITLE_MAX {
        return Err(TrackError::Validation {
            field: "title",
            message: format!("Title cannot exceed {} characters", TITLE_MAX),
        });
    }
    Ok(title.to_string())
}

pub fn validate_description(description: &str) -> Result<String, TrackError> {
    let description = description.trim();
    if description.chars().count() > DESCRIPTION_MAX {
        return Err(TrackError::Validation {
            field: "description",
            message: format!("Description cannot exceed {} characters", DESCRIPTION_MAX),
        });
    }
    Ok(description.to_string())
}
