pub mod day;
pub mod habit;
pub mod stats;

pub use day::{Day, DaySet};
pub use habit::{Completion, Habit, HabitId};
pub use stats::{DashboardStats, DayBucket, DayFlag, HabitProgress, HabitToday, Streak};
