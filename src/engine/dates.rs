use chrono::{DateTime, Utc};

use crate::engine::Clock;
use crate::models::Day;

pub fn today(clock: &impl Clock) -> Day {
    clock.today()
}

/// The `n` days ending at `today`, most recent first.
pub fn last_n_days(today: Day, n: usize) -> Vec<Day> {
    (0..n as u64).map(|i| today.minus_days(i)).collect()
}

/// Oldest-first copy of a most-recent-first day list.
pub fn chronological(mut days: Vec<Day>) -> Vec<Day> {
    days.reverse();
    days
}

pub fn to_day(instant: DateTime<Utc>) -> Day {
    Day::of(instant)
}
