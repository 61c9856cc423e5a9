use crate::models::{Day, DaySet, Streak};

/// Consecutive completed days ending at `today`.
///
/// The walk is anchored at today itself: if today has no completion the
/// current streak is 0, even when yesterday and earlier form a run.
pub fn current_streak(days: &DaySet, today: Day) -> u32 {
    let mut streak = 0u32;
    let mut expected = today;

    for day in days.descending() {
        if day != expected {
            break;
        }
        streak += 1;
        expected = expected.pred();
    }
    streak
}

/// Longest run of consecutive days anywhere in the set.
pub fn longest_streak(days: &DaySet) -> u32 {
    let mut longest = 0u32;
    let mut run = 0u32;
    let mut prev: Option<Day> = None;

    for day in days.ascending() {
        run = match prev {
            Some(p) if p.days_until(day) == 1 => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        prev = Some(day);
    }
    longest
}

pub fn streak(days: &DaySet, today: Day) -> Streak {
    Streak {
        current: current_streak(days, today),
        longest: longest_streak(days),
    }
}
