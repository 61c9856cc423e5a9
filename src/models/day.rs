use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::error::TrackError;
use crate::models::{Completion, HabitId};

pub const DAY_FORMAT: &str = "%Y-%m-%d";

/// A calendar day with no time-of-day or timezone, written `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Day(NaiveDate);

impl Day {
    /// UTC calendar day of an instant.
    pub fn of(instant: DateTime<Utc>) -> Self {
        Day(instant.date_naive())
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// The previous calendar day. Saturates at the earliest representable date.
    pub fn pred(self) -> Self {
        self.minus_days(1)
    }

    #[cfg(test)]
    pub fn succ(self) -> Self {
        self.0.checked_add_days(Days::new(1)).map(Day).unwrap_or(self)
    }

    pub fn minus_days(self, n: u64) -> Self {
        self.0.checked_sub_days(Days::new(n)).map(Day).unwrap_or(Day(NaiveDate::MIN))
    }

    /// Whole days from `self` to `later` (negative when `later` is earlier).
    pub fn days_until(self, later: Day) -> i64 {
        (later.0 - self.0).num_days()
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DAY_FORMAT))
    }
}

impl FromStr for Day {
    type Err = TrackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // chrono accepts unpadded fields, the wire format does not
        let b = s.as_bytes();
        let shaped = b.len() == 10
            && b[4] == b'-'
            && b[7] == b'-'
            && b
                .iter()
                .enumerate()
                .all(|(i, c)| i == 4 || i == 7 || c.is_ascii_digit());
        if !shaped {
            return Err(TrackError::InvalidDay(s.to_string()));
        }
        NaiveDate::parse_from_str(s, DAY_FORMAT)
            .map(Day)
            .map_err(|_| TrackError::InvalidDay(s.to_string()))
    }
}

impl Serialize for Day {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Day {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Ordered set of unique days.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DaySet(BTreeSet<Day>);

impl DaySet {
    #[cfg(test)]
    pub fn new() -> Self {
        Self::default()
    }

    /// Days on which any of the given completions happened.
    pub fn union_of<'a>(events: impl IntoIterator<Item = &'a Completion>) -> Self {
        events.into_iter().map(|e| e.day).collect()
    }

    /// Days on which one specific habit was completed.
    pub fn for_habit<'a>(events: impl IntoIterator<Item = &'a Completion>, habit_id: HabitId) -> Self {
        events
            .into_iter()
            .filter(|e| e.habit_id == habit_id)
            .map(|e| e.day)
            .collect()
    }

    pub fn contains(&self, day: &Day) -> bool {
        self.0.contains(day)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn ascending(&self) -> impl Iterator<Item = Day> + '_ {
        self.0.iter().copied()
    }

    pub fn descending(&self) -> impl Iterator<Item = Day> + '_ {
        self.0.iter().rev().copied()
    }
}

impl FromIterator<Day> for DaySet {
    fn from_iter<I: IntoIterator<Item = Day>>(iter: I) -> Self {
        DaySet(iter.into_iter().collect())
    }
}
