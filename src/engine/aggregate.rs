use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};

use crate::engine::Clock;
use crate::engine::dates::{chronological, last_n_days, to_day, today};
use crate::engine::streak::{current_streak, streak};
use crate::models::{
    Completion, DashboardStats, Day, DayBucket, DayFlag, DaySet, Habit, HabitId, HabitProgress,
    HabitToday,
};

pub const DEFAULT_WINDOW_DAYS: usize = 7;

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// Turns completion snapshots into statistics.
///
/// Every call reads the clock once and recomputes from the events it is
/// given; nothing is cached between calls.
pub struct StatsEngine<C: Clock> {
    clock: C,
    window_days: usize,
}

impl<C: Clock> StatsEngine<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            window_days: DEFAULT_WINDOW_DAYS,
        }
    }

    pub fn with_window(mut self, window_days: usize) -> Self {
        self.window_days = window_days;
        self
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn today(&self) -> Day {
        today(&self.clock)
    }

    /// Window days, oldest first.
    pub fn window(&self) -> Vec<Day> {
        chronological(last_n_days(self.today(), self.window_days))
    }

    /// Account-wide statistics over the given habits.
    ///
    /// `recent` only needs to cover the trailing window; `all` is the full
    /// history and drives streaks and the raw completion total.
    pub fn dashboard_stats(
        &self,
        habits: &[Habit],
        recent: &[Completion],
        all: &[Completion],
    ) -> DashboardStats {
        if habits.is_empty() {
            return DashboardStats::default();
        }

        let today = self.today();
        let ids: HashSet<HabitId> = habits.iter().map(|h| h.id).collect();
        let total = habits.len() as u32;

        let by_day = habits_by_day(recent.iter().filter(|e| ids.contains(&e.habit_id)));
        let done_on = |day: &Day| by_day.get(day).map_or(0, |set| set.len() as u32);

        let completed_today = done_on(&today);
        let weekly_progress = chronological(last_n_days(today, self.window_days))
            .into_iter()
            .map(|day| DayBucket {
                completed: done_on(&day),
                total,
                day,
            })
            .collect();

        let history: Vec<&Completion> = all.iter().filter(|e| ids.contains(&e.habit_id)).collect();
        let account = streak(&DaySet::union_of(history.iter().copied()), today);

        DashboardStats {
            total_habits: total,
            completed_today,
            completion_percentage_today: percent(completed_today, total),
            current_streak: account.current,
            longest_streak: account.longest,
            total_completions: history.len() as u32,
            weekly_progress,
        }
    }

    /// Statistics for one habit from its own completion history.
    pub fn habit_progress(&self, habit: &Habit, events: &[Completion]) -> HabitProgress {
        let now = self.now();
        let today = to_day(now);

        let own: Vec<&Completion> = events.iter().filter(|e| e.habit_id == habit.id).collect();
        let days = DaySet::for_habit(own.iter().copied(), habit.id);
        let total_completions = own.len() as u32;

        let elapsed_days = (now - habit.created_at).num_seconds().div_euclid(SECONDS_PER_DAY);
        let days_since_creation = (elapsed_days + 1).clamp(1, u32::MAX as i64) as u32;

        let weekly_progress = chronological(last_n_days(today, self.window_days))
            .into_iter()
            .map(|day| DayFlag {
                completed: days.contains(&day),
                day,
            })
            .collect();

        HabitProgress {
            total_completions,
            current_streak: current_streak(&days, today),
            days_since_creation,
            completion_rate: percent(total_completions, days_since_creation).min(100),
            weekly_progress,
            all_completed_dates: days.descending().collect(),
        }
    }

    /// Whether each habit has a completion today.
    pub fn today_overview(&self, habits: &[Habit], events: &[Completion]) -> Vec<HabitToday> {
        let today = self.today();
        let done: HashSet<HabitId> = events
            .iter()
            .filter(|e| e.day == today)
            .map(|e| e.habit_id)
            .collect();

        habits
            .iter()
            .map(|h| HabitToday {
                habit_id: h.id,
                completed_today: done.contains(&h.id),
            })
            .collect()
    }
}

fn habits_by_day<'a>(events: impl Iterator<Item = &'a Completion>) -> HashMap<Day, HashSet<HabitId>> {
    let mut map: HashMap<Day, HashSet<HabitId>> = HashMap::new();
    for e in events {
        map.entry(e.day).or_default().insert(e.habit_id);
    }
    map
}

/// `part / whole` as a percentage rounded half up.
fn percent(part: u32, whole: u32) -> u32 {
    if whole == 0 {
        return 0;
    }
    (part as f64 / whole as f64 * 100.0).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::FixedClock;
    use chrono::{Duration, TimeZone};

    fn day(s: &str) -> Day {
        s.parse().unwrap()
    }

    fn habit(id: HabitId, created: &str) -> Habit {
        Habit {
            id,
            title: format!("habit {id}"),
            description: String::new(),
            created_at: day(created).date().and_hms_opt(8, 0, 0).unwrap().and_utc(),
            is_active: true,
        }
    }

    fn done(id: HabitId, d: &str) -> Completion {
        Completion::new(id, day(d))
    }

    fn engine_on(today: &str) -> StatsEngine<FixedClock> {
        StatsEngine::new(FixedClock::at_day(day(today)))
    }

    #[test]
    fn no_habits_gives_empty_stats() {
        let engine = engine_on("2024-05-10");
        let events = vec![done(1, "2024-05-10")];
        let stats = engine.dashboard_stats(&[], &events, &events);
        assert_eq!(stats, DashboardStats::default());
        assert!(stats.weekly_progress.is_empty());
    }

    #[test]
    fn half_of_habits_done_today() {
        let engine = engine_on("2024-05-10");
        let habits = vec![habit(1, "2024-05-01"), habit(2, "2024-05-01")];
        let events = vec![done(1, "2024-05-10")];
        let stats = engine.dashboard_stats(&habits, &events, &events);
        assert_eq!(stats.total_habits, 2);
        assert_eq!(stats.completed_today, 1);
        assert_eq!(stats.completion_percentage_today, 50);
    }

    #[test]
    fn percentage_rounds_to_nearest() {
        let engine = engine_on("2024-05-10");
        let habits = vec![habit(1, "2024-05-01"), habit(2, "2024-05-01"), habit(3, "2024-05-01")];
        let events = vec![done(1, "2024-05-10"), done(2, "2024-05-10")];
        let stats = engine.dashboard_stats(&habits, &events, &events);
        assert_eq!(stats.completion_percentage_today, 67);
    }

    #[test]
    fn duplicate_events_count_once_per_habit_but_raw_in_total() {
        let engine = engine_on("2024-05-10");
        let habits = vec![habit(1, "2024-05-01"), habit(2, "2024-05-01")];
        let events = vec![done(1, "2024-05-10"), done(1, "2024-05-10"), done(2, "2024-05-09")];
        let stats = engine.dashboard_stats(&habits, &events, &events);
        assert_eq!(stats.completed_today, 1);
        assert_eq!(stats.total_completions, 3);
        assert_eq!(stats.current_streak, 2);
    }

    #[test]
    fn weekly_progress_is_oldest_first_with_distinct_counts() {
        let engine = engine_on("2024-03-02");
        let habits = vec![habit(1, "2024-01-01"), habit(2, "2024-01-01")];
        let recent = vec![
            done(1, "2024-02-25"),
            done(1, "2024-02-29"),
            done(2, "2024-02-29"),
            done(2, "2024-03-02"),
        ];
        let stats = engine.dashboard_stats(&habits, &recent, &recent);
        let days: Vec<String> = stats.weekly_progress.iter().map(|b| b.day.to_string()).collect();
        assert_eq!(
            days,
            ["2024-02-25", "2024-02-26", "2024-02-27", "2024-02-28", "2024-02-29", "2024-03-01", "2024-03-02"]
        );
        let counts: Vec<u32> = stats.weekly_progress.iter().map(|b| b.completed).collect();
        assert_eq!(counts, [1, 0, 0, 0, 2, 0, 1]);
        assert!(stats.weekly_progress.iter().all(|b| b.total == 2));
    }

    #[test]
    fn account_streak_uses_any_habit_and_full_history() {
        let engine = engine_on("2024-05-10");
        let habits = vec![habit(1, "2024-04-01"), habit(2, "2024-04-01")];
        let all = vec![
            done(1, "2024-04-01"),
            done(2, "2024-04-02"),
            done(1, "2024-04-03"),
            done(2, "2024-04-04"),
            done(1, "2024-05-09"),
            done(2, "2024-05-10"),
        ];
        let recent: Vec<Completion> = all.iter().filter(|e| e.day >= day("2024-05-04")).cloned().collect();
        let stats = engine.dashboard_stats(&habits, &recent, &all);
        assert_eq!(stats.current_streak, 2);
        assert_eq!(stats.longest_streak, 4);
        assert_eq!(stats.total_completions, 6);
    }

    #[test]
    fn events_of_unknown_habits_are_ignored() {
        let engine = engine_on("2024-05-10");
        let habits = vec![habit(1, "2024-05-01")];
        let events = vec![done(1, "2024-05-10"), done(9, "2024-05-10"), done(9, "2024-05-09")];
        let stats = engine.dashboard_stats(&habits, &events, &events);
        assert_eq!(stats.completed_today, 1);
        assert_eq!(stats.completion_percentage_today, 100);
        assert_eq!(stats.total_completions, 1);
        assert_eq!(stats.current_streak, 1);
    }

    #[test]
    fn habit_created_today_with_one_completion() {
        let engine = engine_on("2024-05-10");
        let h = habit(1, "2024-05-10");
        let progress = engine.habit_progress(&h, &[done(1, "2024-05-10")]);
        assert_eq!(progress.days_since_creation, 1);
        assert_eq!(progress.completion_rate, 100);
        assert_eq!(progress.current_streak, 1);
        assert_eq!(progress.total_completions, 1);
    }

    #[test]
    fn days_since_creation_counts_whole_elapsed_days() {
        let now = Utc.with_ymd_and_hms(2024, 5, 10, 7, 0, 0).unwrap();
        let engine = StatsEngine::new(FixedClock(now));
        let mut h = habit(1, "2024-05-01");
        h.created_at = now - Duration::hours(24 * 9 - 1);
        assert_eq!(engine.habit_progress(&h, &[]).days_since_creation, 9);
        h.created_at = now + Duration::hours(5);
        assert_eq!(engine.habit_progress(&h, &[]).days_since_creation, 1);
    }

    #[test]
    fn completion_rate_is_capped() {
        let engine = engine_on("2024-05-10");
        let h = habit(1, "2024-05-10");
        let dirty = vec![done(1, "2024-05-10"), done(1, "2024-05-10"), done(1, "2024-05-09")];
        let progress = engine.habit_progress(&h, &dirty);
        assert_eq!(progress.total_completions, 3);
        assert_eq!(progress.completion_rate, 100);
        assert_eq!(progress.all_completed_dates, vec![day("2024-05-10"), day("2024-05-09")]);
    }

    #[test]
    fn habit_progress_weekly_flags_and_history() {
        let engine = engine_on("2024-05-10");
        let h = habit(3, "2024-04-11");
        let events = vec![
            done(3, "2024-04-20"),
            done(3, "2024-05-04"),
            done(3, "2024-05-08"),
            done(3, "2024-05-09"),
            done(4, "2024-05-10"),
        ];
        let progress = engine.habit_progress(&h, &events);
        assert_eq!(progress.total_completions, 4);
        assert_eq!(progress.current_streak, 0);
        assert_eq!(progress.days_since_creation, 30);
        assert_eq!(progress.completion_rate, 13);
        let flags: Vec<bool> = progress.weekly_progress.iter().map(|f| f.completed).collect();
        assert_eq!(flags, [true, false, false, false, true, true, false]);
        assert_eq!(progress.weekly_progress[0].day, day("2024-05-04"));
        assert_eq!(progress.all_completed_dates[0], day("2024-05-09"));
        assert_eq!(progress.all_completed_dates.len(), 4);
    }

    #[test]
    fn window_is_configurable() {
        let engine = engine_on("2024-05-10").with_window(3);
        let habits = vec![habit(1, "2024-05-01")];
        let stats = engine.dashboard_stats(&habits, &[], &[]);
        assert_eq!(stats.weekly_progress.len(), 3);
        assert_eq!(stats.weekly_progress[0].day, day("2024-05-08"));
    }

    #[test]
    fn recomputation_is_identical() {
        let engine = engine_on("2024-05-10");
        let habits = vec![habit(1, "2024-05-01"), habit(2, "2024-05-03")];
        let events = vec![done(1, "2024-05-10"), done(2, "2024-05-09"), done(1, "2024-05-08")];
        assert_eq!(
            engine.dashboard_stats(&habits, &events, &events),
            engine.dashboard_stats(&habits, &events, &events)
        );
        assert_eq!(
            engine.habit_progress(&habits[0], &events),
            engine.habit_progress(&habits[0], &events)
        );
    }

    #[test]
    fn today_overview_flags_each_habit() {
        let engine = engine_on("2024-05-10");
        let habits = vec![habit(1, "2024-05-01"), habit(2, "2024-05-01")];
        let events = vec![done(2, "2024-05-10"), done(1, "2024-05-09")];
        let overview = engine.today_overview(&habits, &events);
        assert!(!overview[0].completed_today);
        assert!(overview[1].completed_today);
    }

    #[test]
    fn serializes_dashboard_in_camel_case() {
        let engine = engine_on("2024-05-10").with_window(1);
        let habits = vec![habit(1, "2024-05-01")];
        let events = vec![done(1, "2024-05-10")];
        let json = serde_json::to_value(engine.dashboard_stats(&habits, &events, &events)).unwrap();
        assert_eq!(json["completionPercentageToday"], 100);
        assert_eq!(json["weeklyProgress"][0]["day"], "2024-05-10");
        assert_eq!(json["weeklyProgress"][0]["completed"], 1);
        assert_eq!(json["weeklyProgress"][0]["total"], 1);
    }

    #[test]
    fn serializes_habit_progress_in_camel_case() {
        let engine = engine_on("2024-05-10").with_window(2);
        let h = habit(1, "2024-05-01");
        let events = vec![done(1, "2024-05-10"), done(1, "2024-05-03")];
        let json = serde_json::to_value(engine.habit_progress(&h, &events)).unwrap();

        let mut keys: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            [
                "allCompletedDates",
                "completionRate",
                "currentStreak",
                "daysSinceCreation",
                "totalCompletions",
                "weeklyProgress"
            ]
        );
        assert_eq!(json["totalCompletions"], 2);
        assert_eq!(json["currentStreak"], 1);
        assert_eq!(json["daysSinceCreation"], 10);
        assert_eq!(json["completionRate"], 20);
        assert_eq!(json["weeklyProgress"][0]["day"], "2024-05-09");
        assert_eq!(json["weeklyProgress"][0]["completed"], false);
        assert_eq!(json["weeklyProgress"][1]["completed"], true);
        assert_eq!(json["allCompletedDates"], serde_json::json!(["2024-05-10", "2024-05-03"]));
    }
}
