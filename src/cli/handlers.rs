use anyhow::{Context, Result};
use rusqlite::Connection;
use serde::Serialize;

use crate::config::AppConfig;
use crate::db::repository::{HabitRepo, LogRepo};
use crate::engine::{Clock, StatsEngine};
use crate::error::{validate_description, validate_title, TrackError};
use crate::models::{DashboardStats, Day, Habit, HabitProgress};
use crate::utils::format::{fit_width, format_days, progress_bar};

// ─── ANSI helpers ────────────────────────────────────────────────────────────

const GREEN: &str = "\x1b[32m";
const AMBER: &str = "\x1b[33m";
const DIM: &str = "\x1b[2m";
const BOLD: &str = "\x1b[1m";
const GOLD: &str = "\x1b[38;2;196;160;68m";
const RESET: &str = "\x1b[0m";

/// Wraps text in a color unless colors are turned off.
struct Painter {
    color: bool,
}

impl Painter {
    fn new(config: &AppConfig) -> Self {
        Self {
            color: config.display.color,
        }
    }

    fn paint(&self, color: &str, text: impl std::fmt::Display) -> String {
        if self.color {
            format!("{}{}{}", color, text, RESET)
        } else {
            text.to_string()
        }
    }

    fn line(&self, color: &str, text: impl std::fmt::Display) {
        println!("{}", self.paint(color, text));
    }
}

const TITLE_COLUMN: usize = 28;

/// Everything a handler needs besides its arguments.
pub struct Ctx<'a, C: Clock> {
    pub conn: &'a Connection,
    pub config: &'a AppConfig,
    pub engine: StatsEngine<C>,
}

impl<'a, C: Clock> Ctx<'a, C> {
    pub fn new(conn: &'a Connection, config: &'a AppConfig, clock: C) -> Self {
        Self {
            conn,
            config,
            engine: StatsEngine::new(clock).with_window(config.stats.window_days),
        }
    }

    fn painter(&self) -> Painter {
        Painter::new(self.config)
    }
}

// ─── JSON envelopes ──────────────────────────────────────────────────────────

#[derive(Serialize)]
struct StatsResponse<'a> {
    success: bool,
    stats: &'a DashboardStats,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HabitSummary<'a> {
    id: i64,
    title: &'a str,
    description: &'a str,
    created_at: String,
}

#[derive(Serialize)]
struct ProgressResponse<'a> {
    success: bool,
    habit: HabitSummary<'a>,
    progress: &'a HabitProgress,
}

impl<'a> ProgressResponse<'a> {
    fn new(habit: &'a Habit, progress: &'a HabitProgress) -> Self {
        Self {
            success: true,
            habit: HabitSummary {
                id: habit.id,
                title: &habit.title,
                description: &habit.description,
                created_at: habit.created_at.to_rfc3339(),
            },
            progress,
        }
    }
}

// ─── Lookup ──────────────────────────────────────────────────────────────────

/// Resolve an active habit by numeric id, falling back to its title.
pub fn resolve_habit(conn: &Connection, key: &str) -> Result<Habit> {
    if let Ok(id) = key.trim().parse::<i64>() {
        if let Some(habit) = HabitRepo::get_active(conn, id)? {
            return Ok(habit);
        }
    }
    HabitRepo::find_active_by_title(conn, key)?
        .ok_or_else(|| TrackError::HabitNotFound(key.to_string()).into())
}

/// Like [`resolve_habit`], but a numeric id also reaches removed habits.
pub fn resolve_any_habit(conn: &Connection, key: &str) -> Result<Habit> {
    if let Ok(id) = key.trim().parse::<i64>() {
        if let Some(habit) = HabitRepo::get_any(conn, id)? {
            return Ok(habit);
        }
    }
    resolve_habit(conn, key)
}

// ─── CRUD ────────────────────────────────────────────────────────────────────

pub fn handle_add<C: Clock>(ctx: &Ctx<'_, C>, title: &str, description: &str) -> Result<()> {
    let title = validate_title(title)?;
    let description = validate_description(description)?;
    let id = HabitRepo::create(ctx.conn, &title, &description, ctx.engine.now())?;
    ctx.painter().line(GREEN, format!("  ✓ Added habit #{}: {}", id, title));
    Ok(())
}

pub fn handle_list<C: Clock>(ctx: &Ctx<'_, C>) -> Result<()> {
    let p = ctx.painter();
    let habits = HabitRepo::list_active(ctx.conn)?;
    println!();
    if habits.is_empty() {
        p.line(DIM, "  No habits yet. Add one with `habitual add <title>`");
        println!();
        return Ok(());
    }

    let today = ctx.engine.today();
    let todays = LogRepo::for_active_in_range(ctx.conn, today, today)?;
    let overview = ctx.engine.today_overview(&habits, &todays);

    p.line(GOLD, format!("  Habits — {}", today));
    println!();
    for (habit, status) in habits.iter().zip(&overview) {
        let mark = if status.completed_today {
            p.paint(GREEN, "✓ done")
        } else {
            p.paint(DIM, "○ pending")
        };
        println!("  {:>4}  {}  {}", habit.id, fit_width(&habit.title, TITLE_COLUMN), mark);
    }
    println!();
    Ok(())
}

pub fn handle_show<C: Clock>(ctx: &Ctx<'_, C>, key: &str) -> Result<()> {
    let p = ctx.painter();
    let habit = resolve_habit(ctx.conn, key)?;
    let done_today = LogRepo::find(ctx.conn, habit.id, ctx.engine.today())?.is_some();

    println!();
    p.line(GOLD, format!("  #{} {}", habit.id, habit.title));
    if !habit.description.is_empty() {
        p.line(DIM, format!("  {}", habit.description));
    }
    println!();
    println!("  Created:     {}", Day::of(habit.created_at));
    if done_today {
        p.line(GREEN, "  Today:       ✓ done");
    } else {
        println!("  Today:       ○ pending");
    }
    println!();
    Ok(())
}

pub fn handle_edit<C: Clock>(
    ctx: &Ctx<'_, C>,
    key: &str,
    title: Option<&str>,
    description: Option<&str>,
) -> Result<()> {
    let habit = resolve_habit(ctx.conn, key)?;
    let title = validate_title(title.unwrap_or(&habit.title))?;
    let description = validate_description(description.unwrap_or(&habit.description))?;

    if !HabitRepo::update(ctx.conn, habit.id, &title, &description, ctx.engine.now())? {
        return Err(TrackError::HabitNotFound(key.to_string()).into());
    }
    ctx.painter().line(GREEN, format!("  ✓ Updated habit #{}: {}", habit.id, title));
    Ok(())
}

pub fn handle_remove<C: Clock>(ctx: &Ctx<'_, C>, key: &str) -> Result<()> {
    let habit = resolve_habit(ctx.conn, key)?;
    if !HabitRepo::deactivate(ctx.conn, habit.id, ctx.engine.now())? {
        return Err(TrackError::HabitNotFound(key.to_string()).into());
    }
    log::info!("deactivated habit {}", habit.id);
    ctx.painter().line(AMBER, format!("  Removed habit #{}: {}", habit.id, habit.title));
    Ok(())
}

// ─── Tracking ────────────────────────────────────────────────────────────────

/// Record a completion and return the day it was recorded for.
pub fn complete_habit<C: Clock>(ctx: &Ctx<'_, C>, habit: &Habit, date: Option<&str>) -> Result<Day> {
    let today = ctx.engine.today();
    let day = match date {
        Some(s) => s.trim().parse::<Day>()?,
        None => today,
    };
    if day > today {
        return Err(TrackError::FutureDay { day, today }.into());
    }

    if !LogRepo::insert(ctx.conn, habit.id, day, ctx.engine.now())? {
        return Err(TrackError::AlreadyCompleted {
            id: habit.id,
            title: habit.title.clone(),
            day,
        }
        .into());
    }
    log::debug!("habit {} completed for {}", habit.id, day);
    Ok(day)
}

pub fn handle_done<C: Clock>(ctx: &Ctx<'_, C>, key: &str, date: Option<&str>) -> Result<()> {
    let p = ctx.painter();
    let habit = resolve_habit(ctx.conn, key)?;
    let day = complete_habit(ctx, &habit, date)?;

    let events = LogRepo::for_habit(ctx.conn, habit.id)?;
    let progress = ctx.engine.habit_progress(&habit, &events);

    p.line(GREEN, format!("  ✓ {} marked as done for {}", habit.title, day));
    if progress.current_streak > 0 {
        p.line(AMBER, format!("  Streak: {}", format_days(progress.current_streak)));
    }
    Ok(())
}

pub fn handle_logs<C: Clock>(ctx: &Ctx<'_, C>, key: &str) -> Result<()> {
    let p = ctx.painter();
    let habit = resolve_any_habit(ctx.conn, key)?;
    let logs = LogRepo::for_habit(ctx.conn, habit.id)?;

    println!();
    p.line(GOLD, format!("  {} — {} completions", habit.title, logs.len()));
    println!();
    for entry in &logs {
        let at = entry
            .logged_at
            .map(|t| t.format("%Y-%m-%d %H:%M UTC").to_string())
            .unwrap_or_default();
        println!("  {}  {}", entry.day, p.paint(DIM, format!("logged {}", at)));
    }
    println!();
    Ok(())
}

// ─── Progress ────────────────────────────────────────────────────────────────

pub fn handle_progress<C: Clock>(ctx: &Ctx<'_, C>, key: &str, json: bool) -> Result<()> {
    let habit = resolve_any_habit(ctx.conn, key)?;
    let events = LogRepo::for_habit(ctx.conn, habit.id)?;
    let progress = ctx.engine.habit_progress(&habit, &events);

    if json {
        let response = ProgressResponse::new(&habit, &progress);
        println!(
            "{}",
            serde_json::to_string_pretty(&response).context("Serializing progress")?
        );
        return Ok(());
    }

    let p = ctx.painter();
    println!();
    p.line(GOLD, format!("  {}", habit.title));
    println!();
    p.line(
        BOLD,
        format!(
            "  Streak:       {} current  |  rate {}%",
            format_days(progress.current_streak),
            progress.completion_rate
        ),
    );
    println!(
        "  Completions:  {} over {}",
        progress.total_completions,
        format_days(progress.days_since_creation)
    );
    println!();
    print!("  ");
    for flag in &progress.weekly_progress {
        if flag.completed {
            print!("{} ", p.paint(GREEN, "●"));
        } else {
            print!("{} ", p.paint(DIM, "○"));
        }
    }
    println!();
    println!();
    Ok(())
}

fn load_dashboard<C: Clock>(ctx: &Ctx<'_, C>) -> Result<DashboardStats> {
    let habits = HabitRepo::list_active(ctx.conn)?;
    let window = ctx.engine.window();
    let (start, end) = match (window.first(), window.last()) {
        (Some(s), Some(e)) => (*s, *e),
        _ => {
            let today = ctx.engine.today();
            (today, today)
        }
    };
    let recent = LogRepo::for_active_in_range(ctx.conn, start, end)?;
    let all = LogRepo::for_active_all(ctx.conn)?;
    log::debug!(
        "dashboard over {} habits, {} recent / {} total completions",
        habits.len(),
        recent.len(),
        all.len()
    );
    Ok(ctx.engine.dashboard_stats(&habits, &recent, &all))
}

pub fn handle_stats<C: Clock>(ctx: &Ctx<'_, C>, week: bool, json: bool) -> Result<()> {
    let stats = load_dashboard(ctx)?;

    if json {
        let response = StatsResponse {
            success: true,
            stats: &stats,
        };
        println!(
            "{}",
            serde_json::to_string_pretty(&response).context("Serializing stats")?
        );
        return Ok(());
    }

    let p = ctx.painter();
    println!();
    p.line(GOLD, "  Statistics");
    println!();
    p.line(
        BOLD,
        format!(
            "  Today:       {}/{} habits  ({}%)",
            stats.completed_today, stats.total_habits, stats.completion_percentage_today
        ),
    );
    p.line(
        BOLD,
        format!(
            "  Streak:      {} current  |  {} best",
            format_days(stats.current_streak),
            format_days(stats.longest_streak)
        ),
    );
    println!("  Completions: {} all time", stats.total_completions);

    if week && !stats.weekly_progress.is_empty() {
        println!();
        p.line(DIM, format!("  Last {} days", stats.weekly_progress.len()));
        println!();
        for bucket in &stats.weekly_progress {
            let bar = progress_bar(bucket.completed, bucket.total, ctx.config.display.bar_width);
            let color = if bucket.total > 0 && bucket.completed >= bucket.total {
                GREEN
            } else if bucket.completed > 0 {
                AMBER
            } else {
                DIM
            };
            println!(
                "  {}  {}  {}/{}",
                bucket.day,
                p.paint(color, bar),
                bucket.completed,
                bucket.total
            );
        }
    }

    println!();
    Ok(())
}

// ─── Export ──────────────────────────────────────────────────────────────────

pub fn handle_export<C: Clock>(ctx: &Ctx<'_, C>) -> Result<()> {
    let stats = load_dashboard(ctx)?;
    let habits = HabitRepo::list_active(ctx.conn)?;
    let width = ctx.config.display.bar_width;

    println!("# habitual — Weekly Summary");
    println!("# {}", ctx.engine.today());
    println!();
    println!("## Daily Completion (last {} days)", stats.weekly_progress.len());
    for bucket in &stats.weekly_progress {
        println!(
            "  {}  {}/{}  {}",
            bucket.day,
            bucket.completed,
            bucket.total,
            progress_bar(bucket.completed, bucket.total, width)
        );
    }
    println!();
    println!("## Habits");
    for habit in &habits {
        let events = LogRepo::for_habit(ctx.conn, habit.id)?;
        let progress = ctx.engine.habit_progress(habit, &events);
        let week: String = progress
            .weekly_progress
            .iter()
            .map(|f| if f.completed { '█' } else { '░' })
            .collect();
        println!(
            "  {}  {}  streak {:>3}  rate {:>3}%",
            fit_width(&habit.title, TITLE_COLUMN),
            week,
            progress.current_streak,
            progress.completion_rate
        );
    }
    println!();
    println!("## Summary");
    println!("  Habits:      {}", stats.total_habits);
    println!("  Today:       {}%", stats.completion_percentage_today);
    println!(
        "  Streak:      {} (best: {})",
        format_days(stats.current_streak),
        format_days(stats.longest_streak)
    );
    println!("  Completions: {}", stats.total_completions);
    Ok(())
}

// ─── Config ──────────────────────────────────────────────────────────────────

pub fn handle_config(config: &AppConfig, init: bool) -> Result<()> {
    let path = AppConfig::config_path()?;
    let p = Painter::new(config);
    if init {
        if path.exists() {
            p.line(AMBER, format!("  Config already exists at {:?}", path));
        } else {
            config.save_to(&path)?;
            p.line(GREEN, format!("  ✓ Wrote default config to {:?}", path));
        }
    } else {
        p.line(GOLD, format!("  {:?}", path));
    }
    println!();
    println!("  Database:    {:?}", config.db_path()?);
    println!();
    print!(
        "{}",
        toml::to_string_pretty(config).context("Serializing config")?
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use crate::engine::FixedClock;
    use chrono::Utc;

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    fn today() -> Day {
        Day::of(Utc::now())
    }

    #[test]
    fn resolves_by_id_then_title() {
        let conn = setup();
        let id = HabitRepo::create(&conn, "Stretch", "", Utc::now()).unwrap();
        assert_eq!(resolve_habit(&conn, &id.to_string()).unwrap().id, id);
        assert_eq!(resolve_habit(&conn, "STRETCH").unwrap().id, id);
        let err = resolve_habit(&conn, "nope").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TrackError>(),
            Some(TrackError::HabitNotFound(_))
        ));
    }

    #[test]
    fn numeric_title_still_resolves() {
        let conn = setup();
        let id = HabitRepo::create(&conn, "10000", "steps", Utc::now()).unwrap();
        assert_eq!(resolve_habit(&conn, "10000").unwrap().id, id);
    }

    #[test]
    fn second_completion_same_day_is_rejected() {
        let conn = setup();
        let config = AppConfig::default();
        let ctx = Ctx::new(&conn, &config, FixedClock::at_day(today()));
        let id = HabitRepo::create(&conn, "Read", "", Utc::now()).unwrap();
        let habit = HabitRepo::get_active(&conn, id).unwrap().unwrap();

        assert_eq!(complete_habit(&ctx, &habit, None).unwrap(), today());
        let err = complete_habit(&ctx, &habit, None).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TrackError>(),
            Some(TrackError::AlreadyCompleted { .. })
        ));
    }

    #[test]
    fn backfill_validates_the_day() {
        let conn = setup();
        let config = AppConfig::default();
        let anchor: Day = "2024-05-10".parse().unwrap();
        let ctx = Ctx::new(&conn, &config, FixedClock::at_day(anchor));
        let id = HabitRepo::create(&conn, "Read", "", Utc::now()).unwrap();
        let habit = HabitRepo::get_active(&conn, id).unwrap().unwrap();

        assert_eq!(
            complete_habit(&ctx, &habit, Some("2024-05-08")).unwrap().to_string(),
            "2024-05-08"
        );
        let future = complete_habit(&ctx, &habit, Some("2024-05-11")).unwrap_err();
        assert!(matches!(
            future.downcast_ref::<TrackError>(),
            Some(TrackError::FutureDay { .. })
        ));
        let malformed = complete_habit(&ctx, &habit, Some("2024-5-8")).unwrap_err();
        assert!(matches!(
            malformed.downcast_ref::<TrackError>(),
            Some(TrackError::InvalidDay(_))
        ));
    }

    #[test]
    fn dashboard_reads_store_through_the_engine() {
        let conn = setup();
        let config = AppConfig::default();
        let anchor: Day = "2024-05-10".parse().unwrap();
        let ctx = Ctx::new(&conn, &config, FixedClock::at_day(anchor));
        let a = HabitRepo::create(&conn, "Read", "", Utc::now()).unwrap();
        HabitRepo::create(&conn, "Run", "", Utc::now()).unwrap();
        for d in ["2024-04-01", "2024-05-09", "2024-05-10"] {
            LogRepo::insert(&conn, a, d.parse().unwrap(), Utc::now()).unwrap();
        }

        let stats = load_dashboard(&ctx).unwrap();
        assert_eq!(stats.total_habits, 2);
        assert_eq!(stats.completed_today, 1);
        assert_eq!(stats.completion_percentage_today, 50);
        assert_eq!(stats.current_streak, 2);
        assert_eq!(stats.total_completions, 3);
        assert_eq!(stats.weekly_progress.len(), 7);
        assert_eq!(stats.weekly_progress[6].day, anchor);
    }

    #[test]
    fn removed_habit_keeps_readable_history() {
        let conn = setup();
        let config = AppConfig::default();
        let ctx = Ctx::new(&conn, &config, FixedClock::at_day("2024-05-10".parse().unwrap()));
        handle_add(&ctx, "Floss", "").unwrap();
        let habit = resolve_habit(&conn, "Floss").unwrap();
        complete_habit(&ctx, &habit, Some("2024-05-09")).unwrap();
        handle_remove(&ctx, "Floss").unwrap();

        let key = habit.id.to_string();
        assert!(resolve_habit(&conn, &key).is_err());
        assert!(handle_done(&ctx, &key, None).is_err());

        let removed = resolve_any_habit(&conn, &key).unwrap();
        assert!(!removed.is_active);
        handle_logs(&ctx, &key).unwrap();
        handle_progress(&ctx, &key, true).unwrap();
        let events = LogRepo::for_habit(&conn, removed.id).unwrap();
        let progress = ctx.engine.habit_progress(&removed, &events);
        assert_eq!(progress.total_completions, 1);
        assert_eq!(progress.all_completed_dates[0].to_string(), "2024-05-09");
    }

    #[test]
    fn writes_are_stamped_from_the_engine_clock() {
        let conn = setup();
        let config = AppConfig::default();
        let clock = FixedClock::at_day("2024-05-10".parse().unwrap());
        let ctx = Ctx::new(&conn, &config, clock);
        handle_add(&ctx, "Walk", "").unwrap();
        let habit = resolve_habit(&conn, "Walk").unwrap();
        assert_eq!(habit.created_at, clock.0);

        complete_habit(&ctx, &habit, None).unwrap();
        let logged = LogRepo::find(&conn, habit.id, ctx.engine.today()).unwrap().unwrap();
        assert_eq!(logged.logged_at, Some(clock.0));

        let events = LogRepo::for_habit(&conn, habit.id).unwrap();
        assert_eq!(ctx.engine.habit_progress(&habit, &events).days_since_creation, 1);
    }

    #[test]
    fn progress_response_wraps_habit_and_progress() {
        let conn = setup();
        let config = AppConfig::default();
        let ctx = Ctx::new(&conn, &config, FixedClock::at_day("2024-05-10".parse().unwrap()));
        handle_add(&ctx, "Journal", "evenings").unwrap();
        let habit = resolve_habit(&conn, "Journal").unwrap();
        complete_habit(&ctx, &habit, None).unwrap();

        let events = LogRepo::for_habit(&conn, habit.id).unwrap();
        let progress = ctx.engine.habit_progress(&habit, &events);
        let json = serde_json::to_value(ProgressResponse::new(&habit, &progress)).unwrap();

        assert_eq!(json["success"], true);
        assert_eq!(json["habit"]["id"], habit.id);
        assert_eq!(json["habit"]["title"], "Journal");
        assert_eq!(json["habit"]["description"], "evenings");
        assert_eq!(json["habit"]["createdAt"], "2024-05-10T12:00:00+00:00");
        assert_eq!(json["progress"]["totalCompletions"], 1);
        assert_eq!(json["progress"]["completionRate"], 100);
        assert_eq!(json["progress"]["weeklyProgress"][6]["completed"], true);
        assert_eq!(json["progress"]["allCompletedDates"][0], "2024-05-10");
    }
}
