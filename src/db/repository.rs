use anyhow::{anyhow, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::models::{Completion, Day, Habit, HabitId};

fn format_instant(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn parse_instant(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| anyhow!("Bad timestamp '{}': {}", s, e))
}

// ─── Habit repo ──────────────────────────────────────────────────────────────

type HabitRow = (i64, String, String, i32, String);

fn habit_row(row: &Row<'_>) -> rusqlite::Result<HabitRow> {
    Ok((
        row.get::<_, i64>(0)?,
        row.get::<_, String>(1)?,
        row.get::<_, String>(2)?,
        row.get::<_, i32>(3)?,
        row.get::<_, String>(4)?,
    ))
}

fn into_habit((id, title, description, is_active, created_at): HabitRow) -> Result<Habit> {
    Ok(Habit {
        id,
        title,
        description,
        created_at: parse_instant(&created_at)?,
        is_active: is_active != 0,
    })
}

pub struct HabitRepo;

impl HabitRepo {
    pub fn create(
        conn: &Connection,
        title: &str,
        description: &str,
        created_at: DateTime<Utc>,
    ) -> Result<HabitId> {
        let ts = format_instant(created_at);
        conn.execute(
            "INSERT INTO habits (title, description, is_active, created_at, updated_at)
             VALUES (?1, ?2, 1, ?3, ?3)",
            params![title, description, ts],
        )?;
        let id = conn.last_insert_rowid();
        log::debug!("created habit {} '{}'", id, title);
        Ok(id)
    }

    /// Fetch a habit regardless of its active flag.
    pub fn get_any(conn: &Connection, id: HabitId) -> Result<Option<Habit>> {
        let row = conn
            .query_row(
                "SELECT id, title, description, is_active, created_at FROM habits WHERE id = ?1",
                params![id],
                habit_row,
            )
            .optional()?;
        row.map(into_habit).transpose()
    }

    pub fn get_active(conn: &Connection, id: HabitId) -> Result<Option<Habit>> {
        Ok(Self::get_any(conn, id)?.filter(|h| h.is_active))
    }

    /// Active habits, newest first.
    pub fn list_active(conn: &Connection) -> Result<Vec<Habit>> {
        let mut stmt = conn.prepare(
            "SELECT id, title, description, is_active, created_at
             FROM habits WHERE is_active = 1
             ORDER BY created_at DESC, id DESC",
        )?;
        let rows = stmt.query_map([], habit_row)?;

        let mut result = Vec::new();
        for r in rows {
            result.push(into_habit(r?)?);
        }
        Ok(result)
    }

    pub fn find_active_by_title(conn: &Connection, title: &str) -> Result<Option<Habit>> {
        let wanted = title.trim().to_lowercase();
        let habits = Self::list_active(conn)?;
        Ok(habits.into_iter().find(|h| h.title.to_lowercase() == wanted))
    }

    /// Returns false when no active habit has this id.
    pub fn update(
        conn: &Connection,
        id: HabitId,
        title: &str,
        description: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<bool> {
        let changed = conn.execute(
            "UPDATE habits SET title = ?1, description = ?2, updated_at = ?3
             WHERE id = ?4 AND is_active = 1",
            params![title, description, format_instant(updated_at), id],
        )?;
        Ok(changed > 0)
    }

    /// Soft delete: the habit disappears from listings, its log is kept.
    pub fn deactivate(conn: &Connection, id: HabitId, updated_at: DateTime<Utc>) -> Result<bool> {
        let changed = conn.execute(
            "UPDATE habits SET is_active = 0, updated_at = ?1 WHERE id = ?2 AND is_active = 1",
            params![format_instant(updated_at), id],
        )?;
        Ok(changed > 0)
    }
}

// ─── Log repo ────────────────────────────────────────────────────────────────

type LogRow = (i64, i64, String, String);

fn log_row(row: &Row<'_>) -> rusqlite::Result<LogRow> {
    Ok((
        row.get::<_, i64>(0)?,
        row.get::<_, i64>(1)?,
        row.get::<_, String>(2)?,
        row.get::<_, String>(3)?,
    ))
}

fn into_completion((id, habit_id, date, created_at): LogRow) -> Result<Completion> {
    Ok(Completion {
        id: Some(id),
        habit_id,
        day: date.parse::<Day>()?,
        logged_at: Some(parse_instant(&created_at)?),
    })
}

fn collect_completions(
    rows: impl Iterator<Item = rusqlite::Result<LogRow>>,
) -> Result<Vec<Completion>> {
    let mut result = Vec::new();
    for r in rows {
        result.push(into_completion(r?)?);
    }
    Ok(result)
}

pub struct LogRepo;

impl LogRepo {
    /// Record a completion. Returns false if the habit already has one that day.
    pub fn insert(
        conn: &Connection,
        habit_id: HabitId,
        day: Day,
        logged_at: DateTime<Utc>,
    ) -> Result<bool> {
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO habit_log (habit_id, completed_date, created_at)
             VALUES (?1, ?2, ?3)",
            params![habit_id, day.to_string(), format_instant(logged_at)],
        )?;
        Ok(inserted > 0)
    }

    pub fn find(conn: &Connection, habit_id: HabitId, day: Day) -> Result<Option<Completion>> {
        let row = conn
            .query_row(
                "SELECT id, habit_id, completed_date, created_at
                 FROM habit_log WHERE habit_id = ?1 AND completed_date = ?2",
                params![habit_id, day.to_string()],
                log_row,
            )
            .optional()?;
        row.map(into_completion).transpose()
    }

    /// All completions of one habit, most recent first.
    pub fn for_habit(conn: &Connection, habit_id: HabitId) -> Result<Vec<Completion>> {
        let mut stmt = conn.prepare(
            "SELECT id, habit_id, completed_date, created_at
             FROM habit_log WHERE habit_id = ?1
             ORDER BY completed_date DESC",
        )?;
        let rows = stmt.query_map(params![habit_id], log_row)?;
        collect_completions(rows)
    }

    /// Completions of active habits with `start <= day <= end`.
    pub fn for_active_in_range(conn: &Connection, start: Day, end: Day) -> Result<Vec<Completion>> {
        let mut stmt = conn.prepare(
            "SELECT l.id, l.habit_id, l.completed_date, l.created_at
             FROM habit_log l JOIN habits h ON h.id = l.habit_id
             WHERE h.is_active = 1 AND l.completed_date >= ?1 AND l.completed_date <= ?2
             ORDER BY l.completed_date, l.habit_id",
        )?;
        let rows = stmt.query_map(params![start.to_string(), end.to_string()], log_row)?;
        collect_completions(rows)
    }

    /// Full history of every active habit.
    pub fn for_active_all(conn: &Connection) -> Result<Vec<Completion>> {
        let mut stmt = conn.prepare(
            "SELECT l.id, l.habit_id, l.completed_date, l.created_at
             FROM habit_log l JOIN habits h ON h.id = l.habit_id
             WHERE h.is_active = 1
             ORDER BY l.completed_date, l.habit_id",
        )?;
        let rows = stmt.query_map([], log_row)?;
        collect_completions(rows)
    }
}
