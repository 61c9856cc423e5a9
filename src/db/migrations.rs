use anyhow::Result;
use rusqlite::Connection;

pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch("
        PRAGMA foreign_keys = ON;

        CREATE TABLE IF NOT EXISTS habits (
            id           INTEGER PRIMARY KEY AUTOINCREMENT,
            title        TEXT NOT NULL CHECK(length(title) BETWEEN 1 AND 100),
            description  TEXT NOT NULL DEFAULT '' CHECK(length(description) <= 500),
            is_active    INTEGER NOT NULL DEFAULT 1,
            created_at   TEXT NOT NULL,
            updated_at   TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_habits_active ON habits(is_active);

        CREATE TABLE IF NOT EXISTS habit_log (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            habit_id        INTEGER NOT NULL REFERENCES habits(id),
            completed_date  TEXT NOT NULL
                            CHECK(completed_date GLOB '[0-9][0-9][0-9][0-9]-[0-9][0-9]-[0-9][0-9]'),
            created_at      TEXT NOT NULL,
            UNIQUE(habit_id, completed_date)
        );

        CREATE INDEX IF NOT EXISTS idx_habit_log_date ON habit_log(completed_date);
    ")?;
    log::debug!("migrations applied");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();
        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN ('habits', 'habit_log')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 2);
    }

    #[test]
    fn log_rejects_malformed_dates() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn.execute(
            "INSERT INTO habits (title, created_at, updated_at) VALUES ('Read', 'x', 'x')",
            [],
        )
        .unwrap();
        let bad = conn.execute(
            "INSERT INTO habit_log (habit_id, completed_date, created_at) VALUES (1, '2024-3-1', 'x')",
            [],
        );
        assert!(bad.is_err());
    }
}
