//! Pool construction and idempotent schema DDL, applied at startup.

use crate::error::AppError;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;

/// Table DDL, ordered so foreign-key targets exist first. The UNIQUE
/// constraints on email and on (student_id, event_id) are the backstop for
/// the check-then-insert chains: a racing duplicate insert fails at the
/// store level and is mapped to a conflict.
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS colleges (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        location TEXT NOT NULL,
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS students (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        email TEXT NOT NULL UNIQUE,
        college_id INTEGER NOT NULL REFERENCES colleges(id),
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS events (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        description TEXT NOT NULL,
        college_id INTEGER NOT NULL REFERENCES colleges(id),
        start_time TEXT NOT NULL,
        end_time TEXT NOT NULL,
        location TEXT NOT NULL,
        max_capacity INTEGER NOT NULL,
        is_cancelled INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS registrations (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        student_id INTEGER NOT NULL REFERENCES students(id),
        event_id INTEGER NOT NULL REFERENCES events(id),
        registered_at TEXT NOT NULL,
        UNIQUE (student_id, event_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS attendance (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        student_id INTEGER NOT NULL REFERENCES students(id),
        event_id INTEGER NOT NULL REFERENCES events(id),
        checked_in_at TEXT NOT NULL,
        UNIQUE (student_id, event_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS feedback (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        student_id INTEGER NOT NULL REFERENCES students(id),
        event_id INTEGER NOT NULL REFERENCES events(id),
        rating INTEGER NOT NULL,
        comment TEXT,
        submitted_at TEXT NOT NULL,
        UNIQUE (student_id, event_id)
    )
    "#,
];

/// Connect to the SQLite database at `database_url` (e.g.
/// `sqlite://campus_events.db`), creating the file if missing.
pub async fn connect_pool(database_url: &str) -> Result<SqlitePool, AppError> {
    let options = SqliteConnectOptions::from_str(database_url)
        .map_err(AppError::Db)?
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5))
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;
    Ok(pool)
}

/// Create all tables if they do not exist.
pub async fn apply_schema(pool: &SqlitePool) -> Result<(), AppError> {
    for ddl in SCHEMA {
        sqlx::query(ddl).execute(pool).await?;
    }
    tracing::info!(tables = SCHEMA.len(), "schema ensured");
    Ok(())
}
