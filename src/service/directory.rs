//! College, student, and event lifecycle: creation with referential
//! checks, listing, and the one-way event cancellation.

use crate::error::AppError;
use crate::models::{College, Event, NewCollege, NewEvent, NewStudent, Registration, Student};
use chrono::Utc;
use sqlx::SqlitePool;

pub struct DirectoryService;

impl DirectoryService {
    pub async fn create_college(pool: &SqlitePool, new: &NewCollege) -> Result<College, AppError> {
        let college = sqlx::query_as::<_, College>(
            "INSERT INTO colleges (name, location, created_at) VALUES (?, ?, ?) \
             RETURNING id, name, location, created_at",
        )
        .bind(&new.name)
        .bind(&new.location)
        .bind(Utc::now())
        .fetch_one(pool)
        .await
        .map_err(|e| AppError::from_insert(e, "college name already exists"))?;
        tracing::info!(college_id = college.id, "college created");
        Ok(college)
    }

    pub async fn list_colleges(pool: &SqlitePool) -> Result<Vec<College>, AppError> {
        let rows = sqlx::query_as::<_, College>("SELECT * FROM colleges ORDER BY id")
            .fetch_all(pool)
            .await?;
        Ok(rows)
    }

    /// College must exist, then the email must be unused anywhere. Check
    /// order determines the reported error.
    pub async fn create_student(pool: &SqlitePool, new: &NewStudent) -> Result<Student, AppError> {
        let mut tx = pool.begin().await?;
        if !Self::college_exists(&mut tx, new.college_id).await? {
            return Err(AppError::NotFound("college not found".into()));
        }
        let email_taken: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM students WHERE email = ?)")
                .bind(&new.email)
                .fetch_one(&mut *tx)
                .await?;
        if email_taken {
            return Err(AppError::Conflict("email already registered".into()));
        }
        let student = sqlx::query_as::<_, Student>(
            "INSERT INTO students (name, email, college_id, created_at) VALUES (?, ?, ?, ?) \
             RETURNING id, name, email, college_id, created_at",
        )
        .bind(&new.name)
        .bind(&new.email)
        .bind(new.college_id)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::from_insert(e, "email already registered"))?;
        tx.commit().await?;
        tracing::info!(student_id = student.id, "student created");
        Ok(student)
    }

    pub async fn list_students(pool: &SqlitePool) -> Result<Vec<Student>, AppError> {
        let rows = sqlx::query_as::<_, Student>("SELECT * FROM students ORDER BY id")
            .fetch_all(pool)
            .await?;
        Ok(rows)
    }

    pub async fn get_student(pool: &SqlitePool, id: i64) -> Result<Student, AppError> {
        sqlx::query_as::<_, Student>("SELECT * FROM students WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| AppError::NotFound("student not found".into()))
    }

    /// College must exist, then the start time must strictly precede the
    /// end time.
    pub async fn create_event(pool: &SqlitePool, new: &NewEvent) -> Result<Event, AppError> {
        let mut tx = pool.begin().await?;
        if !Self::college_exists(&mut tx, new.college_id).await? {
            return Err(AppError::NotFound("college not found".into()));
        }
        if new.start_time >= new.end_time {
            return Err(AppError::InvalidInput(
                "start time must be before end time".into(),
            ));
        }
        let event = sqlx::query_as::<_, Event>(
            "INSERT INTO events \
             (title, description, college_id, start_time, end_time, location, max_capacity, is_cancelled, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, 0, ?) \
             RETURNING *",
        )
        .bind(&new.title)
        .bind(&new.description)
        .bind(new.college_id)
        .bind(new.start_time)
        .bind(new.end_time)
        .bind(&new.location)
        .bind(new.max_capacity)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;
        tracing::info!(event_id = event.id, "event created");
        Ok(event)
    }

    pub async fn list_events(pool: &SqlitePool) -> Result<Vec<Event>, AppError> {
        let rows = sqlx::query_as::<_, Event>("SELECT * FROM events ORDER BY id")
            .fetch_all(pool)
            .await?;
        Ok(rows)
    }

    pub async fn get_event(pool: &SqlitePool, id: i64) -> Result<Event, AppError> {
        sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| AppError::NotFound("event not found".into()))
    }

    /// Set the cancelled flag. Idempotent: cancelling an already-cancelled
    /// event succeeds and leaves the flag set. There is no un-cancel.
    pub async fn cancel_event(pool: &SqlitePool, id: i64) -> Result<Event, AppError> {
        let event = Self::get_event(pool, id).await?;
        sqlx::query("UPDATE events SET is_cancelled = 1 WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;
        tracing::info!(event_id = id, "event cancelled");
        Ok(Event {
            is_cancelled: true,
            ..event
        })
    }

    pub async fn student_registrations(
        pool: &SqlitePool,
        student_id: i64,
    ) -> Result<Vec<Registration>, AppError> {
        let rows = sqlx::query_as::<_, Registration>(
            "SELECT * FROM registrations WHERE student_id = ? ORDER BY id",
        )
        .bind(student_id)
        .fetch_all(pool)
        .await?;
        Ok(rows)
    }

    async fn college_exists(
        tx: &mut sqlx::SqliteConnection,
        id: i64,
    ) -> Result<bool, AppError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM colleges WHERE id = ?)")
            .bind(id)
            .fetch_one(tx)
            .await?;
        Ok(exists)
    }
}
