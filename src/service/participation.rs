//! Registration, attendance check-in, and feedback submission.
//!
//! Each operation runs an ordered, short-circuiting rule chain inside one
//! transaction; the first failing check determines the reported error.
//! Existence checks come before state checks, so a request naming a missing
//! student against a cancelled event reports "student not found".

use crate::error::AppError;
use crate::models::{Attendance, Event, Feedback, FeedbackRequest, ParticipationRequest, Registration};
use chrono::{DateTime, Duration, Utc};
use sqlx::{SqliteConnection, SqlitePool};

/// Sign-up is permitted strictly before the event starts.
pub fn registration_open(event_start: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now < event_start
}

/// Check-in is permitted within a 30-minute grace band around the event's
/// nominal interval, tolerating early arrivals and late check-ins.
pub fn within_active_window(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    now: DateTime<Utc>,
) -> bool {
    let grace = Duration::minutes(30);
    now >= start - grace && now <= end + grace
}

pub struct ParticipationService;

impl ParticipationService {
    /// Register a student for an event. Chain: student exists, event
    /// exists, event not cancelled, registration window open, no duplicate
    /// registration, capacity not reached.
    pub async fn register(
        pool: &SqlitePool,
        req: &ParticipationRequest,
        now: DateTime<Utc>,
    ) -> Result<Registration, AppError> {
        let mut tx = pool.begin().await?;
        let event = Self::lookup_pair(&mut tx, req.student_id, req.event_id).await?;
        if event.is_cancelled {
            return Err(AppError::PolicyViolation(
                "cannot register for a cancelled event".into(),
            ));
        }
        if !registration_open(event.start_time, now) {
            return Err(AppError::PolicyViolation(
                "registration closed: event has started".into(),
            ));
        }
        if Self::pair_exists(&mut tx, "registrations", req.student_id, req.event_id).await? {
            return Err(AppError::Conflict("already registered for this event".into()));
        }
        let registered: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM registrations WHERE event_id = ?")
                .bind(req.event_id)
                .fetch_one(&mut *tx)
                .await?;
        if registered >= event.max_capacity {
            return Err(AppError::PolicyViolation("event is at full capacity".into()));
        }
        let registration = sqlx::query_as::<_, Registration>(
            "INSERT INTO registrations (student_id, event_id, registered_at) VALUES (?, ?, ?) \
             RETURNING id, student_id, event_id, registered_at",
        )
        .bind(req.student_id)
        .bind(req.event_id)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::from_insert(e, "already registered for this event"))?;
        tx.commit().await?;
        tracing::info!(
            student_id = req.student_id,
            event_id = req.event_id,
            "registration created"
        );
        Ok(registration)
    }

    /// Check a student in. Chain: student exists, event exists, event not
    /// cancelled, registration exists, no duplicate attendance, current
    /// time within the active window.
    pub async fn check_in(
        pool: &SqlitePool,
        req: &ParticipationRequest,
        now: DateTime<Utc>,
    ) -> Result<Attendance, AppError> {
        let mut tx = pool.begin().await?;
        let event = Self::lookup_pair(&mut tx, req.student_id, req.event_id).await?;
        if event.is_cancelled {
            return Err(AppError::PolicyViolation(
                "cannot check in for a cancelled event".into(),
            ));
        }
        if !Self::pair_exists(&mut tx, "registrations", req.student_id, req.event_id).await? {
            return Err(AppError::PolicyViolation(
                "student not registered for this event".into(),
            ));
        }
        if Self::pair_exists(&mut tx, "attendance", req.student_id, req.event_id).await? {
            return Err(AppError::Conflict("already checked in for this event".into()));
        }
        if !within_active_window(event.start_time, event.end_time, now) {
            return Err(AppError::PolicyViolation(
                "cannot check in: event is not active".into(),
            ));
        }
        let attendance = sqlx::query_as::<_, Attendance>(
            "INSERT INTO attendance (student_id, event_id, checked_in_at) VALUES (?, ?, ?) \
             RETURNING id, student_id, event_id, checked_in_at",
        )
        .bind(req.student_id)
        .bind(req.event_id)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::from_insert(e, "already checked in for this event"))?;
        tx.commit().await?;
        tracing::info!(
            student_id = req.student_id,
            event_id = req.event_id,
            "attendance recorded"
        );
        Ok(attendance)
    }

    /// Submit feedback. Chain: student exists, event exists, event not
    /// cancelled, rating in 1..=5, attendance exists, no duplicate
    /// feedback.
    pub async fn submit_feedback(
        pool: &SqlitePool,
        req: &FeedbackRequest,
        now: DateTime<Utc>,
    ) -> Result<Feedback, AppError> {
        let mut tx = pool.begin().await?;
        let event = Self::lookup_pair(&mut tx, req.student_id, req.event_id).await?;
        if event.is_cancelled {
            return Err(AppError::PolicyViolation(
                "cannot submit feedback for a cancelled event".into(),
            ));
        }
        if !(1..=5).contains(&req.rating) {
            return Err(AppError::InvalidInput(
                "rating must be between 1 and 5".into(),
            ));
        }
        if !Self::pair_exists(&mut tx, "attendance", req.student_id, req.event_id).await? {
            return Err(AppError::PolicyViolation(
                "must attend event before submitting feedback".into(),
            ));
        }
        if Self::pair_exists(&mut tx, "feedback", req.student_id, req.event_id).await? {
            return Err(AppError::Conflict(
                "already submitted feedback for this event".into(),
            ));
        }
        let feedback = sqlx::query_as::<_, Feedback>(
            "INSERT INTO feedback (student_id, event_id, rating, comment, submitted_at) \
             VALUES (?, ?, ?, ?, ?) \
             RETURNING id, student_id, event_id, rating, comment, submitted_at",
        )
        .bind(req.student_id)
        .bind(req.event_id)
        .bind(req.rating)
        .bind(req.comment.as_deref())
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::from_insert(e, "already submitted feedback for this event"))?;
        tx.commit().await?;
        tracing::info!(
            student_id = req.student_id,
            event_id = req.event_id,
            rating = req.rating,
            "feedback submitted"
        );
        Ok(feedback)
    }

    /// Existence checks shared by every chain: the student first, then the
    /// event (returned for its times, capacity, and cancelled flag).
    async fn lookup_pair(
        tx: &mut SqliteConnection,
        student_id: i64,
        event_id: i64,
    ) -> Result<Event, AppError> {
        let student_exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM students WHERE id = ?)")
                .bind(student_id)
                .fetch_one(&mut *tx)
                .await?;
        if !student_exists {
            return Err(AppError::NotFound("student not found".into()));
        }
        sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = ?")
            .bind(event_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound("event not found".into()))
    }

    async fn pair_exists(
        tx: &mut SqliteConnection,
        table: &str,
        student_id: i64,
        event_id: i64,
    ) -> Result<bool, AppError> {
        // table is one of three fixed names, never caller input
        let sql = format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE student_id = ? AND event_id = ?)",
            table
        );
        let exists: bool = sqlx::query_scalar(&sql)
            .bind(student_id)
            .bind(event_id)
            .fetch_one(tx)
            .await?;
        Ok(exists)
    }
}
