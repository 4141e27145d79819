//! Read-only aggregation: per-event and per-student statistics.
//!
//! Percentage and average values are rounded to 2 decimal digits. A zero
//! registration count yields a 0 percentage, and an event or student with
//! no feedback yields an absent average, never 0 and never NaN.

use crate::error::AppError;
use crate::models::{Event, EventReport, StudentReport};
use crate::service::DirectoryService;
use sqlx::SqlitePool;

pub(crate) fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

pub struct ReportService;

impl ReportService {
    pub async fn event_report(pool: &SqlitePool, event_id: i64) -> Result<EventReport, AppError> {
        let event = DirectoryService::get_event(pool, event_id).await?;
        Self::report_for(pool, &event).await
    }

    pub async fn student_report(
        pool: &SqlitePool,
        student_id: i64,
    ) -> Result<StudentReport, AppError> {
        let student = DirectoryService::get_student(pool, student_id).await?;
        let college_name: String = sqlx::query_scalar("SELECT name FROM colleges WHERE id = ?")
            .bind(student.college_id)
            .fetch_one(pool)
            .await?;
        let total_events_attended: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM attendance WHERE student_id = ?")
                .bind(student_id)
                .fetch_one(pool)
                .await?;
        let average_feedback_given: Option<f64> =
            sqlx::query_scalar("SELECT AVG(rating) FROM feedback WHERE student_id = ?")
                .bind(student_id)
                .fetch_one(pool)
                .await?;
        Ok(StudentReport {
            student_id: student.id,
            student_name: student.name,
            college_name,
            total_events_attended,
            average_feedback_given: average_feedback_given.map(round2),
        })
    }

    /// The event report for every event of a college, in ascending event id
    /// order (stable for a fixed store state).
    pub async fn college_events_report(
        pool: &SqlitePool,
        college_id: i64,
    ) -> Result<Vec<EventReport>, AppError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM colleges WHERE id = ?)")
            .bind(college_id)
            .fetch_one(pool)
            .await?;
        if !exists {
            return Err(AppError::NotFound("college not found".into()));
        }
        let events =
            sqlx::query_as::<_, Event>("SELECT * FROM events WHERE college_id = ? ORDER BY id")
                .bind(college_id)
                .fetch_all(pool)
                .await?;
        let mut reports = Vec::with_capacity(events.len());
        for event in &events {
            reports.push(Self::report_for(pool, event).await?);
        }
        Ok(reports)
    }

    async fn report_for(pool: &SqlitePool, event: &Event) -> Result<EventReport, AppError> {
        let total_registrations: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM registrations WHERE event_id = ?")
                .bind(event.id)
                .fetch_one(pool)
                .await?;
        let total_attendance: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM attendance WHERE event_id = ?")
                .bind(event.id)
                .fetch_one(pool)
                .await?;
        let total_feedback_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM feedback WHERE event_id = ?")
                .bind(event.id)
                .fetch_one(pool)
                .await?;
        // AVG over zero rows is NULL, which decodes to None.
        let average_feedback: Option<f64> =
            sqlx::query_scalar("SELECT AVG(rating) FROM feedback WHERE event_id = ?")
                .bind(event.id)
                .fetch_one(pool)
                .await?;
        let attendance_percentage = if total_registrations > 0 {
            round2(total_attendance as f64 / total_registrations as f64 * 100.0)
        } else {
            0.0
        };
        Ok(EventReport {
            event_id: event.id,
            event_title: event.title.clone(),
            total_registrations,
            total_attendance,
            attendance_percentage,
            average_feedback: average_feedback.map(round2),
            total_feedback_count,
        })
    }
}
