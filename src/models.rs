//! Entity rows, request payloads, and report shapes.
//!
//! All timestamps are UTC; SQLite stores them as RFC 3339 text, which
//! sorts correctly and round-trips through sqlx's chrono support.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct College {
    pub id: i64,
    pub name: String,
    pub location: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Student {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub college_id: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Event {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub college_id: i64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub location: String,
    pub max_capacity: i64,
    pub is_cancelled: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Registration {
    pub id: i64,
    pub student_id: i64,
    pub event_id: i64,
    pub registered_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Attendance {
    pub id: i64,
    pub student_id: i64,
    pub event_id: i64,
    pub checked_in_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Feedback {
    pub id: i64,
    pub student_id: i64,
    pub event_id: i64,
    pub rating: i64,
    pub comment: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct NewCollege {
    pub name: String,
    pub location: String,
}

#[derive(Debug, Deserialize)]
pub struct NewStudent {
    pub name: String,
    pub email: String,
    pub college_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct NewEvent {
    pub title: String,
    pub description: String,
    pub college_id: i64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub location: String,
    pub max_capacity: i64,
}

/// Shared payload for register and check-in requests.
#[derive(Debug, Deserialize)]
pub struct ParticipationRequest {
    pub student_id: i64,
    pub event_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct FeedbackRequest {
    pub student_id: i64,
    pub event_id: i64,
    pub rating: i64,
    pub comment: Option<String>,
}

/// Per-event statistics. `average_feedback` is absent (not zero) when the
/// event has no feedback rows.
#[derive(Debug, Serialize)]
pub struct EventReport {
    pub event_id: i64,
    pub event_title: String,
    pub total_registrations: i64,
    pub total_attendance: i64,
    pub attendance_percentage: f64,
    pub average_feedback: Option<f64>,
    pub total_feedback_count: i64,
}

#[derive(Debug, Serialize)]
pub struct StudentReport {
    pub student_id: i64,
    pub student_name: String,
    pub college_name: String,
    pub total_events_attended: i64,
    pub average_feedback_given: Option<f64>,
}
