//! Reporting handlers.

use crate::error::AppError;
use crate::response::{success_many, success_one_ok};
use crate::service::ReportService;
use crate::state::AppState;
use axum::extract::{Path, State};

pub async fn event_report(
    State(state): State<AppState>,
    Path(event_id): Path<i64>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let report = ReportService::event_report(&state.pool, event_id).await?;
    Ok(success_one_ok(report))
}

pub async fn student_report(
    State(state): State<AppState>,
    Path(student_id): Path<i64>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let report = ReportService::student_report(&state.pool, student_id).await?;
    Ok(success_one_ok(report))
}

pub async fn college_events_report(
    State(state): State<AppState>,
    Path(college_id): Path<i64>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let reports = ReportService::college_events_report(&state.pool, college_id).await?;
    Ok(success_many(reports))
}
