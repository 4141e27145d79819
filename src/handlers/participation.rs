//! Registration, check-in, and feedback handlers. Each passes the current
//! time into the service so the window checks are evaluated once.

use crate::error::AppError;
use crate::models::{FeedbackRequest, ParticipationRequest};
use crate::response::{success_many, success_one};
use crate::service::{DirectoryService, ParticipationService};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;

pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<ParticipationRequest>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let registration = ParticipationService::register(&state.pool, &body, Utc::now()).await?;
    Ok(success_one(registration))
}

pub async fn student_registrations(
    State(state): State<AppState>,
    Path(student_id): Path<i64>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let registrations =
        DirectoryService::student_registrations(&state.pool, student_id).await?;
    Ok(success_many(registrations))
}

pub async fn check_in(
    State(state): State<AppState>,
    Json(body): Json<ParticipationRequest>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let attendance = ParticipationService::check_in(&state.pool, &body, Utc::now()).await?;
    Ok(success_one(attendance))
}

pub async fn submit_feedback(
    State(state): State<AppState>,
    Json(body): Json<FeedbackRequest>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let feedback = ParticipationService::submit_feedback(&state.pool, &body, Utc::now()).await?;
    Ok(success_one(feedback))
}
