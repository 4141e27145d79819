//! College, student, and event handlers.

use crate::error::AppError;
use crate::models::{NewCollege, NewEvent, NewStudent};
use crate::response::{success_many, success_one, success_one_ok};
use crate::service::DirectoryService;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    Json,
};

pub async fn create_college(
    State(state): State<AppState>,
    Json(body): Json<NewCollege>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let college = DirectoryService::create_college(&state.pool, &body).await?;
    Ok(success_one(college))
}

pub async fn list_colleges(
    State(state): State<AppState>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let colleges = DirectoryService::list_colleges(&state.pool).await?;
    Ok(success_many(colleges))
}

pub async fn create_student(
    State(state): State<AppState>,
    Json(body): Json<NewStudent>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let student = DirectoryService::create_student(&state.pool, &body).await?;
    Ok(success_one(student))
}

pub async fn list_students(
    State(state): State<AppState>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let students = DirectoryService::list_students(&state.pool).await?;
    Ok(success_many(students))
}

pub async fn get_student(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let student = DirectoryService::get_student(&state.pool, id).await?;
    Ok(success_one_ok(student))
}

pub async fn create_event(
    State(state): State<AppState>,
    Json(body): Json<NewEvent>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let event = DirectoryService::create_event(&state.pool, &body).await?;
    Ok(success_one(event))
}

pub async fn list_events(
    State(state): State<AppState>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let events = DirectoryService::list_events(&state.pool).await?;
    Ok(success_many(events))
}

pub async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let event = DirectoryService::get_event(&state.pool, id).await?;
    Ok(success_one_ok(event))
}

pub async fn cancel_event(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let event = DirectoryService::cancel_event(&state.pool, id).await?;
    Ok(success_one_ok(event))
}
