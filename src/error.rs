//! Typed errors and HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("{0}")]
    PolicyViolation(String),
    #[error("query rejected: {0}")]
    QueryRejected(String),
    #[error("execution error: {0}")]
    ExecutionError(String),
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
}

impl AppError {
    /// Map an insert failure: a store-level unique violation becomes
    /// Conflict (the transactional backstop for racing duplicates),
    /// anything else stays a database error.
    pub fn from_insert(e: sqlx::Error, conflict_msg: &str) -> Self {
        if let sqlx::Error::Database(db) = &e {
            if db.is_unique_violation() {
                return AppError::Conflict(conflict_msg.into());
            }
        }
        AppError::Db(e)
    }
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            AppError::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
            AppError::InvalidInput(_) => (StatusCode::UNPROCESSABLE_ENTITY, "invalid_input"),
            AppError::PolicyViolation(_) => (StatusCode::BAD_REQUEST, "policy_violation"),
            AppError::QueryRejected(_) => (StatusCode::BAD_REQUEST, "query_rejected"),
            AppError::ExecutionError(_) => (StatusCode::BAD_REQUEST, "execution_error"),
            AppError::Db(e) => {
                if let sqlx::Error::RowNotFound = e {
                    (StatusCode::NOT_FOUND, "not_found")
                } else {
                    (StatusCode::INTERNAL_SERVER_ERROR, "database_error")
                }
            }
        };
        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
            },
        };
        (status, Json(body)).into_response()
    }
}
