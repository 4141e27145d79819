//! Constrained query and introspection handlers.

use crate::error::AppError;
use crate::response::success_one_ok;
use crate::sql::{run_query, sample_rows, schema as schema_info};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub query: String,
}

#[derive(Debug, Deserialize)]
pub struct SampleParams {
    pub limit: Option<i64>,
}

pub async fn execute_query(
    State(state): State<AppState>,
    Json(body): Json<QueryRequest>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let outcome = run_query(&state.pool, &body.query).await?;
    Ok(success_one_ok(outcome))
}

pub async fn schema(
    State(state): State<AppState>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let info = schema_info(&state.pool).await?;
    Ok(success_one_ok(info))
}

pub async fn sample(
    State(state): State<AppState>,
    Path(table): Path<String>,
    Query(params): Query<SampleParams>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let limit = params.limit.unwrap_or(5).clamp(1, 100);
    let page = sample_rows(&state.pool, &table, limit).await?;
    Ok(success_one_ok(page))
}
