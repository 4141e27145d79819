//! Executes filtered queries and shapes results into a uniform table.

use crate::error::AppError;
use crate::sql::filter::check_query;
use serde::Serialize;
use serde_json::Value;
use sqlx::sqlite::SqliteRow;
use sqlx::{Column, Row, SqlitePool};
use std::time::Instant;

/// Column names, rows of cell values, row count, and elapsed wall-clock
/// seconds rounded to 4 decimal digits. Column identity is only known when
/// at least one row comes back; zero rows yield an empty column list.
#[derive(Debug, Serialize)]
pub struct QueryOutcome {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
    pub row_count: usize,
    pub execution_time: f64,
}

fn round4(v: f64) -> f64 {
    (v * 10_000.0).round() / 10_000.0
}

/// Filter, execute the original text, and shape the result. Execution
/// failures (malformed query, unknown table) come back as ExecutionError
/// carrying the store's message, never as an unhandled fault.
pub async fn run_query(pool: &SqlitePool, query: &str) -> Result<QueryOutcome, AppError> {
    check_query(query)?;
    let started = Instant::now();
    let fetched = sqlx::query(query)
        .fetch_all(pool)
        .await
        .map_err(|e| AppError::ExecutionError(e.to_string()))?;
    let execution_time = round4(started.elapsed().as_secs_f64());

    let columns: Vec<String> = fetched
        .first()
        .map(|row| row.columns().iter().map(|c| c.name().to_string()).collect())
        .unwrap_or_default();
    let rows: Vec<Vec<Value>> = fetched.iter().map(row_to_cells).collect();
    let row_count = rows.len();
    tracing::debug!(row_count, execution_time, "ad-hoc query executed");
    Ok(QueryOutcome {
        columns,
        rows,
        row_count,
        execution_time,
    })
}

pub(crate) fn row_to_cells(row: &SqliteRow) -> Vec<Value> {
    (0..row.columns().len()).map(|i| cell_to_value(row, i)).collect()
}

/// Decode a dynamically-typed SQLite cell by trying the storage classes in
/// turn. Integer before real so counts stay integral in JSON.
fn cell_to_value(row: &SqliteRow, index: usize) -> Value {
    if let Ok(Some(n)) = row.try_get::<Option<i64>, _>(index) {
        return Value::Number(n.into());
    }
    if let Ok(Some(f)) = row.try_get::<Option<f64>, _>(index) {
        if let Some(n) = serde_json::Number::from_f64(f) {
            return Value::Number(n);
        }
    }
    if let Ok(Some(s)) = row.try_get::<Option<String>, _>(index) {
        return Value::String(s);
    }
    if let Ok(Some(b)) = row.try_get::<Option<Vec<u8>>, _>(index) {
        return Value::String(String::from_utf8_lossy(&b).into_owned());
    }
    Value::Null
}

#[cfg(test)]
mod tests {
    use super::round4;

    #[test]
    fn rounds_to_four_decimals() {
        assert_eq!(round4(0.123_456), 0.1235);
        assert_eq!(round4(0.000_049), 0.0);
        assert_eq!(round4(1.0), 1.0);
    }
}
