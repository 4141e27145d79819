//! Schema discovery for clients: user tables, their columns, and sample
//! rows.

use crate::error::AppError;
use crate::sql::executor::row_to_cells;
use serde::Serialize;
use serde_json::Value;
use sqlx::{Column, Row, SqlitePool};
use std::collections::BTreeMap;

#[derive(Debug, Serialize)]
pub struct ColumnInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub declared_type: String,
    pub not_null: bool,
    pub primary_key: bool,
}

#[derive(Debug, Serialize)]
pub struct TableSchema {
    pub columns: Vec<ColumnInfo>,
    pub column_count: usize,
}

#[derive(Debug, Serialize)]
pub struct SchemaInfo {
    pub tables: Vec<String>,
    pub schema: BTreeMap<String, TableSchema>,
}

#[derive(Debug, Serialize)]
pub struct SamplePage {
    pub table: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
    pub row_count: usize,
}

/// Every user table (internal `sqlite_%` tables excluded), sorted by name,
/// with column name, declared type, nullability, and primary-key
/// membership from `PRAGMA table_info`.
pub async fn schema(pool: &SqlitePool) -> Result<SchemaInfo, AppError> {
    let tables: Vec<String> = sqlx::query_scalar(
        "SELECT name FROM sqlite_master \
         WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
    )
    .fetch_all(pool)
    .await
    .map_err(|e| AppError::ExecutionError(e.to_string()))?;

    let mut schema = BTreeMap::new();
    for table in &tables {
        let rows = sqlx::query(&format!("PRAGMA table_info({})", table))
            .fetch_all(pool)
            .await
            .map_err(|e| AppError::ExecutionError(e.to_string()))?;
        let columns: Vec<ColumnInfo> = rows
            .iter()
            .map(|row| {
                Ok(ColumnInfo {
                    name: row.try_get("name")?,
                    declared_type: row.try_get("type")?,
                    not_null: row.try_get::<i64, _>("notnull")? != 0,
                    primary_key: row.try_get::<i64, _>("pk")? != 0,
                })
            })
            .collect::<Result<_, sqlx::Error>>()
            .map_err(AppError::Db)?;
        let column_count = columns.len();
        schema.insert(table.clone(), TableSchema { columns, column_count });
    }
    Ok(SchemaInfo { tables, schema })
}

/// The table name is interpolated into the query, so it is restricted to
/// alphanumerics, underscore, and hyphen first. A character check, not an
/// allowlist against the known schema.
fn valid_table_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Up to `limit` rows from a named table for preview purposes.
pub async fn sample_rows(
    pool: &SqlitePool,
    table: &str,
    limit: i64,
) -> Result<SamplePage, AppError> {
    if !valid_table_name(table) {
        return Err(AppError::InvalidInput("invalid table name".into()));
    }
    let fetched = sqlx::query(&format!("SELECT * FROM {} LIMIT {}", table, limit))
        .fetch_all(pool)
        .await
        .map_err(|e| AppError::ExecutionError(e.to_string()))?;
    let columns: Vec<String> = fetched
        .first()
        .map(|row| row.columns().iter().map(|c| c.name().to_string()).collect())
        .unwrap_or_default();
    let rows: Vec<Vec<Value>> = fetched.iter().map(row_to_cells).collect();
    let row_count = rows.len();
    Ok(SamplePage {
        table: table.to_string(),
        columns,
        rows,
        row_count,
    })
}

#[cfg(test)]
mod tests {
    use super::valid_table_name;

    #[test]
    fn accepts_plain_identifiers() {
        assert!(valid_table_name("events"));
        assert!(valid_table_name("audit_log-2024"));
    }

    #[test]
    fn rejects_injection_shapes() {
        assert!(!valid_table_name("events; drop"));
        assert!(!valid_table_name("events.rows"));
        assert!(!valid_table_name(""));
    }
}
