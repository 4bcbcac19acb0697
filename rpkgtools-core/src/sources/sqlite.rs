//! SQLite data source.
//!
//! # Connection Modes
//! - File-based: `sqlite:///path/to/database.db`, `sqlite://./relative.db`
//!   or a bare path ending in `.db`, `.sqlite` or `.sqlite3`
//! - In-memory: `sqlite::memory:` or `:memory:`
//!
//! File databases are opened read-only; the summarizer never writes.

use super::TabularSource;
use super::helpers::{blob_cell, cell_or_unsupported, float_cell, quote_double};
use crate::Result;
use crate::error::ToolkitError;
use crate::models::{DatabaseType, RowSet, TableDescriptor};
use async_trait::async_trait;
use futures::TryStreamExt;
use serde_json::Value as JsonValue;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Column, Executor, Row, SqlitePool, Statement, TypeInfo};
use std::str::FromStr;
use std::time::Duration;

/// Tables and views, minus SQLite's internal bookkeeping tables
const LIST_TABLES_QUERY: &str = "SELECT name FROM sqlite_master \
     WHERE type IN ('table', 'view') AND name NOT LIKE 'sqlite_%' \
     ORDER BY name";

/// SQLite-backed [`TabularSource`].
pub struct SqliteSource {
    /// Connection pool (single connection for SQLite)
    pub pool: SqlitePool,
}

impl std::fmt::Debug for SqliteSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteSource").finish_non_exhaustive()
    }
}

impl SqliteSource {
    /// Opens a SQLite database from a connection string or file path.
    ///
    /// # Errors
    /// Returns error if the connection string is malformed or the database
    /// cannot be opened
    pub async fn connect(connection_string: &str) -> Result<Self> {
        let normalized = normalize_connection_string(connection_string);
        let in_memory = normalized.contains(":memory:") || normalized.contains("mode=memory");

        let mut options = SqliteConnectOptions::from_str(&normalized).map_err(|e| {
            ToolkitError::configuration(format!("Invalid SQLite connection string: {}", e))
        })?;
        if !in_memory {
            options = options.read_only(true);
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .acquire_timeout(Duration::from_secs(30))
            .connect_with(options)
            .await
            .map_err(ToolkitError::connection_failed)?;

        Ok(Self::from_pool(pool))
    }

    /// Wraps an existing pool.
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TabularSource for SqliteSource {
    async fn list_tables(&self) -> Result<Vec<TableDescriptor>> {
        let names: Vec<String> = sqlx::query_scalar(LIST_TABLES_QUERY)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| ToolkitError::query_failed("Failed to list tables", e))?;

        tracing::debug!("Enumerated {} SQLite tables", names.len());
        Ok(names.into_iter().map(TableDescriptor::new).collect())
    }

    fn quote_identifier(&self, identifier: &str) -> String {
        quote_double(identifier)
    }

    async fn fetch_rows(&self, query: &str, limit: usize) -> Result<RowSet> {
        let mut rows: Vec<SqliteRow> = Vec::new();
        {
            // The stream owns the statement; dropping it resets the cursor
            let mut stream = sqlx::query(query).fetch(&self.pool);
            while rows.len() < limit {
                match stream.try_next().await.map_err(|e| {
                    ToolkitError::query_failed(format!("Failed to execute '{}'", query), e)
                })? {
                    Some(row) => rows.push(row),
                    None => break,
                }
            }
        }

        let columns = match rows.first() {
            Some(row) => row.columns().iter().map(|c| c.name().to_string()).collect(),
            None => match (&self.pool).prepare(query).await {
                Ok(statement) => statement
                    .columns()
                    .iter()
                    .map(|c| c.name().to_string())
                    .collect(),
                Err(_) => Vec::new(),
            },
        };

        let mut row_set = RowSet::new(columns);
        row_set.rows = rows.iter().map(row_cells).collect();
        Ok(row_set)
    }

    fn database_type(&self) -> DatabaseType {
        DatabaseType::SQLite
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

fn row_cells(row: &SqliteRow) -> Vec<JsonValue> {
    (0..row.columns().len())
        .map(|index| extract_column_value(row, index))
        .collect()
}

/// Extract a column value as a JSON value.
///
/// SQLite is dynamically typed, so candidate types are tried in order of
/// likelihood.
fn extract_column_value(row: &SqliteRow, index: usize) -> JsonValue {
    let decoded = decode::<String>(row, index, JsonValue::String)
        .or_else(|| decode::<i64>(row, index, |n| JsonValue::Number(n.into())))
        .or_else(|| decode::<f64>(row, index, float_cell))
        .or_else(|| decode::<bool>(row, index, JsonValue::Bool))
        .or_else(|| decode::<Vec<u8>>(row, index, |bytes| blob_cell(&bytes)));

    cell_or_unsupported(decoded, row.column(index).type_info().name())
}

fn decode<'r, T>(row: &'r SqliteRow, index: usize, f: impl FnOnce(T) -> JsonValue) -> Option<JsonValue>
where
    T: sqlx::Decode<'r, sqlx::Sqlite> + sqlx::Type<sqlx::Sqlite>,
{
    row.try_get::<Option<T>, _>(index)
        .ok()
        .map(|v| v.map_or(JsonValue::Null, f))
}

/// Normalizes connection string to SQLite URL format.
fn normalize_connection_string(connection_string: &str) -> String {
    if connection_string == ":memory:" {
        return "sqlite::memory:".to_string();
    }

    if connection_string.starts_with("sqlite:") {
        return connection_string.to_string();
    }

    format!("sqlite://{}", connection_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_connection_string() {
        assert_eq!(normalize_connection_string(":memory:"), "sqlite::memory:");
        assert_eq!(
            normalize_connection_string("sqlite:///path/db.sqlite"),
            "sqlite:///path/db.sqlite"
        );
        assert_eq!(
            normalize_connection_string("/path/to/db.sqlite"),
            "sqlite:///path/to/db.sqlite"
        );
    }

    #[tokio::test]
    async fn test_connect_in_memory() {
        let source = SqliteSource::connect(":memory:").await.unwrap();
        assert_eq!(source.database_type(), DatabaseType::SQLite);
        assert!(source.list_tables().await.unwrap().is_empty());
        source.close().await;
    }

    #[tokio::test]
    async fn test_declared_types_decode_to_values() {
        let source = SqliteSource::connect(":memory:").await.unwrap();
        sqlx::query(
            "CREATE TABLE typed (stamp DATETIME, amount NUMERIC, day DATE, flag BOOLEAN, \
             price DECIMAL(10,2), raw BLOB, \"nothing\" TEXT)",
        )
        .execute(&source.pool)
        .await
        .unwrap();
        sqlx::query(
            "INSERT INTO typed VALUES ('2026-10-18 09:30:00', 3.25, '2026-10-18', 1, 19.99, x'6869', NULL)",
        )
        .execute(&source.pool)
        .await
        .unwrap();

        let rows = source.fetch_rows("SELECT * FROM \"typed\"", 5).await.unwrap();
        let cells = &rows.rows[0];
        assert_eq!(cells.len(), 7);
        assert!(cells[..6].iter().all(|cell| !cell.is_null()), "{:?}", cells);
        assert_eq!(cells[0], JsonValue::String("2026-10-18 09:30:00".to_string()));
        assert_eq!(cells[5], JsonValue::String("base64:aGk=".to_string()));
        assert!(cells[6].is_null());
        source.close().await;
    }

    #[tokio::test]
    async fn test_connect_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.db");
        let result = SqliteSource::connect(&path.to_string_lossy()).await;
        assert!(matches!(result, Err(ToolkitError::Connection { .. })));
    }
}
