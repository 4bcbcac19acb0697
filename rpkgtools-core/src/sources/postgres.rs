//! PostgreSQL data source.
//!
//! Tables are enumerated from the schemas on the connection's search path,
//! so bare table names can be quoted and queried directly.

use super::TabularSource;
use super::helpers::{blob_cell, cell_or_unsupported, float_cell, quote_double};
use crate::Result;
use crate::error::{ToolkitError, redact_database_url};
use crate::models::{DatabaseType, RowSet, TableDescriptor};
use async_trait::async_trait;
use futures::TryStreamExt;
use serde_json::Value as JsonValue;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::types::{BigDecimal, Uuid};
use sqlx::{Column, Executor, Row, Statement, TypeInfo};
use std::time::Duration;

const LIST_TABLES_QUERY: &str = r#"
    SELECT table_name::text
    FROM information_schema.tables
    WHERE table_type IN ('BASE TABLE', 'VIEW')
    AND table_schema = ANY (current_schemas(false))
    ORDER BY table_name
"#;

/// PostgreSQL-backed [`TabularSource`].
pub struct PostgresSource {
    pub pool: PgPool,
}

impl std::fmt::Debug for PostgresSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Connection details are intentionally omitted
        f.debug_struct("PostgresSource").finish_non_exhaustive()
    }
}

impl PostgresSource {
    /// Connects to a PostgreSQL server.
    ///
    /// # Errors
    /// Returns a sanitized connection error if the server is unreachable or
    /// rejects the credentials
    pub async fn connect(connection_string: &str) -> Result<Self> {
        tracing::debug!(
            "Connecting to PostgreSQL at {}",
            redact_database_url(connection_string)
        );

        let pool = PgPoolOptions::new()
            .max_connections(2)
            .acquire_timeout(Duration::from_secs(30))
            .connect(connection_string)
            .await
            .map_err(ToolkitError::connection_failed)?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl TabularSource for PostgresSource {
    async fn list_tables(&self) -> Result<Vec<TableDescriptor>> {
        let names: Vec<String> = sqlx::query_scalar(LIST_TABLES_QUERY)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| ToolkitError::query_failed("Failed to list tables", e))?;

        tracing::debug!("Enumerated {} PostgreSQL tables", names.len());
        Ok(names.into_iter().map(TableDescriptor::new).collect())
    }

    fn quote_identifier(&self, identifier: &str) -> String {
        quote_double(identifier)
    }

    async fn fetch_rows(&self, query: &str, limit: usize) -> Result<RowSet> {
        let mut rows: Vec<PgRow> = Vec::new();
        {
            // Dropping the stream closes the portal before the next table
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
        DatabaseType::PostgreSQL
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

fn row_cells(row: &PgRow) -> Vec<JsonValue> {
    row.columns()
        .iter()
        .map(|column| extract_column_value(row, column.ordinal(), column.type_info().name()))
        .collect()
}

/// Decodes a cell by its PostgreSQL type name.
fn extract_column_value(row: &PgRow, index: usize, type_name: &str) -> JsonValue {
    fn cell<'r, T>(row: &'r PgRow, index: usize, f: impl FnOnce(T) -> JsonValue) -> Option<JsonValue>
    where
        T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
    {
        row.try_get::<Option<T>, _>(index)
            .ok()
            .map(|v| v.map_or(JsonValue::Null, f))
    }

    let value = match type_name {
        "BOOL" => cell::<bool>(row, index, JsonValue::Bool),
        "INT2" => cell::<i16>(row, index, |n| JsonValue::Number(n.into())),
        "INT4" => cell::<i32>(row, index, |n| JsonValue::Number(n.into())),
        "INT8" => cell::<i64>(row, index, |n| JsonValue::Number(n.into())),
        "FLOAT4" => cell::<f32>(row, index, |n| float_cell(f64::from(n))),
        "FLOAT8" => cell::<f64>(row, index, float_cell),
        "DATE" => cell::<chrono::NaiveDate>(row, index, |d| JsonValue::String(d.to_string())),
        "TIMESTAMP" => cell::<chrono::NaiveDateTime>(row, index, |d| {
            JsonValue::String(d.to_string())
        }),
        "TIMESTAMPTZ" => cell::<chrono::DateTime<chrono::Utc>>(row, index, |d| {
            JsonValue::String(d.to_rfc3339())
        }),
        "TIME" => cell::<chrono::NaiveTime>(row, index, |t| JsonValue::String(t.to_string())),
        "NUMERIC" => cell::<BigDecimal>(row, index, |d| JsonValue::String(d.to_string())),
        "UUID" => cell::<Uuid>(row, index, |u| JsonValue::String(u.to_string())),
        "JSON" | "JSONB" => cell::<JsonValue>(row, index, |v| JsonValue::String(v.to_string())),
        "BYTEA" => cell::<Vec<u8>>(row, index, |bytes| blob_cell(&bytes)),
        _ => cell::<String>(row, index, JsonValue::String),
    };

    cell_or_unsupported(value, type_name)
}
