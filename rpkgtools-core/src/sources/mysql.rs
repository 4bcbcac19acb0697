//! MySQL / MariaDB data source.

use super::TabularSource;
use super::helpers::{blob_cell, cell_or_unsupported, float_cell, quote_backtick};
use crate::Result;
use crate::error::{ToolkitError, redact_database_url};
use crate::models::{DatabaseType, RowSet, TableDescriptor};
use async_trait::async_trait;
use futures::TryStreamExt;
use serde_json::Value as JsonValue;
use sqlx::mysql::{MySqlPool, MySqlPoolOptions, MySqlRow};
use sqlx::types::BigDecimal;
use sqlx::{Column, Executor, Row, Statement, TypeInfo};
use std::time::Duration;

const LIST_TABLES_QUERY: &str = r#"
    SELECT CAST(table_name AS CHAR) AS table_name
    FROM information_schema.tables
    WHERE table_schema = DATABASE()
    ORDER BY table_name
"#;

/// MySQL-backed [`TabularSource`].
pub struct MySqlSource {
    pub pool: MySqlPool,
}

impl std::fmt::Debug for MySqlSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MySqlSource").finish_non_exhaustive()
    }
}

impl MySqlSource {
    /// Connects to a MySQL server.
    ///
    /// # Errors
    /// Returns a sanitized connection error on failure
    pub async fn connect(connection_string: &str) -> Result<Self> {
        tracing::debug!(
            "Connecting to MySQL at {}",
            redact_database_url(connection_string)
        );

        let pool = MySqlPoolOptions::new()
            .max_connections(2)
            .acquire_timeout(Duration::from_secs(30))
            .connect(connection_string)
            .await
            .map_err(ToolkitError::connection_failed)?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl TabularSource for MySqlSource {
    async fn list_tables(&self) -> Result<Vec<TableDescriptor>> {
        let names: Vec<String> = sqlx::query_scalar(LIST_TABLES_QUERY)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| ToolkitError::query_failed("Failed to list tables", e))?;

        tracing::debug!("Enumerated {} MySQL tables", names.len());
        Ok(names.into_iter().map(TableDescriptor::new).collect())
    }

    fn quote_identifier(&self, identifier: &str) -> String {
        quote_backtick(identifier)
    }

    async fn fetch_rows(&self, query: &str, limit: usize) -> Result<RowSet> {
        let mut rows: Vec<MySqlRow> = Vec::new();
        {
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
        DatabaseType::MySQL
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

fn row_cells(row: &MySqlRow) -> Vec<JsonValue> {
    (0..row.columns().len())
        .map(|index| extract_column_value(row, index))
        .collect()
}

/// Extract a column value as a JSON value, trying types in order of likelihood.
fn extract_column_value(row: &MySqlRow, index: usize) -> JsonValue {
    let decoded = decode::<String>(row, index, JsonValue::String)
        .or_else(|| decode::<i64>(row, index, |n| JsonValue::Number(n.into())))
        .or_else(|| decode::<u64>(row, index, |n| JsonValue::Number(n.into())))
        .or_else(|| decode::<f64>(row, index, float_cell))
        .or_else(|| decode::<f32>(row, index, |n| float_cell(f64::from(n))))
        .or_else(|| decode::<BigDecimal>(row, index, |d| JsonValue::String(d.to_string())))
        .or_else(|| {
            decode::<chrono::NaiveDateTime>(row, index, |d| JsonValue::String(d.to_string()))
        })
        .or_else(|| decode::<chrono::NaiveDate>(row, index, |d| JsonValue::String(d.to_string())))
        .or_else(|| decode::<chrono::NaiveTime>(row, index, |t| JsonValue::String(t.to_string())))
        .or_else(|| decode::<JsonValue>(row, index, |v| JsonValue::String(v.to_string())))
        .or_else(|| decode::<Vec<u8>>(row, index, |bytes| blob_cell(&bytes)));

    cell_or_unsupported(decoded, row.column(index).type_info().name())
}

fn decode<'r, T>(row: &'r MySqlRow, index: usize, f: impl FnOnce(T) -> JsonValue) -> Option<JsonValue>
where
    T: sqlx::Decode<'r, sqlx::MySql> + sqlx::Type<sqlx::MySql>,
{
    row.try_get::<Option<T>, _>(index)
        .ok()
        .map(|v| v.map_or(JsonValue::Null, f))
}
