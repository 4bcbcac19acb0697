//! Tabular data source collaborator and its database-backed implementations.
//!
//! The summarizer only needs four capabilities from a store: enumerate
//! tables, quote an identifier, run a query while fetching a bounded number
//! of rows, and release the query afterwards. [`TabularSource`] captures
//! exactly that, so any relational database (or an adapter over one)
//! qualifies.
//!
//! # Module Structure
//! - `helpers`: cell decoding and identifier quoting shared by the engines
//! - Engine modules (`sqlite`, `postgres`, `mysql`), each feature-gated

use crate::Result;
use crate::models::{DatabaseType, RowSet, TableDescriptor};
use async_trait::async_trait;

pub mod helpers;

#[cfg(feature = "mysql")]
pub mod mysql;
#[cfg(feature = "postgresql")]
pub mod postgres;
#[cfg(feature = "sqlite")]
pub mod sqlite;

/// Capability set the database summarizer depends on.
///
/// # Resource Handling
/// `fetch_rows` must release the query's result set before returning, on
/// success and on failure alike. The summarizer relies on this to move on to
/// the next table with no cursor left open.
///
/// # Object Safety
/// This trait is object-safe, allowing for dynamic dispatch through
/// `Box<dyn TabularSource>`.
#[async_trait]
pub trait TabularSource: Send + Sync {
    /// Lists every table visible through the connection, in a stable order.
    async fn list_tables(&self) -> Result<Vec<TableDescriptor>>;

    /// Quotes an identifier following the engine's rules.
    fn quote_identifier(&self, identifier: &str) -> String;

    /// Executes `query` and returns at most `limit` rows.
    ///
    /// The bound is enforced while reading the result stream; the query text
    /// is sent unchanged.
    async fn fetch_rows(&self, query: &str, limit: usize) -> Result<RowSet>;

    /// Returns the database type this source talks to
    fn database_type(&self) -> DatabaseType;

    /// Releases the underlying connection pool.
    async fn close(&self) {}
}

/// Opens a data source for a connection string.
///
/// # Arguments
/// * `connection_string` - Database connection URL or SQLite file path
///
/// # Errors
/// Returns error if:
/// - Connection string format is unrecognized
/// - The engine is not compiled in
/// - The connection cannot be established
///
/// # Example
/// ```rust,no_run
/// use rpkgtools_core::sources::open_source;
///
/// # async fn example() -> rpkgtools_core::Result<()> {
/// let source = open_source("sqlite://data/app.db").await?;
/// let tables = source.list_tables().await?;
/// println!("Found {} tables", tables.len());
/// # Ok(())
/// # }
/// ```
pub async fn open_source(connection_string: &str) -> Result<Box<dyn TabularSource>> {
    let database_type = detect_database_type(connection_string)?;

    match database_type {
        #[cfg(feature = "postgresql")]
        DatabaseType::PostgreSQL => {
            let source = postgres::PostgresSource::connect(connection_string).await?;
            Ok(Box::new(source))
        }
        #[cfg(not(feature = "postgresql"))]
        DatabaseType::PostgreSQL => Err(crate::error::ToolkitError::unsupported_feature(
            "PostgreSQL source",
            "Compile with --features postgresql to enable PostgreSQL support",
        )),
        #[cfg(feature = "mysql")]
        DatabaseType::MySQL => {
            let source = mysql::MySqlSource::connect(connection_string).await?;
            Ok(Box::new(source))
        }
        #[cfg(not(feature = "mysql"))]
        DatabaseType::MySQL => Err(crate::error::ToolkitError::unsupported_feature(
            "MySQL source",
            "Compile with --features mysql to enable MySQL support",
        )),
        #[cfg(feature = "sqlite")]
        DatabaseType::SQLite => {
            let source = sqlite::SqliteSource::connect(connection_string).await?;
            Ok(Box::new(source))
        }
        #[cfg(not(feature = "sqlite"))]
        DatabaseType::SQLite => Err(crate::error::ToolkitError::unsupported_feature(
            "SQLite source",
            "Compile with --features sqlite to enable SQLite support",
        )),
    }
}

/// Database engines compiled into this build.
pub fn compiled_engines() -> Vec<DatabaseType> {
    let mut engines = Vec::new();
    #[cfg(feature = "postgresql")]
    engines.push(DatabaseType::PostgreSQL);
    #[cfg(feature = "mysql")]
    engines.push(DatabaseType::MySQL);
    #[cfg(feature = "sqlite")]
    engines.push(DatabaseType::SQLite);
    engines
}

/// Detects database type from connection string
///
/// # Errors
/// Returns error if connection string format is unrecognized
pub fn detect_database_type(connection_string: &str) -> Result<DatabaseType> {
    if connection_string.starts_with("postgres://")
        || connection_string.starts_with("postgresql://")
    {
        Ok(DatabaseType::PostgreSQL)
    } else if connection_string.starts_with("mysql://")
        || connection_string.starts_with("mariadb://")
    {
        Ok(DatabaseType::MySQL)
    } else if connection_string.starts_with("sqlite:")
        || connection_string == ":memory:"
        || connection_string.ends_with(".db")
        || connection_string.ends_with(".sqlite")
        || connection_string.ends_with(".sqlite3")
    {
        Ok(DatabaseType::SQLite)
    } else {
        Err(crate::error::ToolkitError::configuration(
            "Unrecognized database connection string format",
        ))
    }
}
