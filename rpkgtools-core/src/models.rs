//! Invocation-scoped data model shared by the three pipelines.
//!
//! Nothing here outlives a single run; the only persisted state is the
//! output files and the project files the release pipeline mutates.

use serde_json::Value as JsonValue;

/// Supported database engines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatabaseType {
    PostgreSQL,
    MySQL,
    SQLite,
}

impl std::fmt::Display for DatabaseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatabaseType::PostgreSQL => write!(f, "PostgreSQL"),
            DatabaseType::MySQL => write!(f, "MySQL"),
            DatabaseType::SQLite => write!(f, "SQLite"),
        }
    }
}

/// A table (or view) enumerated from a data source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDescriptor {
    pub name: String,
}

impl TableDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A bounded set of records fetched from one query.
///
/// Cells are JSON values so every engine can share the renderer; SQL NULL
/// maps to [`JsonValue::Null`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<JsonValue>>,
}

impl RowSet {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Number of records held
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// What a table preview ended up holding.
#[derive(Debug, Clone, PartialEq)]
pub enum PreviewContent {
    /// Up to the configured number of rows
    Rows(RowSet),
    /// The captured failure message; the run carried on without this table
    Error(String),
}

/// Preview of a single table.
#[derive(Debug, Clone, PartialEq)]
pub struct RowPreview {
    pub table_name: String,
    pub content: PreviewContent,
}

impl RowPreview {
    pub fn is_error(&self) -> bool {
        matches!(self.content, PreviewContent::Error(_))
    }
}

/// One discovered source file and its text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFileEntry {
    /// Path relative to the package root, always `/` separated
    pub relative_path: String,
    pub lines: Vec<String>,
}

/// A release entry to be prepended to `NEWS.md`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangelogEntry {
    pub package_name: String,
    pub version: String,
    pub date: String,
    /// Operator-supplied change descriptions, one bullet each
    pub fixtures: Vec<String>,
}

impl ChangelogEntry {
    /// Renders the entry: heading, one `* ` bullet per fixture, blank line.
    pub fn to_lines(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(self.fixtures.len() + 2);
        lines.push(format!(
            "# {} {} -- {}",
            self.package_name, self.version, self.date
        ));
        lines.extend(self.fixtures.iter().map(|fixture| format!("* {}", fixture)));
        lines.push(String::new());
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_changelog_entry_lines() {
        let entry = ChangelogEntry {
            package_name: "mypkg".to_string(),
            version: "1.0.1".to_string(),
            date: "2026-10-18".to_string(),
            fixtures: vec!["Fixed `foo()` crash".to_string(), "Added bar".to_string()],
        };

        assert_eq!(
            entry.to_lines(),
            vec![
                "# mypkg 1.0.1 -- 2026-10-18",
                "* Fixed `foo()` crash",
                "* Added bar",
                "",
            ]
        );
    }

    #[test]
    fn test_changelog_entry_without_fixtures() {
        let entry = ChangelogEntry {
            package_name: "mypkg".to_string(),
            version: "0.2.0".to_string(),
            date: "2026-01-02".to_string(),
            fixtures: Vec::new(),
        };
        assert_eq!(entry.to_lines(), vec!["# mypkg 0.2.0 -- 2026-01-02", ""]);
    }

    #[test]
    fn test_database_type_display() {
        assert_eq!(DatabaseType::SQLite.to_string(), "SQLite");
        assert_eq!(DatabaseType::PostgreSQL.to_string(), "PostgreSQL");
        assert_eq!(DatabaseType::MySQL.to_string(), "MySQL");
    }

    #[test]
    fn test_preview_error_flag() {
        let preview = RowPreview {
            table_name: "broken".to_string(),
            content: PreviewContent::Error("no such table".to_string()),
        };
        assert!(preview.is_error());
    }
}
