//! Pipeline configuration.
//!
//! Builder-style structs with safe defaults; the CLI maps its flags onto
//! them and calls `validate()` before running a pipeline.

use crate::error::ToolkitError;

/// Rule width used for every banner and separator line
pub const RULE_WIDTH: usize = 50;

/// Default number of rows previewed per table
pub const DEFAULT_PREVIEW_ROWS: usize = 5;

/// Upper bound for `preview_rows`, keeps reports readable
pub const MAX_PREVIEW_ROWS: usize = 1000;

/// Configuration for the database content summarizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryConfig {
    /// Rows fetched per table; enforced while fetching, never via SQL LIMIT
    pub preview_rows: usize,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            preview_rows: DEFAULT_PREVIEW_ROWS,
        }
    }
}

impl SummaryConfig {
    /// Creates a new summary config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the number of previewed rows.
    pub fn with_preview_rows(mut self, rows: usize) -> Self {
        self.preview_rows = rows;
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    /// Returns error if `preview_rows` is zero or above [`MAX_PREVIEW_ROWS`]
    pub fn validate(&self) -> crate::Result<()> {
        if self.preview_rows == 0 {
            return Err(ToolkitError::configuration(
                "preview_rows must be greater than 0",
            ));
        }
        if self.preview_rows > MAX_PREVIEW_ROWS {
            return Err(ToolkitError::configuration(format!(
                "preview_rows should not exceed {}",
                MAX_PREVIEW_ROWS
            )));
        }
        Ok(())
    }
}

/// Connector characters used by the tree renderer.
///
/// The style belongs to the renderer passed to the aggregator, not to
/// [`AggregateConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreeStyle {
    /// `|-- `, `` `-- ``, `|   `
    #[default]
    Ascii,
    /// `├── `, `└── `, `│   `
    Unicode,
}

/// Configuration for the package structure & source aggregator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateConfig {
    /// Directories, relative to the package root, scanned one level deep
    pub source_dirs: Vec<String>,
    /// File extensions (without dot) matched case-insensitively
    pub extensions: Vec<String>,
}

impl Default for AggregateConfig {
    fn default() -> Self {
        Self {
            source_dirs: vec!["R".to_string(), "tests/testthat".to_string()],
            extensions: vec!["r".to_string()],
        }
    }
}

impl AggregateConfig {
    /// Creates a new aggregate config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks whether a file name carries one of the configured extensions.
    pub fn matches_extension(&self, file_name: &str) -> bool {
        match file_name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => self
                .extensions
                .iter()
                .any(|wanted| wanted.eq_ignore_ascii_case(ext)),
            _ => false,
        }
    }

    /// Validates the configuration.
    ///
    /// # Errors
    /// Returns error if no directories or extensions are configured, or if a
    /// source directory escapes the package root
    pub fn validate(&self) -> crate::Result<()> {
        if self.source_dirs.is_empty() {
            return Err(ToolkitError::configuration(
                "at least one source directory is required",
            ));
        }
        if self.extensions.is_empty() {
            return Err(ToolkitError::configuration(
                "at least one source extension is required",
            ));
        }
        for dir in &self.source_dirs {
            let path = std::path::Path::new(dir);
            if path.is_absolute()
                || path
                    .components()
                    .any(|c| matches!(c, std::path::Component::ParentDir))
            {
                return Err(ToolkitError::configuration(format!(
                    "source directory '{}' must stay inside the package root",
                    dir
                )));
            }
        }
        Ok(())
    }
}
