//! Database content summarizer.
//!
//! Enumerates every table of a [`TabularSource`], previews the first rows of
//! each and writes one plain-text report. A table whose query fails gets its
//! error message in place of the preview; the remaining tables are still
//! summarized.

use crate::Result;
use crate::config::SummaryConfig;
use crate::models::{PreviewContent, RowPreview, TableDescriptor};
use crate::output::write_lines;
use crate::render::{banner, render_rows, rule};
use crate::sources::TabularSource;
use crate::sources::helpers::select_all;
use std::path::{Path, PathBuf};

/// Title of the report's header banner
pub const SUMMARY_TITLE: &str = "DATABASE CONTENT SUMMARY";

/// Result of a summarizer run.
#[derive(Debug, Clone)]
pub struct SummaryReport {
    /// Where the report was written
    pub output: PathBuf,
    /// Per-table previews in enumeration order
    pub previews: Vec<RowPreview>,
}

impl SummaryReport {
    /// Number of tables summarized
    pub fn table_count(&self) -> usize {
        self.previews.len()
    }

    /// Names of the tables whose preview failed
    pub fn failed_tables(&self) -> Vec<&str> {
        self.previews
            .iter()
            .filter(|p| p.is_error())
            .map(|p| p.table_name.as_str())
            .collect()
    }
}

/// Summarizes every table of `source` into a text report at `output`.
///
/// # Errors
/// Returns error if the configuration is invalid, the table list cannot be
/// read, or the report cannot be written. Failures on individual tables are
/// recorded in the report instead.
pub async fn summarize_database(
    source: &dyn TabularSource,
    output: &Path,
    config: &SummaryConfig,
) -> Result<SummaryReport> {
    config.validate()?;

    let tables = source.list_tables().await?;
    tracing::info!(
        "Found {} tables in {} database",
        tables.len(),
        source.database_type()
    );

    let previews = collect_previews(source, &tables, config).await;
    let lines = render_summary(&tables, &previews);

    write_lines(output, &lines).await?;
    tracing::info!("✓ Database summary written to {}", output.display());

    Ok(SummaryReport {
        output: output.to_path_buf(),
        previews,
    })
}

/// Fetches a bounded preview of each table, one table at a time.
pub async fn collect_previews(
    source: &dyn TabularSource,
    tables: &[TableDescriptor],
    config: &SummaryConfig,
) -> Vec<RowPreview> {
    let mut previews = Vec::with_capacity(tables.len());

    for table in tables {
        let query = select_all(&source.quote_identifier(&table.name));
        let content = match source.fetch_rows(&query, config.preview_rows).await {
            Ok(rows) => {
                tracing::debug!("Previewed {} rows from '{}'", rows.len(), table.name);
                PreviewContent::Rows(rows)
            }
            Err(e) => {
                tracing::warn!("Could not preview table '{}': {}", table.name, e);
                PreviewContent::Error(e.chain_message())
            }
        };

        previews.push(RowPreview {
            table_name: table.name.clone(),
            content,
        });
    }

    previews
}

/// Builds the report lines: header block, then one block per table.
pub fn render_summary(tables: &[TableDescriptor], previews: &[RowPreview]) -> Vec<String> {
    let mut lines = banner(SUMMARY_TITLE);
    lines.push(format!("Total Tables: {}", tables.len()));
    lines.push("Table List:".to_string());
    lines.extend(tables.iter().map(|t| format!("  - {}", t.name)));

    for preview in previews {
        lines.push(String::new());
        lines.push(rule('-'));
        lines.push(format!("Table: {}", preview.table_name));
        lines.push(rule('-'));
        match &preview.content {
            PreviewContent::Rows(rows) => lines.extend(render_rows(rows)),
            PreviewContent::Error(message) => lines.push(format!("Error: {}", message)),
        }
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RowSet;
    use serde_json::json;

    #[test]
    fn test_render_summary_header() {
        let tables = vec![TableDescriptor::new("mtcars"), TableDescriptor::new("iris")];
        let lines = render_summary(&tables, &[]);

        assert_eq!(lines[1], SUMMARY_TITLE);
        assert_eq!(lines[3], "Total Tables: 2");
        assert_eq!(lines[4], "Table List:");
        assert_eq!(lines[5], "  - mtcars");
        assert_eq!(lines[6], "  - iris");
        assert_eq!(lines.len(), 7);
    }

    #[test]
    fn test_render_summary_blocks() {
        let tables = vec![TableDescriptor::new("ok"), TableDescriptor::new("broken")];
        let previews = vec![
            RowPreview {
                table_name: "ok".to_string(),
                content: PreviewContent::Rows(RowSet {
                    columns: vec!["id".to_string()],
                    rows: vec![vec![json!(1)]],
                }),
            },
            RowPreview {
                table_name: "broken".to_string(),
                content: PreviewContent::Error("no such table: broken".to_string()),
            },
        ];

        let lines = render_summary(&tables, &previews);
        let ok_at = lines.iter().position(|l| l == "Table: ok").unwrap();
        assert_eq!(lines[ok_at - 2], "");
        assert_eq!(lines[ok_at - 1], rule('-'));
        assert_eq!(lines[ok_at + 1], rule('-'));
        assert_eq!(lines[ok_at + 2], "  id");
        assert_eq!(lines[ok_at + 3], "1  1");

        let broken_at = lines.iter().position(|l| l == "Table: broken").unwrap();
        assert!(broken_at > ok_at);
        assert_eq!(lines[broken_at + 2], "Error: no such table: broken");
    }
}
