//! Package structure & source aggregator.
//!
//! Writes a single text file holding the package's directory tree followed
//! by the full text of every top-level `.R` file in `R/` and
//! `tests/testthat/`.
//!
//! Files are taken from one directory level only and ordered by directory
//! (as configured) and then by file name. A file that cannot be read keeps
//! its block, with an `[unreadable: ...]` line as the body.

use crate::Result;
use crate::config::AggregateConfig;
use crate::error::ToolkitError;
use crate::models::SourceFileEntry;
use crate::output::{split_lines, write_lines};
use crate::render::{banner, rule};
use crate::tree::{TreeRenderer, is_hidden};
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

pub const STRUCTURE_TITLE: &str = "PROJECT STRUCTURE";
pub const SOURCES_TITLE: &str = "SOURCE CODE CONTENTS";
pub const NO_SOURCES_NOTICE: &str = "No R files found.";

/// Result of an aggregator run.
#[derive(Debug, Clone)]
pub struct AggregateReport {
    /// Where the dump was written
    pub output: PathBuf,
    /// Absolute package root the paths are relative to
    pub root: PathBuf,
    /// Included files, in output order
    pub files: Vec<SourceFileEntry>,
}

/// Dumps the tree and sources of the package at `root` into `output`.
///
/// # Errors
/// Returns error if `root` does not exist, the tree cannot be rendered, or
/// the output cannot be written
pub async fn aggregate_package(
    root: &Path,
    output: &Path,
    config: &AggregateConfig,
    renderer: &dyn TreeRenderer,
) -> Result<AggregateReport> {
    config.validate()?;

    let root = tokio::fs::canonicalize(root)
        .await
        .map_err(|e| ToolkitError::io("resolve", root, e))?;

    let tree = renderer.render(&root)?;
    let paths = discover_sources(&root, config)?;
    tracing::info!("Found {} source files under {}", paths.len(), root.display());

    let mut files = Vec::with_capacity(paths.len());
    for path in &paths {
        files.push(read_source(&root, path).await);
    }

    let lines = render_aggregate(&tree, &files);
    write_lines(output, &lines).await?;
    tracing::info!("✓ Package source written to {}", output.display());

    Ok(AggregateReport {
        output: output.to_path_buf(),
        root,
        files,
    })
}

/// Lists matching files in each configured directory, one level deep.
///
/// Missing directories and hidden files are skipped.
pub fn discover_sources(root: &Path, config: &AggregateConfig) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();

    for dir in &config.source_dirs {
        let dir_path = root.join(dir);
        if !dir_path.is_dir() {
            tracing::debug!("Skipping missing source directory {}", dir_path.display());
            continue;
        }

        for entry in WalkDir::new(&dir_path)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !is_hidden(e))
        {
            let entry = entry.map_err(|e| ToolkitError::io("list", &dir_path, e.into()))?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if entry.path().is_file() && config.matches_extension(&name) {
                found.push(entry.into_path());
            }
        }
    }

    Ok(found)
}

/// Reads one source file; read failures become an inline notice.
async fn read_source(root: &Path, path: &Path) -> SourceFileEntry {
    source_entry(relative_display(root, path), tokio::fs::read(path).await)
}

/// Builds a block from the outcome of reading a file.
///
/// Invalid UTF-8 is replaced with U+FFFD rather than failing the dump.
fn source_entry(relative_path: String, read: std::io::Result<Vec<u8>>) -> SourceFileEntry {
    let lines = match read {
        Ok(bytes) => split_lines(&String::from_utf8_lossy(&bytes)),
        Err(e) => {
            tracing::warn!("Could not read {}: {}", relative_path, e);
            vec![format!("[unreadable: {}]", e)]
        }
    };

    SourceFileEntry {
        relative_path,
        lines,
    }
}

/// `path` relative to `root`, `/` separated on every platform.
pub fn relative_display(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Builds the output lines from a rendered tree and the collected files.
pub fn render_aggregate(tree: &[String], files: &[SourceFileEntry]) -> Vec<String> {
    let mut lines = banner(STRUCTURE_TITLE);
    lines.extend(tree.iter().cloned());
    lines.push(String::new());
    lines.extend(banner(SOURCES_TITLE));

    if files.is_empty() {
        lines.push(NO_SOURCES_NOTICE.to_string());
        return lines;
    }

    for file in files {
        lines.push(String::new());
        lines.push(rule('-'));
        lines.push(file.relative_path.clone());
        lines.push(rule('-'));
        lines.extend(file.lines.iter().cloned());
    }

    lines
}
