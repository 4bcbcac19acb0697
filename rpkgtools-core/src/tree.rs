//! Directory tree rendering.
//!
//! [`WalkTreeRenderer`] walks the whole subtree with `walkdir`, sorted by file
//! name, and prints it with indentation guides. Hidden entries (names starting
//! with `.`) are left out together with everything below them:
//!
//! ```text
//! /home/me/mypkg
//! |-- DESCRIPTION
//! |-- R
//! |   |-- a.R
//! |   `-- b.R
//! `-- tests
//!     `-- testthat
//!         `-- test-a.R
//! ```

use crate::Result;
use crate::config::TreeStyle;
use crate::error::ToolkitError;
use std::path::Path;
use walkdir::{DirEntry, WalkDir};

/// Produces a textual tree of every file and directory below a root.
pub trait TreeRenderer {
    /// Renders `root` and all of its descendants, one line per entry.
    ///
    /// Output must be deterministic for an unchanged directory.
    fn render(&self, root: &Path) -> Result<Vec<String>>;
}

/// `walkdir`-backed tree renderer.
#[derive(Debug, Clone, Copy, Default)]
pub struct WalkTreeRenderer {
    pub style: TreeStyle,
}

impl WalkTreeRenderer {
    pub fn new(style: TreeStyle) -> Self {
        Self { style }
    }
}

struct Connectors {
    branch: &'static str,
    last: &'static str,
    pipe: &'static str,
    blank: &'static str,
}

impl TreeStyle {
    fn connectors(self) -> Connectors {
        match self {
            TreeStyle::Ascii => Connectors {
                branch: "|-- ",
                last: "`-- ",
                pipe: "|   ",
                blank: "    ",
            },
            TreeStyle::Unicode => Connectors {
                branch: "├── ",
                last: "└── ",
                pipe: "│   ",
                blank: "    ",
            },
        }
    }
}

impl TreeRenderer for WalkTreeRenderer {
    fn render(&self, root: &Path) -> Result<Vec<String>> {
        let mut entries: Vec<(usize, String)> = Vec::new();
        let walker = WalkDir::new(root)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !is_hidden(e));
        for entry in walker {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(root).to_path_buf();
                ToolkitError::io("walk", &path, e.into())
            })?;
            entries.push((
                entry.depth(),
                entry.file_name().to_string_lossy().into_owned(),
            ));
        }

        let last_flags = last_sibling_flags(&entries);
        let connectors = self.style.connectors();

        let mut lines = Vec::with_capacity(entries.len() + 1);
        lines.push(root.display().to_string());

        // open[d] is true while the ancestor at depth d still has siblings below
        let mut open: Vec<bool> = Vec::new();
        for ((depth, name), is_last) in entries.iter().zip(last_flags) {
            open.truncate(depth - 1);
            let mut line = String::new();
            for &still_open in &open {
                line.push_str(if still_open {
                    connectors.pipe
                } else {
                    connectors.blank
                });
            }
            line.push_str(if is_last {
                connectors.last
            } else {
                connectors.branch
            });
            line.push_str(name);
            lines.push(line);
            open.push(!is_last);
        }

        Ok(lines)
    }
}

/// Dot-prefixed entries below the root (`.git`, `.Rproj.user`, ...).
///
/// Skipping a hidden directory skips its whole subtree.
pub(crate) fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0 && entry.file_name().to_string_lossy().starts_with('.')
}

/// For a pre-order listing of `(depth, name)`, marks entries that are the
/// last child of their parent.
fn last_sibling_flags(entries: &[(usize, String)]) -> Vec<bool> {
    let mut flags = vec![false; entries.len()];
    // seen[d]: a later sibling at depth d exists under the current parent
    let mut seen: Vec<bool> = Vec::new();

    for (i, (depth, _)) in entries.iter().enumerate().rev() {
        let depth = *depth;
        if seen.len() <= depth {
            seen.resize(depth + 1, false);
        }
        flags[i] = !seen[depth];
        seen[depth] = true;
        // Anything deeper belonged to this entry's subtree
        seen.truncate(depth + 1);
    }

    flags
}
