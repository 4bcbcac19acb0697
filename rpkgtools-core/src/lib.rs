//! Core pipelines and collaborators for rpkgtools.
//!
//! This crate implements the three utilities used by the `rpkgtools` binary
//! during R package development:
//!
//! - [`summary`]: dump a database's table list and row previews to a text file
//! - [`release`]: bump `DESCRIPTION` version/date and prepend a `NEWS.md` entry
//! - [`aggregate`]: dump a package's directory tree and `.R` sources to a text file
//!
//! # Architecture
//! Each utility is a stateless Enumerate -> Extract -> Format -> Write
//! pipeline. External capabilities sit behind traits so callers and tests can
//! swap them:
//! - [`sources::TabularSource`] for database access
//! - [`tree::TreeRenderer`] for directory tree rendering
//! - [`version::VersionChooser`] for the interactive version decision

pub mod aggregate;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod logging;
pub mod models;
pub mod output;
pub mod release;
pub mod render;
pub mod sources;
pub mod summary;
pub mod tree;
pub mod version;

// Re-export commonly used types
pub use aggregate::{AggregateReport, aggregate_package};
pub use config::{AggregateConfig, SummaryConfig, TreeStyle};
pub use error::{Result, ToolkitError};
pub use logging::init_logging;
pub use models::{
    ChangelogEntry, DatabaseType, PreviewContent, RowPreview, RowSet, SourceFileEntry,
    TableDescriptor,
};
pub use release::{ReleaseOutcome, ReleaseRequest, update_release};
pub use sources::{TabularSource, open_source};
pub use summary::{SummaryReport, summarize_database};
pub use tree::{TreeRenderer, WalkTreeRenderer};
pub use version::{FixedChooser, PackageVersion, PromptChooser, VersionBump, VersionChooser};
