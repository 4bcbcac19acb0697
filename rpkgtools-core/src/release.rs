//! Package metadata & changelog updater.
//!
//! Bumps `Version` and `Date` in `DESCRIPTION` and prepends a release entry
//! to `NEWS.md`. The operator picks the new version through a
//! [`VersionChooser`]; declining leaves every file exactly as it was.

use crate::Result;
use crate::descriptor::{DESCRIPTION_FILE, Descriptor};
use crate::error::ToolkitError;
use crate::models::ChangelogEntry;
use crate::output::{file_exists, read_lines, write_lines};
use crate::version::{PackageVersion, VersionChooser};
use chrono::NaiveDate;
use std::path::{Path, PathBuf};

/// Changelog file name, relative to the project root
pub const CHANGELOG_FILE: &str = "NEWS.md";

/// Files or directories whose presence marks a project root
const ROOT_MARKERS: &[&str] = &[DESCRIPTION_FILE, ".here", ".git"];

/// Inputs of one release update.
#[derive(Debug, Clone)]
pub struct ReleaseRequest {
    /// Project root holding `DESCRIPTION` and `NEWS.md`
    pub root: PathBuf,
    /// Change descriptions, one changelog bullet each
    pub fixtures: Vec<String>,
    /// Release date written to `DESCRIPTION` and the changelog heading
    pub date: NaiveDate,
}

/// How a release update ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReleaseOutcome {
    /// No version was chosen; nothing was written
    Declined,
    /// Both files were updated
    Released {
        package: String,
        version: PackageVersion,
        changelog: PathBuf,
        /// Fixtures with inline code markup stripped, ready for `git commit -m`
        commit_message: String,
    },
}

/// Checks whether `dir` looks like an R project root.
///
/// A root contains `DESCRIPTION`, `.here`, `.git` or an `*.Rproj` file.
pub fn is_project_root(dir: &Path) -> bool {
    if !dir.is_dir() {
        return false;
    }
    if ROOT_MARKERS.iter().any(|marker| dir.join(marker).exists()) {
        return true;
    }
    std::fs::read_dir(dir)
        .map(|entries| {
            entries.filter_map(|e| e.ok()).any(|e| {
                e.path()
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("rproj"))
            })
        })
        .unwrap_or(false)
}

/// Strips inline code markup so fixtures read well as a commit message.
pub fn commit_message(fixtures: &[String]) -> String {
    fixtures
        .iter()
        .map(|fixture| fixture.replace('`', ""))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Runs a release update for the project at `request.root`.
///
/// # Errors
/// Returns error if the root is not a project, `DESCRIPTION` is missing or
/// malformed, the chooser fails, or a file cannot be written
pub async fn update_release(
    request: &ReleaseRequest,
    chooser: &mut dyn VersionChooser,
) -> Result<ReleaseOutcome> {
    let root = request.root.as_path();
    if !is_project_root(root) {
        return Err(ToolkitError::NotAProject {
            path: root.display().to_string(),
        });
    }

    let changelog_path = root.join(CHANGELOG_FILE);
    let descriptor_path = root.join(DESCRIPTION_FILE);
    let mut descriptor = Descriptor::load(&descriptor_path).await?;
    let package = descriptor.package()?;
    let current = descriptor.version()?;

    let Some(version) = chooser.choose(&current)? else {
        tracing::info!("No version chosen. Try again later.");
        return Ok(ReleaseOutcome::Declined);
    };

    let existing = if file_exists(&changelog_path).await? {
        read_lines(&changelog_path).await?
    } else {
        write_lines(&changelog_path, &[]).await?;
        tracing::info!("✓ Created {}", CHANGELOG_FILE);
        Vec::new()
    };

    let date = request.date.format("%Y-%m-%d").to_string();
    descriptor.set_date(request.date);
    tracing::info!("✓ Setting Date field in DESCRIPTION to '{}'", date);
    descriptor.set_version(&version);
    tracing::info!("✓ Setting Version field in DESCRIPTION to '{}'", version);
    descriptor.save(&descriptor_path).await?;

    let entry = ChangelogEntry {
        package_name: package.clone(),
        version: version.to_string(),
        date,
        fixtures: request.fixtures.clone(),
    };
    let mut lines = entry.to_lines();
    lines.extend(existing);
    write_lines(&changelog_path, &lines).await?;
    tracing::info!("✓ Writing {}", CHANGELOG_FILE);

    tracing::warn!("Run devtools::check() before publishing this release");
    tracing::warn!("Do not push directly to the production branch; open a pull request");

    let message = commit_message(&request.fixtures);
    tracing::info!("Suggested commit message: {}", message);

    Ok(ReleaseOutcome::Released {
        package,
        version,
        changelog: changelog_path,
        commit_message: message,
    })
}
