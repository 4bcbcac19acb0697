//! Release updater tests.
//!
//! This test suite covers:
//! - DESCRIPTION Version/Date rewrite with every other field untouched
//! - NEWS.md creation and newest-first prepending
//! - Cancellation through the interactive chooser leaving files unchanged
//! - Project root and DESCRIPTION preconditions

use chrono::NaiveDate;
use rpkgtools_core::{
    FixedChooser, PromptChooser, ReleaseOutcome, ReleaseRequest, Result, ToolkitError,
    VersionBump, update_release,
};
use std::fs;
use std::io::Cursor;
use std::path::Path;

const DESCRIPTION: &str = "Package: mypkg
Title: Tools for Things
Version: 1.0.0
Authors@R:
    person(\"Ada\", \"Lovelace\", role = c(\"aut\", \"cre\"))
Description: Does things.
License: MIT + file LICENSE
Date: 2025-01-01
";

fn package(root: &Path) {
    fs::write(root.join("DESCRIPTION"), DESCRIPTION).unwrap();
}

fn request(root: &Path, fixtures: &[&str], day: u32) -> ReleaseRequest {
    ReleaseRequest {
        root: root.to_path_buf(),
        fixtures: fixtures.iter().map(|f| f.to_string()).collect(),
        date: NaiveDate::from_ymd_opt(2026, 10, day).unwrap(),
    }
}

#[tokio::test]
async fn test_release_creates_changelog_and_bumps_version() -> Result<()> {
    let dir = tempfile::tempdir().unwrap();
    package(dir.path());

    let mut chooser = FixedChooser::Bump(VersionBump::Patch);
    let outcome = update_release(
        &request(dir.path(), &["Fixed `read_data()` on empty input"], 18),
        &mut chooser,
    )
    .await?;

    match outcome {
        ReleaseOutcome::Released {
            package,
            version,
            commit_message,
            ..
        } => {
            assert_eq!(package, "mypkg");
            assert_eq!(version.to_string(), "1.0.1");
            assert_eq!(commit_message, "Fixed read_data() on empty input");
        }
        ReleaseOutcome::Declined => panic!("expected a release"),
    }

    let description = fs::read_to_string(dir.path().join("DESCRIPTION")).unwrap();
    let expected = DESCRIPTION
        .replace("Version: 1.0.0", "Version: 1.0.1")
        .replace("Date: 2025-01-01", "Date: 2026-10-18");
    assert_eq!(description, expected);

    let news = fs::read_to_string(dir.path().join("NEWS.md")).unwrap();
    assert_eq!(
        news,
        "# mypkg 1.0.1 -- 2026-10-18\n* Fixed `read_data()` on empty input\n\n"
    );
    Ok(())
}

#[tokio::test]
async fn test_successive_releases_are_newest_first() -> Result<()> {
    let dir = tempfile::tempdir().unwrap();
    package(dir.path());

    update_release(
        &request(dir.path(), &["First fix"], 1),
        &mut FixedChooser::version("1.0.1")?,
    )
    .await?;
    update_release(
        &request(dir.path(), &["Second fix", "Third fix"], 2),
        &mut FixedChooser::version("1.0.2")?,
    )
    .await?;

    let news = fs::read_to_string(dir.path().join("NEWS.md")).unwrap();
    assert_eq!(
        news,
        "# mypkg 1.0.2 -- 2026-10-02\n\
         * Second fix\n\
         * Third fix\n\
         \n\
         # mypkg 1.0.1 -- 2026-10-01\n\
         * First fix\n\n"
    );

    let description = fs::read_to_string(dir.path().join("DESCRIPTION")).unwrap();
    assert!(description.contains("Version: 1.0.2\n"));
    assert!(description.contains("Date: 2026-10-02\n"));
    Ok(())
}

#[tokio::test]
async fn test_existing_changelog_is_kept_below_new_entry() -> Result<()> {
    let dir = tempfile::tempdir().unwrap();
    package(dir.path());
    fs::write(
        dir.path().join("NEWS.md"),
        "# mypkg 1.0.0\n\n* Initial CRAN submission.\n",
    )
    .unwrap();

    update_release(
        &request(dir.path(), &["Faster parsing"], 18),
        &mut FixedChooser::Bump(VersionBump::Minor),
    )
    .await?;

    let news = fs::read_to_string(dir.path().join("NEWS.md")).unwrap();
    assert_eq!(
        news,
        "# mypkg 1.1.0 -- 2026-10-18\n* Faster parsing\n\n# mypkg 1.0.0\n\n* Initial CRAN submission.\n"
    );
    Ok(())
}

#[tokio::test]
async fn test_interactive_choice() -> Result<()> {
    let dir = tempfile::tempdir().unwrap();
    package(dir.path());

    let mut shown = Vec::new();
    let mut chooser = PromptChooser::new(Cursor::new("9\n4\n"), &mut shown);
    let outcome = update_release(&request(dir.path(), &["Dev cycle"], 18), &mut chooser).await?;

    assert!(matches!(
        outcome,
        ReleaseOutcome::Released { ref version, .. } if version.to_string() == "1.0.0.9000"
    ));
    let shown = String::from_utf8(shown).unwrap();
    assert!(shown.contains("Current version is 1.0.0."));
    assert!(shown.contains("Enter an item from the menu, or 0 to exit"));
    Ok(())
}

#[tokio::test]
async fn test_cancelled_choice_changes_nothing() -> Result<()> {
    let dir = tempfile::tempdir().unwrap();
    package(dir.path());
    fs::write(dir.path().join("NEWS.md"), "# mypkg 1.0.0\n").unwrap();

    for answer in ["0\n", "\n", ""] {
        let mut sink = Vec::new();
        let mut chooser = PromptChooser::new(Cursor::new(answer), &mut sink);
        let outcome =
            update_release(&request(dir.path(), &["Never shipped"], 18), &mut chooser).await?;
        assert_eq!(outcome, ReleaseOutcome::Declined);
    }

    assert_eq!(
        fs::read_to_string(dir.path().join("DESCRIPTION")).unwrap(),
        DESCRIPTION
    );
    assert_eq!(
        fs::read_to_string(dir.path().join("NEWS.md")).unwrap(),
        "# mypkg 1.0.0\n"
    );
    Ok(())
}

#[tokio::test]
async fn test_cancel_does_not_create_changelog() -> Result<()> {
    let dir = tempfile::tempdir().unwrap();
    package(dir.path());

    let mut sink = Vec::new();
    let mut chooser = PromptChooser::new(Cursor::new("q\n"), &mut sink);
    update_release(&request(dir.path(), &["x"], 18), &mut chooser).await?;

    assert!(!dir.path().join("NEWS.md").exists());
    Ok(())
}

#[tokio::test]
async fn test_missing_description_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("mypkg.Rproj"), "Version: 1.0\n").unwrap();

    let result = update_release(
        &request(dir.path(), &["x"], 18),
        &mut FixedChooser::Bump(VersionBump::Patch),
    )
    .await;

    assert!(matches!(result, Err(ToolkitError::MissingFile { .. })));
    assert!(!dir.path().join("NEWS.md").exists());
}

#[tokio::test]
async fn test_not_a_project_is_an_error() {
    let dir = tempfile::tempdir().unwrap();

    let result = update_release(
        &request(dir.path(), &["x"], 18),
        &mut FixedChooser::Bump(VersionBump::Patch),
    )
    .await;

    assert!(matches!(result, Err(ToolkitError::NotAProject { .. })));
}

#[tokio::test]
async fn test_invalid_current_version_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("DESCRIPTION"),
        "Package: mypkg\nVersion: one\n",
    )
    .unwrap();

    let result = update_release(
        &request(dir.path(), &["x"], 18),
        &mut FixedChooser::Bump(VersionBump::Patch),
    )
    .await;

    assert!(matches!(result, Err(ToolkitError::InvalidVersion { .. })));
}
