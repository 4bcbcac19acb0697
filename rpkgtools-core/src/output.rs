//! Line-oriented file output shared by all pipelines.
//!
//! Reports are written through a sibling temp file and renamed over the
//! destination, so readers never observe a half-written file.

use crate::Result;
use crate::error::ToolkitError;
use std::path::{Path, PathBuf};

/// Joins lines with `\n` and terminates the text with a final newline.
///
/// An empty slice yields an empty string.
pub fn join_lines(lines: &[String]) -> String {
    if lines.is_empty() {
        return String::new();
    }
    let mut text = lines.join("\n");
    text.push('\n');
    text
}

/// Splits text into lines, accepting both `\n` and `\r\n` endings.
pub fn split_lines(text: &str) -> Vec<String> {
    text.lines().map(str::to_string).collect()
}

/// Creates `dir` and all missing parents; existing directories are fine.
pub async fn ensure_dir(dir: &Path) -> Result<()> {
    if dir.as_os_str().is_empty() {
        return Ok(());
    }
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| ToolkitError::io("create directory", dir, e))
}

/// Writes `lines` to `path`, replacing any existing file.
///
/// The parent directory is created first when missing.
///
/// # Errors
/// Returns an I/O error if the directory cannot be created or the file
/// cannot be written; the destination is left untouched in that case.
pub async fn write_lines(path: &Path, lines: &[String]) -> Result<()> {
    write_text(path, &join_lines(lines)).await
}

/// Writes `text` to `path` with an atomic replace.
pub async fn write_text(path: &Path, text: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent).await?;
    }

    let staging = staging_path(path)?;
    if let Err(e) = tokio::fs::write(&staging, text).await {
        let _ = tokio::fs::remove_file(&staging).await;
        return Err(ToolkitError::io("write", path, e));
    }

    if let Err(e) = tokio::fs::rename(&staging, path).await {
        let _ = tokio::fs::remove_file(&staging).await;
        return Err(ToolkitError::io("replace", path, e));
    }

    tracing::debug!("Wrote {} bytes to {}", text.len(), path.display());
    Ok(())
}

/// Whether `path` exists.
///
/// # Errors
/// Returns an I/O error when existence cannot be determined, e.g. when a
/// parent component is not a directory or access is denied
pub async fn file_exists(path: &Path) -> Result<bool> {
    tokio::fs::try_exists(path)
        .await
        .map_err(|e| ToolkitError::io("check", path, e))
}

/// Reads a whole file into lines.
pub async fn read_lines(path: &Path) -> Result<Vec<String>> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ToolkitError::io("read", path, e))?;
    Ok(split_lines(&text))
}

/// Temp file next to `path` so the final rename never crosses filesystems.
fn staging_path(path: &Path) -> Result<PathBuf> {
    let file_name = path.file_name().ok_or_else(|| {
        ToolkitError::configuration(format!(
            "Output path {} does not name a file",
            path.display()
        ))
    })?;
    let staging_name = format!(
        ".{}.{}.tmp",
        file_name.to_string_lossy(),
        uuid::Uuid::new_v4().simple()
    );
    Ok(path.with_file_name(staging_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_lines() {
        assert_eq!(join_lines(&[]), "");
        assert_eq!(join_lines(&["a".to_string()]), "a\n");
        assert_eq!(
            join_lines(&["a".to_string(), String::new(), "b".to_string()]),
            "a\n\nb\n"
        );
    }

    #[test]
    fn test_split_lines_handles_crlf() {
        assert_eq!(split_lines("a\r\nb\n"), vec!["a", "b"]);
        assert!(split_lines("").is_empty());
    }

    #[test]
    fn test_staging_path_is_sibling() {
        let staging = staging_path(Path::new("/tmp/out/report.txt")).unwrap();
        assert_eq!(staging.parent(), Some(Path::new("/tmp/out")));
        let name = staging.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with(".report.txt."));
        assert!(name.ends_with(".tmp"));
    }

    #[test]
    fn test_staging_path_rejects_directory_like_path() {
        assert!(staging_path(Path::new("/")).is_err());
    }

    #[tokio::test]
    async fn test_file_exists() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("DESCRIPTION");
        assert!(!file_exists(&file).await.unwrap());

        std::fs::write(&file, "Package: p\n").unwrap();
        assert!(file_exists(&file).await.unwrap());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_file_exists_reports_unresolvable_path() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("plain.txt");
        std::fs::write(&file, "").unwrap();

        let result = file_exists(&file.join("NEWS.md")).await;
        assert!(matches!(result, Err(ToolkitError::Io { .. })));
    }

    #[tokio::test]
    async fn test_write_lines_creates_parents_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deeper/out.txt");

        write_lines(&path, &["first".to_string()]).await.unwrap();
        write_lines(&path, &["second".to_string(), "third".to_string()])
            .await
            .unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "second\nthird\n");

        let leftovers: Vec<_> = std::fs::read_dir(path.parent().unwrap())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }
}
