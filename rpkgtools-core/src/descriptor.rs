//! Typed access to an R package `DESCRIPTION` file.
//!
//! `DESCRIPTION` uses the Debian control file (DCF) layout: `Name: value`
//! lines, with continuation lines indented by whitespace. The parser keeps
//! every field's original text and the file's line ending (`\n` or `\r\n`),
//! so saving after `set_version`/`set_date` rewrites only those two fields.
//! Blank lines carry no meaning in DCF and are dropped on save.

use crate::Result;
use crate::error::ToolkitError;
use crate::output::{file_exists, write_text};
use crate::version::PackageVersion;
use std::path::Path;

/// Canonical name of the descriptor file
pub const DESCRIPTION_FILE: &str = "DESCRIPTION";

/// One DCF field, with its text kept as written.
#[derive(Debug, Clone, PartialEq, Eq)]
struct DcfField {
    name: String,
    /// Everything after the colon on the first line
    first: String,
    /// Indented continuation lines, verbatim
    continuation: Vec<String>,
}

impl DcfField {
    fn new(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            first: format!(" {}", value),
            continuation: Vec::new(),
        }
    }

    fn value(&self) -> String {
        std::iter::once(self.first.trim())
            .chain(self.continuation.iter().map(|line| line.trim()))
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Parsed `DESCRIPTION` with explicit accessors for the release fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Descriptor {
    fields: Vec<DcfField>,
    line_ending: &'static str,
}

impl Descriptor {
    /// Parses DCF text.
    ///
    /// # Errors
    /// Returns `Descriptor` if a line is neither a field nor a continuation,
    /// or a continuation appears before the first field
    pub fn parse(text: &str) -> Result<Self> {
        let mut fields: Vec<DcfField> = Vec::new();

        for (index, line) in text.lines().enumerate() {
            let line_no = index + 1;
            if line.trim().is_empty() {
                continue;
            }

            if line.starts_with([' ', '\t']) {
                let field = fields.last_mut().ok_or_else(|| ToolkitError::Descriptor {
                    line: line_no,
                    message: "continuation line before any field".to_string(),
                })?;
                field.continuation.push(line.to_string());
                continue;
            }

            let (name, first) = line.split_once(':').ok_or_else(|| ToolkitError::Descriptor {
                line: line_no,
                message: format!("expected 'Field: value', found '{}'", line),
            })?;
            if name.is_empty() || name.contains(char::is_whitespace) {
                return Err(ToolkitError::Descriptor {
                    line: line_no,
                    message: format!("invalid field name '{}'", name),
                });
            }

            fields.push(DcfField {
                name: name.to_string(),
                first: first.to_string(),
                continuation: Vec::new(),
            });
        }

        let line_ending = if text.contains("\r\n") { "\r\n" } else { "\n" };
        Ok(Self {
            fields,
            line_ending,
        })
    }

    /// Loads and parses a descriptor file.
    ///
    /// # Errors
    /// Returns `MissingFile` if `path` does not exist, otherwise any read or
    /// parse error
    pub async fn load(path: &Path) -> Result<Self> {
        if !file_exists(path).await? {
            return Err(ToolkitError::missing_file(path));
        }
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ToolkitError::io("read", path, e))?;
        Self::parse(&text)
    }

    /// Writes the descriptor back to `path`.
    pub async fn save(&self, path: &Path) -> Result<()> {
        write_text(path, &self.to_string()).await
    }

    /// Line ending used when serializing, as detected on parse.
    pub fn line_ending(&self) -> &'static str {
        self.line_ending
    }

    /// Serializes to DCF lines.
    pub fn to_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        for field in &self.fields {
            lines.push(format!("{}:{}", field.name, field.first));
            lines.extend(field.continuation.iter().cloned());
        }
        lines
    }

    /// Value of a field, continuation lines joined by newlines.
    pub fn get(&self, name: &str) -> Option<String> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(DcfField::value)
    }

    /// Sets a field to a single-line value, appending it when absent.
    pub fn set(&mut self, name: &str, value: &str) {
        match self.fields.iter_mut().find(|f| f.name == name) {
            Some(field) => *field = DcfField::new(name, value),
            None => self.fields.push(DcfField::new(name, value)),
        }
    }

    /// The `Package` field.
    ///
    /// # Errors
    /// Returns `Descriptor` when the field is missing or empty
    pub fn package(&self) -> Result<String> {
        self.get("Package")
            .filter(|name| !name.is_empty())
            .ok_or_else(|| ToolkitError::Descriptor {
                line: 0,
                message: "missing 'Package' field".to_string(),
            })
    }

    /// The `Version` field, parsed.
    ///
    /// # Errors
    /// Returns `Descriptor` when missing, `InvalidVersion` when malformed
    pub fn version(&self) -> Result<PackageVersion> {
        self.get("Version")
            .ok_or_else(|| ToolkitError::Descriptor {
                line: 0,
                message: "missing 'Version' field".to_string(),
            })?
            .parse()
    }

    pub fn set_version(&mut self, version: &PackageVersion) {
        self.set("Version", &version.to_string());
    }

    /// The `Date` field, if present.
    pub fn date(&self) -> Option<String> {
        self.get("Date")
    }

    /// Sets `Date` in ISO 8601 (`YYYY-MM-DD`) form.
    pub fn set_date(&mut self, date: chrono::NaiveDate) {
        self.set("Date", &date.format("%Y-%m-%d").to_string());
    }
}

impl std::fmt::Display for Descriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for line in self.to_lines() {
            write!(f, "{}{}", line, self.line_ending)?;
        }
        Ok(())
    }
}
