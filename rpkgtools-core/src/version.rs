//! Package versions and the interactive version decision.
//!
//! Versions follow R's `package_version` grammar: two to four non-negative
//! integers separated by `.` or `-`. A fourth component marks a development
//! version (`1.2.3.9000`).

use crate::Result;
use crate::error::ToolkitError;
use regex::Regex;
use std::io::{BufRead, Write};
use std::str::FromStr;
use std::sync::OnceLock;

/// First development component appended by a `dev` bump
pub const DEV_START: u64 = 9000;

fn version_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\d+(?:[.-]\d+){1,3}$").expect("Invalid version pattern"))
}

/// A parsed package version.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct PackageVersion {
    components: Vec<u64>,
}

impl PackageVersion {
    /// Component at `index`, zero when absent
    fn part(&self, index: usize) -> u64 {
        self.components.get(index).copied().unwrap_or(0)
    }

    /// Whether this is a development version (four components)
    pub fn is_dev(&self) -> bool {
        self.components.len() > 3
    }

    pub fn components(&self) -> &[u64] {
        &self.components
    }
}

impl FromStr for PackageVersion {
    type Err = ToolkitError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let invalid = || ToolkitError::InvalidVersion {
            version: s.to_string(),
        };
        if !version_pattern().is_match(trimmed) {
            return Err(invalid());
        }
        let components = trimmed
            .split(['.', '-'])
            .map(|part| part.parse::<u64>().map_err(|_| invalid()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { components })
    }
}

impl std::fmt::Display for PackageVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self.components.iter().map(u64::to_string).collect();
        write!(f, "{}", parts.join("."))
    }
}

/// The increments offered to the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionBump {
    Major,
    Minor,
    Patch,
    Dev,
}

impl VersionBump {
    /// All bumps in menu order
    pub const ALL: [VersionBump; 4] = [Self::Major, Self::Minor, Self::Patch, Self::Dev];

    /// Applies the bump to `current`.
    ///
    /// Release bumps drop any development component; `Dev` starts at
    /// [`DEV_START`] or increments an existing development component.
    pub fn apply(self, current: &PackageVersion) -> PackageVersion {
        let (x, y, z) = (current.part(0), current.part(1), current.part(2));
        let components = match self {
            Self::Major => vec![x.saturating_add(1), 0, 0],
            Self::Minor => vec![x, y.saturating_add(1), 0],
            Self::Patch => vec![x, y, z.saturating_add(1)],
            Self::Dev if current.is_dev() => vec![x, y, z, current.part(3).saturating_add(1)],
            Self::Dev => vec![x, y, z, DEV_START],
        };
        PackageVersion { components }
    }
}

impl std::fmt::Display for VersionBump {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(match self {
            Self::Major => "major",
            Self::Minor => "minor",
            Self::Patch => "patch",
            Self::Dev => "dev",
        })
    }
}

impl FromStr for VersionBump {
    type Err = ToolkitError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "major" => Ok(Self::Major),
            "minor" => Ok(Self::Minor),
            "patch" => Ok(Self::Patch),
            "dev" => Ok(Self::Dev),
            other => Err(ToolkitError::configuration(format!(
                "Unknown version bump '{}': expected major, minor, patch or dev",
                other
            ))),
        }
    }
}

/// Obtains the new version from an operator.
///
/// Returning `Ok(None)` means no version was chosen; the caller abandons the
/// release without touching any file.
pub trait VersionChooser {
    fn choose(&mut self, current: &PackageVersion) -> Result<Option<PackageVersion>>;
}

/// Numbered menu over any reader/writer pair (stdin/stdout in the CLI).
///
/// Empty input, `0`, `q` or end of input cancel. Anything else that is not a
/// menu number asks again.
pub struct PromptChooser<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> PromptChooser<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn write_menu(&mut self, current: &PackageVersion) -> std::io::Result<()> {
        writeln!(self.output, "Current version is {}.", current)?;
        writeln!(self.output, "Which part to increment? (0 to exit)")?;
        for (n, bump) in VersionBump::ALL.iter().enumerate() {
            writeln!(self.output, "{}: {:<5} --> {}", n + 1, bump, bump.apply(current))?;
        }
        Ok(())
    }
}

impl<R: BufRead, W: Write> VersionChooser for PromptChooser<R, W> {
    fn choose(&mut self, current: &PackageVersion) -> Result<Option<PackageVersion>> {
        let prompt_error = |e: std::io::Error| ToolkitError::Io {
            context: "Failed to interact with the version prompt".to_string(),
            source: e,
        };

        self.write_menu(current).map_err(prompt_error)?;

        loop {
            write!(self.output, "Selection: ").map_err(prompt_error)?;
            self.output.flush().map_err(prompt_error)?;

            let mut answer = String::new();
            if self.input.read_line(&mut answer).map_err(prompt_error)? == 0 {
                return Ok(None);
            }

            let answer = answer.trim();
            if answer.is_empty() || answer == "0" || answer.eq_ignore_ascii_case("q") {
                return Ok(None);
            }

            match answer.parse::<usize>() {
                Ok(n) if (1..=VersionBump::ALL.len()).contains(&n) => {
                    return Ok(Some(VersionBump::ALL[n - 1].apply(current)));
                }
                _ => {
                    writeln!(self.output, "Enter an item from the menu, or 0 to exit")
                        .map_err(prompt_error)?;
                }
            }
        }
    }
}

/// Non-interactive chooser for scripted releases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FixedChooser {
    /// Use exactly this version
    Version(PackageVersion),
    /// Apply this bump to the current version
    Bump(VersionBump),
}

impl FixedChooser {
    /// Chooser for an explicit version string.
    ///
    /// # Errors
    /// Returns `InvalidVersion` if the string is not a package version
    pub fn version(version: &str) -> Result<Self> {
        Ok(Self::Version(version.parse()?))
    }
}

impl VersionChooser for FixedChooser {
    fn choose(&mut self, current: &PackageVersion) -> Result<Option<PackageVersion>> {
        Ok(Some(match self {
            Self::Version(version) => version.clone(),
            Self::Bump(bump) => bump.apply(current),
        }))
    }
}
