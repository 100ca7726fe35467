//! ISE installation discovery.
//!
//! An ISE install root (e.g. `/opt/Xilinx`) contains one directory per
//! installed version, named like `14.7`. The newest one wins, compared as
//! decimal numbers.

use std::cmp::Ordering;
use std::fmt;
use std::path::{Path, PathBuf};

use super::errors::BuildError;

/// A decimal version number such as `14.7`.
///
/// Ordering is numeric (`9.1 < 14.2`). Numerically equal spellings such as
/// `14.2` and `14.20` are ordered by their text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolVersion {
    raw: String,
    /// Integer digits without leading zeros.
    int: String,
    /// Fraction digits without trailing zeros.
    frac: String,
}

impl ToolVersion {
    /// Parse a base-10 decimal: digits, optionally a point and more digits.
    /// At least one digit is required.
    pub fn parse(s: &str) -> Option<Self> {
        let (int, frac) = match s.split_once('.') {
            Some((int, frac)) => (int, frac),
            None => (s, ""),
        };
        if int.is_empty() && frac.is_empty() {
            return None;
        }
        if !int.bytes().all(|b| b.is_ascii_digit()) || !frac.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }

        Some(ToolVersion {
            raw: s.to_string(),
            int: int.trim_start_matches('0').to_string(),
            frac: frac.trim_end_matches('0').to_string(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    fn numeric_cmp(&self, other: &Self) -> Ordering {
        self.int
            .len()
            .cmp(&other.int.len())
            .then_with(|| self.int.cmp(&other.int))
            .then_with(|| self.frac.cmp(&other.frac))
    }
}

impl Ord for ToolVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        // Numerically equal spellings are tie-broken by text so the maximum
        // does not depend on directory listing order.
        self.numeric_cmp(other)
            .then_with(|| self.raw.cmp(&other.raw))
    }
}

impl PartialOrd for ToolVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for ToolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Find the newest installed version under `install_root`.
///
/// Entries that are not directories, or whose names are not decimals, are
/// skipped. Fails with [`BuildError::ToolchainNotFound`] when nothing is left,
/// including when `install_root` cannot be listed.
pub fn resolve_version(install_root: &Path) -> Result<ToolVersion, BuildError> {
    let not_found = || BuildError::ToolchainNotFound {
        root: install_root.to_path_buf(),
    };

    let entries = std::fs::read_dir(install_root).map_err(|e| {
        tracing::debug!("cannot list {}: {}", install_root.display(), e);
        not_found()
    })?;

    let mut best: Option<ToolVersion> = None;
    for entry in entries.flatten() {
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        let Some(version) = ToolVersion::parse(name) else {
            tracing::debug!("skipping `{}`: not a version", name);
            continue;
        };
        if !entry.path().is_dir() {
            tracing::debug!("skipping `{}`: not a directory", name);
            continue;
        }
        if best.as_ref().map_or(true, |b| version > *b) {
            best = Some(version);
        }
    }

    let version = best.ok_or_else(not_found)?;
    tracing::debug!("resolved ISE {} under {}", version, install_root.display());
    Ok(version)
}

/// Pointer width of the host, used to pick the settings script.
pub fn host_bits() -> u32 {
    usize::BITS
}

/// Path of the environment settings script for `version`.
///
/// On a 64-bit host without `settings64.sh` (a 32-bit install), falls back
/// to `settings32.sh`.
pub fn settings_file(install_root: &Path, version: &ToolVersion, bits: u32) -> PathBuf {
    let ise_ds = install_root.join(version.as_str()).join("ISE_DS");
    let settings = ise_ds.join(format!("settings{}.sh", bits));
    if bits == 64 && !settings.exists() {
        tracing::warn!(
            "{} not found, falling back to the 32-bit environment",
            settings.display()
        );
        return ise_ds.join("settings32.sh");
    }
    settings
}

/// Commands that set up the ISE environment ahead of the toolchain stages.
///
/// Empty when sourcing is disabled or on Windows hosts, where the tools are
/// expected on `PATH` already.
pub fn environment_prelude(install_root: &Path, source: bool) -> Result<Vec<String>, BuildError> {
    if !source || cfg!(windows) {
        return Ok(Vec::new());
    }

    let version = resolve_version(install_root)?;
    let settings = settings_file(install_root, &version, host_bits());
    Ok(vec![format!("source {}", settings.display())])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn install_root(dirs: &[&str]) -> TempDir {
        let tmp = TempDir::new().unwrap();
        for dir in dirs {
            fs::create_dir_all(tmp.path().join(dir)).unwrap();
        }
        tmp
    }

    #[test]
    fn test_version_parse() {
        assert!(ToolVersion::parse("14.7").is_some());
        assert!(ToolVersion::parse("13").is_some());
        assert!(ToolVersion::parse("14.").is_some());
        assert!(ToolVersion::parse("14.2x").is_none());
        assert!(ToolVersion::parse("abc").is_none());
        assert!(ToolVersion::parse(".").is_none());
        assert!(ToolVersion::parse("").is_none());
        assert!(ToolVersion::parse("1.2.3").is_none());
    }

    #[test]
    fn test_version_ordering_is_numeric() {
        let v = |s| ToolVersion::parse(s).unwrap();
        assert!(v("14.2") > v("9.1"));
        assert!(v("14.10") < v("14.7"));
        assert!(v("014.7").numeric_cmp(&v("14.70")) == Ordering::Equal);
        assert!(v("10") > v("9.99"));
    }

    #[test]
    fn test_resolve_picks_numeric_maximum() {
        let tmp = install_root(&["9.1", "14.2", "abc", "14.2x"]);
        fs::write(tmp.path().join("15.0"), "not a directory").unwrap();

        let version = resolve_version(tmp.path()).unwrap();
        assert_eq!(version.as_str(), "14.2");

        // Same answer on a second look.
        assert_eq!(resolve_version(tmp.path()).unwrap(), version);
    }

    #[test]
    fn test_resolve_without_candidates() {
        let tmp = install_root(&["abc", "DocNav"]);

        let err = resolve_version(tmp.path()).unwrap_err();
        assert!(matches!(err, BuildError::ToolchainNotFound { .. }));
    }

    #[test]
    fn test_resolve_missing_root() {
        let tmp = TempDir::new().unwrap();
        let err = resolve_version(&tmp.path().join("nope")).unwrap_err();
        assert!(matches!(err, BuildError::ToolchainNotFound { .. }));
    }

    #[test]
    fn test_settings_file_fallback_to_32_bit() {
        let tmp = install_root(&["14.7/ISE_DS"]);
        let version = ToolVersion::parse("14.7").unwrap();

        let settings = settings_file(tmp.path(), &version, 64);
        assert!(settings.ends_with("14.7/ISE_DS/settings32.sh"));

        fs::write(tmp.path().join("14.7/ISE_DS/settings64.sh"), "").unwrap();
        let settings = settings_file(tmp.path(), &version, 64);
        assert!(settings.ends_with("14.7/ISE_DS/settings64.sh"));

        let settings = settings_file(tmp.path(), &version, 32);
        assert!(settings.ends_with("14.7/ISE_DS/settings32.sh"));
    }

    #[test]
    fn test_environment_prelude_disabled() {
        let tmp = TempDir::new().unwrap();
        // No install needed when sourcing is off.
        assert!(environment_prelude(tmp.path(), false).unwrap().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_environment_prelude_sources_settings() {
        let tmp = install_root(&["13.4/ISE_DS", "14.7/ISE_DS"]);
        let prelude = environment_prelude(tmp.path(), true).unwrap();

        assert_eq!(prelude.len(), 1);
        assert!(prelude[0].starts_with("source "));
        assert!(prelude[0].contains("14.7"));
    }
}
