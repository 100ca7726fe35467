//! Toolchain inspection.
//!
//! The `toolchain` command reports which ISE version a build would source,
//! and whether the helper programs a build shells out to are installed.
//!
//! ## Checks Performed
//!
//! - ISE installation and the selected version directory
//! - The environment settings script for this host
//! - bash, which runs the control script
//! - yosys (optional, only needed in `yosys` mode)
//! - ISE tools already on `PATH` (optional, normally provided by sourcing)

use std::fmt::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::builder::toolchain::{host_bits, resolve_version, settings_file};
use crate::util::process::{find_bash, find_executable, find_yosys};

/// Tools run by the control script.
pub const ISE_TOOLS: &[&str] = &["xst", "ngdbuild", "map", "par", "bitgen"];

/// Result of a single check.
#[derive(Debug, Clone, Serialize)]
pub struct CheckResult {
    pub name: String,
    pub passed: bool,
    /// Human-readable status message
    pub message: String,
    pub path: Option<PathBuf>,
    /// Whether a failure prevents building
    pub required: bool,
}

impl CheckResult {
    pub fn pass(name: impl Into<String>, message: impl Into<String>) -> Self {
        CheckResult {
            name: name.into(),
            passed: true,
            message: message.into(),
            path: None,
            required: true,
        }
    }

    pub fn fail(name: impl Into<String>, message: impl Into<String>) -> Self {
        CheckResult {
            name: name.into(),
            passed: false,
            message: message.into(),
            path: None,
            required: true,
        }
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn with_path(mut self, path: PathBuf) -> Self {
        self.path = Some(path);
        self
    }
}

/// Everything the `toolchain` command found.
#[derive(Debug, Clone, Serialize)]
pub struct ToolchainReport {
    pub ise_path: PathBuf,
    /// Selected version directory, if any
    pub version: Option<String>,
    pub host_bits: u32,
    pub checks: Vec<CheckResult>,
}

impl ToolchainReport {
    pub fn all_required_passed(&self) -> bool {
        self.checks.iter().filter(|c| c.required).all(|c| c.passed)
    }
}

/// Inspect the ISE installation under `ise_path` and the host's helper tools.
pub fn inspect_toolchain(ise_path: &Path) -> ToolchainReport {
    let bits = host_bits();
    let mut report = ToolchainReport {
        ise_path: ise_path.to_path_buf(),
        version: None,
        host_bits: bits,
        checks: Vec::new(),
    };

    match resolve_version(ise_path) {
        Ok(version) => {
            report.checks.push(
                CheckResult::pass("ISE installation", format!("version {}", version))
                    .with_path(ise_path.join(version.as_str())),
            );

            let settings = settings_file(ise_path, &version, bits);
            let check = if settings.is_file() {
                CheckResult::pass("settings script", "found")
            } else {
                CheckResult::fail("settings script", "missing")
            };
            report.checks.push(check.with_path(settings));
            report.version = Some(version.to_string());
        }
        Err(e) => {
            report
                .checks
                .push(CheckResult::fail("ISE installation", e.to_string()));
        }
    }

    report.checks.push(match find_bash() {
        Some(path) => CheckResult::pass("bash", "found").with_path(path),
        None => CheckResult::fail("bash", "not found in PATH"),
    });

    report.checks.push(
        match find_yosys() {
            Some(path) => CheckResult::pass("yosys", "found").with_path(path),
            None => CheckResult::fail("yosys", "not found (set YOSYS or add it to PATH)"),
        }
        .optional(),
    );

    for tool in ISE_TOOLS {
        report.checks.push(
            match find_executable(tool) {
                Some(path) => CheckResult::pass(*tool, "on PATH").with_path(path),
                None => CheckResult::fail(*tool, "not on PATH, provided by the settings script"),
            }
            .optional(),
        );
    }

    tracing::debug!("toolchain report: {:?}", report);
    report
}

/// Format a toolchain report for display.
pub fn format_report(report: &ToolchainReport, verbose: bool) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "ISE toolchain");
    let _ = writeln!(output, "=============\n");
    let _ = writeln!(output, "Install root: {}", report.ise_path.display());
    let _ = writeln!(
        output,
        "Version: {}",
        report.version.as_deref().unwrap_or("none")
    );
    let _ = writeln!(output, "Host: {}-bit\n", report.host_bits);

    let _ = writeln!(output, "Checks:");
    for check in &report.checks {
        let status = if check.passed { "[OK]" } else { "[!!]" };
        let required = if check.required { "" } else { " (optional)" };
        let _ = writeln!(output, "  {} {}{}", status, check.name, required);

        if verbose || !check.passed {
            let _ = writeln!(output, "      {}", check.message);
        }
        if verbose {
            if let Some(path) = &check.path {
                let _ = writeln!(output, "      Path: {}", path.display());
            }
        }
    }

    if !report.all_required_passed() {
        let _ = writeln!(output, "\nWarning: builds that run the toolchain will fail.");
    }

    output
}
