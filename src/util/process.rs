//! Subprocess execution utilities.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

use anyhow::{Context, Result};

/// Builder for subprocess execution.
#[derive(Debug, Clone)]
pub struct ProcessBuilder {
    program: PathBuf,
    args: Vec<String>,
}

impl ProcessBuilder {
    /// Create a new process builder for the given program.
    pub fn new(program: impl AsRef<Path>) -> Self {
        ProcessBuilder {
            program: program.as_ref().to_path_buf(),
            args: Vec::new(),
        }
    }

    /// Add a single argument.
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_string_lossy().into_owned());
        self
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args.extend(
            args.into_iter()
                .map(|s| s.as_ref().to_string_lossy().into_owned()),
        );
        self
    }

    /// Get the program path.
    pub fn get_program(&self) -> &Path {
        &self.program
    }

    /// Get the arguments.
    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    /// Execute with inherited stdio and return the status only.
    pub fn status(&self) -> Result<ExitStatus> {
        let status = Command::new(&self.program)
            .args(&self.args)
            .status()
            .with_context(|| format!("failed to execute `{}`", self.program.display()))?;
        Ok(status)
    }

    /// Display the command for error messages.
    pub fn display_command(&self) -> String {
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }
}

/// Executes external toolchain commands.
///
/// Every call blocks until the child exits. The returned value is the exit
/// code, or `None` when the child was terminated by a signal.
pub trait Runner {
    fn run(&self, cmd: &ProcessBuilder) -> Result<Option<i32>>;
}

impl<T: Runner + ?Sized> Runner for &T {
    fn run(&self, cmd: &ProcessBuilder) -> Result<Option<i32>> {
        (**self).run(cmd)
    }
}

/// Runs commands on the host with inherited stdio.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl Runner for SystemRunner {
    fn run(&self, cmd: &ProcessBuilder) -> Result<Option<i32>> {
        tracing::debug!("running `{}`", cmd.display_command());
        let status = cmd.status()?;
        Ok(status.code())
    }
}

/// Find an executable in PATH.
pub fn find_executable(name: impl AsRef<OsStr>) -> Option<PathBuf> {
    which::which(name).ok()
}

/// The yosys program to run: `$YOSYS` when set, otherwise `yosys`.
pub fn yosys_program() -> PathBuf {
    yosys_program_from(std::env::var_os("YOSYS"))
}

fn yosys_program_from(var: Option<OsString>) -> PathBuf {
    match var {
        Some(program) if !program.is_empty() => PathBuf::from(program),
        _ => PathBuf::from("yosys"),
    }
}

/// Find the yosys program that synthesis will run.
pub fn find_yosys() -> Option<PathBuf> {
    find_executable(yosys_program())
}

/// Find bash, used to run generated control scripts.
pub fn find_bash() -> Option<PathBuf> {
    find_executable("bash")
}
