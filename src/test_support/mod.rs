//! Test utilities for isebuild unit tests.
//!
//! Provides a stub toolchain runner that records every invocation instead of
//! spawning processes, and a lock serializing tests that change the process
//! working directory.
//!
//! # Example
//!
//! ```rust,ignore
//! use isebuild::test_support::StubRunner;
//!
//! #[test]
//! fn test_example() {
//!     let runner = StubRunner::new(0).with_code("yosys", 1);
//!     // Pass `&runner` wherever a `Runner` is expected...
//!     assert_eq!(runner.commands(), ["yosys top.ys"]);
//! }
//! ```

pub mod fixtures;

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use anyhow::Result;

use crate::util::process::{ProcessBuilder, Runner};

pub use fixtures::*;

/// One recorded invocation.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    /// Full command line.
    pub command: String,
    /// Working directory at the time of the call.
    pub cwd: PathBuf,
    /// Sorted names of the files in `cwd` at the time of the call.
    pub files: Vec<String>,
}

/// Runner that returns canned exit codes.
#[derive(Debug, Default)]
pub struct StubRunner {
    default_code: Option<i32>,
    codes: HashMap<String, Option<i32>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl StubRunner {
    /// Every command exits with `code`.
    pub fn new(code: i32) -> Self {
        StubRunner {
            default_code: Some(code),
            ..Default::default()
        }
    }

    /// Commands whose program is `program` exit with `code` instead.
    pub fn with_code(mut self, program: &str, code: i32) -> Self {
        self.codes.insert(program.to_string(), Some(code));
        self
    }

    /// Commands whose program is `program` are "killed by a signal".
    pub fn killed(mut self, program: &str) -> Self {
        self.codes.insert(program.to_string(), None);
        self
    }

    /// All recorded calls.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Recorded command lines.
    pub fn commands(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.command).collect()
    }
}

impl Runner for StubRunner {
    fn run(&self, cmd: &ProcessBuilder) -> Result<Option<i32>> {
        let cwd = std::env::current_dir()?;
        let mut files: Vec<String> = std::fs::read_dir(&cwd)?
            .flatten()
            .filter(|e| e.path().is_file())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        files.sort();

        self.calls.lock().unwrap().push(RecordedCall {
            command: cmd.display_command(),
            cwd,
            files,
        });

        let program = cmd.get_program().to_string_lossy();
        Ok(self
            .codes
            .get(&*program)
            .copied()
            .unwrap_or(self.default_code))
    }
}

static CWD_LOCK: Mutex<()> = Mutex::new(());

/// Hold this while a test changes the process working directory.
pub fn cwd_lock() -> MutexGuard<'static, ()> {
    CWD_LOCK.lock().unwrap_or_else(|e| e.into_inner())
}
