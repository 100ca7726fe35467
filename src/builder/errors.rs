//! Build error types.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// An external process boundary of the build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// `yosys <name>.ys`
    Yosys,
    /// The specialized synthesizer command.
    SpecializedSynthesis,
    /// `bash build_<name>.sh`, covering xst through bitgen.
    ControlScript,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Yosys => "yosys synthesis",
            Stage::SpecializedSynthesis => "specialized synthesis",
            Stage::ControlScript => "toolchain script",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecoverable build failures. None of these are retried.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("no ISE installation found under `{}`", root.display())]
    ToolchainNotFound { root: PathBuf },

    #[error("device `{device}` has no known yosys architecture (code `{code}`)")]
    UnknownArchitecture { device: String, code: String },

    #[error("invalid synthesis mode `{0}`, valid values: xst, yosys, edif, mist")]
    InvalidMode(String),

    #[error("{stage} failed with {}", describe_exit(*code))]
    Subprocess { stage: Stage, code: Option<i32> },
}

impl BuildError {
    /// Exit code of the failed external process, if it exited normally.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            BuildError::Subprocess { code, .. } => *code,
            _ => None,
        }
    }
}

fn describe_exit(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "no exit code (terminated by signal)".to_string(),
    }
}
