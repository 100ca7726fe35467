//! High-level operations.
//!
//! This module contains the implementation of isebuild commands.

pub mod ise_build;
pub mod toolchain_info;

pub use ise_build::{build, BuildContext, BuildFailure, BuildOptions, BuildReport, BuildState};
pub use toolchain_info::{format_report, inspect_toolchain, ToolchainReport};
