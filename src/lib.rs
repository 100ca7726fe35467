//! isebuild - Build driver for the Xilinx ISE toolchain
//!
//! This crate turns a finalized design into a bitstream: it renders the
//! design as verilog or EDIF, writes the synthesis project and UCF
//! constraints, and runs the ISE implementation tools from a generated
//! control script.

pub mod builder;
pub mod core;
pub mod ops;
pub mod util;

/// Test utilities for isebuild unit tests.
///
/// This module is only available when compiling with `--cfg test`. It
/// provides a recording toolchain runner and project fixtures.
#[cfg(test)]
pub mod test_support;

pub use crate::builder::{BuildError, LoweringTable, SynthesisMode};
pub use crate::core::{manifest::Manifest, DesignGenerator, Device, PrecompiledDesign};
pub use crate::ops::{build, BuildContext, BuildOptions, BuildReport};
