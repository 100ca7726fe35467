//! Interfaces to the upstream design compiler.
//!
//! The build driver never looks inside a design. It asks the compiler for a
//! textual rendering in one of two exchange forms and receives the constraint
//! tables alongside it.

use anyhow::Result;

use crate::builder::lowering::LoweringTable;
use crate::core::constraint::SignalConstraint;
use crate::core::device::Device;

/// Output of design generation.
///
/// Every exchange form exposes the same constraint outputs so the UCF
/// writer does not care which synthesis path produced them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeneratedDesign {
    /// Verilog or EDIF text.
    pub text: String,
    /// Per-signal pin constraints.
    pub signal_constraints: Vec<SignalConstraint>,
    /// Free-form platform constraint blocks, inserted verbatim.
    pub platform_commands: Vec<String>,
}

/// Parameters for EDIF generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdifTarget {
    pub cell_library: String,
    pub vendor: String,
    pub device: Device,
}

impl EdifTarget {
    /// The Xilinx UNISIMS library for `device`.
    pub fn xilinx(device: &Device) -> Self {
        EdifTarget {
            cell_library: "UNISIMS".to_string(),
            vendor: "Xilinx".to_string(),
            device: device.clone(),
        }
    }
}

/// A finalized design that can be rendered for the toolchain.
pub trait DesignGenerator {
    /// Render verilog, substituting primitives through `lowering`.
    fn get_verilog(&self, lowering: &LoweringTable) -> Result<GeneratedDesign>;

    /// Render an EDIF netlist for `target`.
    fn get_edif(&self, target: &EdifTarget) -> Result<GeneratedDesign>;

    /// Names of the top-level I/O signals.
    fn io_signals(&self) -> Vec<String>;
}

/// A synthesizer that takes over design generation entirely.
///
/// After it returns, the design is expected to render as EDIF.
pub trait SpecializedSynthesizer {
    fn synthesize(&self, design: &dyn DesignGenerator, io_signals: &[String]) -> Result<()>;
}
