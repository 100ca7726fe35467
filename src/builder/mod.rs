//! Toolchain input generation.
//!
//! Everything here turns already-finalized inputs into files for the ISE
//! flow: UCF constraints, XST projects, yosys scripts and the control script
//! that chains the implementation tools.

pub mod errors;
pub mod lowering;
pub mod mode;
pub mod script;
pub mod toolchain;
pub mod ucf;
pub mod xst;
pub mod yosys;

pub use errors::{BuildError, Stage};
pub use lowering::LoweringTable;
pub use mode::{NetlistInput, SynthesisMode};
pub use script::{ControlScript, ToolOptions};
pub use toolchain::{resolve_version, ToolVersion};
