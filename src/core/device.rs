//! Xilinx device identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::builder::BuildError;

/// Architecture codes understood by `synth_xilinx -arch`.
const SYNTH_ARCHES: &[(&str, &str)] = &[
    ("6s", "spartan6"),
    ("7a", "artix7"),
    ("7k", "kintex7"),
    ("7v", "virtex7"),
    ("7z", "zynq7000"),
];

/// A part identifier such as `xc6slx45-csg324-3`, passed to the tools as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Device(String);

impl Device {
    pub fn new(id: impl Into<String>) -> Self {
        Device(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The two-character family code: the two characters after an `xc`
    /// vendor prefix, or the first two characters otherwise.
    ///
    /// Returns `None` when the identifier is too short.
    pub fn arch_code(&self) -> Option<&str> {
        if self.0.starts_with("xc") {
            self.0.get(2..4)
        } else {
            self.0.get(0..2)
        }
    }

    /// The yosys `synth_xilinx` architecture for this device.
    pub fn synth_arch(&self) -> Result<&'static str, BuildError> {
        let code = self.arch_code().unwrap_or("");
        SYNTH_ARCHES
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, arch)| *arch)
            .ok_or_else(|| BuildError::UnknownArchitecture {
                device: self.0.clone(),
                code: code.to_string(),
            })
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Device {
    fn from(id: &str) -> Self {
        Device::new(id)
    }
}
