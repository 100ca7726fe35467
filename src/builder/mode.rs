//! Synthesis mode selection.

use serde::{Deserialize, Serialize};

use super::errors::BuildError;

/// How the design reaches the ISE implementation tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SynthesisMode {
    /// Verilog synthesized by XST inside the control script
    #[default]
    Xst,
    /// Verilog synthesized to EDIF by yosys before the control script runs
    Yosys,
    /// EDIF netlist generated directly, no synthesis
    Edif,
    /// Specialized synthesizer produces the netlist, then as `Edif`
    Mist,
}

/// The netlist `ngdbuild` consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetlistInput {
    /// `<name>.ngc` from XST; the control script must synthesize first.
    Ngc,
    /// `<name>.edif` supplied before the control script runs.
    Edif,
}

impl NetlistInput {
    pub fn extension(&self) -> &'static str {
        match self {
            NetlistInput::Ngc => "ngc",
            NetlistInput::Edif => "edif",
        }
    }
}

impl SynthesisMode {
    /// All modes, in the order they are listed to users.
    pub const ALL: [SynthesisMode; 4] = [
        SynthesisMode::Xst,
        SynthesisMode::Yosys,
        SynthesisMode::Edif,
        SynthesisMode::Mist,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SynthesisMode::Xst => "xst",
            SynthesisMode::Yosys => "yosys",
            SynthesisMode::Edif => "edif",
            SynthesisMode::Mist => "mist",
        }
    }

    /// Whether the design is rendered as verilog (as opposed to EDIF).
    pub fn uses_verilog(&self) -> bool {
        matches!(self, SynthesisMode::Xst | SynthesisMode::Yosys)
    }

    pub fn netlist_input(&self) -> NetlistInput {
        match self {
            SynthesisMode::Xst => NetlistInput::Ngc,
            SynthesisMode::Yosys | SynthesisMode::Edif | SynthesisMode::Mist => NetlistInput::Edif,
        }
    }
}

impl From<SynthesisMode> for NetlistInput {
    fn from(mode: SynthesisMode) -> Self {
        mode.netlist_input()
    }
}

impl std::fmt::Display for SynthesisMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for SynthesisMode {
    type Err = BuildError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "xst" => Ok(SynthesisMode::Xst),
            "yosys" => Ok(SynthesisMode::Yosys),
            "edif" => Ok(SynthesisMode::Edif),
            "mist" => Ok(SynthesisMode::Mist),
            _ => Err(BuildError::InvalidMode(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_modes() {
        for mode in SynthesisMode::ALL {
            assert_eq!(mode.as_str().parse::<SynthesisMode>().unwrap(), mode);
        }
        assert_eq!("XST".parse::<SynthesisMode>().unwrap(), SynthesisMode::Xst);
    }

    #[test]
    fn test_parse_invalid_mode() {
        let err = "vivado".parse::<SynthesisMode>().unwrap_err();
        assert!(matches!(err, BuildError::InvalidMode(ref m) if m == "vivado"));
    }

    #[test]
    fn test_netlist_input() {
        assert_eq!(SynthesisMode::Xst.netlist_input(), NetlistInput::Ngc);
        assert_eq!(SynthesisMode::Yosys.netlist_input(), NetlistInput::Edif);
        assert_eq!(SynthesisMode::Mist.netlist_input(), NetlistInput::Edif);
        assert!(SynthesisMode::Yosys.uses_verilog());
        assert!(!SynthesisMode::Edif.uses_verilog());
    }
}
