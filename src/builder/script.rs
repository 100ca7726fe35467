//! Control script generation.
//!
//! The ISE flow is a fixed chain of tools. It is written out as one bash
//! script run with `set -e`, so the first failing tool stops the chain and
//! its exit code becomes the script's.

use serde::{Deserialize, Serialize};

use super::mode::NetlistInput;

/// Header of every generated control script.
pub const SCRIPT_HEADER: &str = "# Autogenerated by isebuild\nset -e\n";

/// Extension of the generated configuration image.
pub const BITSTREAM_EXT: &str = ".bit";

/// Option strings passed verbatim to each tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolOptions {
    pub xst: String,
    pub ngdbuild: String,
    pub map: String,
    pub par: String,
    pub bitgen: String,
    /// Trailing shell commands; `{build_name}` is substituted.
    pub commands: String,
}

impl Default for ToolOptions {
    fn default() -> Self {
        ToolOptions {
            xst: "-ifmt MIXED\n-opt_mode SPEED\n-register_balancing yes".to_string(),
            ngdbuild: String::new(),
            map: "-ol high -w".to_string(),
            par: "-ol high -w".to_string(),
            bitgen: "-g LCK_cycle:6 -g Binary:Yes -w".to_string(),
            commands: String::new(),
        }
    }
}

/// The command sequence driving the toolchain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlScript {
    /// Environment setup, run before any tool.
    pub prelude: Vec<String>,
    /// One command per tool, in execution order.
    pub stages: Vec<String>,
    /// Caller-supplied trailing commands, already substituted.
    pub trailer: String,
}

impl ControlScript {
    /// Assemble the ISE implementation flow for `build_name`.
    ///
    /// `xst` only runs when the netlist input is its own `.ngc` output.
    pub fn new(
        build_name: &str,
        prelude: Vec<String>,
        input: NetlistInput,
        opts: &ToolOptions,
    ) -> Self {
        let mut stages = Vec::new();

        if input == NetlistInput::Ngc {
            stages.push(format!("xst -ifn {build_name}.xst"));
        }

        let ext = input.extension();
        stages.push(format!(
            "ngdbuild {} -uc {build_name}.ucf {build_name}.{ext} {build_name}.ngd",
            opts.ngdbuild
        ));
        stages.push(format!(
            "map {} -o {build_name}_map.ncd {build_name}.ngd {build_name}.pcf",
            opts.map
        ));
        stages.push(format!(
            "par {} {build_name}_map.ncd {build_name}.ncd {build_name}.pcf",
            opts.par
        ));
        stages.push(format!(
            "bitgen {} {build_name}.ncd {build_name}{BITSTREAM_EXT}",
            opts.bitgen
        ));

        ControlScript {
            prelude,
            stages,
            trailer: opts.commands.replace("{build_name}", build_name),
        }
    }

    /// Render as bash source.
    pub fn render(&self) -> String {
        let mut out = String::from(SCRIPT_HEADER);
        for line in &self.prelude {
            out.push_str(line);
            out.push('\n');
        }
        out.push('\n');
        for stage in &self.stages {
            out.push_str(stage);
            out.push('\n');
        }
        out.push_str(&self.trailer);
        out
    }

    /// Whether the script runs XST.
    pub fn synthesizes(&self) -> bool {
        self.stages.iter().any(|s| s.starts_with("xst "))
    }
}

/// File name of the control script for `build_name`.
pub fn script_name(build_name: &str) -> String {
    format!("build_{}.sh", build_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::mode::SynthesisMode;

    #[test]
    fn test_xst_flow() {
        let script = ControlScript::new(
            "top",
            Vec::new(),
            SynthesisMode::Xst.into(),
            &ToolOptions::default(),
        );

        assert!(script.synthesizes());
        assert_eq!(
            script.render(),
            "# Autogenerated by isebuild\n\
             set -e\n\
             \n\
             xst -ifn top.xst\n\
             ngdbuild  -uc top.ucf top.ngc top.ngd\n\
             map -ol high -w -o top_map.ncd top.ngd top.pcf\n\
             par -ol high -w top_map.ncd top.ncd top.pcf\n\
             bitgen -g LCK_cycle:6 -g Binary:Yes -w top.ncd top.bit\n"
        );
    }

    #[test]
    fn test_edif_flow_skips_synthesis() {
        let script = ControlScript::new(
            "top",
            Vec::new(),
            SynthesisMode::Edif.into(),
            &ToolOptions::default(),
        );

        assert!(!script.synthesizes());
        assert!(!script.render().contains("xst"));
        assert_eq!(
            script.stages[0],
            "ngdbuild  -uc top.ucf top.edif top.ngd"
        );
    }

    #[test]
    fn test_prelude_and_trailer() {
        let opts = ToolOptions {
            ngdbuild: "-p xc6slx9".to_string(),
            commands: "cp {build_name}.bit /srv/tftp/\n".to_string(),
            ..ToolOptions::default()
        };
        let script = ControlScript::new(
            "soc",
            vec!["source /opt/Xilinx/14.7/ISE_DS/settings64.sh".to_string()],
            NetlistInput::Edif,
            &opts,
        );

        let text = script.render();
        assert!(text.starts_with(
            "# Autogenerated by isebuild\nset -e\nsource /opt/Xilinx/14.7/ISE_DS/settings64.sh\n"
        ));
        assert!(text.contains("ngdbuild -p xc6slx9 -uc soc.ucf soc.edif soc.ngd\n"));
        assert!(text.ends_with("bitgen -g LCK_cycle:6 -g Binary:Yes -w soc.ncd soc.bit\ncp soc.bit /srv/tftp/\n"));
    }

    #[test]
    fn test_script_name() {
        assert_eq!(script_name("top"), "build_top.sh");
    }
}
