//! Test fixtures for common test scenarios.

use std::path::Path;

/// A small Spartan-6 design: a clock, a two-bit LED bus, a synchronized
/// button and one extra source.
pub const BLINKY_MANIFEST: &str = r#"platform_commands = ["CONFIG VCCAUX = \"3.3\";"]

[design]
device = "xc6slx9-tqg144-2"
verilog = "gen/top.v"
sources = ["rtl/*.v"]
include_dirs = ["rtl/include"]

[[signal]]
name = "clk50"
pins = ["P56"]
iostandard = "LVCMOS33"

[[signal]]
name = "user_led"
pins = ["P11", "N9"]
iostandard = "LVCMOS33"
drive = 12
slew = "fast"

[[clock]]
name = "clk50"
period = 20.0

[[primitive]]
kind = "multi_reg"
input = "btn"
output = "btn_sync"
odomain = "sys"
"#;

/// Generated top module matching [`BLINKY_MANIFEST`].
pub const BLINKY_TOP_V: &str = r#"module top(input clk50, output [1:0] user_led);
wire sys_clk = clk50;
reg btn;
wire btn_sync;
reg [23:0] counter;
always @(posedge sys_clk) counter <= counter + 1'd1;
assign user_led = counter[23:22];
endmodule
"#;

/// Write the blinky project into `root`.
pub fn write_project(root: &Path) {
    write(root, "Isebuild.toml", BLINKY_MANIFEST);
    write(root, "gen/top.v", BLINKY_TOP_V);
    write(root, "rtl/debounce.v", "module debounce(input i, output o);\nassign o = i;\nendmodule\n");
    write(root, "rtl/include/defines.vh", "`define WIDTH 24\n");
}

/// Write the blinky project with an EDIF artifact instead of verilog.
pub fn write_edif_project(root: &Path) {
    let manifest = BLINKY_MANIFEST.replace("verilog = \"gen/top.v\"", "edif = \"gen/top.edif\"");
    write(root, "Isebuild.toml", &manifest);
    write(root, "gen/top.edif", "(edif top (edifVersion 2 0 0))\n");
}

fn write(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("failed to create fixture directory");
    }
    std::fs::write(&path, contents).expect("failed to write fixture");
}
