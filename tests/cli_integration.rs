//! CLI integration tests for isebuild.
//!
//! These tests drive the binary against small projects in temporary
//! directories. None of them needs an ISE installation.

use std::fs;
use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

const MANIFEST: &str = r#"platform_commands = ["CONFIG VCCAUX = \"3.3\";"]

[design]
device = "xc6slx9-tqg144-2"
verilog = "gen/top.v"
edif = "gen/top.edif"
sources = ["rtl/*.v"]

[[signal]]
name = "clk50"
pins = ["P56"]
iostandard = "LVCMOS33"

[[signal]]
name = "user_led"
pins = ["P11", "N9"]
drive = 12

[[clock]]
name = "clk50"
period = 20.0
"#;

/// Get the isebuild binary command, isolated from the user's configuration.
fn isebuild(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("isebuild").unwrap();
    cmd.env("HOME", home).env_remove("XILINX_ISE_PATH");
    cmd
}

/// Create a project with both a verilog and an EDIF artifact.
fn project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    fs::write(root.join("Isebuild.toml"), MANIFEST).unwrap();
    fs::create_dir_all(root.join("gen")).unwrap();
    fs::create_dir_all(root.join("rtl")).unwrap();
    fs::write(
        root.join("gen/top.v"),
        "module top(input clk50, output [1:0] user_led);\nendmodule\n",
    )
    .unwrap();
    fs::write(root.join("gen/top.edif"), "(edif top (edifVersion 2 0 0))\n").unwrap();
    fs::write(root.join("rtl/blink.v"), "module blink();\nendmodule\n").unwrap();
    tmp
}

// ============================================================================
// isebuild build
// ============================================================================

#[test]
fn test_build_xst_generates_project_files() {
    let tmp = project();
    let build = tmp.path().join("build");

    isebuild(tmp.path())
        .args(["build", "--no-run", "--no-source"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("toolchain not run"));

    for file in ["top.v", "top.prj", "top.xst", "top.ucf"] {
        assert!(build.join(file).exists(), "missing {}", file);
    }
    assert!(!build.join("build_top.sh").exists());

    let prj = fs::read_to_string(build.join("top.prj")).unwrap();
    assert!(prj.contains("rtl/blink.v\n"));
    assert!(prj.ends_with("verilog work top.v\n"));
}

#[test]
fn test_build_edif_writes_constraints() {
    let tmp = project();
    let build = tmp.path().join("build");

    isebuild(tmp.path())
        .args(["build", "--no-run", "--mode", "edif"])
        .current_dir(tmp.path())
        .assert()
        .success();

    assert!(build.join("top.edif").exists());
    assert!(!build.join("top.v").exists());

    let ucf = fs::read_to_string(build.join("top.ucf")).unwrap();
    assert!(ucf.starts_with("NET \"clk50\" LOC=P56 | IOSTANDARD=LVCMOS33; # clk50:0\n"));
    assert!(ucf.contains("NET \"user_led(1)\" LOC=N9 | DRIVE=12; # user_led:0\n"));
    assert!(ucf.contains("TIMESPEC \"TSclk50\" = PERIOD \"GRPclk50\" 20 ns HIGH 50%;"));
    assert!(ucf.ends_with("CONFIG VCCAUX = \"3.3\";"));
}

#[test]
fn test_build_custom_dir_and_name() {
    let tmp = project();

    isebuild(tmp.path())
        .args([
            "build",
            "--no-run",
            "--build-dir",
            "out/fpga",
            "--build-name",
            "blinky",
        ])
        .current_dir(tmp.path())
        .assert()
        .success();

    let out = tmp.path().join("out/fpga");
    assert!(out.join("blinky.xst").exists());
    let xst = fs::read_to_string(out.join("blinky.xst")).unwrap();
    assert!(xst.contains("-ofn blinky.ngc\n"));
}

#[test]
fn test_build_json_report() {
    let tmp = project();

    let output = isebuild(tmp.path())
        .args(["build", "--no-run", "--mode", "edif", "--message-format", "json"])
        .current_dir(tmp.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["mode"], "edif");
    assert_eq!(report["netlist_input"], "edif");
    assert_eq!(report["ran_toolchain"], false);
    assert_eq!(report["files"], serde_json::json!(["top.edif", "top.ucf"]));
}

#[test]
fn test_build_reads_project_config() {
    let tmp = project();
    fs::create_dir_all(tmp.path().join(".isebuild")).unwrap();
    fs::write(
        tmp.path().join(".isebuild/config.toml"),
        "[build]\nbuild_name = \"soc\"\nrun = false\n\n[options]\nxst = \"-opt_mode AREA\"\n",
    )
    .unwrap();

    isebuild(tmp.path())
        .args(["build"])
        .current_dir(tmp.path())
        .assert()
        .success();

    let xst = fs::read_to_string(tmp.path().join("build/soc.xst")).unwrap();
    assert!(xst.contains("-opt_mode AREA\n"));
}

#[test]
fn test_build_invalid_mode() {
    let tmp = project();

    isebuild(tmp.path())
        .args(["build", "--mode", "vivado"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("invalid synthesis mode `vivado`"));

    assert!(!tmp.path().join("build").exists());
}

#[test]
fn test_build_without_manifest() {
    let tmp = TempDir::new().unwrap();

    isebuild(tmp.path())
        .args(["build"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("could not find `Isebuild.toml`"));
}

#[test]
fn test_build_mist_needs_synthesizer() {
    let tmp = project();

    isebuild(tmp.path())
        .args(["build", "--mode", "mist"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("specialized synthesizer"));
}

#[test]
fn test_build_missing_ise_installation() {
    let tmp = project();

    isebuild(tmp.path())
        .args(["build", "--ise-path"])
        .arg(tmp.path().join("Xilinx"))
        .current_dir(tmp.path())
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("no ISE installation found"));

    // Generation finished before the toolchain was needed.
    assert!(tmp.path().join("build/top.ucf").exists());
}

#[cfg(unix)]
#[test]
fn test_build_propagates_toolchain_exit_code() {
    let tmp = project();

    // Without ISE on PATH the first tool is not found and bash exits 127.
    isebuild(tmp.path())
        .args(["build", "--no-source", "--mode", "edif"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .code(127)
        .stderr(predicate::str::contains("toolchain script failed with exit code 127"));

    let script = fs::read_to_string(tmp.path().join("build/build_top.sh")).unwrap();
    assert!(script.starts_with("# Autogenerated by isebuild\nset -e\n"));
}

#[cfg(unix)]
#[test]
fn test_build_killed_toolchain_exits_with_one() {
    use std::os::unix::fs::PermissionsExt;

    let tmp = project();
    let bin = tmp.path().join("fake-bin");
    fs::create_dir_all(&bin).unwrap();
    let ngdbuild = bin.join("ngdbuild");
    fs::write(&ngdbuild, "#!/bin/sh\nkill -9 $PPID\n").unwrap();
    fs::set_permissions(&ngdbuild, fs::Permissions::from_mode(0o755)).unwrap();
    let path = format!("{}:{}", bin.display(), std::env::var("PATH").unwrap_or_default());

    // ngdbuild kills the control script, which then has no exit code.
    isebuild(tmp.path())
        .args(["build", "--no-source", "--mode", "edif"])
        .env("PATH", path)
        .current_dir(tmp.path())
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("terminated by signal"));
}

#[cfg(unix)]
#[test]
fn test_build_from_subdirectory_uses_configured_ise_path() {
    let tmp = project();
    let root = tmp.path();
    let ise_ds = root.join("ise/14.7/ISE_DS");
    fs::create_dir_all(&ise_ds).unwrap();
    fs::write(ise_ds.join("settings32.sh"), "").unwrap();
    fs::write(ise_ds.join("settings64.sh"), "").unwrap();
    fs::create_dir_all(root.join(".isebuild")).unwrap();
    fs::write(
        root.join(".isebuild/config.toml"),
        "[toolchain]\nise_path = \"ise\"\n",
    )
    .unwrap();
    fs::create_dir_all(root.join("sub")).unwrap();

    // The settings script is found; the ISE tools themselves are not.
    isebuild(root)
        .args(["build", "--mode", "edif"])
        .current_dir(root.join("sub"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("no ISE installation found").not())
        .stderr(predicate::str::contains("toolchain script failed"));

    let script = fs::read_to_string(root.join("build/build_top.sh")).unwrap();
    let ise_ds = root.canonicalize().unwrap().join("ise/14.7/ISE_DS");
    let source = format!("source {}", ise_ds.join("settings").display());
    assert!(script.contains(&source), "script was:\n{}", script);
}

// ============================================================================
// isebuild toolchain / completions
// ============================================================================

#[test]
fn test_toolchain_reports_missing_installation() {
    let tmp = TempDir::new().unwrap();

    isebuild(tmp.path())
        .args(["toolchain", "--ise-path"])
        .arg(tmp.path().join("Xilinx"))
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Version: none"))
        .stdout(predicate::str::contains("[!!] ISE installation"));
}

#[test]
fn test_toolchain_env_var() {
    let tmp = TempDir::new().unwrap();
    fs::create_dir_all(tmp.path().join("ise/14.7/ISE_DS")).unwrap();

    isebuild(tmp.path())
        .args(["toolchain"])
        .env("XILINX_ISE_PATH", tmp.path().join("ise"))
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Version: 14.7"));
}

#[test]
fn test_toolchain_from_subdirectory_reads_project_config() {
    let tmp = project();
    let root = tmp.path();
    fs::create_dir_all(root.join("ise/14.7/ISE_DS")).unwrap();
    fs::create_dir_all(root.join(".isebuild")).unwrap();
    fs::write(
        root.join(".isebuild/config.toml"),
        "[toolchain]\nise_path = \"ise\"\n",
    )
    .unwrap();
    fs::create_dir_all(root.join("rtl/include")).unwrap();

    isebuild(root)
        .args(["toolchain"])
        .current_dir(root.join("rtl/include"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Version: 14.7"));
}

#[test]
fn test_completions_bash() {
    let tmp = TempDir::new().unwrap();

    isebuild(tmp.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("isebuild"));
}

#[test]
fn test_help() {
    let tmp = TempDir::new().unwrap();

    isebuild(tmp.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("build"))
        .stdout(predicate::str::contains("toolchain"));
}
