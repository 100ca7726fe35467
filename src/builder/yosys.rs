//! Yosys synthesis to EDIF.

use std::path::{Path, PathBuf};

use anyhow::Result;

use super::errors::{BuildError, Stage};
use crate::core::device::Device;
use crate::core::source::SourceFile;
use crate::util::fs::write_string;
use crate::util::process::{yosys_program, ProcessBuilder, Runner};

/// Render the yosys script that reads every source and writes
/// `<build_name>.edif`.
pub fn render_yosys_script(
    device: &Device,
    sources: &[SourceFile],
    include_paths: &[PathBuf],
    build_name: &str,
) -> Result<String, BuildError> {
    let arch = device.synth_arch()?;

    let incflags: String = include_paths
        .iter()
        .map(|p| format!(" -I{}", p.display()))
        .collect();

    let mut out = String::new();
    for source in sources {
        out.push_str(&format!(
            "read_{}{} {}\n",
            source.language,
            incflags,
            source.path.display()
        ));
    }

    out.push_str(&format!(
        "hierarchy -check -top top\n\
         proc; memory; opt; fsm; opt\n\
         synth_xilinx -arch {arch} -top top -edif {build_name}.edif"
    ));

    Ok(out)
}

/// Write `<build_name>.ys` into `dir` and run yosys on it.
///
/// yosys runs in the current working directory, so `dir` is expected to be
/// it. Any non-zero exit is fatal.
pub fn run_yosys(
    runner: &dyn Runner,
    dir: &Path,
    device: &Device,
    sources: &[SourceFile],
    include_paths: &[PathBuf],
    build_name: &str,
) -> Result<String> {
    let script = render_yosys_script(device, sources, include_paths, build_name)?;
    let ys_name = format!("{}.ys", build_name);
    write_string(&dir.join(&ys_name), &script)?;

    tracing::info!("synthesizing with yosys ({})", device.synth_arch()?);
    let cmd = ProcessBuilder::new(yosys_program()).arg(&ys_name);
    let code = runner.run(&cmd)?;
    if code != Some(0) {
        return Err(BuildError::Subprocess {
            stage: Stage::Yosys,
            code,
        }
        .into());
    }

    Ok(ys_name)
}
