//! Implementation of `isebuild build`.
//!
//! The build runs inside the build directory: design text, project files,
//! constraints and the control script are written there, and every external
//! tool runs there. The previous working directory is restored on every exit
//! path. Artifacts written before a failure are left in place.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Serialize;
use thiserror::Error;

use crate::builder::errors::{BuildError, Stage};
use crate::builder::lowering::LoweringTable;
use crate::builder::mode::{NetlistInput, SynthesisMode};
use crate::builder::script::{script_name, ControlScript, ToolOptions, BITSTREAM_EXT};
use crate::builder::toolchain::environment_prelude;
use crate::builder::{ucf, xst, yosys};
use crate::core::design::{DesignGenerator, EdifTarget, GeneratedDesign, SpecializedSynthesizer};
use crate::core::device::Device;
use crate::core::source::SourceFile;
use crate::util::fs::{absolutize, ensure_dir, write_string, WorkdirGuard};
use crate::util::process::{ProcessBuilder, Runner};

/// Default ISE installation root.
pub const DEFAULT_ISE_PATH: &str = "/opt/Xilinx";

/// Options for the build command.
///
/// Constructed once per build and never modified by it.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Target part
    pub device: Device,

    /// Build directory, created if missing
    pub build_dir: PathBuf,

    /// Base name of every generated file
    pub build_name: String,

    /// ISE installation root
    pub ise_path: PathBuf,

    /// Source the ISE settings script in the control script
    pub source: bool,

    /// Run the toolchain after generating files
    pub run: bool,

    /// Synthesis mode
    pub mode: SynthesisMode,

    /// Per-tool option strings
    pub tool_options: ToolOptions,

    /// Additional HDL sources, ahead of the generated top module
    pub sources: Vec<SourceFile>,

    /// Verilog include directories
    pub include_paths: Vec<PathBuf>,
}

impl BuildOptions {
    pub fn new(device: Device) -> Self {
        BuildOptions {
            device,
            build_dir: PathBuf::from("build"),
            build_name: "top".to_string(),
            ise_path: PathBuf::from(DEFAULT_ISE_PATH),
            source: true,
            run: true,
            mode: SynthesisMode::default(),
            tool_options: ToolOptions::default(),
            sources: Vec::new(),
            include_paths: Vec::new(),
        }
    }
}

/// Collaborators of a build.
pub struct BuildContext<'a> {
    /// Executes yosys and the control script.
    pub runner: &'a dyn Runner,

    /// Primitive substitutions handed to verilog generation.
    pub lowering: LoweringTable,

    /// Required by [`SynthesisMode::Mist`].
    pub synthesizer: Option<&'a dyn SpecializedSynthesizer>,
}

impl<'a> BuildContext<'a> {
    /// A context with the Xilinx primitive substitutions.
    pub fn new(runner: &'a dyn Runner) -> Self {
        BuildContext {
            runner,
            lowering: LoweringTable::xilinx(),
            synthesizer: None,
        }
    }

    /// Replace or add primitive lowerings.
    pub fn with_overrides(mut self, overrides: LoweringTable) -> Self {
        self.lowering.merge(overrides);
        self
    }

    pub fn with_synthesizer(mut self, synthesizer: &'a dyn SpecializedSynthesizer) -> Self {
        self.synthesizer = Some(synthesizer);
        self
    }
}

/// Orchestrator states, in the order a successful build visits them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildState {
    ChangeDir,
    SelectMode,
    GenerateDesign,
    GenerateProject,
    WriteConstraints,
    WriteAndRunScript,
    Done,
    Failed,
}

impl fmt::Display for BuildState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BuildState::ChangeDir => "entering the build directory",
            BuildState::SelectMode => "selecting the synthesis mode",
            BuildState::GenerateDesign => "generating the design",
            BuildState::GenerateProject => "generating the synthesis project",
            BuildState::WriteConstraints => "writing constraints",
            BuildState::WriteAndRunScript => "running the toolchain",
            BuildState::Done => "done",
            BuildState::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Error context attached to every failed build.
///
/// `states` is the trace up to the failure and ends with
/// [`BuildState::Failed`].
#[derive(Debug, Clone, Error)]
#[error("build failed while {failed_in}")]
pub struct BuildFailure {
    pub failed_in: BuildState,
    pub states: Vec<BuildState>,
}

/// What a build did.
#[derive(Debug, Clone, Serialize)]
pub struct BuildReport {
    pub mode: SynthesisMode,
    pub netlist_input: NetlistInput,
    pub build_dir: PathBuf,
    /// Generated file names, in write order.
    pub files: Vec<String>,
    pub ran_toolchain: bool,
    pub bitstream: Option<PathBuf>,
    pub states: Vec<BuildState>,
}

impl BuildReport {
    fn enter(&mut self, state: BuildState) {
        tracing::debug!("{}", state);
        self.states.push(state);
    }

    fn current(&self) -> BuildState {
        self.states.last().copied().unwrap_or(BuildState::ChangeDir)
    }
}

/// Paths resolved against the invocation directory, so they stay valid
/// after entering the build directory.
struct ResolvedPaths {
    build_dir: PathBuf,
    ise_path: PathBuf,
    sources: Vec<SourceFile>,
    include_paths: Vec<PathBuf>,
}

/// Build `design` into a bitstream.
pub fn build(
    design: &dyn DesignGenerator,
    opts: &BuildOptions,
    ctx: &BuildContext<'_>,
) -> Result<BuildReport> {
    if opts.mode == SynthesisMode::Mist && ctx.synthesizer.is_none() {
        bail!(
            "`mist` mode needs a specialized synthesizer\n\
             hint: add a [mist] section to the manifest"
        );
    }

    let cwd = std::env::current_dir().context("failed to read the current working directory")?;
    let paths = ResolvedPaths {
        build_dir: absolutize(&cwd, &opts.build_dir),
        ise_path: absolutize(&cwd, &opts.ise_path),
        sources: opts
            .sources
            .iter()
            .map(|s| SourceFile::new(absolutize(&cwd, &s.path), s.language))
            .collect(),
        include_paths: opts
            .include_paths
            .iter()
            .map(|p| absolutize(&cwd, p))
            .collect(),
    };

    let mut report = BuildReport {
        mode: opts.mode,
        netlist_input: opts.mode.netlist_input(),
        build_dir: paths.build_dir.clone(),
        files: Vec::new(),
        ran_toolchain: false,
        bitstream: None,
        states: Vec::new(),
    };

    report.enter(BuildState::ChangeDir);
    ensure_dir(&paths.build_dir)?;
    let result = {
        let _guard = WorkdirGuard::enter(&paths.build_dir)?;
        run_stages(design, opts, ctx, &paths, &mut report)
    };

    match result {
        Ok(()) => {
            report.enter(BuildState::Done);
            Ok(report)
        }
        Err(e) => {
            let failed_in = report.current();
            report.enter(BuildState::Failed);
            Err(e.context(BuildFailure {
                failed_in,
                states: report.states,
            }))
        }
    }
}

fn run_stages(
    design: &dyn DesignGenerator,
    opts: &BuildOptions,
    ctx: &BuildContext<'_>,
    paths: &ResolvedPaths,
    report: &mut BuildReport,
) -> Result<()> {
    let dir = paths.build_dir.as_path();
    let name = opts.build_name.as_str();

    report.enter(BuildState::SelectMode);
    tracing::info!(
        "building `{}` for {} with {}",
        name,
        opts.device,
        opts.mode
    );
    let mut ngdbuild_opt = opts.tool_options.ngdbuild.clone();

    report.enter(BuildState::GenerateDesign);
    let generated = match opts.mode {
        SynthesisMode::Xst | SynthesisMode::Yosys => {
            let generated = design.get_verilog(&ctx.lowering)?;
            let v_file = format!("{}.v", name);
            write_artifact(dir, &v_file, &generated.text, report)?;

            let mut sources = paths.sources.clone();
            sources.push(SourceFile::verilog(&v_file));

            report.enter(BuildState::GenerateProject);
            if opts.mode == SynthesisMode::Xst {
                let files = xst::write_xst_files(
                    dir,
                    &opts.device,
                    &sources,
                    &paths.include_paths,
                    name,
                    &opts.tool_options.xst,
                )?;
                report.files.extend(files);
            } else {
                let ys = yosys::run_yosys(
                    ctx.runner,
                    dir,
                    &opts.device,
                    &sources,
                    &paths.include_paths,
                    name,
                )?;
                report.files.push(ys);
                // ngdbuild cannot infer the part from a yosys EDIF.
                append_option(&mut ngdbuild_opt, &format!("-p {}", opts.device));
            }
            generated
        }
        SynthesisMode::Edif | SynthesisMode::Mist => {
            if opts.mode == SynthesisMode::Mist {
                if let Some(synthesizer) = ctx.synthesizer {
                    synthesizer.synthesize(design, &design.io_signals())?;
                }
            }
            let generated = design.get_edif(&EdifTarget::xilinx(&opts.device))?;
            write_artifact(dir, &format!("{}.edif", name), &generated.text, report)?;
            generated
        }
    };

    report.enter(BuildState::WriteConstraints);
    write_constraints(dir, name, &generated, report)?;

    if !opts.run {
        tracing::info!("not running the toolchain, files are in {}", dir.display());
        return Ok(());
    }

    report.enter(BuildState::WriteAndRunScript);
    let prelude = environment_prelude(&paths.ise_path, opts.source)?;
    let tool_options = ToolOptions {
        ngdbuild: ngdbuild_opt,
        ..opts.tool_options.clone()
    };
    let script = ControlScript::new(name, prelude, opts.mode.netlist_input(), &tool_options);
    let script_file = script_name(name);
    write_artifact(dir, &script_file, &script.render(), report)?;

    tracing::info!("running {}", script_file);
    let cmd = ProcessBuilder::new("bash").arg(&script_file);
    let code = ctx.runner.run(&cmd)?;
    if code != Some(0) {
        return Err(BuildError::Subprocess {
            stage: Stage::ControlScript,
            code,
        }
        .into());
    }

    report.ran_toolchain = true;
    report.bitstream = Some(dir.join(format!("{}{}", name, BITSTREAM_EXT)));
    Ok(())
}

fn write_constraints(
    dir: &Path,
    name: &str,
    generated: &GeneratedDesign,
    report: &mut BuildReport,
) -> Result<()> {
    let text = ucf::build_ucf(&generated.signal_constraints, &generated.platform_commands);
    write_artifact(dir, &format!("{}.ucf", name), &text, report)
}

fn write_artifact(dir: &Path, file: &str, contents: &str, report: &mut BuildReport) -> Result<()> {
    write_string(&dir.join(file), contents)?;
    report.files.push(file.to_string());
    Ok(())
}

fn append_option(opts: &mut String, extra: &str) {
    if !opts.is_empty() {
        opts.push(' ');
    }
    opts.push_str(extra);
}
