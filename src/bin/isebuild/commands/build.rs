//! `isebuild build` command

use anyhow::Result;

use super::{config_for, ise_path};
use crate::cli::{BuildArgs, MessageFormat};
use isebuild::builder::SynthesisMode;
use isebuild::core::manifest::find_manifest;
use isebuild::ops::{build, BuildContext, BuildOptions};
use isebuild::util::fs::{absolutize, relative_path};
use isebuild::util::SystemRunner;
use isebuild::PrecompiledDesign;

pub fn execute(args: BuildArgs) -> Result<()> {
    // Mode errors are reported before anything touches the filesystem.
    let cli_mode = args
        .mode
        .as_deref()
        .map(str::parse::<SynthesisMode>)
        .transpose()?;

    let cwd = std::env::current_dir()?;
    let manifest_path = match args.manifest_path {
        Some(path) => absolutize(&cwd, &path),
        None => find_manifest(&cwd)?,
    };
    let project_root = manifest_path
        .parent()
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| cwd.clone());

    let config = config_for(&project_root);
    let mode = match cli_mode {
        Some(mode) => mode,
        None => config.mode()?.unwrap_or_default(),
    };

    let design = PrecompiledDesign::load(&manifest_path)?;

    let mut opts = BuildOptions::new(design.device().clone());
    opts.mode = mode;
    // Command-line paths are relative to the invocation directory,
    // configured ones to the project root.
    opts.build_dir = match args.build_dir {
        Some(dir) => absolutize(&cwd, &dir),
        None => absolutize(
            &project_root,
            config
                .build
                .build_dir
                .as_deref()
                .unwrap_or(&opts.build_dir),
        ),
    };
    if let Some(name) = args.build_name.or_else(|| config.build.build_name.clone()) {
        opts.build_name = name;
    }
    opts.ise_path = ise_path(args.ise_path, &config, &cwd, &project_root);
    opts.source = !args.no_source && config.toolchain.source.unwrap_or(true);
    opts.run = !args.no_run && config.build.run.unwrap_or(true);
    opts.tool_options = config.tool_options();
    opts.sources = design.extra_sources()?;
    opts.include_paths = design.include_dirs();

    let runner = SystemRunner;
    let mist = design.mist(runner);
    let mut ctx = BuildContext::new(&runner);
    if let Some(ref synthesizer) = mist {
        ctx = ctx.with_synthesizer(synthesizer);
    }

    let report = build(&design, &opts, &ctx)?;

    match args.message_format {
        MessageFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        MessageFormat::Human => {
            for file in &report.files {
                let path = relative_path(&cwd, &report.build_dir.join(file));
                eprintln!("   Generated {}", path.display());
            }
            match report.bitstream {
                Some(ref bit) => eprintln!("    Finished `{}` -> {}", opts.build_name, bit.display()),
                None => eprintln!(
                    "    Finished `{}` ({} mode, toolchain not run)",
                    opts.build_name, report.mode
                ),
            }
        }
    }

    Ok(())
}
