//! `isebuild toolchain` command

use anyhow::Result;

use super::{config_for, ise_path, project_root};
use crate::cli::{MessageFormat, ToolchainArgs};
use isebuild::ops::toolchain_info::{format_report, inspect_toolchain};

pub fn execute(args: ToolchainArgs, verbose: bool) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let root = project_root(&cwd);
    let config = config_for(&root);
    let report = inspect_toolchain(&ise_path(args.ise_path, &config, &cwd, &root));

    match args.message_format {
        MessageFormat::Human => print!("{}", format_report(&report, verbose)),
        MessageFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    Ok(())
}
