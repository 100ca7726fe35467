//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

/// isebuild - Build driver for the Xilinx ISE toolchain
#[derive(Parser)]
#[command(name = "isebuild")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate toolchain inputs and build a bitstream
    Build(BuildArgs),

    /// Show the ISE installation a build would use
    Toolchain(ToolchainArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum MessageFormat {
    #[default]
    Human,
    Json,
}

#[derive(Args)]
pub struct BuildArgs {
    /// Path to Isebuild.toml (defaults to searching upwards)
    #[arg(long)]
    pub manifest_path: Option<PathBuf>,

    /// Synthesis mode: xst, yosys, edif or mist
    #[arg(short, long)]
    pub mode: Option<String>,

    /// Build directory
    #[arg(long)]
    pub build_dir: Option<PathBuf>,

    /// Base name of the generated files
    #[arg(long)]
    pub build_name: Option<String>,

    /// ISE installation root
    #[arg(long, env = "XILINX_ISE_PATH")]
    pub ise_path: Option<PathBuf>,

    /// Do not source the ISE settings script
    #[arg(long)]
    pub no_source: bool,

    /// Generate files only, do not run the toolchain
    #[arg(long)]
    pub no_run: bool,

    /// Output format for the build report
    #[arg(long, value_enum, default_value_t)]
    pub message_format: MessageFormat,
}

#[derive(Args)]
pub struct ToolchainArgs {
    /// ISE installation root
    #[arg(long, env = "XILINX_ISE_PATH")]
    pub ise_path: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t)]
    pub message_format: MessageFormat,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
