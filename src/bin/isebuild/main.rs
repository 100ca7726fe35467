//! isebuild CLI - Build driver for the Xilinx ISE toolchain

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use isebuild::BuildError;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        // A failed tool's exit code becomes ours.
        let code = e
            .downcast_ref::<BuildError>()
            .and_then(BuildError::exit_code)
            .filter(|c| *c != 0)
            .unwrap_or(1);
        std::process::exit(code);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("isebuild=debug")
    } else {
        EnvFilter::new("isebuild=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Build(args) => commands::build::execute(args),
        Commands::Toolchain(args) => commands::toolchain::execute(args, cli.verbose),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
