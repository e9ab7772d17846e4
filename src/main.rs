//! SmartBin command-line entry point.

use anyhow::Context as _;
use clap::Parser;
use smartbin::cli::Cli;
use smartbin::output;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet)?;

    match cli.run().await {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(e) => {
            output::print_error(&e.to_string());
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Log to stderr; `RUST_LOG` wins over the verbosity flags.
fn init_tracing(verbose: bool, quiet: bool) -> anyhow::Result<()> {
    let default = if verbose {
        "smartbin=debug"
    } else if quiet {
        "warn"
    } else {
        "smartbin=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))
        .context("failed to initialize logging")
}
