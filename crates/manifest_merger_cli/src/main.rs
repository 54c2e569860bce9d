use clap::{Parser, Subcommand};
use manifest_merger_cli::commands::merge_cmd::{self, MergeArgs};
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;

/// manifest-merger CLI: Upgrade a customized manifest between two baselines
#[derive(Parser)]
#[command(name = "manifest-merger")]
#[command(about = "Three-way merge of project manifests", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge the target baseline into an installed manifest
    #[command()]
    Merge(MergeArgs),

    /// Show the CLI version
    Version,
}

fn main() {
    // Diagnostics go to stderr, stdout carries the patch.
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_env("MANIFEST_MERGER_LOG"))
        .init();

    let cli = Cli::parse();
    match &cli.command {
        Commands::Merge(args) => {
            if let Err(e) = merge_cmd::execute(args) {
                error!("Error: {e}");
                std::process::exit(e.exit_code());
            }
        }
        Commands::Version => {
            println!(
                "manifest-merger version {}",
                option_env!("MANIFEST_MERGER_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"))
            );
        }
    }
}
