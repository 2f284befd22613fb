//! Command-line tools for the pooled storage network.
//!
//! Runs a scripted scenario against a [`storage_runtime::Host`] and inspects
//! the node records it leaves behind.
//!
//! Run with: `storage-cli <command>`

mod commands;
mod dirs;
mod report;

use anyhow::Result;
use clap::Parser;
use commands::{Clean, Demo, Inspect, List};

/// Tools for the pooled storage network
#[derive(Parser)]
#[command(name = "storage-cli")]
#[command(about = "Tools for the pooled storage network", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Run a scripted scenario and print node summaries
    Demo(Demo),

    /// Decode and inspect one saved node record
    Inspect(Inspect),

    /// List saved node records
    List(List),

    /// Delete saved node records
    Clean(Clean),
}

fn main() -> Result<()> {
    // Load .env file if it exists (for STORAGE_* variables)
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::Demo(cmd) => cmd.execute(),
        Command::Inspect(cmd) => cmd.execute(),
        Command::List(cmd) => cmd.execute(),
        Command::Clean(cmd) => cmd.execute(),
    };

    if let Err(err) = &result {
        report::log_failure(err);
    }
    result
}
