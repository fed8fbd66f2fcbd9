//! `doorway` - door access-control gate.
//!
//! # Usage
//!
//! ```bash
//! # Run the gate with ./doorway.toml (or built-in defaults)
//! doorway run
//!
//! # Use an explicit configuration file
//! doorway --config /etc/doorway.toml run
//!
//! # Print the identifier of the next tag presented to the reader
//! doorway read-one
//! ```
//!
//! # Environment Variables
//!
//! - `DOORWAY_CONFIG`: configuration file used when `--config` is absent
//! - `RUST_LOG`: log filter (default: info)
//!
//! Logs go to stderr; stdout carries only feedback lines (`run`) or the tag
//! read (`read-one`).

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use doorway_core::Config;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod wiring;

/// Door access-control gate
#[derive(Parser, Debug)]
#[command(name = "doorway")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Command {
    /// Run both credential sources until Ctrl-C or SIGTERM
    Run,

    /// Wait for one tag, print its identifier and text, then exit
    ReadOne,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start the async runtime")?;

    let result = runtime.block_on(async {
        match cli.command {
            Command::Run => commands::run(&config).await,
            Command::ReadOne => commands::read_one(&config).await,
        }
    });

    // Line drivers may still be parked in a blocking read (FIFO, device,
    // stdin); exit without joining them.
    runtime.shutdown_background();
    result
}
