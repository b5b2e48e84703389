//! ashq-cli
//!
//! The external driver: wires a `BacktestConfig` and a `DataManager`
//! into a `BacktestEngine` and runs it to completion. `tracing`/
//! `dotenvy` are wired here and nowhere deeper in the workspace, so the
//! deterministic core crates stay free of logging/environment side
//! effects.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "ashq")]
#[command(about = "A-share backtesting engine CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute a layered config's canonical JSON + hash without running anything.
    ConfigHash {
        /// Paths in merge order (defaults -> overrides -> env).
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Run a full backtest and persist artifacts under the configured output dir.
    Run(commands::run::RunArgs),
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Commands::ConfigHash { paths } => commands::config_hash::run(&paths),
        Commands::Run(args) => commands::run::run(args),
    }
}
