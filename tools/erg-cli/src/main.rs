//! ERG CLI - inspect and export CarMaker ERG result files
//!
//! # Commands
//!
//! - `erg info` - Print flavor, geometry and the quantity catalog
//! - `erg read` - Print the values of one quantity
//! - `erg export` - Write the whole table as CSV or JSON
//! - `erg check` - Probe files for readability
//!
//! # Usage
//!
//! ```bash
//! # Catalog of a result file
//! erg info run_001.erg
//!
//! # Records 100..200 of one quantity
//! erg read run_001.erg Car.v --start 100 --count 100
//!
//! # Selected quantities as CSV
//! erg export run_001.erg -o run_001.csv -q Time -q Car.v
//! ```
//!
//! # Configuration (erg.toml)
//!
//! ```toml
//! [reader]
//! chunk_records = 65536
//!
//! [export]
//! format = "csv"
//! delimiter = ";"
//! units_row = true
//! ```

mod check;
mod config;
mod export;
mod info;
mod read;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::debug;

/// ERG CLI - inspect and export CarMaker ERG result files
#[derive(Parser)]
#[command(name = "erg")]
#[command(about = "Inspect and export CarMaker ERG result files")]
#[command(version)]
struct Cli {
    /// Configuration file (defaults to erg.toml in the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log progress at info level (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print flavor, geometry and the quantity catalog
    Info(info::InfoArgs),

    /// Print the values of one quantity, one per line
    Read(read::ReadArgs),

    /// Export quantities as CSV or JSON
    Export(export::ExportArgs),

    /// Check that files open cleanly
    Check(check::CheckArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = config::load(cli.config.as_deref())?;
    debug!(?config, "loaded configuration");

    match cli.command {
        Commands::Info(args) => info::execute(args, &config),
        Commands::Read(args) => read::execute(args, &config),
        Commands::Export(args) => export::execute(args, &config),
        Commands::Check(args) => check::execute(args, &config),
    }
}
