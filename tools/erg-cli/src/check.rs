//! Check command - probe files for readability

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Args;
use erg::Reader;
use tracing::warn;

use crate::config::Config;

/// Arguments for the check command
#[derive(Args)]
pub struct CheckArgs {
    /// ERG data files to check
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

/// Execute the check command
pub fn execute(args: CheckArgs, config: &Config) -> Result<()> {
    let mut reader = Reader::with_config(config.reader.clone());
    let mut failed = 0;

    for file in &args.files {
        match reader.open(file) {
            Ok(()) => println!(
                "ok    {} ({} records, {} quantities)",
                file.display(),
                reader.records()?,
                reader.num_quantities()?
            ),
            Err(err) => {
                warn!(file = %file.display(), %err, "check failed");
                println!("FAIL  {}: {err}", file.display());
                failed += 1;
            }
        }
    }
    reader.close();

    if failed > 0 {
        bail!("{failed} of {} files could not be read", args.files.len());
    }
    Ok(())
}
