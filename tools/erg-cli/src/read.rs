//! Read command - print the values of one quantity

use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use erg::{QuantityKey, Reader};

use crate::config::Config;

/// Arguments for the read command
#[derive(Args)]
pub struct ReadArgs {
    /// ERG data file
    pub file: PathBuf,

    /// Quantity name, or its catalog index
    pub quantity: String,

    /// First record to print
    #[arg(long, default_value_t = 0)]
    pub start: usize,

    /// Number of records to print (default: through the last record)
    #[arg(long)]
    pub count: Option<usize>,
}

/// Execute the read command
pub fn execute(args: ReadArgs, config: &Config) -> Result<()> {
    let mut reader = Reader::with_config(config.reader.clone());
    reader
        .open(&args.file)
        .with_context(|| format!("Failed to open {}", args.file.display()))?;

    let key = resolve_key(&reader, &args.quantity);
    let column = match args.count {
        Some(count) => reader.read_range(key, args.start, count),
        None => reader.read_from(key, args.start),
    }
    .with_context(|| format!("Failed to read '{}'", args.quantity))?;

    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    for value in (0..column.len()).filter_map(|i| column.get(i)) {
        writeln!(out, "{value}")?;
    }
    out.flush()?;
    Ok(())
}

/// Names win over indices so a quantity literally called "3" stays reachable
fn resolve_key<'a>(reader: &Reader, quantity: &'a str) -> QuantityKey<'a> {
    if reader.has(quantity) {
        return QuantityKey::Name(quantity);
    }
    match quantity.parse::<usize>() {
        Ok(index) => QuantityKey::Index(index),
        Err(_) => QuantityKey::Name(quantity),
    }
}
