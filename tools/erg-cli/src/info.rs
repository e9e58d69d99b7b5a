//! Info command - print file geometry and the quantity catalog

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use erg::{ByteOrder, Flavor, Quantity, Reader};
use serde::Serialize;

use crate::config::Config;

/// Arguments for the info command
#[derive(Args)]
pub struct InfoArgs {
    /// ERG data file
    pub file: PathBuf,

    /// Print machine-readable JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct Summary<'a> {
    path: &'a Path,
    flavor: Flavor,
    byte_order: ByteOrder,
    record_size: usize,
    records: usize,
    quantities: Vec<&'a Quantity>,
    attributes: &'a [(String, String)],
}

/// Execute the info command
pub fn execute(args: InfoArgs, config: &Config) -> Result<()> {
    let mut reader = Reader::with_config(config.reader.clone());
    reader
        .open(&args.file)
        .with_context(|| format!("Failed to open {}", args.file.display()))?;

    let summary = Summary {
        path: reader.path()?,
        flavor: reader.flavor()?,
        byte_order: reader.byte_order()?,
        record_size: reader.record_size()?,
        records: reader.records()?,
        quantities: reader.quantities()?.collect(),
        attributes: reader.attributes()?,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("File:        {}", summary.path.display());
    println!("Flavor:      {:?}", summary.flavor);
    println!("Byte order:  {:?}", summary.byte_order);
    println!("Record size: {} bytes", summary.record_size);
    println!("Records:     {}", summary.records);
    println!();

    let name_width = summary
        .quantities
        .iter()
        .map(|q| q.name.len())
        .max()
        .unwrap_or(0)
        .max("Name".len());
    println!(
        "{:>4}  {:<name_width$}  {:<6}  {:>6}  Unit",
        "#", "Name", "Type", "Offset"
    );
    for (index, quantity) in summary.quantities.iter().enumerate() {
        println!(
            "{:>4}  {:<name_width$}  {:<6}  {:>6}  {}",
            index, quantity.name, quantity.kind, quantity.offset, quantity.unit
        );
    }

    Ok(())
}
