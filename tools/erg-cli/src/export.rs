//! Export command - write quantities as CSV or JSON
//!
//! Only the selected quantities are decoded. CSV is streamed block by block
//! (`[reader] chunk_records`), so memory use stays bounded for long
//! recordings. JSON needs the selected columns in memory.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use erg::{Column, Reader};
use tracing::info;

use crate::config::{Config, ExportFormat};

/// Arguments for the export command
#[derive(Args)]
pub struct ExportArgs {
    /// ERG data file
    pub file: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format (default: from config, else csv)
    #[arg(long, value_enum)]
    pub format: Option<ExportFormat>,

    /// Quantity to export; repeat for several (default: all, in catalog order)
    #[arg(short, long = "quantity")]
    pub quantities: Vec<String>,
}

/// Execute the export command
pub fn execute(args: ExportArgs, config: &Config) -> Result<()> {
    let mut reader = Reader::with_config(config.reader.clone());
    reader
        .open(&args.file)
        .with_context(|| format!("Failed to open {}", args.file.display()))?;

    let selected = select(&reader, &args.quantities)?;

    let out: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(std::io::stdout().lock())),
    };

    let format = args.format.unwrap_or(config.export.format);
    match format {
        ExportFormat::Csv => write_csv(&reader, &selected, config, out)?,
        ExportFormat::Json => write_json(&reader, &selected, out)?,
    }

    info!(
        records = reader.records()?,
        quantities = selected.len(),
        ?format,
        "export finished"
    );
    Ok(())
}

/// Catalog indices to export, in the order requested
fn select(reader: &Reader, names: &[String]) -> Result<Vec<usize>> {
    if names.is_empty() {
        return Ok((0..reader.num_quantities()?).collect());
    }
    names
        .iter()
        .map(|name| reader.index(name).map_err(anyhow::Error::from))
        .collect()
}

fn write_csv(
    reader: &Reader,
    selected: &[usize],
    config: &Config,
    out: Box<dyn Write>,
) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(config.export.delimiter_byte()?)
        .from_writer(out);

    let mut names = Vec::with_capacity(selected.len());
    let mut units = Vec::with_capacity(selected.len());
    for &index in selected {
        let quantity = reader.quantity(index)?;
        names.push(quantity.name.as_str());
        units.push(quantity.unit.as_str());
    }
    writer.write_record(&names)?;
    if config.export.units_row {
        writer.write_record(&units)?;
    }

    let mut row = Vec::with_capacity(selected.len());
    for block in reader.blocks_of(selected.iter().copied())? {
        let block = block?;
        let columns: Vec<&Column> = block.iter().map(|(_, column)| column).collect();
        for record in 0..block.records() {
            row.clear();
            row.extend(
                columns
                    .iter()
                    .map(|column| column.get(record).map(|v| v.to_string()).unwrap_or_default()),
            );
            writer.write_record(&row)?;
        }
    }

    writer.flush()?;
    Ok(())
}

fn write_json(reader: &Reader, selected: &[usize], mut out: Box<dyn Write>) -> Result<()> {
    let table = reader.read_columns(selected.iter().copied())?;
    serde_json::to_writer_pretty(&mut out, &table)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}
