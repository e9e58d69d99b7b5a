//! CLI configuration (`erg.toml`)
//!
//! Loaded from the platform config directory unless `--config` names a file.
//! A missing default file means defaults; an explicit file must exist and parse.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::ValueEnum;
use erg::ReaderConfig;
use serde::{Deserialize, Serialize};

const CONFIG_FILE: &str = "erg.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub reader: ReaderConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
}

/// Defaults for `erg export`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(default)]
    pub format: ExportFormat,
    /// CSV field delimiter (default: ',')
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
    /// Write a second CSV header row with units (default: false)
    #[serde(default)]
    pub units_row: bool,
}

fn default_delimiter() -> char {
    ','
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            format: ExportFormat::default(),
            delimiter: default_delimiter(),
            units_row: false,
        }
    }
}

impl ExportConfig {
    /// The delimiter as the single byte the CSV writer expects
    pub fn delimiter_byte(&self) -> Result<u8> {
        if !self.delimiter.is_ascii() {
            bail!("CSV delimiter must be an ASCII character, got '{}'", self.delimiter);
        }
        Ok(self.delimiter as u8)
    }
}

/// Returns the platform-specific configuration directory.
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("io", "erg-reader", "erg")
        .map(|dirs| dirs.config_dir().to_path_buf())
}

/// Load the configuration from `explicit` or the default location
pub fn load(explicit: Option<&Path>) -> Result<Config> {
    if let Some(path) = explicit {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        return toml::from_str(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()));
    }

    Ok(config_dir()
        .and_then(|dir| std::fs::read_to_string(dir.join(CONFIG_FILE)).ok())
        .and_then(|content| toml::from_str(&content).ok())
        .unwrap_or_default())
}
