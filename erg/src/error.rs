//! Error types for opening and reading ERG files

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur when opening or reading an ERG file
#[derive(Debug, Error)]
pub enum ErgError {
    /// The data file or its `.info` companion does not exist
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// The companion or binary header cannot be parsed into a consistent catalog
    #[error("Malformed header: {0}")]
    MalformedHeader(String),

    /// A catalog entry declares an element type outside the supported set
    #[error("Unsupported type '{tag}' for entry File.At.{position}")]
    UnsupportedType { position: usize, tag: String },

    /// The binary header declares a format version this reader does not know
    #[error("Unsupported ERG version: {0}")]
    UnsupportedVersion(u8),

    /// Record size or data region length disagrees with the catalog
    #[error("Layout mismatch: {0}")]
    LayoutMismatch(String),

    /// Operation needs an open file
    #[error("No file is open")]
    NotOpen,

    /// Lookup by a name that is not in the catalog
    #[error("The quantity '{0}' does not exist")]
    UnknownQuantity(String),

    /// Lookup by an index outside `[0, len)`
    #[error("The quantity with index {index} does not exist (file has {len})")]
    IndexOutOfRange { index: usize, len: usize },

    /// Read window outside `[0, records)`
    #[error("Records {start}..{start}+{count} are out of bounds (file has {records})")]
    RangeOutOfBounds {
        start: usize,
        count: usize,
        records: usize,
    },

    /// IO error that none of the above describes
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl ErgError {
    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedHeader(msg.into())
    }

    pub(crate) fn layout(msg: impl Into<String>) -> Self {
        Self::LayoutMismatch(msg.into())
    }
}

/// Convenience alias used throughout the crate
pub type Result<T> = std::result::Result<T, ErgError>;
