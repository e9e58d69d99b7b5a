//! ERG: reader for CarMaker ERG binary result files
//!
//! An ERG result is a pair of files: the binary data file (`run.erg`) holding
//! fixed-size records, and a plain-text companion (`run.erg.info`) declaring
//! the quantities stored in every record, their types, units and order.
//!
//! # Key Features
//!
//! - **Zero-copy access**: the data file is memory-mapped, reads decode
//!   straight from the mapping
//! - **Native precision**: columns keep the on-disk element type
//! - **Both flavors**: standard ERG files and Fortran sequential binary data
//! - **Both byte orders**: little- and big-endian files
//!
//! # Usage
//!
//! ```no_run
//! use erg::Reader;
//!
//! let reader = Reader::open_path("run_001.erg")?;
//! for quantity in reader.quantities()? {
//!     println!("{} [{}] {}", quantity.name, quantity.unit, quantity.kind);
//! }
//!
//! let time = reader.read("Time")?;
//! let table = erg::read("run_001.erg")?;
//! assert_eq!(table["Time"], time);
//! # Ok::<(), erg::ErgError>(())
//! ```

mod catalog;
mod config;
mod decode;
mod error;
mod layout;
mod quantity;
mod reader;
mod store;
mod table;

use std::path::Path;

pub use catalog::Catalog;
pub use config::ReaderConfig;
pub use decode::{decode, Column, ColumnPlan, Element, Scalar};
pub use error::{ErgError, Result};
pub use layout::{ErgHeader, Flavor, Layout};
pub use quantity::{ByteOrder, ElementKind, Quantity};
pub use reader::{Blocks, QuantityKey, Reader};
pub use table::Table;

// =============================================================================
// Constants
// =============================================================================

/// Identifier at the start of a standard ERG file
pub const ERG_IDENTIFIER: &[u8; 7] = b"CM-ERG\0";

/// Size of the standard ERG file header
pub const ERG_HEADER_SIZE: usize = 16;

/// The only supported ERG header version
pub const ERG_VERSION: u8 = 1;

/// Size of one Fortran record length marker
pub const FORTRAN_MARKER_SIZE: usize = 4;

// =============================================================================
// One-shot helpers
// =============================================================================

/// True if `path` opens successfully as an ERG file
///
/// Never fails; any error (missing file, bad companion, layout mismatch)
/// yields `false`.
pub fn can_read(path: impl AsRef<Path>) -> bool {
    Reader::open_path(path).is_ok()
}

/// Open `path`, read every quantity and release the file
pub fn read(path: impl AsRef<Path>) -> Result<Table> {
    read_with_config(path, ReaderConfig::default())
}

/// [`read`] with custom reader settings
pub fn read_with_config(path: impl AsRef<Path>, config: ReaderConfig) -> Result<Table> {
    let mut reader = Reader::with_config(config);
    reader.open(path)?;
    reader.read_all()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants() {
        assert_eq!(ERG_IDENTIFIER, b"CM-ERG\0");
        assert_eq!(ERG_HEADER_SIZE, 16);
        assert_eq!(ERG_VERSION, 1);
        assert_eq!(FORTRAN_MARKER_SIZE, 4);
    }

    #[test]
    fn test_can_read_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!can_read(dir.path().join("missing.erg")));
    }
}
