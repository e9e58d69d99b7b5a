//! Record layout resolution and file flavor detection
//!
//! # Standard flavor (`File.Format = erg`)
//!
//! ```text
//! ┌───────────────────────────────────────────┐
//! │ Header (16 bytes)                         │
//! │ ├─ identifier: [u8; 8]  "CM-ERG\0\0"      │
//! │ ├─ version: u8          1                 │
//! │ ├─ byte_order: u8       0 = LE, 1 = BE    │
//! │ ├─ record_size: u16     header byte order │
//! │ └─ reserved: [u8; 4]                      │
//! ├───────────────────────────────────────────┤
//! │ Records (record_size bytes each)          │
//! └───────────────────────────────────────────┘
//! ```
//!
//! # Alternate flavor (`File.Format = FORTRAN_Binary_Data`)
//!
//! Sequential unformatted Fortran records with no file header. Every record
//! is framed by its payload length:
//!
//! ```text
//! [u32 length][payload: length bytes][u32 length]
//! ```

use byteorder::{BigEndian, ByteOrder as Endian, LittleEndian};
use serde::Serialize;
use tracing::{debug, warn};

use crate::catalog::Catalog;
use crate::config::ReaderConfig;
use crate::decode::ColumnPlan;
use crate::error::{ErgError, Result};
use crate::quantity::{ByteOrder, Quantity};
use crate::{ERG_HEADER_SIZE, ERG_IDENTIFIER, ERG_VERSION, FORTRAN_MARKER_SIZE};

/// On-disk convention of the data file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Flavor {
    /// CarMaker ERG with a 16-byte binary header
    Erg,
    /// Fortran sequential unformatted records
    Fortran,
}

impl Flavor {
    /// Parse the `File.Format` attribute (case-insensitive)
    pub fn from_attribute(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "erg" => Some(Self::Erg),
            "fortran_binary_data" => Some(Self::Fortran),
            _ => None,
        }
    }
}

/// The 16-byte header at the start of a standard ERG file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErgHeader {
    pub version: u8,
    pub byte_order: ByteOrder,
    pub record_size: u16,
}

impl ErgHeader {
    /// Parse the header from the first bytes of a file
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < ERG_HEADER_SIZE {
            return Err(ErgError::malformed(format!(
                "File too small for the {ERG_HEADER_SIZE}-byte ERG header ({} bytes)",
                bytes.len()
            )));
        }
        if &bytes[..ERG_IDENTIFIER.len()] != ERG_IDENTIFIER {
            return Err(ErgError::malformed("Not an ERG file (missing CM-ERG identifier)"));
        }

        let version = bytes[8];
        let byte_order = match bytes[9] {
            0 => ByteOrder::LittleEndian,
            _ => ByteOrder::BigEndian,
        };
        let record_size = match byte_order {
            ByteOrder::LittleEndian => LittleEndian::read_u16(&bytes[10..12]),
            ByteOrder::BigEndian => BigEndian::read_u16(&bytes[10..12]),
        };

        Ok(Self {
            version,
            byte_order,
            record_size,
        })
    }
}

/// Resolved byte layout of an open data file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Layout {
    pub flavor: Flavor,
    pub byte_order: ByteOrder,
    /// Byte position of the first record
    pub data_offset: usize,
    /// Bytes per record, framing included
    pub record_size: usize,
    /// Framing bytes before the payload of every record
    pub record_prefix: usize,
    /// Number of whole records in the data region
    pub records: usize,
}

impl Layout {
    /// Validate the file against the catalog and derive the record geometry
    pub(crate) fn resolve(
        catalog: &Catalog,
        flavor: Flavor,
        byte_order: ByteOrder,
        file: &[u8],
        config: &ReaderConfig,
    ) -> Result<Self> {
        let payload = catalog.payload_size();

        let (data_offset, record_size, record_prefix) = match flavor {
            Flavor::Erg => {
                let header = ErgHeader::parse(file)?;
                if header.version != ERG_VERSION {
                    return Err(ErgError::UnsupportedVersion(header.version));
                }
                if header.byte_order != byte_order {
                    return Err(ErgError::layout(format!(
                        "Header byte order {:?} disagrees with companion {:?}",
                        header.byte_order, byte_order
                    )));
                }
                if usize::from(header.record_size) != payload {
                    return Err(ErgError::layout(format!(
                        "Header record size {} disagrees with catalog size {payload}",
                        header.record_size
                    )));
                }
                (ERG_HEADER_SIZE, payload, 0)
            }
            Flavor::Fortran if file.is_empty() => {
                (0, payload + 2 * FORTRAN_MARKER_SIZE, FORTRAN_MARKER_SIZE)
            }
            Flavor::Fortran => {
                let marker = read_marker(file, 0, byte_order).ok_or_else(|| {
                    ErgError::malformed("File too small for a Fortran record marker")
                })?;
                if marker != payload {
                    return Err(ErgError::layout(format!(
                        "Fortran record length {marker} disagrees with catalog size {payload}"
                    )));
                }
                if config.verify_fortran_markers {
                    match read_marker(file, FORTRAN_MARKER_SIZE + payload, byte_order) {
                        Some(trailing) if trailing != marker => {
                            return Err(ErgError::layout(format!(
                                "Fortran trailing marker {trailing} disagrees with leading marker {marker}"
                            )));
                        }
                        Some(_) => {}
                        None => warn!("first Fortran record is truncated, trailing marker not checked"),
                    }
                }
                (0, payload + 2 * FORTRAN_MARKER_SIZE, FORTRAN_MARKER_SIZE)
            }
        };

        let data_len = file.len().saturating_sub(data_offset);
        if data_len % record_size != 0 {
            return Err(ErgError::layout(format!(
                "Data region of {data_len} bytes is not a multiple of the {record_size}-byte record"
            )));
        }
        let records = data_len / record_size;

        debug!(?flavor, record_size, records, "resolved layout");

        Ok(Self {
            flavor,
            byte_order,
            data_offset,
            record_size,
            record_prefix,
            records,
        })
    }

    /// Where the values of a quantity sit inside a run of whole records
    pub fn plan(&self, quantity: &Quantity) -> ColumnPlan {
        ColumnPlan::strided(self.record_prefix + quantity.offset, self.record_size)
    }

    /// Check both length markers of every Fortran record in `bytes`
    ///
    /// `bytes` holds whole records starting at record `first`. Standard ERG
    /// records carry no framing and always pass.
    pub fn check_framing(&self, bytes: &[u8], first: usize) -> Result<()> {
        if self.flavor != Flavor::Fortran {
            return Ok(());
        }
        let payload = self.record_size - 2 * FORTRAN_MARKER_SIZE;
        let trailing_at = FORTRAN_MARKER_SIZE + payload;

        for (i, record) in bytes.chunks_exact(self.record_size).enumerate() {
            let leading = read_marker(record, 0, self.byte_order);
            let trailing = read_marker(record, trailing_at, self.byte_order);
            if leading != Some(payload) || trailing != Some(payload) {
                return Err(ErgError::layout(format!(
                    "Fortran record {} is framed as {leading:?}/{trailing:?}, expected {payload}",
                    first + i
                )));
            }
        }
        Ok(())
    }
}

fn read_marker(file: &[u8], at: usize, order: ByteOrder) -> Option<usize> {
    let bytes = file.get(at..at + FORTRAN_MARKER_SIZE)?;
    let value = match order {
        ByteOrder::LittleEndian => LittleEndian::read_u32(bytes),
        ByteOrder::BigEndian => BigEndian::read_u32(bytes),
    };
    usize::try_from(value).ok()
}
