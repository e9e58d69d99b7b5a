//! Quantity catalog built from the `.info` companion
//!
//! The companion declares every column of the data file as a numbered
//! `File.At.<n>` entry:
//!
//! ```text
//! File.Format     = erg
//! File.ByteOrder  = LittleEndian
//! File.At.1.Name  = Time
//! File.At.1.Type  = Double
//! File.At.2.Name  = Car.v
//! File.At.2.Type  = Float
//! File.At.3.Type  = 4 Bytes
//! Quantity.Time.Unit  = s
//! Quantity.Car.v.Unit = m/s
//! ```
//!
//! Entries are numbered from 1 and enumeration stops at the first missing
//! `Type`. A `<N> Bytes` type is padding: it takes record space but is not a
//! quantity.

mod info;

use std::path::Path;

use hashbrown::HashMap;
use tracing::debug;

use crate::error::{ErgError, Result};
use crate::layout::Flavor;
use crate::quantity::{ByteOrder, ElementKind, Quantity};

pub(crate) use info::find_companion;
use info::InfoFile;

const FORMAT_KEY: &str = "File.Format";
const BYTE_ORDER_KEY: &str = "File.ByteOrder";
const ENTRY_PREFIX: &str = "File.At.";
const UNIT_PREFIX: &str = "Quantity.";
const UNIT_SUFFIX: &str = ".Unit";

/// Ordered, immutable list of the quantities of one file
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    quantities: Vec<Quantity>,
    names: HashMap<String, usize>,
    payload_size: usize,
}

impl Catalog {
    /// Number of quantities (padding excluded)
    pub fn len(&self) -> usize {
        self.quantities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quantities.is_empty()
    }

    /// Quantity at a catalog position
    pub fn get(&self, index: usize) -> Option<&Quantity> {
        self.quantities.get(index)
    }

    /// Catalog position of a name
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.get(name).copied()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Quantity> {
        self.quantities.iter()
    }

    /// Bytes of one record payload: every quantity plus padding
    pub fn payload_size(&self) -> usize {
        self.payload_size
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a Quantity;
    type IntoIter = std::slice::Iter<'a, Quantity>;

    fn into_iter(self) -> Self::IntoIter {
        self.quantities.iter()
    }
}

/// Everything the companion file declares
#[derive(Debug, Clone)]
pub(crate) struct Companion {
    pub flavor: Flavor,
    pub byte_order: ByteOrder,
    pub catalog: Catalog,
    pub attributes: Vec<(String, String)>,
}

/// Read and parse the companion of a data file
pub(crate) fn load_companion(data_path: &Path) -> Result<Companion> {
    let Some(info_path) = find_companion(data_path) else {
        let mut expected = data_path.as_os_str().to_owned();
        expected.push(".info");
        return Err(ErgError::FileNotFound(expected.into()));
    };
    debug!(companion = %info_path.display(), "reading catalog");

    let bytes = std::fs::read(&info_path)?;
    let text = decode_text(bytes)?;
    parse_companion(&text)
}

/// Companion text must be UTF-8; names and units are kept byte-for-byte
fn decode_text(bytes: Vec<u8>) -> Result<String> {
    String::from_utf8(bytes).map_err(|err| {
        let at = err.utf8_error().valid_up_to();
        let line = err.as_bytes()[..at].iter().filter(|&&b| b == b'\n').count() + 1;
        ErgError::malformed(format!(
            "Companion is not valid UTF-8 (byte {at}, line {line})"
        ))
    })
}

/// Parse companion text into flavor, byte order, catalog and attributes
pub(crate) fn parse_companion(text: &str) -> Result<Companion> {
    let info = InfoFile::parse(text);

    let format = info
        .get(FORMAT_KEY)
        .ok_or_else(|| ErgError::malformed("File.Format not specified"))?;
    let flavor = Flavor::from_attribute(format)
        .ok_or_else(|| ErgError::malformed(format!("Unknown format '{format}'")))?;

    let order = info
        .get(BYTE_ORDER_KEY)
        .ok_or_else(|| ErgError::malformed("File.ByteOrder not specified"))?;
    let byte_order = ByteOrder::from_attribute(order)
        .ok_or_else(|| ErgError::malformed(format!("Unknown byte order '{order}'")))?;

    let catalog = parse_entries(&info)?;

    let attributes = info
        .entries()
        .filter(|(key, _)| !is_catalog_key(key))
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect();

    debug!(
        ?flavor,
        ?byte_order,
        quantities = catalog.len(),
        payload = catalog.payload_size(),
        "parsed catalog"
    );

    Ok(Companion {
        flavor,
        byte_order,
        catalog,
        attributes,
    })
}

fn parse_entries(info: &InfoFile) -> Result<Catalog> {
    let mut catalog = Catalog::default();
    let mut offset = 0usize;

    for position in 1.. {
        let Some(tag) = info.get(&format!("{ENTRY_PREFIX}{position}.Type")) else {
            break;
        };

        if let Some(kind) = ElementKind::from_tag(tag) {
            let name = info
                .get(&format!("{ENTRY_PREFIX}{position}.Name"))
                .ok_or_else(|| {
                    ErgError::malformed(format!("File.At.{position} has a type but no name"))
                })?;
            if name.is_empty() {
                return Err(ErgError::malformed(format!(
                    "File.At.{position} has an empty name"
                )));
            }
            if catalog.names.contains_key(name) {
                return Err(ErgError::malformed(format!(
                    "Quantity '{name}' is declared twice"
                )));
            }

            let unit = info
                .get(&format!("{UNIT_PREFIX}{name}{UNIT_SUFFIX}"))
                .unwrap_or_default();

            catalog
                .names
                .insert(name.to_string(), catalog.quantities.len());
            catalog.quantities.push(Quantity {
                name: name.to_string(),
                unit: unit.to_string(),
                type_tag: tag.to_string(),
                kind,
                offset,
            });
            offset += kind.width();
        } else if let Some(padding) = padding_width(tag) {
            offset += padding;
        } else {
            return Err(ErgError::UnsupportedType {
                position,
                tag: tag.to_string(),
            });
        }
    }

    if catalog.is_empty() {
        return Err(ErgError::malformed("No quantities declared"));
    }

    catalog.payload_size = offset;
    Ok(catalog)
}

/// Width of a padding entry such as `8 Bytes`
fn padding_width(tag: &str) -> Option<usize> {
    let tag = tag.trim();
    let digits = tag.find(|c: char| !c.is_ascii_digit()).unwrap_or(tag.len());
    let count: usize = tag[..digits].parse().ok()?;
    let suffix = tag[digits..].trim();
    let valid_suffix = suffix.is_empty()
        || suffix.eq_ignore_ascii_case("bytes")
        || suffix.eq_ignore_ascii_case("byte");
    (count > 0 && valid_suffix).then_some(count)
}

fn is_catalog_key(key: &str) -> bool {
    key == FORMAT_KEY
        || key == BYTE_ORDER_KEY
        || key.starts_with(ENTRY_PREFIX)
        || (key.starts_with(UNIT_PREFIX) && key.ends_with(UNIT_SUFFIX))
}
