//! The `Reader`: open/close lifecycle, catalog queries and column reads

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::catalog::{load_companion, Catalog};
use crate::config::ReaderConfig;
use crate::decode::{decode, decode_into, Column};
use crate::error::{ErgError, Result};
use crate::layout::{Flavor, Layout};
use crate::quantity::{ByteOrder, ElementKind, Quantity};
use crate::store::{MappedFile, RecordStore};
use crate::table::Table;

/// Selects a quantity by catalog name or by catalog position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityKey<'a> {
    Name(&'a str),
    Index(usize),
}

impl<'a> From<&'a str> for QuantityKey<'a> {
    fn from(name: &'a str) -> Self {
        Self::Name(name)
    }
}

impl<'a> From<&'a String> for QuantityKey<'a> {
    fn from(name: &'a String) -> Self {
        Self::Name(name)
    }
}

impl From<usize> for QuantityKey<'_> {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

/// Everything derived from one successful `open`
#[derive(Debug)]
struct OpenFile {
    path: PathBuf,
    catalog: Catalog,
    attributes: Vec<(String, String)>,
    layout: Layout,
    store: RecordStore,
    verify_framing: bool,
}

impl OpenFile {
    fn open(path: &Path, config: &ReaderConfig) -> Result<Self> {
        if !path.exists() {
            return Err(ErgError::FileNotFound(path.to_path_buf()));
        }

        let companion = load_companion(path)?;
        let file = MappedFile::open(path)?;
        let layout = Layout::resolve(
            &companion.catalog,
            companion.flavor,
            companion.byte_order,
            file.bytes(),
            config,
        )?;

        Ok(Self {
            path: path.to_path_buf(),
            catalog: companion.catalog,
            attributes: companion.attributes,
            store: RecordStore::new(file, &layout),
            layout,
            verify_framing: config.verify_fortran_markers,
        })
    }

    fn resolve(&self, key: QuantityKey<'_>) -> Result<&Quantity> {
        match key {
            QuantityKey::Name(name) => self
                .catalog
                .index_of(name)
                .and_then(|i| self.catalog.get(i))
                .ok_or_else(|| ErgError::UnknownQuantity(name.to_string())),
            QuantityKey::Index(index) => {
                self.catalog
                    .get(index)
                    .ok_or(ErgError::IndexOutOfRange {
                        index,
                        len: self.catalog.len(),
                    })
            }
        }
    }

    /// Whole records `[start, start + count)`, framing checked if enabled
    fn records_bytes(&self, start: usize, count: usize) -> Result<&[u8]> {
        let bytes = self.store.byte_range(start, count)?;
        if self.verify_framing {
            self.layout.check_framing(bytes, start)?;
        }
        Ok(bytes)
    }

    fn read_range(&self, quantity: &Quantity, start: usize, count: usize) -> Result<Column> {
        let bytes = self.records_bytes(start, count)?;
        decode(
            quantity.kind,
            self.layout.byte_order,
            bytes,
            self.layout.plan(quantity),
            count,
        )
    }

    /// Decode records `[start, start + count)` of the selected quantities onto `columns`
    fn decode_block(
        &self,
        start: usize,
        count: usize,
        selection: &[usize],
        columns: &mut [Column],
    ) -> Result<()> {
        let bytes = self.records_bytes(start, count)?;
        for (quantity, column) in self.selected(selection).zip(columns.iter_mut()) {
            decode_into(
                column,
                self.layout.byte_order,
                bytes,
                self.layout.plan(quantity),
                count,
            )?;
        }
        Ok(())
    }

    fn selected<'s>(&'s self, selection: &'s [usize]) -> impl Iterator<Item = &'s Quantity> {
        selection.iter().filter_map(|&index| self.catalog.get(index))
    }

    fn empty_columns(&self, selection: &[usize], capacity: usize) -> Vec<Column> {
        self.selected(selection)
            .map(|q| Column::with_capacity(q.kind, capacity))
            .collect()
    }

    fn table(&self, selection: &[usize], columns: Vec<Column>) -> Table {
        Table::from_quantities(self.selected(selection), columns)
    }

    fn resolve_all<'k, K>(&self, keys: impl IntoIterator<Item = K>) -> Result<Vec<usize>>
    where
        K: Into<QuantityKey<'k>>,
    {
        keys.into_iter()
            .map(|key| match key.into() {
                QuantityKey::Name(name) => self
                    .catalog
                    .index_of(name)
                    .ok_or_else(|| ErgError::UnknownQuantity(name.to_string())),
                key @ QuantityKey::Index(index) => self.resolve(key).map(|_| index),
            })
            .collect()
    }
}

/// Reader for ERG result files
///
/// A reader is either unopened or holds exactly one open file with a
/// complete catalog. `open` replaces the current file, `close` (or drop)
/// releases it.
///
/// ```no_run
/// use erg::Reader;
///
/// let reader = Reader::open_path("run_001.erg")?;
/// println!("{} records of {} bytes", reader.records()?, reader.record_size()?);
///
/// let speed = reader.read("Car.v")?;
/// let window = reader.read_range("Car.v", 10, 90)?;
/// assert_eq!(window.len(), 90);
/// # Ok::<(), erg::ErgError>(())
/// ```
#[derive(Debug, Default)]
pub struct Reader {
    config: ReaderConfig,
    state: Option<OpenFile>,
}

impl Reader {
    /// An unopened reader with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// An unopened reader with custom settings
    pub fn with_config(config: ReaderConfig) -> Self {
        Self {
            config,
            state: None,
        }
    }

    /// Create a reader and open `path`
    pub fn open_path(path: impl AsRef<Path>) -> Result<Self> {
        let mut reader = Self::new();
        reader.open(path)?;
        Ok(reader)
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    /// Open a data file and its `.info` companion
    ///
    /// Any previously open file is released first. On failure the reader is
    /// left unopened.
    pub fn open(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.close();

        let path = path.as_ref();
        let opened = OpenFile::open(path, &self.config)?;
        debug!(
            path = %path.display(),
            flavor = ?opened.layout.flavor,
            quantities = opened.catalog.len(),
            records = opened.layout.records,
            "opened"
        );
        self.state = Some(opened);
        Ok(())
    }

    /// Release the open file, if any
    pub fn close(&mut self) {
        if let Some(open) = self.state.take() {
            debug!(path = %open.path.display(), "closed");
        }
    }

    pub fn is_open(&self) -> bool {
        self.state.is_some()
    }

    /// True if the open file is a standard ERG file
    pub fn is_erg(&self) -> bool {
        self.flavor().ok() == Some(Flavor::Erg)
    }

    /// True if the open file is a Fortran binary file
    pub fn is_fortran(&self) -> bool {
        self.flavor().ok() == Some(Flavor::Fortran)
    }

    fn open_file(&self) -> Result<&OpenFile> {
        self.state.as_ref().ok_or(ErgError::NotOpen)
    }

    /// Number of records (rows)
    pub fn records(&self) -> Result<usize> {
        Ok(self.open_file()?.store.records())
    }

    /// Bytes per record, framing included
    pub fn record_size(&self) -> Result<usize> {
        Ok(self.open_file()?.store.record_size())
    }

    /// Number of quantities (columns); padding is not counted
    pub fn num_quantities(&self) -> Result<usize> {
        Ok(self.open_file()?.catalog.len())
    }

    pub fn flavor(&self) -> Result<Flavor> {
        Ok(self.open_file()?.layout.flavor)
    }

    pub fn byte_order(&self) -> Result<ByteOrder> {
        Ok(self.open_file()?.layout.byte_order)
    }

    pub fn layout(&self) -> Result<&Layout> {
        Ok(&self.open_file()?.layout)
    }

    /// Path of the open data file
    pub fn path(&self) -> Result<&Path> {
        Ok(&self.open_file()?.path)
    }

    pub fn catalog(&self) -> Result<&Catalog> {
        Ok(&self.open_file()?.catalog)
    }

    /// Companion entries that do not describe the catalog, in file order
    pub fn attributes(&self) -> Result<&[(String, String)]> {
        Ok(&self.open_file()?.attributes)
    }

    /// True if a quantity with this exact name exists
    pub fn has(&self, name: &str) -> bool {
        self.state
            .as_ref()
            .is_some_and(|open| open.catalog.index_of(name).is_some())
    }

    /// Catalog position of a quantity
    pub fn index(&self, name: &str) -> Result<usize> {
        self.open_file()?
            .catalog
            .index_of(name)
            .ok_or_else(|| ErgError::UnknownQuantity(name.to_string()))
    }

    /// Full descriptor of a quantity
    pub fn quantity<'k>(&self, key: impl Into<QuantityKey<'k>>) -> Result<&Quantity> {
        self.open_file()?.resolve(key.into())
    }

    pub fn quantities(&self) -> Result<std::slice::Iter<'_, Quantity>> {
        Ok(self.open_file()?.catalog.iter())
    }

    pub fn quantity_name(&self, index: usize) -> Result<&str> {
        Ok(&self.quantity(index)?.name)
    }

    /// Unit of a quantity, empty if none is declared
    pub fn quantity_unit(&self, index: usize) -> Result<&str> {
        Ok(&self.quantity(index)?.unit)
    }

    pub fn quantity_type(&self, index: usize) -> Result<ElementKind> {
        Ok(self.quantity(index)?.kind)
    }

    /// Bytes of decoded data for a quantity: element width times records
    pub fn quantity_size<'k>(&self, key: impl Into<QuantityKey<'k>>) -> Result<usize> {
        let open = self.open_file()?;
        let quantity = open.resolve(key.into())?;
        Ok(quantity.width() * open.store.records())
    }

    /// Every value of a quantity
    pub fn read<'k>(&self, key: impl Into<QuantityKey<'k>>) -> Result<Column> {
        let open = self.open_file()?;
        let quantity = open.resolve(key.into())?;
        open.read_range(quantity, 0, open.store.records())
    }

    /// Values of a quantity from record `start` to the end
    pub fn read_from<'k>(&self, key: impl Into<QuantityKey<'k>>, start: usize) -> Result<Column> {
        let open = self.open_file()?;
        let quantity = open.resolve(key.into())?;
        let records = open.store.records();
        let count = records
            .checked_sub(start)
            .ok_or(ErgError::RangeOutOfBounds {
                start,
                count: 0,
                records,
            })?;
        open.read_range(quantity, start, count)
    }

    /// Values of a quantity for records `[start, start + count)`
    pub fn read_range<'k>(
        &self,
        key: impl Into<QuantityKey<'k>>,
        start: usize,
        count: usize,
    ) -> Result<Column> {
        let open = self.open_file()?;
        let quantity = open.resolve(key.into())?;
        open.read_range(quantity, start, count)
    }

    /// Every value of every quantity, keyed by name in catalog order
    ///
    /// Walks the data region once, in blocks of `chunk_records` records.
    pub fn read_all(&self) -> Result<Table> {
        let open = self.open_file()?;
        self.read_selection(open, (0..open.catalog.len()).collect())
    }

    /// Every value of the given quantities, in the order requested
    ///
    /// Quantities not asked for are never decoded.
    pub fn read_columns<'k, K>(&self, keys: impl IntoIterator<Item = K>) -> Result<Table>
    where
        K: Into<QuantityKey<'k>>,
    {
        let open = self.open_file()?;
        let selection = open.resolve_all(keys)?;
        self.read_selection(open, selection)
    }

    fn read_selection(&self, open: &OpenFile, selection: Vec<usize>) -> Result<Table> {
        let records = open.store.records();
        let block = self.config.block_records();

        let mut columns = open.empty_columns(&selection, records);
        let mut start = 0;
        while start < records {
            let count = block.min(records - start);
            open.decode_block(start, count, &selection, &mut columns)?;
            start += count;
        }
        Ok(open.table(&selection, columns))
    }

    /// Iterate over the whole file as consecutive tables of `chunk_records` records
    pub fn blocks(&self) -> Result<Blocks<'_>> {
        let open = self.open_file()?;
        Ok(Blocks::new(open, (0..open.catalog.len()).collect(), &self.config))
    }

    /// Like [`blocks`](Self::blocks), restricted to the given quantities
    pub fn blocks_of<'k, K>(&self, keys: impl IntoIterator<Item = K>) -> Result<Blocks<'_>>
    where
        K: Into<QuantityKey<'k>>,
    {
        let open = self.open_file()?;
        let selection = open.resolve_all(keys)?;
        Ok(Blocks::new(open, selection, &self.config))
    }
}

/// Iterator returned by [`Reader::blocks`]
#[derive(Debug)]
pub struct Blocks<'r> {
    open: &'r OpenFile,
    selection: Vec<usize>,
    next: usize,
    block: usize,
}

impl<'r> Blocks<'r> {
    fn new(open: &'r OpenFile, selection: Vec<usize>, config: &ReaderConfig) -> Self {
        Self {
            open,
            selection,
            next: 0,
            block: config.block_records(),
        }
    }

    /// Index of the first record of the next block
    pub fn position(&self) -> usize {
        self.next
    }
}

impl Iterator for Blocks<'_> {
    type Item = Result<Table>;

    fn next(&mut self) -> Option<Self::Item> {
        let records = self.open.store.records();
        if self.next >= records {
            return None;
        }
        let count = self.block.min(records - self.next);
        let mut columns = self.open.empty_columns(&self.selection, count);
        let result = self
            .open
            .decode_block(self.next, count, &self.selection, &mut columns)
            .map(|()| self.open.table(&self.selection, columns));
        // Stop after an error instead of retrying the same block
        self.next = if result.is_ok() { self.next + count } else { records };
        Some(result)
    }
}
