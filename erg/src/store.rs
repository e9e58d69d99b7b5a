//! Record store: the open data file as a read-only mapped view

use std::fs::File;
use std::path::Path;

use memmap2::{Mmap, MmapOptions};

use crate::error::{ErgError, Result};
use crate::layout::Layout;

/// A read-only view of a data file
///
/// Zero-length files are not mapped; they expose an empty byte slice.
#[derive(Debug)]
pub(crate) struct MappedFile {
    map: Option<Mmap>,
}

impl MappedFile {
    pub(crate) fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|err| match err.kind() {
            std::io::ErrorKind::NotFound => ErgError::FileNotFound(path.to_path_buf()),
            _ => ErgError::Io(err),
        })?;
        if !file.metadata()?.is_file() {
            return Err(ErgError::FileNotFound(path.to_path_buf()));
        }
        if file.metadata()?.len() == 0 {
            return Ok(Self { map: None });
        }

        // SAFETY: the file is opened read-only and never written through
        // this mapping. Truncation by another process while mapped is outside
        // what this reader supports.
        let map = unsafe { MmapOptions::new().map(&file)? };
        Ok(Self { map: Some(map) })
    }

    pub(crate) fn bytes(&self) -> &[u8] {
        self.map.as_deref().unwrap_or_default()
    }
}

/// Owner of the mapped data file and its record geometry
///
/// Dropping the store unmaps the file.
#[derive(Debug)]
pub(crate) struct RecordStore {
    file: MappedFile,
    data_offset: usize,
    record_size: usize,
    records: usize,
}

impl RecordStore {
    pub(crate) fn new(file: MappedFile, layout: &Layout) -> Self {
        Self {
            file,
            data_offset: layout.data_offset,
            record_size: layout.record_size,
            records: layout.records,
        }
    }

    pub(crate) fn records(&self) -> usize {
        self.records
    }

    pub(crate) fn record_size(&self) -> usize {
        self.record_size
    }

    /// Bytes of the whole records `[start, start + count)`
    pub(crate) fn byte_range(&self, start: usize, count: usize) -> Result<&[u8]> {
        let out_of_bounds = || ErgError::RangeOutOfBounds {
            start,
            count,
            records: self.records,
        };
        let end = start.checked_add(count).ok_or_else(out_of_bounds)?;
        if end > self.records {
            return Err(out_of_bounds());
        }

        let from = self.data_offset + start * self.record_size;
        let to = self.data_offset + end * self.record_size;
        Ok(&self.file.bytes()[from..to])
    }
}
