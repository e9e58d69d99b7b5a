//! Reader settings

use serde::{Deserialize, Serialize};

/// Tuning knobs for [`Reader`](crate::Reader).
///
/// Deserializable so applications can embed it in their own TOML/JSON
/// configuration (the `erg` CLI reads it from the `[reader]` table).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReaderConfig {
    /// Records decoded per block by `read_all` and `blocks` (default: 65536)
    #[serde(default = "default_chunk_records")]
    pub chunk_records: usize,
    /// Check the trailing length marker of the first Fortran record (default: true)
    #[serde(default = "default_true")]
    pub verify_fortran_markers: bool,
}

fn default_chunk_records() -> usize {
    65_536
}

fn default_true() -> bool {
    true
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            chunk_records: default_chunk_records(),
            verify_fortran_markers: default_true(),
        }
    }
}

impl ReaderConfig {
    /// Block size with a floor of one record
    pub(crate) fn block_records(&self) -> usize {
        self.chunk_records.max(1)
    }
}
