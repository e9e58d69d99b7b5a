//! `.info` companion file: `key = value` lines with `#` comments

use std::path::{Path, PathBuf};

use hashbrown::HashMap;

/// Parsed key/value pairs of a companion file, in first-seen order
#[derive(Debug, Default)]
pub(crate) struct InfoFile {
    entries: Vec<(String, String)>,
    lookup: HashMap<String, usize>,
}

impl InfoFile {
    pub(crate) fn parse(text: &str) -> Self {
        let mut info = Self::default();
        for line in text.lines() {
            let line = strip_comment(line);
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim();
            if key.is_empty() {
                continue;
            }
            info.insert(key, value.trim());
        }
        info
    }

    fn insert(&mut self, key: &str, value: &str) {
        // Later duplicates override the value but keep the original position
        if let Some(&slot) = self.lookup.get(key) {
            self.entries[slot].1 = value.to_string();
        } else {
            self.lookup.insert(key.to_string(), self.entries.len());
            self.entries.push((key.to_string(), value.to_string()));
        }
    }

    pub(crate) fn get(&self, key: &str) -> Option<&str> {
        self.lookup
            .get(key)
            .map(|&slot| self.entries[slot].1.as_str())
    }

    pub(crate) fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(pos) => &line[..pos],
        None => line,
    }
}

/// Candidate companion paths for a data file, most specific first
///
/// `run.erg` looks for `run.erg.info`, then `run.info`.
pub(crate) fn companion_candidates(data_path: &Path) -> Vec<PathBuf> {
    let mut full = data_path.as_os_str().to_owned();
    full.push(".info");
    let mut candidates = vec![PathBuf::from(full)];
    if data_path.extension().is_some() {
        candidates.push(data_path.with_extension("info"));
    }
    candidates
}

/// First existing companion for a data file
pub(crate) fn find_companion(data_path: &Path) -> Option<PathBuf> {
    companion_candidates(data_path)
        .into_iter()
        .find(|candidate| candidate.is_file())
}
