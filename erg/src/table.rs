//! Name-to-column mapping returned by full-table reads

use std::ops::Index;

use hashbrown::HashMap;
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::decode::Column;
use crate::quantity::Quantity;

/// Decoded columns keyed by quantity name, in catalog order
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    names: Vec<String>,
    lookup: HashMap<String, usize>,
    columns: Vec<Column>,
}

impl Table {
    pub(crate) fn from_quantities<'q>(
        quantities: impl Iterator<Item = &'q Quantity>,
        columns: Vec<Column>,
    ) -> Self {
        let names: Vec<String> = quantities.map(|q| q.name.clone()).collect();
        debug_assert_eq!(names.len(), columns.len());
        let lookup = names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();
        Self {
            names,
            lookup,
            columns,
        }
    }

    /// Number of columns
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Number of values in every column
    pub fn records(&self) -> usize {
        self.columns.first().map_or(0, Column::len)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lookup.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Column> {
        self.lookup.get(name).map(|&i| &self.columns[i])
    }

    /// Column by catalog position
    pub fn column(&self, index: usize) -> Option<&Column> {
        self.columns.get(index)
    }

    pub fn names(&self) -> impl ExactSizeIterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&str, &Column)> {
        self.names.iter().map(String::as_str).zip(self.columns.iter())
    }

    /// Consume into `(name, column)` pairs in catalog order
    pub fn into_columns(self) -> Vec<(String, Column)> {
        self.names.into_iter().zip(self.columns).collect()
    }
}

impl Index<&str> for Table {
    type Output = Column;

    fn index(&self, name: &str) -> &Column {
        match self.get(name) {
            Some(column) => column,
            None => panic!("no quantity named '{name}' in table"),
        }
    }
}

impl Serialize for Table {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (name, column) in self.iter() {
            map.serialize_entry(name, column)?;
        }
        map.end()
    }
}
