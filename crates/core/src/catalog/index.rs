//! Inverted index over item metadata.
//!
//! Maps every lower-cased scalar field value to the ids of the items that
//! carry it. Queries scan all keys for substring containment; at the target
//! scale (tens of thousands of items) a linear scan is cheaper than keeping
//! a trie or suffix structure up to date mid-crawl.

use std::collections::BTreeMap;

use crate::model::Item;

/// Inverted mapping from lower-cased field value to item ids.
///
/// Keys are kept in a `BTreeMap` so query scans visit them in a stable
/// order. Within one key, ids keep insertion order and are appended once
/// per field occurrence: an item carrying the same value in two fields is
/// listed twice under that value, and a query reports it twice.
#[derive(Debug, Default)]
pub struct SearchIndex {
    entries: BTreeMap<String, Vec<u64>>,
}

impl SearchIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index every scalar field value of an item under its id.
    ///
    /// Existing entries for a value are extended, never replaced.
    pub fn index_item(&mut self, item: &Item) {
        for value in item.scalar_values() {
            let key = value.to_lowercase();
            self.entries.entry(key).or_default().push(item.id);
        }
    }

    /// All ids whose entries contain `term` as a substring.
    ///
    /// The term is lower-cased before matching. Ids are collected in entry
    /// order without deduplication, so an item matching through several
    /// field values is reported once per occurrence.
    pub fn matching_ids(&self, term: &str) -> Vec<u64> {
        let term = term.to_lowercase();
        let mut ids = Vec::new();
        for (key, entry) in &self.entries {
            if key.contains(&term) {
                ids.extend_from_slice(entry);
            }
        }
        ids
    }

    /// Number of distinct index keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
