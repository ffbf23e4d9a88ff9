//! Partition Module
//!
//! A single named response cache: keyed snapshots plus insertion order.

use std::collections::HashMap;

use crate::cache::{InsertionOrder, ResponseSnapshot};

// == Partition ==
/// One named cache partition mapping request keys to response snapshots.
///
/// Keys keep their first-insertion position for the lifetime of the entry;
/// overwrites replace the snapshot without reordering. The eviction routine
/// relies on this to identify the oldest entry.
#[derive(Debug, Default)]
pub struct Partition {
    /// Key-snapshot storage
    entries: HashMap<String, ResponseSnapshot>,
    /// Insertion order tracker
    order: InsertionOrder,
}

impl Partition {
    // == Constructor ==
    /// Creates a new empty partition.
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            order: InsertionOrder::new(),
        }
    }

    // == Insert ==
    /// Stores a snapshot under the given key.
    ///
    /// An existing key is overwritten in place and keeps its insertion
    /// position.
    pub fn insert(&mut self, key: String, snapshot: ResponseSnapshot) {
        self.order.record(&key);
        self.entries.insert(key, snapshot);
    }

    // == Get ==
    /// Returns the snapshot stored under the key, if any.
    ///
    /// Reads do not reorder entries.
    pub fn get(&self, key: &str) -> Option<&ResponseSnapshot> {
        self.entries.get(key)
    }

    // == Remove ==
    /// Removes an entry by key. Returns true if it existed.
    pub fn remove(&mut self, key: &str) -> bool {
        if self.entries.remove(key).is_some() {
            self.order.remove(key);
            true
        } else {
            false
        }
    }

    // == Keys ==
    /// Returns all keys in insertion order, oldest first.
    pub fn keys(&self) -> Vec<String> {
        self.order.keys().cloned().collect()
    }

    // == Oldest ==
    /// Returns the oldest-inserted key, if any.
    pub fn oldest_key(&self) -> Option<&String> {
        self.order.oldest()
    }

    // == Length ==
    /// Returns the current number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
