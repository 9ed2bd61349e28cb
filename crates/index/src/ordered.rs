//! Ordered index entries.
//!
//! An `OrderedIndex` stores `(key, bookmark)` pairs sorted by key, then by
//! bookmark, and answers the positional questions a cursor asks: first,
//! last, neighbours, seeks and rank.

use crate::bookmark::Bookmark;
use crate::key::{Key, KeySchema};
use crate::stats::IndexStats;
use crate::traits::{IndexError, Result};
use alloc::collections::BTreeSet;
use alloc::string::String;
use core::ops::Bound;

/// One index entry.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IndexEntry {
    pub key: Key,
    pub bookmark: Bookmark,
}

impl IndexEntry {
    pub fn new(key: Key, bookmark: Bookmark) -> Self {
        Self { key, bookmark }
    }

    /// The entry that sorts before every entry with `key`.
    fn floor(key: Key) -> Self {
        Self {
            key,
            bookmark: Bookmark::default(),
        }
    }
}

/// A sorted set of index entries.
#[derive(Clone, Debug)]
pub struct OrderedIndex {
    name: String,
    schema: KeySchema,
    /// Whether two records may share a key.
    unique: bool,
    entries: BTreeSet<IndexEntry>,
    stats: IndexStats,
}

impl OrderedIndex {
    /// Creates an empty index.
    pub fn new(name: impl Into<String>, schema: KeySchema, unique: bool) -> Self {
        Self {
            name: name.into(),
            schema,
            unique,
            entries: BTreeSet::new(),
            stats: IndexStats::new(),
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn schema(&self) -> &KeySchema {
        &self.schema
    }

    #[inline]
    pub fn is_unique(&self) -> bool {
        self.unique
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn stats(&self) -> &IndexStats {
        &self.stats
    }

    /// Inserts an entry. An identical entry is folded into the existing one.
    pub fn insert(&mut self, entry: IndexEntry) -> Result<()> {
        if self.unique {
            if let Some(existing) = self.seek_ge(&entry.key) {
                if existing.key == entry.key && existing.bookmark != entry.bookmark {
                    return Err(IndexError::DuplicateKey {
                        index: self.name.clone(),
                    });
                }
            }
        }
        if self.entries.insert(entry) {
            self.stats.add_entries(1);
        } else {
            self.stats.record_collapse();
        }
        Ok(())
    }

    /// Removes an entry, returning whether it was present.
    pub fn remove(&mut self, entry: &IndexEntry) -> bool {
        let removed = self.entries.remove(entry);
        if removed {
            self.stats.remove_entries(1);
        }
        removed
    }

    pub fn contains(&self, entry: &IndexEntry) -> bool {
        self.entries.contains(entry)
    }

    pub fn first(&self) -> Option<&IndexEntry> {
        self.entries.first()
    }

    pub fn last(&self) -> Option<&IndexEntry> {
        self.entries.last()
    }

    /// Returns the entry immediately after `entry`.
    pub fn next_after(&self, entry: &IndexEntry) -> Option<&IndexEntry> {
        self.entries
            .range((Bound::Excluded(entry), Bound::Unbounded))
            .next()
    }

    /// Returns the entry immediately before `entry`.
    pub fn prev_before(&self, entry: &IndexEntry) -> Option<&IndexEntry> {
        self.entries
            .range((Bound::Unbounded, Bound::Excluded(entry)))
            .next_back()
    }

    /// Returns the first entry whose key is at or after `key`.
    pub fn seek_ge(&self, key: &Key) -> Option<&IndexEntry> {
        let floor = IndexEntry::floor(key.clone());
        self.entries.range(floor..).next()
    }

    /// Returns the last entry whose key is at or before `key`.
    ///
    /// Keys that extend `key` sort after it and are excluded.
    pub fn seek_le(&self, key: &Key) -> Option<&IndexEntry> {
        let ceiling = IndexEntry::floor(key.successor());
        self.entries.range(..ceiling).next_back()
    }

    /// Returns the entry at zero-based position `n`.
    pub fn nth(&self, n: usize) -> Option<&IndexEntry> {
        self.entries.iter().nth(n)
    }

    /// Returns the number of entries sorting before `entry`.
    pub fn rank(&self, entry: &IndexEntry) -> usize {
        self.entries.range(..entry).count()
    }

    /// Iterates over all entries in key order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &IndexEntry> + '_ {
        self.entries.iter()
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.stats.clear();
    }
}
