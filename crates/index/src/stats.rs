//! Index statistics for keyscan.

use core::sync::atomic::{AtomicUsize, Ordering};

/// Entry counters for an ordered index.
#[derive(Debug)]
pub struct IndexStats {
    /// Entries currently stored.
    total_entries: AtomicUsize,
    /// Entries rejected because their key already existed for the record.
    collapsed_entries: AtomicUsize,
}

impl IndexStats {
    pub fn new() -> Self {
        Self {
            total_entries: AtomicUsize::new(0),
            collapsed_entries: AtomicUsize::new(0),
        }
    }

    /// Returns the number of stored entries.
    pub fn total_entries(&self) -> usize {
        self.total_entries.load(Ordering::Relaxed)
    }

    /// Returns how many duplicate entries were folded into existing ones.
    pub fn collapsed_entries(&self) -> usize {
        self.collapsed_entries.load(Ordering::Relaxed)
    }

    pub fn add_entries(&self, count: usize) {
        self.total_entries.fetch_add(count, Ordering::Relaxed);
    }

    pub fn remove_entries(&self, count: usize) {
        self.total_entries.fetch_sub(count, Ordering::Relaxed);
    }

    pub fn record_collapse(&self) {
        self.collapsed_entries.fetch_add(1, Ordering::Relaxed);
    }

    /// Resets all counters.
    pub fn clear(&self) {
        self.total_entries.store(0, Ordering::Relaxed);
        self.collapsed_entries.store(0, Ordering::Relaxed);
    }
}

impl Default for IndexStats {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for IndexStats {
    fn clone(&self) -> Self {
        Self {
            total_entries: AtomicUsize::new(self.total_entries()),
            collapsed_entries: AtomicUsize::new(self.collapsed_entries()),
        }
    }
}
