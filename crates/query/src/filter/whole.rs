//! Whole-index scan.

use crate::error::Result;
use alloc::string::String;
use keyscan_index::{Bookmark, Cursor, SeekMode};

/// Visits every entry of one index.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WholeIndexScan {
    /// `None` scans the clustering index.
    index: Option<String>,
    reversed: bool,
}

impl WholeIndexScan {
    /// Creates a forward scan over the given index.
    pub fn new(index: Option<String>) -> Self {
        Self {
            index,
            reversed: false,
        }
    }

    /// Sets the scan direction.
    pub fn reversed(mut self, reversed: bool) -> Self {
        self.reversed = reversed;
        self
    }

    pub fn index(&self) -> Option<&str> {
        self.index.as_deref()
    }

    pub fn is_reversed(&self) -> bool {
        self.reversed
    }

    fn select<C: Cursor>(&self, cursor: &mut C) -> Result<()> {
        cursor.select_index(self.index.as_deref())?;
        cursor.clear_scan_bound();
        Ok(())
    }

    pub(crate) fn apply_from_start<C: Cursor>(&self, cursor: &mut C) -> Result<bool> {
        self.select(cursor)?;
        let found = if self.reversed {
            cursor.move_last()?
        } else {
            cursor.move_first()?
        };
        Ok(found)
    }

    pub(crate) fn apply_from_bookmark<C: Cursor>(
        &self,
        cursor: &mut C,
        bookmark: &Bookmark,
    ) -> Result<bool> {
        self.select(cursor)?;
        let mode = if self.reversed {
            SeekMode::LessOrEqual
        } else {
            SeekMode::GreaterOrEqual
        };
        Ok(cursor.goto_bookmark_within(bookmark, None, None, mode)?)
    }

    /// Samples `samples` evenly spaced positions and averages the entry
    /// counts they imply.
    pub(crate) fn estimate_count_with<C: Cursor>(&self, cursor: &mut C, samples: u64) -> Result<u64> {
        self.select(cursor)?;
        if !cursor.move_first()? {
            return Ok(0);
        }

        let samples = samples.max(1);
        let denominator = samples + 1;
        let mut sum: u128 = 0;
        for i in 1..=samples {
            if !cursor.goto_position(i, denominator)? {
                return Ok(0);
            }
            let before = cursor.record_position()?.entries_before as u128;
            // Midpoint of the entry, so a single-entry index estimates one.
            sum += (2 * before + 1) * denominator as u128 / (2 * i as u128);
        }
        let estimate = (sum / samples as u128) as u64;

        tracing::trace!(index = ?self.index, samples, estimate, "estimated entry count");
        Ok(estimate.max(1))
    }
}
