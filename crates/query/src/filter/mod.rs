//! Range filters over an index cursor.
//!
//! A `Filter` positions a cursor on the first entry that satisfies a compiled
//! predicate and installs the scan bound that stops iteration after the last
//! one. Filters hold no cursor state of their own: the selected index and the
//! bound live in the cursor, so applying a second filter to the same cursor
//! invalidates the first. `apply_from_bookmark` re-establishes a filter after
//! the cursor was moved by anything else.

mod exact;
mod prefix;
mod range;
mod whole;

pub use exact::ExactMatch;
pub use prefix::PrefixScan;
pub use range::RangeScan;
pub use whole::WholeIndexScan;

use crate::error::{FilterError, Result};
use crate::scan::Scan;
use keyscan_core::Value;
use keyscan_index::{Bookmark, BoundSide, Cursor, Key, KeyLimit, SeekMode};

/// Positions sampled by `Filter::estimate_count`.
pub const DEFAULT_ESTIMATE_SAMPLES: u64 = 8;

/// The closed set of scan behaviours.
#[derive(Clone, Debug, PartialEq)]
pub enum FilterStrategy {
    /// Every entry of an index, in either direction.
    WholeIndex(WholeIndexScan),
    /// Entries equal to a key prefix, ascending.
    ExactMatch(ExactMatch),
    /// Entries equal to a key prefix, descending.
    ExactMatchReversed(ExactMatch),
    /// Entries between two optional keys, ascending.
    Range(RangeScan),
    /// Entries between two optional keys, descending.
    RangeReversed(RangeScan),
    /// Entries whose last key column begins with a value.
    Prefix(PrefixScan),
}

impl FilterStrategy {
    /// Returns a short name for diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            FilterStrategy::WholeIndex(_) => "whole-index",
            FilterStrategy::ExactMatch(_) => "exact-match",
            FilterStrategy::ExactMatchReversed(_) => "exact-match-reversed",
            FilterStrategy::Range(_) => "range",
            FilterStrategy::RangeReversed(_) => "range-reversed",
            FilterStrategy::Prefix(_) => "prefix",
        }
    }
}

/// A compiled predicate bound to concrete values.
#[derive(Clone, Debug, PartialEq)]
pub struct Filter {
    strategy: FilterStrategy,
    /// Whether a scan must skip records it already returned.
    distinct: bool,
}

impl Filter {
    /// Creates a filter from a strategy.
    pub fn new(strategy: FilterStrategy) -> Self {
        Self {
            strategy,
            distinct: false,
        }
    }

    /// Sets whether scans suppress repeated bookmarks.
    pub fn with_distinct(mut self, distinct: bool) -> Self {
        self.distinct = distinct;
        self
    }

    #[inline]
    pub fn strategy(&self) -> &FilterStrategy {
        &self.strategy
    }

    #[inline]
    pub fn is_distinct(&self) -> bool {
        self.distinct
    }

    /// Returns the index the filter scans. `None` is the clustering index.
    pub fn index_name(&self) -> Option<&str> {
        match &self.strategy {
            FilterStrategy::WholeIndex(s) => s.index(),
            FilterStrategy::ExactMatch(s) | FilterStrategy::ExactMatchReversed(s) => Some(s.index()),
            FilterStrategy::Range(s) | FilterStrategy::RangeReversed(s) => Some(s.index()),
            FilterStrategy::Prefix(s) => Some(s.index()),
        }
    }

    /// Returns true if the scan moves backwards.
    pub fn is_reversed(&self) -> bool {
        match &self.strategy {
            FilterStrategy::WholeIndex(s) => s.is_reversed(),
            FilterStrategy::ExactMatchReversed(_) | FilterStrategy::RangeReversed(_) => true,
            _ => false,
        }
    }

    /// Returns true if the direction may change after construction.
    pub fn is_invertible(&self) -> bool {
        matches!(
            self.strategy,
            FilterStrategy::WholeIndex(_) | FilterStrategy::Range(_) | FilterStrategy::RangeReversed(_)
        )
    }

    /// Sets the scan direction.
    ///
    /// Exact-match and prefix filters fix their direction when built;
    /// asking them to change it fails.
    pub fn set_reversed(&mut self, reversed: bool) -> Result<()> {
        if reversed == self.is_reversed() {
            return Ok(());
        }
        let strategy = core::mem::replace(
            &mut self.strategy,
            FilterStrategy::WholeIndex(WholeIndexScan::new(None)),
        );
        match strategy {
            FilterStrategy::WholeIndex(s) => {
                self.strategy = FilterStrategy::WholeIndex(s.reversed(reversed));
            }
            FilterStrategy::Range(s) | FilterStrategy::RangeReversed(s) => {
                self.strategy = if reversed {
                    FilterStrategy::RangeReversed(s)
                } else {
                    FilterStrategy::Range(s)
                };
            }
            fixed => {
                let name = fixed.name();
                self.strategy = fixed;
                return Err(FilterError::Unsupported {
                    operation: "set_reversed",
                    strategy: name,
                });
            }
        }
        Ok(())
    }

    /// Positions the cursor on the first qualifying entry.
    ///
    /// Returns false if no entry qualifies.
    pub fn apply_from_start<C: Cursor>(&self, cursor: &mut C) -> Result<bool> {
        tracing::trace!(strategy = self.strategy.name(), index = ?self.index_name(), "apply from start");
        match &self.strategy {
            FilterStrategy::WholeIndex(s) => s.apply_from_start(cursor),
            FilterStrategy::ExactMatch(s) => s.key_range().apply(cursor, false),
            FilterStrategy::ExactMatchReversed(s) => s.key_range().apply(cursor, true),
            FilterStrategy::Range(s) => s.key_range().apply(cursor, false),
            FilterStrategy::RangeReversed(s) => s.key_range().apply(cursor, true),
            FilterStrategy::Prefix(s) => s.key_range().apply(cursor, false),
        }
    }

    /// Re-applies the filter and positions the cursor on `bookmark`.
    ///
    /// Returns false if the record is gone or no longer satisfies the filter;
    /// the cursor then has no usable position.
    pub fn apply_from_bookmark<C: Cursor>(&self, cursor: &mut C, bookmark: &Bookmark) -> Result<bool> {
        tracing::trace!(strategy = self.strategy.name(), ?bookmark, "apply from bookmark");
        match &self.strategy {
            FilterStrategy::WholeIndex(s) => s.apply_from_bookmark(cursor, bookmark),
            FilterStrategy::ExactMatch(s) => s.key_range().resume(cursor, bookmark, false),
            FilterStrategy::ExactMatchReversed(s) => s.key_range().resume(cursor, bookmark, true),
            FilterStrategy::Range(s) => s.key_range().resume(cursor, bookmark, false),
            FilterStrategy::RangeReversed(s) => s.key_range().resume(cursor, bookmark, true),
            FilterStrategy::Prefix(s) => s.key_range().resume(cursor, bookmark, false),
        }
    }

    /// Estimates the number of entries the filter visits.
    ///
    /// Only whole-index filters can estimate. The cursor is left positioned
    /// arbitrarily; apply the filter again before iterating.
    pub fn estimate_count<C: Cursor>(&self, cursor: &mut C) -> Result<u64> {
        self.estimate_count_with(cursor, DEFAULT_ESTIMATE_SAMPLES)
    }

    /// Like `estimate_count`, sampling `samples` positions.
    pub fn estimate_count_with<C: Cursor>(&self, cursor: &mut C, samples: u64) -> Result<u64> {
        match &self.strategy {
            FilterStrategy::WholeIndex(s) => s.estimate_count_with(cursor, samples),
            other => Err(FilterError::Unsupported {
                operation: "estimate_count",
                strategy: other.name(),
            }),
        }
    }

    /// Iterates the bookmarks of the matching records.
    pub fn scan<'f, 'c, C: Cursor>(&'f self, cursor: &'c mut C) -> Scan<'f, 'c, C> {
        Scan::new(self, cursor)
    }

    /// Iterates from `bookmark` (inclusive) onwards.
    pub fn scan_from<'f, 'c, C: Cursor>(
        &'f self,
        cursor: &'c mut C,
        bookmark: Bookmark,
    ) -> Scan<'f, 'c, C> {
        Scan::new(self, cursor).resume_from(bookmark)
    }
}

/// Chooses the marker for a key built from `count` of `width` columns.
pub(crate) fn limit_for(count: usize, width: usize, shorter: KeyLimit) -> KeyLimit {
    if count < width {
        shorter
    } else {
        KeyLimit::Exact
    }
}

/// Checks a value list against an index's width.
pub(crate) fn check_width(index: &str, width: usize, values: &[Value]) -> Result<()> {
    if values.len() > width {
        return Err(FilterError::ValueCountOutOfBounds {
            index: index.into(),
            width,
            count: values.len(),
        });
    }
    Ok(())
}

/// The start and end keys of a bounded scan, before encoding.
pub(crate) struct KeyRange<'a> {
    pub(crate) index: &'a str,
    pub(crate) start: Option<(&'a [Value], KeyLimit)>,
    pub(crate) end: Option<(&'a [Value], KeyLimit)>,
}

impl<'a> KeyRange<'a> {
    fn keys<C: Cursor>(&self, cursor: &C) -> Result<(Option<Key>, Option<Key>)> {
        let start = self
            .start
            .map(|(values, limit)| cursor.make_key(values, limit))
            .transpose()?;
        let end = self
            .end
            .map(|(values, limit)| cursor.make_key(values, limit))
            .transpose()?;
        Ok((start, end))
    }

    /// Seeks to the first entry in scan direction and bounds the other end.
    pub(crate) fn apply<C: Cursor>(&self, cursor: &mut C, reversed: bool) -> Result<bool> {
        cursor.select_index(Some(self.index))?;
        cursor.clear_scan_bound();
        let (start, end) = self.keys(cursor)?;

        let (seek, bound, mode, side) = if reversed {
            (end, start, SeekMode::LessOrEqual, BoundSide::Lower)
        } else {
            (start, end, SeekMode::GreaterOrEqual, BoundSide::Upper)
        };

        let positioned = match (&seek, reversed) {
            (Some(key), _) => cursor.seek(key, mode)?,
            (None, false) => cursor.move_first()?,
            (None, true) => cursor.move_last()?,
        };
        if !positioned {
            return Ok(false);
        }
        match bound {
            Some(key) => Ok(cursor.set_scan_bound(&key, side, true)?),
            None => Ok(true),
        }
    }

    /// Positions on the first entry of `bookmark`, in scan direction, that
    /// lies within the range.
    ///
    /// A record with several entries in the index qualifies if any of them
    /// does.
    pub(crate) fn resume<C: Cursor>(
        &self,
        cursor: &mut C,
        bookmark: &Bookmark,
        reversed: bool,
    ) -> Result<bool> {
        cursor.select_index(Some(self.index))?;
        cursor.clear_scan_bound();
        let (start, end) = self.keys(cursor)?;

        let mode = if reversed {
            SeekMode::LessOrEqual
        } else {
            SeekMode::GreaterOrEqual
        };
        if !cursor.goto_bookmark_within(bookmark, start.as_ref(), end.as_ref(), mode)? {
            tracing::trace!(index = self.index, ?bookmark, "bookmark outside filter range");
            return Ok(false);
        }

        let bound = if reversed {
            start.map(|k| (k, BoundSide::Lower))
        } else {
            end.map(|k| (k, BoundSide::Upper))
        };
        match bound {
            Some((key, side)) => Ok(cursor.set_scan_bound(&key, side, true)?),
            None => Ok(true),
        }
    }
}
