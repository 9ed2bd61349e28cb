//! Cursor contract for keyscan.
//!
//! This module defines the `Cursor` trait that every index-backed storage
//! engine implements, together with the positioning vocabulary it shares
//! with the query compiler.

use crate::bookmark::Bookmark;
use crate::key::{Key, KeyLimit};
use alloc::string::String;
use keyscan_core::{DataType, Value};

/// Direction of a seek.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SeekMode {
    /// Position on the first entry whose key is at or after the search key.
    GreaterOrEqual,
    /// Position on the last entry whose key is at or before the search key.
    LessOrEqual,
}

/// Which end of the scan a bound limits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BoundSide {
    /// Forward movement stops after the bound.
    Upper,
    /// Backward movement stops before the bound.
    Lower,
}

/// A limit on cursor movement within the selected index.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScanBound {
    pub key: Key,
    pub side: BoundSide,
    pub inclusive: bool,
}

impl ScanBound {
    /// Creates a new bound.
    pub fn new(key: Key, side: BoundSide, inclusive: bool) -> Self {
        Self {
            key,
            side,
            inclusive,
        }
    }

    /// Returns true if an entry with `key` lies on the permitted side.
    pub fn admits(&self, key: &Key) -> bool {
        match (self.side, self.inclusive) {
            (BoundSide::Upper, true) => key <= &self.key,
            (BoundSide::Upper, false) => key < &self.key,
            (BoundSide::Lower, true) => key >= &self.key,
            (BoundSide::Lower, false) => key > &self.key,
        }
    }
}

/// Where the current entry sits in the selected index.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RecordPosition {
    /// Number of entries that sort before the current one.
    pub entries_before: u64,
    /// Number of entries in the index.
    pub entries_total: u64,
}

/// Errors raised by key encoding and cursor operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum IndexError {
    /// A record with the same clustering key already exists.
    #[error("Duplicate key in index {index}")]
    DuplicateKey { index: String },
    /// The operation needs a current entry and the cursor has none.
    #[error("Cursor has no current entry")]
    NoCurrentEntry,
    /// The named index does not exist on the table.
    #[error("Unknown index: {name}")]
    UnknownIndex { name: String },
    /// More key values than the index has columns.
    #[error("Key has {count} values but the index has {width} columns")]
    TooManyKeyValues { width: usize, count: usize },
    /// A key value cannot be represented in its column's type.
    #[error("Value {value} cannot be used as a {expected:?} key column")]
    KeyTypeMismatch { expected: DataType, value: String },
    /// Prefix matching was requested on a column that is not textual or binary.
    #[error("Partial key matching is not supported on {data_type:?} columns")]
    PartialKeyUnsupported { data_type: DataType },
    /// Prefix matching was requested with no values.
    #[error("Partial key limit needs at least one value")]
    EmptyPartialKey,
    /// The bookmark does not name a stored record.
    #[error("Record not found")]
    RecordNotFound,
    /// A schema or record mapping error.
    #[error(transparent)]
    Schema(#[from] keyscan_core::Error),
}

/// Result type alias for cursor operations.
pub type Result<T> = core::result::Result<T, IndexError>;

/// A positioned reader over one index of a table at a time.
///
/// Movement that would pass the end of the index, or a scan bound, leaves
/// the cursor without a current entry and reports `false`. Positioning
/// operations (`seek`, `move_first`, `move_last`, `goto_bookmark`,
/// `goto_bookmark_within`, `goto_position`) discard any scan bounds.
pub trait Cursor {
    /// Selects the index to traverse. `None` selects the clustering index.
    ///
    /// Reselecting the current index keeps the position and bounds.
    fn select_index(&mut self, name: Option<&str>) -> Result<()>;

    /// Returns the name of the selected index.
    fn current_index(&self) -> &str;

    /// Removes both scan bounds.
    fn clear_scan_bound(&mut self);

    /// Encodes a key for the selected index.
    fn make_key(&self, values: &[Value], limit: KeyLimit) -> Result<Key>;

    /// Positions on an entry relative to `key`. Returns false if none exists.
    fn seek(&mut self, key: &Key, mode: SeekMode) -> Result<bool>;

    /// Limits further movement to one side of `key`.
    ///
    /// Returns whether the current entry lies within the new bound. If it
    /// does not, the cursor loses its position.
    fn set_scan_bound(&mut self, key: &Key, side: BoundSide, inclusive: bool) -> Result<bool>;

    fn move_first(&mut self) -> Result<bool>;

    fn move_last(&mut self) -> Result<bool>;

    fn move_next(&mut self) -> Result<bool>;

    fn move_previous(&mut self) -> Result<bool>;

    /// Returns the bookmark of the record under the cursor.
    fn current_bookmark(&self) -> Result<Bookmark>;

    /// Positions on the record's first entry in the selected index.
    ///
    /// Returns false if the record does not exist or has no entry in the
    /// selected index.
    fn goto_bookmark(&mut self, bookmark: &Bookmark) -> Result<bool>;

    /// Positions on the record's entry within `[start, end]`, both inclusive
    /// and either open. `GreaterOrEqual` picks the record's lowest such
    /// entry, `LessOrEqual` its highest.
    ///
    /// Returns false if the record has no entry in the range. Scan bounds
    /// are discarded.
    ///
    /// The default walks the range through the cursor; engines that can
    /// enumerate a record's entries should override it.
    fn goto_bookmark_within(
        &mut self,
        bookmark: &Bookmark,
        start: Option<&Key>,
        end: Option<&Key>,
        mode: SeekMode,
    ) -> Result<bool> {
        let mut found = match (mode, start, end) {
            (SeekMode::GreaterOrEqual, Some(key), _) => self.seek(key, mode)?,
            (SeekMode::GreaterOrEqual, None, _) => self.move_first()?,
            (SeekMode::LessOrEqual, _, Some(key)) => self.seek(key, mode)?,
            (SeekMode::LessOrEqual, _, None) => self.move_last()?,
        };
        while found {
            let key = self.current_key()?;
            let passed = match mode {
                SeekMode::GreaterOrEqual => end.map_or(false, |e| &key > e),
                SeekMode::LessOrEqual => start.map_or(false, |s| &key < s),
            };
            if passed {
                break;
            }
            if self.current_bookmark()? == *bookmark {
                return Ok(true);
            }
            found = match mode {
                SeekMode::GreaterOrEqual => self.move_next()?,
                SeekMode::LessOrEqual => self.move_previous()?,
            };
        }
        Ok(false)
    }

    /// Returns the key of the current entry.
    fn current_key(&self) -> Result<Key>;

    /// Positions at approximately `numerator / denominator` of the index.
    fn goto_position(&mut self, numerator: u64, denominator: u64) -> Result<bool>;

    /// Reports where the current entry sits in the index.
    fn record_position(&self) -> Result<RecordPosition>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn k(b: u8) -> Key {
        Key::from_bytes(vec![b])
    }

    #[test]
    fn test_upper_bound_admits() {
        let inclusive = ScanBound::new(k(5), BoundSide::Upper, true);
        assert!(inclusive.admits(&k(5)));
        assert!(inclusive.admits(&k(4)));
        assert!(!inclusive.admits(&k(6)));

        let exclusive = ScanBound::new(k(5), BoundSide::Upper, false);
        assert!(!exclusive.admits(&k(5)));
    }

    #[test]
    fn test_lower_bound_admits() {
        let inclusive = ScanBound::new(k(5), BoundSide::Lower, true);
        assert!(inclusive.admits(&k(5)));
        assert!(inclusive.admits(&k(9)));
        assert!(!inclusive.admits(&k(4)));

        let exclusive = ScanBound::new(k(5), BoundSide::Lower, false);
        assert!(!exclusive.admits(&k(5)));
    }

    #[test]
    fn test_error_display() {
        let err = IndexError::TooManyKeyValues { width: 2, count: 3 };
        assert_eq!(
            alloc::format!("{}", err),
            "Key has 3 values but the index has 2 columns"
        );
    }
}
