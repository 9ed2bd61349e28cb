//! Bounded-range scan.

use super::{check_width, limit_for, KeyRange};
use crate::error::Result;
use alloc::string::String;
use alloc::vec::Vec;
use keyscan_core::Value;
use keyscan_index::KeyLimit;

/// Visits the entries between an optional start key and an optional end key,
/// both inclusive.
///
/// Each bound is a value list over the leading key columns; a list shorter
/// than the key covers every entry it prefixes. Without a start the scan
/// begins at the first entry; without an end it runs to the last.
#[derive(Clone, Debug, PartialEq)]
pub struct RangeScan {
    index: String,
    width: usize,
    start: Option<Vec<Value>>,
    end: Option<Vec<Value>>,
}

impl RangeScan {
    /// Creates a range scan over an index with `width` key columns.
    pub fn new(
        index: impl Into<String>,
        width: usize,
        start: Option<Vec<Value>>,
        end: Option<Vec<Value>>,
    ) -> Result<Self> {
        let index = index.into();
        for values in start.iter().chain(end.iter()) {
            check_width(&index, width, values)?;
        }
        Ok(Self {
            index,
            width,
            start,
            end,
        })
    }

    pub fn index(&self) -> &str {
        &self.index
    }

    pub fn start(&self) -> Option<&[Value]> {
        self.start.as_deref()
    }

    pub fn end(&self) -> Option<&[Value]> {
        self.end.as_deref()
    }

    pub(crate) fn key_range(&self) -> KeyRange<'_> {
        KeyRange {
            index: &self.index,
            start: self.start.as_deref().map(|values| {
                (values, limit_for(values.len(), self.width, KeyLimit::StartOfRange))
            }),
            end: self.end.as_deref().map(|values| {
                (values, limit_for(values.len(), self.width, KeyLimit::EndOfRange))
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn test_bounds_checked() {
        assert!(RangeScan::new("ix", 1, None, Some(vec![Value::Int32(1), Value::Int32(2)])).is_err());
        assert!(RangeScan::new("ix", 2, Some(vec![Value::Int32(1)]), None).is_ok());
    }

    #[test]
    fn test_open_range_has_no_keys() {
        let scan = RangeScan::new("ix", 2, None, None).unwrap();
        let range = scan.key_range();
        assert!(range.start.is_none() && range.end.is_none());
    }
}
