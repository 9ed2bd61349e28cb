//! Prefix scan.

use super::{check_width, KeyRange};
use crate::error::{FilterError, Result};
use alloc::string::String;
use alloc::vec::Vec;
use keyscan_core::Value;
use keyscan_index::KeyLimit;

/// Visits the entries whose last supplied key column begins with the last
/// value, the earlier columns matching exactly.
///
/// Over a tuple index, whose entries are the suffixes of a column, this
/// finds every record whose column contains the value.
#[derive(Clone, Debug, PartialEq)]
pub struct PrefixScan {
    index: String,
    values: Vec<Value>,
}

impl PrefixScan {
    /// Creates a prefix scan over an index with `width` key columns.
    pub fn new(index: impl Into<String>, width: usize, values: Vec<Value>) -> Result<Self> {
        let index = index.into();
        check_width(&index, width, &values)?;
        if values.is_empty() {
            return Err(FilterError::ValueCountOutOfBounds {
                index,
                width,
                count: 0,
            });
        }
        Ok(Self { index, values })
    }

    pub fn index(&self) -> &str {
        &self.index
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub(crate) fn key_range(&self) -> KeyRange<'_> {
        KeyRange {
            index: &self.index,
            start: Some((&self.values, KeyLimit::PartialStart)),
            end: Some((&self.values, KeyLimit::PartialEnd)),
        }
    }
}
