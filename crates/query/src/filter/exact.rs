//! Exact-match scan.

use super::{check_width, limit_for, KeyRange};
use crate::error::Result;
use alloc::string::String;
use alloc::vec::Vec;
use keyscan_core::Value;
use keyscan_index::KeyLimit;

/// Visits the entries whose leading key columns equal `values`.
///
/// With fewer values than key columns the remaining columns are
/// unconstrained and order the results.
#[derive(Clone, Debug, PartialEq)]
pub struct ExactMatch {
    index: String,
    width: usize,
    values: Vec<Value>,
}

impl ExactMatch {
    /// Creates an exact-match scan over an index with `width` key columns.
    pub fn new(index: impl Into<String>, width: usize, values: Vec<Value>) -> Result<Self> {
        let index = index.into();
        check_width(&index, width, &values)?;
        Ok(Self {
            index,
            width,
            values,
        })
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
            start: Some((
                &self.values,
                limit_for(self.values.len(), self.width, KeyLimit::StartOfRange),
            )),
            end: Some((&self.values, KeyLimit::EndOfRange)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FilterError;
    use alloc::vec;

    #[test]
    fn test_too_many_values() {
        let err = ExactMatch::new("ix", 1, vec![Value::Int32(1), Value::Int32(2)]).unwrap_err();
        assert_eq!(
            err,
            FilterError::ValueCountOutOfBounds {
                index: "ix".into(),
                width: 1,
                count: 2,
            }
        );
    }

    #[test]
    fn test_key_limits() {
        let partial = ExactMatch::new("ix", 2, vec![Value::Int32(1)]).unwrap();
        assert_eq!(partial.key_range().start.unwrap().1, KeyLimit::StartOfRange);

        let full = ExactMatch::new("ix", 1, vec![Value::Int32(1)]).unwrap();
        let range = full.key_range();
        assert_eq!(range.start.unwrap().1, KeyLimit::Exact);
        assert_eq!(range.end.unwrap().1, KeyLimit::EndOfRange);
    }
}
