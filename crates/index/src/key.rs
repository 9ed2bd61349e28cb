//! Composite key encoding.
//!
//! Index keys are flat byte strings whose lexicographic order matches the
//! order of the column values they were built from. Each column contributes
//! a tagged segment:
//!
//! - a tag byte (`0x01` for null, `0x02` for a value) so nulls sort first
//! - the value bytes, transformed so that unsigned byte comparison agrees
//!   with the value order
//!
//! Descending columns invert every byte of their segment. Strings and byte
//! strings are escaped and terminated so that a shorter value sorts before
//! any longer value sharing its prefix.
//!
//! A [`KeyLimit`] turns a value list into a search key: an exact key, a key
//! that sorts after every stored key it prefixes, or a partial key that
//! matches stored values beginning with the last supplied value.

use crate::traits::IndexError;
use alloc::format;
use alloc::vec::Vec;
use core::fmt;
use keyscan_core::schema::{IndexDef, Order, Table};
use keyscan_core::{DataType, Value};

const TAG_NULL: u8 = 0x01;
const TAG_VALUE: u8 = 0x02;

/// Suffix appended to end-of-range keys. No encoded segment starts with it.
pub const KEY_LIMIT_HIGH: [u8; 3] = [0xFF, 0xFF, 0xFF];

/// An encoded composite key.
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Key(Vec<u8>);

impl Key {
    /// Wraps already encoded key bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Returns the encoded bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns the encoded length in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true for the empty key, which sorts before every other key.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns true if `self` begins with all of `prefix`'s bytes.
    pub fn starts_with(&self, prefix: &Key) -> bool {
        self.0.starts_with(&prefix.0)
    }

    /// Returns the smallest key strictly greater than every key that
    /// compares equal to or extends `self` with a zero byte.
    pub(crate) fn successor(&self) -> Key {
        let mut bytes = self.0.clone();
        bytes.push(0x00);
        Key(bytes)
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Key(")?;
        for b in &self.0 {
            write!(f, "{:02x}", b)?;
        }
        write!(f, ")")
    }
}

/// How a value list is turned into a search key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyLimit {
    /// The key of exactly these values.
    Exact,
    /// Sorts before every stored key that has these values as a prefix.
    StartOfRange,
    /// Sorts after every stored key that has these values as a prefix.
    EndOfRange,
    /// Like `StartOfRange`, with the last value matched as a prefix.
    PartialStart,
    /// Like `EndOfRange`, with the last value matched as a prefix.
    PartialEnd,
}

impl KeyLimit {
    /// Returns true if the last value is matched as a prefix.
    #[inline]
    pub fn is_partial(&self) -> bool {
        matches!(self, KeyLimit::PartialStart | KeyLimit::PartialEnd)
    }

    /// Returns true if the key is placed after the matching keys.
    #[inline]
    pub fn is_end(&self) -> bool {
        matches!(self, KeyLimit::EndOfRange | KeyLimit::PartialEnd)
    }
}

/// Type and direction of one key column.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyColumn {
    pub data_type: DataType,
    pub order: Order,
}

impl KeyColumn {
    pub fn new(data_type: DataType, order: Order) -> Self {
        Self { data_type, order }
    }
}

/// Key layout of an index: its columns in key order.
#[derive(Clone, Debug, PartialEq)]
pub struct KeySchema {
    columns: Vec<KeyColumn>,
}

impl KeySchema {
    /// Creates a key schema from its columns.
    pub fn new(columns: Vec<KeyColumn>) -> Self {
        Self { columns }
    }

    /// Builds the key schema of an index declared on `table`.
    pub fn for_index(table: &Table, def: &IndexDef) -> Result<Self, IndexError> {
        let columns = def
            .columns()
            .iter()
            .map(|ic| {
                table
                    .get_column(&ic.name)
                    .map(|c| KeyColumn::new(c.data_type(), ic.order))
                    .ok_or_else(|| {
                        IndexError::Schema(keyscan_core::Error::column_not_found(
                            table.name(),
                            ic.name.as_str(),
                        ))
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { columns })
    }

    /// Returns the key columns.
    #[inline]
    pub fn columns(&self) -> &[KeyColumn] {
        &self.columns
    }

    /// Returns the number of key columns.
    #[inline]
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Encodes `values` (a prefix of the key columns) according to `limit`.
    ///
    /// Values are converted to their column type first. Lists are rejected:
    /// multi-valued columns are keyed one element at a time.
    pub fn make_key(&self, values: &[Value], limit: KeyLimit) -> Result<Key, IndexError> {
        if values.len() > self.columns.len() {
            return Err(IndexError::TooManyKeyValues {
                width: self.columns.len(),
                count: values.len(),
            });
        }
        if limit.is_partial() && values.is_empty() {
            return Err(IndexError::EmptyPartialKey);
        }

        let mut out = Vec::new();
        let last = values.len().wrapping_sub(1);
        for (i, (value, column)) in values.iter().zip(self.columns.iter()).enumerate() {
            let partial = limit.is_partial() && i == last;
            if partial && !column.data_type.supports_prefix() {
                return Err(IndexError::PartialKeyUnsupported {
                    data_type: column.data_type,
                });
            }
            encode_segment(&mut out, value, column, partial)?;
        }
        if limit.is_end() {
            out.extend_from_slice(&KEY_LIMIT_HIGH);
        }
        Ok(Key(out))
    }
}

fn encode_segment(
    out: &mut Vec<u8>,
    value: &Value,
    column: &KeyColumn,
    partial: bool,
) -> Result<(), IndexError> {
    let start = out.len();
    let coerced = value
        .coerce_to(column.data_type)
        .ok_or_else(|| IndexError::KeyTypeMismatch {
            expected: column.data_type,
            value: format!("{}", value),
        })?;

    match coerced {
        Value::Null => out.push(TAG_NULL),
        Value::Boolean(b) => {
            out.push(TAG_VALUE);
            out.push(b as u8);
        }
        Value::Int32(v) => {
            out.push(TAG_VALUE);
            out.extend_from_slice(&((v as u32) ^ 0x8000_0000).to_be_bytes());
        }
        Value::Int64(v) | Value::DateTime(v) => {
            out.push(TAG_VALUE);
            out.extend_from_slice(&((v as u64) ^ (1 << 63)).to_be_bytes());
        }
        Value::Float64(v) => {
            out.push(TAG_VALUE);
            out.extend_from_slice(&float_bits(v).to_be_bytes());
        }
        Value::String(s) => {
            out.push(TAG_VALUE);
            escape_into(out, s.as_bytes(), partial);
        }
        Value::Bytes(b) => {
            out.push(TAG_VALUE);
            escape_into(out, &b, partial);
        }
        Value::List(_) => {
            return Err(IndexError::KeyTypeMismatch {
                expected: column.data_type,
                value: format!("{}", value),
            })
        }
    }

    if column.order == Order::Desc {
        for b in &mut out[start..] {
            *b = !*b;
        }
    }
    Ok(())
}

/// Maps a float onto an unsigned integer with the same ordering.
fn float_bits(v: f64) -> u64 {
    // -0.0 and 0.0 compare equal, so they share a key.
    let v = if v == 0.0 { 0.0 } else { v };
    let bits = v.to_bits();
    if bits >> 63 == 1 {
        !bits
    } else {
        bits ^ (1 << 63)
    }
}

/// Escapes `0x00` and `0xFF` so the terminator and limit suffix stay unique.
fn escape_into(out: &mut Vec<u8>, bytes: &[u8], partial: bool) {
    for &b in bytes {
        match b {
            0x00 => out.extend_from_slice(&[0x00, 0x01]),
            0xFF => out.extend_from_slice(&[0xFF, 0x00]),
            _ => out.push(b),
        }
    }
    if !partial {
        out.extend_from_slice(&[0x00, 0x00]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema(columns: &[(DataType, Order)]) -> KeySchema {
        KeySchema::new(columns.iter().map(|&(t, o)| KeyColumn::new(t, o)).collect())
    }

    fn key(schema: &KeySchema, values: &[Value]) -> Key {
        schema.make_key(values, KeyLimit::Exact).unwrap()
    }

    #[test]
    fn test_integer_order() {
        let s = schema(&[(DataType::Int64, Order::Asc)]);
        let keys: Vec<Key> = [-100i64, -1, 0, 1, 100]
            .iter()
            .map(|&v| key(&s, &[Value::Int64(v)]))
            .collect();
        assert!(keys.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_null_sorts_first() {
        let s = schema(&[(DataType::Int32, Order::Asc)]);
        assert!(key(&s, &[Value::Null]) < key(&s, &[Value::Int32(i32::MIN)]));
    }

    #[test]
    fn test_float_order() {
        let s = schema(&[(DataType::Float64, Order::Asc)]);
        let keys: Vec<Key> = [f64::NEG_INFINITY, -2.5, -0.0, 1.0e-9, 3.0, f64::INFINITY]
            .iter()
            .map(|&v| key(&s, &[Value::Float64(v)]))
            .collect();
        assert!(keys.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(key(&s, &[Value::Float64(-0.0)]), key(&s, &[Value::Float64(0.0)]));
    }

    #[test]
    fn test_string_prefix_sorts_first() {
        let s = schema(&[(DataType::String, Order::Asc), (DataType::Int32, Order::Asc)]);
        let short = key(&s, &[Value::from("ab"), Value::Int32(9)]);
        let long = key(&s, &[Value::from("abc"), Value::Int32(0)]);
        assert!(short < long);
    }

    #[test]
    fn test_descending_column() {
        let s = schema(&[(DataType::Int32, Order::Desc)]);
        assert!(key(&s, &[Value::Int32(5)]) < key(&s, &[Value::Int32(1)]));
    }

    #[test]
    fn test_range_limits_bracket_prefix() {
        let s = schema(&[(DataType::String, Order::Asc), (DataType::Int64, Order::Asc)]);
        let start = s.make_key(&[Value::from("b")], KeyLimit::StartOfRange).unwrap();
        let end = s.make_key(&[Value::from("b")], KeyLimit::EndOfRange).unwrap();
        let inside = key(&s, &[Value::from("b"), Value::Int64(i64::MAX)]);
        let after = key(&s, &[Value::from("b\u{0}"), Value::Int64(0)]);
        assert!(start <= inside && inside <= end);
        assert!(after > end);
    }

    #[test]
    fn test_partial_limits_bracket_matches() {
        let s = schema(&[(DataType::String, Order::Asc)]);
        let start = s.make_key(&[Value::from("ab")], KeyLimit::PartialStart).unwrap();
        let end = s.make_key(&[Value::from("ab")], KeyLimit::PartialEnd).unwrap();
        for v in ["ab", "abc", "ab\u{ff}z"] {
            let k = key(&s, &[Value::from(v)]);
            assert!(start <= k && k <= end, "{} should match", v);
        }
        for v in ["aa", "a", "ac", "b"] {
            let k = key(&s, &[Value::from(v)]);
            assert!(k < start || k > end, "{} should not match", v);
        }
    }

    #[test]
    fn test_partial_on_integer_rejected() {
        let s = schema(&[(DataType::Int32, Order::Asc)]);
        let err = s.make_key(&[Value::Int32(1)], KeyLimit::PartialStart).unwrap_err();
        assert!(matches!(err, IndexError::PartialKeyUnsupported { .. }));
    }

    #[test]
    fn test_too_many_values() {
        let s = schema(&[(DataType::Int32, Order::Asc)]);
        let err = s
            .make_key(&[Value::Int32(1), Value::Int32(2)], KeyLimit::Exact)
            .unwrap_err();
        assert_eq!(err, IndexError::TooManyKeyValues { width: 1, count: 2 });
    }

    #[test]
    fn test_values_are_coerced() {
        let s = schema(&[(DataType::Int64, Order::Asc)]);
        assert_eq!(key(&s, &[Value::Int32(7)]), key(&s, &[Value::Int64(7)]));
        let s32 = schema(&[(DataType::Int32, Order::Asc)]);
        assert!(s32
            .make_key(&[Value::Int64(i64::MAX)], KeyLimit::Exact)
            .is_err());
        assert!(s32.make_key(&[Value::from("x")], KeyLimit::Exact).is_err());
    }

    #[test]
    fn test_empty_value_list() {
        let s = schema(&[(DataType::Int32, Order::Asc)]);
        assert!(key(&s, &[]).is_empty());
        let end = s.make_key(&[], KeyLimit::EndOfRange).unwrap();
        assert_eq!(end.as_bytes(), &KEY_LIMIT_HIGH);
        assert!(s.make_key(&[], KeyLimit::PartialEnd).is_err());
    }
}
