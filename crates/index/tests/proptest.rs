//! Property-based tests for keyscan-index using proptest.

use keyscan_core::schema::Order;
use keyscan_core::{DataType, Value};
use keyscan_index::{Bookmark, IndexEntry, KeyColumn, KeyLimit, KeySchema, OrderedIndex};
use proptest::prelude::*;

fn single(data_type: DataType, order: Order) -> KeySchema {
    KeySchema::new(vec![KeyColumn::new(data_type, order)])
}

fn exact(schema: &KeySchema, values: &[Value]) -> keyscan_index::Key {
    schema.make_key(values, KeyLimit::Exact).unwrap()
}

proptest! {
    /// Integer keys sort like the integers they encode.
    #[test]
    fn int64_key_order_matches_value_order(a in any::<i64>(), b in any::<i64>()) {
        let s = single(DataType::Int64, Order::Asc);
        let (ka, kb) = (exact(&s, &[Value::Int64(a)]), exact(&s, &[Value::Int64(b)]));
        prop_assert_eq!(ka.cmp(&kb), a.cmp(&b));
    }

    /// Descending columns reverse the order.
    #[test]
    fn descending_reverses_order(a in any::<i32>(), b in any::<i32>()) {
        let s = single(DataType::Int32, Order::Desc);
        let (ka, kb) = (exact(&s, &[Value::Int32(a)]), exact(&s, &[Value::Int32(b)]));
        prop_assert_eq!(ka.cmp(&kb), b.cmp(&a));
    }

    /// Finite floats sort like their numeric values.
    #[test]
    fn float_key_order_matches_value_order(a in -1.0e12f64..1.0e12, b in -1.0e12f64..1.0e12) {
        let s = single(DataType::Float64, Order::Asc);
        let (ka, kb) = (exact(&s, &[Value::Float64(a)]), exact(&s, &[Value::Float64(b)]));
        prop_assert_eq!(Some(ka.cmp(&kb)), a.partial_cmp(&b));
    }

    /// Byte-string keys sort like the byte strings, embedded zeros included.
    #[test]
    fn bytes_key_order_matches_value_order(
        a in prop::collection::vec(any::<u8>(), 0..12),
        b in prop::collection::vec(any::<u8>(), 0..12),
    ) {
        let s = single(DataType::Bytes, Order::Asc);
        let ka = exact(&s, &[Value::Bytes(a.clone())]);
        let kb = exact(&s, &[Value::Bytes(b.clone())]);
        prop_assert_eq!(ka.cmp(&kb), a.cmp(&b));
    }

    /// Composite keys order by the first column, then the second.
    #[test]
    fn composite_key_order_is_lexicographic(
        a in ("[a-c]{0,4}", any::<i32>()),
        b in ("[a-c]{0,4}", any::<i32>()),
    ) {
        let s = KeySchema::new(vec![
            KeyColumn::new(DataType::String, Order::Asc),
            KeyColumn::new(DataType::Int32, Order::Asc),
        ]);
        let ka = exact(&s, &[Value::from(a.0.as_str()), Value::Int32(a.1)]);
        let kb = exact(&s, &[Value::from(b.0.as_str()), Value::Int32(b.1)]);
        prop_assert_eq!(ka.cmp(&kb), (a.0.as_bytes(), a.1).cmp(&(b.0.as_bytes(), b.1)));
    }

    /// A partial range covers exactly the strings beginning with the prefix.
    #[test]
    fn partial_range_matches_prefix(prefix in "[a-c]{1,3}", value in "[a-c]{0,5}") {
        let s = single(DataType::String, Order::Asc);
        let start = s.make_key(&[Value::from(prefix.as_str())], KeyLimit::PartialStart).unwrap();
        let end = s.make_key(&[Value::from(prefix.as_str())], KeyLimit::PartialEnd).unwrap();
        let k = exact(&s, &[Value::from(value.as_str())]);
        prop_assert_eq!(start <= k && k <= end, value.starts_with(prefix.as_str()));
    }

    /// Seeking at or after a key returns the smallest key not below it.
    #[test]
    fn seek_ge_finds_smallest_not_below(
        values in prop::collection::vec(-500i64..500, 1..200),
        target in -600i64..600,
    ) {
        let s = single(DataType::Int64, Order::Asc);
        let mut index = OrderedIndex::new("ix", s.clone(), false);
        for (seq, v) in values.iter().enumerate() {
            index.insert(IndexEntry::new(exact(&s, &[Value::Int64(*v)]), Bookmark::from_sequence(seq as u64))).unwrap();
        }
        let expected = values.iter().copied().filter(|v| *v >= target).min();
        let found = index.seek_ge(&exact(&s, &[Value::Int64(target)]));
        prop_assert_eq!(found.map(|e| e.key.clone()), expected.map(|v| exact(&s, &[Value::Int64(v)])));
        prop_assert_eq!(index.len(), values.len());
    }
}
