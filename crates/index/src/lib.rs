//! Keyscan Index - Composite keys, ordered entries and the cursor contract.
//!
//! This crate provides the pieces an index-backed storage engine shares with
//! the query compiler:
//!
//! - `KeySchema`/`Key`/`KeyLimit`: order-preserving composite key encoding
//! - `Bookmark`: an opaque record identifier
//! - `OrderedIndex`: a sorted set of `(key, bookmark)` entries
//! - `Cursor`: the positioning and scanning contract filters drive
//!
//! # Example
//!
//! ```rust
//! use keyscan_core::schema::Order;
//! use keyscan_core::{DataType, Value};
//! use keyscan_index::{Bookmark, IndexEntry, KeyColumn, KeyLimit, KeySchema, OrderedIndex};
//!
//! let schema = KeySchema::new(vec![KeyColumn::new(DataType::String, Order::Asc)]);
//! let mut index = OrderedIndex::new("ixName", schema, false);
//!
//! for (seq, name) in ["bob", "alice", "carol"].iter().enumerate() {
//!     let key = index.schema().make_key(&[Value::from(*name)], KeyLimit::Exact).unwrap();
//!     index.insert(IndexEntry::new(key, Bookmark::from_sequence(seq as u64))).unwrap();
//! }
//!
//! let start = index.schema().make_key(&[Value::from("b")], KeyLimit::PartialStart).unwrap();
//! let hit = index.seek_ge(&start).unwrap();
//! assert_eq!(hit.bookmark, Bookmark::from_sequence(0));
//! ```

#![no_std]

extern crate alloc;

pub mod bookmark;
pub mod key;
pub mod ordered;
pub mod stats;
pub mod traits;

pub use bookmark::Bookmark;
pub use key::{Key, KeyColumn, KeyLimit, KeySchema, KEY_LIMIT_HIGH};
pub use ordered::{IndexEntry, OrderedIndex};
pub use stats::IndexStats;
pub use traits::{BoundSide, Cursor, IndexError, RecordPosition, Result, ScanBound, SeekMode};
