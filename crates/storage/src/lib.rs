//! Keyscan Storage - In-memory table store and index cursor.
//!
//! This crate provides a reference storage engine for the keyscan query
//! compiler:
//!
//! - `TableStore`: Records of one table with clustering and secondary index maintenance
//! - `TableCursor`: A `Cursor` over any index of a `TableStore`
//!
//! # Example
//!
//! ```rust
//! use keyscan_core::schema::TableBuilder;
//! use keyscan_core::{DataType, Row, Value};
//! use keyscan_index::{Cursor, KeyLimit, SeekMode};
//! use keyscan_storage::TableStore;
//!
//! let schema = TableBuilder::new("users")
//!     .unwrap()
//!     .add_column("id", DataType::Int64)
//!     .unwrap()
//!     .add_column("name", DataType::String)
//!     .unwrap()
//!     .add_primary_key(&["id"])
//!     .unwrap()
//!     .add_index("ixName", &["name"])
//!     .unwrap()
//!     .build()
//!     .unwrap();
//!
//! let mut store = TableStore::new(schema).unwrap();
//! store.insert(Row::new(vec![Value::Int64(1), Value::from("Alice")])).unwrap();
//! store.insert(Row::new(vec![Value::Int64(2), Value::from("Bob")])).unwrap();
//!
//! let mut cursor = store.cursor();
//! cursor.select_index(Some("ixName")).unwrap();
//! let key = cursor.make_key(&[Value::from("Bob")], KeyLimit::Exact).unwrap();
//! assert!(cursor.seek(&key, SeekMode::GreaterOrEqual).unwrap());
//! assert_eq!(cursor.current_row().unwrap().get(0), Some(&Value::Int64(2)));
//! ```

#![no_std]

extern crate alloc;

pub mod cursor;
pub mod row_store;

pub use cursor::TableCursor;
pub use row_store::{TableStore, SEQUENCE_INDEX};
