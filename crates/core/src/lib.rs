//! Keyscan Core - Core types, record mapping and schema definitions.
//!
//! This crate provides the foundational types shared by the keyscan engine and
//! query compiler:
//!
//! - `DataType`: Column types (Boolean, Int32, Int64, Float64, String, DateTime, Bytes)
//! - `Value`: Runtime values, including multi-valued lists
//! - `Row`: A record's values in column order
//! - `Record`: Mapping between typed structs and table rows
//! - `schema`: Table, column and index declarations plus the catalogue lookup
//! - `Error`: Error types for schema and record operations
//!
//! # Example
//!
//! ```rust
//! use keyscan_core::{DataType, Value, Row};
//! use keyscan_core::schema::{SchemaCatalogue, TableBuilder};
//!
//! let table = TableBuilder::new("orders")
//!     .unwrap()
//!     .add_column("id", DataType::Int64)
//!     .unwrap()
//!     .add_column("customer", DataType::String)
//!     .unwrap()
//!     .add_primary_key(&["id"])
//!     .unwrap()
//!     .add_index("ixCustomer", &["customer", "id"])
//!     .unwrap()
//!     .build()
//!     .unwrap();
//!
//! let covering = table.indices_covering("id");
//! assert_eq!(covering.len(), 2);
//!
//! let row = Row::new(vec![Value::Int64(1), Value::String("ada".into())]);
//! assert_eq!(row.get(1), Some(&Value::String("ada".into())));
//! ```

#![no_std]

extern crate alloc;

mod error;
mod record;
mod row;
pub mod schema;
mod types;
mod value;

pub use error::{Error, Result};
pub use record::Record;
pub use row::Row;
pub use types::DataType;
pub use value::Value;
