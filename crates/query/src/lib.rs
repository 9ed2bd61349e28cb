//! Keyscan Query - Predicate compiler and range-filter engine.
//!
//! This crate turns record predicates into index range scans:
//!
//! - `ast`: Predicate expressions over record fields
//! - `decompose`: Flattening a conjunction into `(field, kind, value)` triples
//! - `plan`: Index selection and compiled, reusable `QueryPlan`s
//! - `filter`: The six scan strategies that drive a `Cursor`
//! - `scan`: Bookmark iteration with duplicate suppression
//! - `plan_cache`: Plan caching for repeated predicates
//!
//! A predicate that cannot be answered by a single index range is rejected
//! at compile time; there is no fallback to a full scan.
//!
//! # Example
//!
//! ```rust
//! use keyscan_core::schema::TableBuilder;
//! use keyscan_core::{DataType, Row, Value};
//! use keyscan_query::{Expr, QueryCompiler};
//! use keyscan_storage::TableStore;
//!
//! let schema = TableBuilder::new("orders")
//!     .unwrap()
//!     .add_column("id", DataType::Int64)
//!     .unwrap()
//!     .add_column("customer", DataType::String)
//!     .unwrap()
//!     .add_column("total", DataType::Int32)
//!     .unwrap()
//!     .add_primary_key(&["id"])
//!     .unwrap()
//!     .add_index("ixCustomerTotal", &["customer", "total"])
//!     .unwrap()
//!     .build()
//!     .unwrap();
//!
//! let mut store = TableStore::new(schema).unwrap();
//! for (id, customer, total) in [(1, "ada", 50), (2, "ada", 150), (3, "bob", 300)] {
//!     store
//!         .insert(Row::new(vec![Value::Int64(id), Value::from(customer), Value::Int32(total)]))
//!         .unwrap();
//! }
//!
//! let predicate = Expr::and(
//!     Expr::eq(Expr::field("customer"), Expr::param(0)),
//!     Expr::ge(Expr::field("total"), Expr::literal(100)),
//! );
//! let plan = QueryCompiler::new(store.schema()).compile(&predicate).unwrap();
//! assert_eq!(plan.index_name(), Some("ixCustomerTotal"));
//!
//! let filter = plan.bind(&[Value::from("ada")]).unwrap();
//! let mut cursor = store.cursor();
//! let hits: Vec<_> = filter.scan(&mut cursor).collect::<Result<_, _>>().unwrap();
//! assert_eq!(hits.len(), 1);
//! assert_eq!(store.get(&hits[0]).unwrap().get(0), Some(&Value::Int64(2)));
//! ```

#![no_std]

extern crate alloc;

pub mod ast;
pub mod decompose;
pub mod error;
pub mod filter;
pub mod plan;
pub mod plan_cache;
pub mod scan;
mod selector;
pub mod unique;

pub use ast::{BinaryOp, Expr, SortOrder, UnaryOp, ValueThunk};
pub use decompose::{decompose, Comparison, Triple, TripleKind, ValueSource};
pub use error::{CompileError, FilterError, Result};
pub use filter::{
    ExactMatch, Filter, FilterStrategy, PrefixScan, RangeScan, WholeIndexScan,
    DEFAULT_ESTIMATE_SAMPLES,
};
pub use plan::{CompileOptions, PlanDescription, QueryCompiler, QueryPlan};
pub use plan_cache::{compute_expr_fingerprint, PlanCache};
pub use scan::Scan;
pub use unique::UniqueBookmarks;
