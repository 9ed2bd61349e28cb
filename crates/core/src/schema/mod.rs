//! Schema module for keyscan.
//!
//! This module contains the schema declarations (columns, tables, indices) and
//! the catalogue lookup the query compiler consumes.

mod catalogue;
mod column;
mod index;
mod table;

pub use catalogue::{IndexCoverage, SchemaCatalogue};
pub use column::Column;
pub use index::{IndexDef, IndexKind, IndexedColumn, Order, TupleLimits};
pub use table::{Table, TableBuilder};
