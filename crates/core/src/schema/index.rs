//! Index definition for keyscan table schemas.

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use core::cmp::Ordering;

/// Index kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum IndexKind {
    /// One entry per record (per element for multi-valued columns).
    #[default]
    Standard,
    /// One entry per suffix of a textual or binary column, for "contains" lookups.
    Tuple,
}

/// Sort order for index columns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Order {
    /// Ascending order.
    #[default]
    Asc,
    /// Descending order.
    Desc,
}

impl Order {
    /// Applies this order to a comparison result.
    #[inline]
    pub fn apply(&self, ord: Ordering) -> Ordering {
        match self {
            Order::Asc => ord,
            Order::Desc => ord.reverse(),
        }
    }
}

/// Bounds on the suffixes a tuple index stores.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TupleLimits {
    /// Suffixes shorter than this (in characters or bytes) are not indexed.
    pub min_length: usize,
}

impl Default for TupleLimits {
    fn default() -> Self {
        Self { min_length: 1 }
    }
}

/// A column reference within an index definition.
#[derive(Clone, Debug, PartialEq)]
pub struct IndexedColumn {
    /// Column name.
    pub name: String,
    /// Sort order for this column in the index.
    pub order: Order,
}

impl IndexedColumn {
    /// Creates a new indexed column with default ascending order.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            order: Order::Asc,
        }
    }

    /// Sets the sort order.
    pub fn order(mut self, order: Order) -> Self {
        self.order = order;
        self
    }
}

/// An index definition in a table schema.
#[derive(Clone, Debug)]
pub struct IndexDef {
    /// Index name.
    name: String,
    /// Table name this index belongs to.
    table_name: String,
    /// Columns included in this index, in key order.
    columns: Vec<IndexedColumn>,
    /// Whether this is the clustering (primary) index.
    primary: bool,
    /// Index kind.
    kind: IndexKind,
    /// Suffix limits, only meaningful for tuple indices.
    tuple_limits: TupleLimits,
}

impl IndexDef {
    /// Creates a new index definition.
    pub fn new(
        name: impl Into<String>,
        table_name: impl Into<String>,
        columns: Vec<IndexedColumn>,
    ) -> Self {
        Self {
            name: name.into(),
            table_name: table_name.into(),
            columns,
            primary: false,
            kind: IndexKind::Standard,
            tuple_limits: TupleLimits::default(),
        }
    }

    /// Marks this index as the clustering index.
    pub fn primary(mut self, primary: bool) -> Self {
        self.primary = primary;
        self
    }

    /// Sets the index kind.
    pub fn kind(mut self, kind: IndexKind) -> Self {
        self.kind = kind;
        self
    }

    /// Sets the tuple limits.
    pub fn tuple_limits(mut self, limits: TupleLimits) -> Self {
        self.tuple_limits = limits;
        self
    }

    /// Returns the index name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the table name.
    #[inline]
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Returns the normalized name (table.index).
    pub fn normalized_name(&self) -> String {
        format!("{}.{}", self.table_name, self.name)
    }

    /// Returns the indexed columns.
    #[inline]
    pub fn columns(&self) -> &[IndexedColumn] {
        &self.columns
    }

    /// Returns the number of key columns.
    #[inline]
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Returns the ordinal position of a column within the key.
    pub fn position_of(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == column)
    }

    /// Returns whether this is the clustering index.
    #[inline]
    pub fn is_primary(&self) -> bool {
        self.primary
    }

    /// Returns the index kind.
    #[inline]
    pub fn get_kind(&self) -> IndexKind {
        self.kind
    }

    /// Returns whether this is a tuple index.
    #[inline]
    pub fn is_tuple(&self) -> bool {
        self.kind == IndexKind::Tuple
    }

    /// Returns the tuple limits.
    #[inline]
    pub fn get_tuple_limits(&self) -> TupleLimits {
        self.tuple_limits
    }
}

impl PartialEq for IndexDef {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.table_name == other.table_name
    }
}
