//! Index catalogue lookup.

use super::column::Column;
use super::index::{IndexDef, Order};
use super::table::Table;
use alloc::string::String;
use alloc::vec::Vec;

/// One index that covers a given field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexCoverage {
    /// Index name.
    pub index: String,
    /// Ordinal position of the field within the index key.
    pub position: usize,
    /// Sort direction of the field within the index.
    pub order: Order,
    /// Whether the index is the clustering index.
    pub is_primary: bool,
}

/// Read-only schema lookup used while compiling queries.
///
/// Every method reports indices in declaration order.
pub trait SchemaCatalogue {
    /// Returns the indices whose key includes `field`.
    fn indices_covering(&self, field: &str) -> Vec<IndexCoverage>;

    /// Returns all declared indices.
    fn indices(&self) -> &[IndexDef];

    /// Looks up an index by name.
    fn index(&self, name: &str) -> Option<&IndexDef> {
        self.indices().iter().find(|i| i.name() == name)
    }

    /// Looks up a column by name.
    fn column(&self, name: &str) -> Option<&Column>;
}

impl SchemaCatalogue for Table {
    fn indices_covering(&self, field: &str) -> Vec<IndexCoverage> {
        self.indices()
            .iter()
            .filter_map(|def| {
                def.columns()
                    .iter()
                    .position(|c| c.name == field)
                    .map(|position| IndexCoverage {
                        index: def.name().into(),
                        position,
                        order: def.columns()[position].order,
                        is_primary: def.is_primary(),
                    })
            })
            .collect()
    }

    fn indices(&self) -> &[IndexDef] {
        Table::indices(self)
    }

    fn column(&self, name: &str) -> Option<&Column> {
        self.get_column(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::TableBuilder;
    use crate::DataType;

    #[test]
    fn test_indices_covering() {
        let table = TableBuilder::new("t")
            .unwrap()
            .add_column("c1", DataType::Int32)
            .unwrap()
            .add_column("c2", DataType::Int32)
            .unwrap()
            .add_column("c3", DataType::Int32)
            .unwrap()
            .add_primary_key(&["c1"])
            .unwrap()
            .add_ordered_index("ix2", &[("c3", Order::Asc), ("c2", Order::Desc)])
            .unwrap()
            .build()
            .unwrap();

        let c2 = table.indices_covering("c2");
        assert_eq!(c2.len(), 1);
        assert_eq!(c2[0].index, "ix2");
        assert_eq!(c2[0].position, 1);
        assert_eq!(c2[0].order, Order::Desc);
        assert!(!c2[0].is_primary);

        let c1 = table.indices_covering("c1");
        assert_eq!(c1.len(), 1);
        assert!(c1[0].is_primary);

        assert!(table.indices_covering("nope").is_empty());
        assert_eq!(SchemaCatalogue::index(&table, "ix2").map(|i| i.width()), Some(2));
    }
}
