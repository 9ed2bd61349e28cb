//! Property-based tests for compiled filters.
//!
//! These tests verify that index scans return exactly the records a naive
//! row-by-row evaluation selects, in index order.

use keyscan_core::schema::{Order, Table, TableBuilder};
use keyscan_core::{DataType, Row, Value};
use keyscan_index::Bookmark;
use keyscan_query::{
    CompileOptions, Expr, Filter, FilterStrategy, PrefixScan, QueryCompiler, SortOrder,
};
use keyscan_storage::TableStore;
use proptest::prelude::*;
use std::cmp::Reverse;

type Record = (i32, i64, String);

fn table() -> Table {
    TableBuilder::new("samples")
        .unwrap()
        .add_column("a", DataType::Int32)
        .unwrap()
        .add_column("b", DataType::Int64)
        .unwrap()
        .add_column("s", DataType::String)
        .unwrap()
        .add_ordered_index("ixAB", &[("a", Order::Asc), ("b", Order::Desc)])
        .unwrap()
        .add_index("ixS", &["s"])
        .unwrap()
        .build()
        .unwrap()
}

/// Strategy for generating records with many collisions.
fn records_strategy() -> impl Strategy<Value = Vec<Record>> {
    prop::collection::vec((-4i32..4, -20i64..20, "[a-c]{0,3}"), 0..80)
}

fn bound_strategy() -> impl Strategy<Value = Option<i64>> {
    prop::option::of(-25i64..25)
}

fn load(records: &[Record]) -> (TableStore, Vec<Bookmark>) {
    let mut store = TableStore::new(table()).unwrap();
    let bookmarks = records
        .iter()
        .map(|(a, b, s)| {
            store
                .insert(Row::new(vec![
                    Value::Int32(*a),
                    Value::Int64(*b),
                    Value::from(s.as_str()),
                ]))
                .unwrap()
        })
        .collect();
    (store, bookmarks)
}

/// Runs a filter and maps results back to insertion positions.
fn positions(store: &TableStore, filter: &Filter, bookmarks: &[Bookmark]) -> Vec<usize> {
    let mut cursor = store.cursor();
    filter
        .scan(&mut cursor)
        .map(|bookmark| {
            let bookmark = bookmark.unwrap();
            bookmarks.iter().position(|b| *b == bookmark).unwrap()
        })
        .collect()
}

fn b_condition(lo: Option<i64>, hi: Option<i64>) -> Vec<Expr> {
    let mut conditions = Vec::new();
    if let Some(lo) = lo {
        conditions.push(Expr::ge(Expr::field("b"), Expr::literal(lo)));
    }
    if let Some(hi) = hi {
        conditions.push(Expr::le(Expr::field("b"), Expr::literal(hi)));
    }
    conditions
}

fn in_bounds(v: i64, lo: Option<i64>, hi: Option<i64>) -> bool {
    lo.map_or(true, |lo| v >= lo) && hi.map_or(true, |hi| v <= hi)
}

proptest! {
    /// Equality on the first column plus a range on the descending second
    /// column returns matches ordered by `a` ascending, `b` descending.
    #[test]
    fn prop_equality_prefix_range(
        records in records_strategy(),
        a in -4i32..4,
        lo in bound_strategy(),
        hi in bound_strategy(),
        descending in any::<bool>(),
    ) {
        let (store, bookmarks) = load(&records);
        let mut conditions = vec![Expr::eq(Expr::field("a"), Expr::param(0))];
        conditions.extend(b_condition(lo, hi));
        let predicate = Expr::all(conditions).unwrap();

        let order = if descending { SortOrder::Desc } else { SortOrder::Asc };
        let plan = QueryCompiler::new(store.schema())
            .with_options(CompileOptions { order })
            .compile(&predicate)
            .unwrap();
        let filter = plan.bind(&[Value::Int32(a)]).unwrap();

        let mut expected: Vec<usize> = (0..records.len())
            .filter(|&i| records[i].0 == a && in_bounds(records[i].1, lo, hi))
            .collect();
        expected.sort_by_key(|&i| (Reverse(records[i].1), i));
        if descending {
            expected.reverse();
        }

        prop_assert_eq!(positions(&store, &filter, &bookmarks), expected);
    }

    /// A range over the leading column alone.
    #[test]
    fn prop_leading_column_range(
        records in records_strategy(),
        lo in prop::option::of(-5i32..5),
        hi in prop::option::of(-5i32..5),
    ) {
        prop_assume!(lo.is_some() || hi.is_some());
        let (store, bookmarks) = load(&records);
        let mut conditions = Vec::new();
        if let Some(lo) = lo {
            conditions.push(Expr::ge(Expr::field("a"), Expr::literal(lo)));
        }
        if let Some(hi) = hi {
            conditions.push(Expr::le(Expr::field("a"), Expr::literal(hi)));
        }
        let filter = QueryCompiler::new(store.schema())
            .compile(&Expr::all(conditions).unwrap())
            .unwrap()
            .bind(&[])
            .unwrap();

        let mut expected: Vec<usize> = (0..records.len())
            .filter(|&i| {
                let a = records[i].0;
                lo.map_or(true, |lo| a >= lo) && hi.map_or(true, |hi| a <= hi)
            })
            .collect();
        expected.sort_by_key(|&i| (records[i].0, Reverse(records[i].1), i));

        prop_assert_eq!(positions(&store, &filter, &bookmarks), expected);
    }

    /// A partial key on a standard string index finds every value that
    /// starts with the needle.
    #[test]
    fn prop_string_prefix(records in records_strategy(), needle in "[a-c]{1,2}") {
        let (store, bookmarks) = load(&records);
        let filter = Filter::new(FilterStrategy::Prefix(
            PrefixScan::new("ixS", 1, vec![Value::from(needle.as_str())]).unwrap(),
        ));

        let mut expected: Vec<usize> = (0..records.len())
            .filter(|&i| records[i].2.starts_with(needle.as_str()))
            .collect();
        expected.sort_by(|&x, &y| (&records[x].2, x).cmp(&(&records[y].2, y)));

        prop_assert_eq!(positions(&store, &filter, &bookmarks), expected);
    }
}
