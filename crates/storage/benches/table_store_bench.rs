//! Benchmarks for TableStore maintenance and cursor scans.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use keyscan_core::schema::{Table, TableBuilder, TupleLimits};
use keyscan_core::{DataType, Row, Value};
use keyscan_index::{Cursor, KeyLimit, SeekMode};
use keyscan_storage::TableStore;

fn create_test_schema() -> Table {
    TableBuilder::new("test")
        .unwrap()
        .add_column("id", DataType::Int64)
        .unwrap()
        .add_column("price", DataType::Float64)
        .unwrap()
        .add_column("symbol", DataType::String)
        .unwrap()
        .add_multi_valued("sectors", DataType::String)
        .unwrap()
        .add_primary_key(&["id"])
        .unwrap()
        .add_index("ixPrice", &["price"])
        .unwrap()
        .add_index("ixSectors", &["sectors"])
        .unwrap()
        .add_tuple_index("ixSymbolText", "symbol", TupleLimits { min_length: 2 })
        .unwrap()
        .build()
        .unwrap()
}

fn populate_store(store: &mut TableStore, count: i64) {
    let sectors = ["Tech", "Finance", "Health", "Energy", "Consumer"];
    for i in 1..=count {
        let row = Row::new(vec![
            Value::Int64(i),
            Value::Float64(100.0 + (i as f64) * 0.1),
            Value::String(format!("SYM{}", i)),
            Value::List(vec![
                Value::from(sectors[(i as usize) % sectors.len()]),
                Value::from(sectors[(i as usize * 7) % sectors.len()]),
            ]),
        ]);
        store.insert(row).unwrap();
    }
}

fn table_store_insert_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("table_store_insert");

    for size in [100i64, 1000, 5000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            b.iter(|| {
                let mut store = TableStore::new(create_test_schema()).unwrap();
                populate_store(&mut store, size);
                black_box(store.len())
            });
        });
    }

    group.finish();
}

fn cursor_range_scan_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("cursor_range_scan");

    for size in [1000i64, 10000].iter() {
        let mut store = TableStore::new(create_test_schema()).unwrap();
        populate_store(&mut store, *size);

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                let mut cursor = store.cursor();
                cursor.select_index(Some("ixPrice")).unwrap();
                let start = cursor
                    .make_key(&[Value::Float64(150.0)], KeyLimit::StartOfRange)
                    .unwrap();
                let mut count = 0usize;
                if cursor.seek(&start, SeekMode::GreaterOrEqual).unwrap() {
                    count += 1;
                    while count < 100 && cursor.move_next().unwrap() {
                        count += 1;
                    }
                }
                black_box(count)
            });
        });
    }

    group.finish();
}

criterion_group!(benches, table_store_insert_benchmark, cursor_range_scan_benchmark);
criterion_main!(benches);
