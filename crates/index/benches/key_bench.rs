//! Benchmarks for keyscan-index using criterion.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use keyscan_core::schema::Order;
use keyscan_core::{DataType, Value};
use keyscan_index::{Bookmark, IndexEntry, KeyColumn, KeyLimit, KeySchema, OrderedIndex};

fn composite_schema() -> KeySchema {
    KeySchema::new(vec![
        KeyColumn::new(DataType::String, Order::Asc),
        KeyColumn::new(DataType::Int64, Order::Desc),
    ])
}

fn make_key_benchmark(c: &mut Criterion) {
    let schema = composite_schema();
    let values = [Value::from("customer-00042"), Value::Int64(1_700_000_000)];

    c.bench_function("make_key_composite", |b| {
        b.iter(|| black_box(schema.make_key(black_box(&values), KeyLimit::Exact)))
    });
    c.bench_function("make_key_partial_end", |b| {
        b.iter(|| black_box(schema.make_key(black_box(&values[..1]), KeyLimit::PartialEnd)))
    });
}

fn seek_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("ordered_seek");

    for size in [100, 1000, 10000].iter() {
        let schema = composite_schema();
        let mut index = OrderedIndex::new("ixCustomer", schema.clone(), false);
        for i in 0..*size {
            let values = [Value::String(format!("customer-{:05}", i % 97)), Value::Int64(i)];
            let key = schema.make_key(&values, KeyLimit::Exact).unwrap();
            index
                .insert(IndexEntry::new(key, Bookmark::from_sequence(i as u64)))
                .unwrap();
        }
        let target = schema
            .make_key(&[Value::from("customer-00050")], KeyLimit::StartOfRange)
            .unwrap();

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| black_box(index.seek_ge(black_box(&target))))
        });
    }

    group.finish();
}

criterion_group!(benches, make_key_benchmark, seek_benchmark);
criterion_main!(benches);
