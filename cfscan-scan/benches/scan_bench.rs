//! Conversion and batching throughput of the scan node over the in-memory store.
//!
//! Run:
//!   cargo bench --bench scan_bench

#![forbid(unsafe_code)]

use std::hint::black_box;
use std::sync::Arc;

use cfscan_scan::{ScanNode, ScanNodeConfig, ScanNodePlan};
use cfscan_storage::{MemCellScanner, MemColumnFamilyStore};
use cfscan_types::{
    ColumnFamilyTable, MemDescriptorCatalog, ScanRange, SlotType, TupleLayoutBuilder,
};
use criterion::{BatchSize, Criterion, Throughput, criterion_group, criterion_main};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const TABLE: &str = "bench";
const NUM_ROWS: usize = 50_000;

fn catalog() -> MemDescriptorCatalog {
    let mut catalog = MemDescriptorCatalog::new();
    catalog.register_table(
        ColumnFamilyTable::new(TABLE)
            .with_column("cf", "id")
            .with_column("cf", "name")
            .with_column("cf", "price")
            .with_column("cf", "ts"),
    );
    catalog
        .register_tuple(
            TupleLayoutBuilder::new(0, TABLE)
                .slot(0, 0, SlotType::String)
                .slot(1, 1, SlotType::BigInt)
                .slot(2, 2, SlotType::String)
                .slot(3, 3, SlotType::Double)
                .slot(4, 4, SlotType::Timestamp)
                .build(),
        )
        .unwrap();
    catalog
}

/// Rows with random values; roughly one in `bad_every` rows has a malformed
/// price.
fn seeded_store(bad_every: u32) -> Arc<MemColumnFamilyStore> {
    let mut rng = StdRng::seed_from_u64(42);
    let store = Arc::new(MemColumnFamilyStore::new());
    store.create_table(TABLE).unwrap();
    for i in 0..NUM_ROWS {
        let key = format!("row{i:08}");
        let id: i64 = rng.random();
        let price = if bad_every > 0 && rng.random_range(0..bad_every) == 0 {
            "n/a".to_string()
        } else {
            format!("{:.2}", rng.random_range(0.0..10_000.0f64))
        };
        let day = rng.random_range(1..=28);
        store.put(TABLE, key.as_bytes(), "cf", "id", id.to_string()).unwrap();
        store
            .put(TABLE, key.as_bytes(), "cf", "name", format!("item-{}", rng.random::<u32>()))
            .unwrap();
        store.put(TABLE, key.as_bytes(), "cf", "price", price).unwrap();
        store
            .put(TABLE, key.as_bytes(), "cf", "ts", format!("2024-03-{day:02} 12:30:00.125"))
            .unwrap();
    }
    store
}

fn scan_all(store: &Arc<MemColumnFamilyStore>, catalog: &MemDescriptorCatalog) -> usize {
    let mut node = ScanNode::new(
        ScanNodePlan::new(0, 0, TABLE),
        ScanNodeConfig::default(),
        MemCellScanner::new(Arc::clone(store)),
    );
    node.prepare(catalog).unwrap();
    node.open(vec![ScanRange::full()], Vec::new()).unwrap();
    let mut rows = 0;
    loop {
        let (batch, eos) = node.get_next(0).unwrap();
        rows += batch.num_rows();
        if eos {
            break;
        }
    }
    node.close().unwrap();
    rows
}

fn bench_scan(c: &mut Criterion) {
    let catalog = catalog();
    let clean = seeded_store(0);
    let dirty = seeded_store(10);

    let mut group = c.benchmark_group("scan_node_50k");
    group.sample_size(10);
    group.throughput(Throughput::Elements(NUM_ROWS as u64));

    group.bench_function("well_formed", |b| {
        b.iter_batched(
            || (),
            |_| black_box(scan_all(&clean, &catalog)),
            BatchSize::SmallInput,
        );
    });

    group.bench_function("ten_percent_malformed", |b| {
        b.iter_batched(
            || (),
            |_| black_box(scan_all(&dirty, &catalog)),
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

criterion_group!(benches, bench_scan);
criterion_main!(benches);
