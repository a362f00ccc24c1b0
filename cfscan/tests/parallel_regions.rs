//! Independent scan nodes over disjoint region ranges of one table.

use std::sync::Arc;
use std::thread;

use cfscan::storage::InstrumentedCellScanner;
use cfscan::{
    CellScanner, ColumnFamilyTable, MemCellScanner, MemColumnFamilyStore, MemDescriptorCatalog,
    ScanNode, ScanNodeConfig, ScanNodePlan, SlotType, SlotValue, TupleLayoutBuilder,
};
// Linked for its auto-init hook, which installs the tracing subscriber.
use cfscan_test_utils as _;

const TABLE: &str = "events";
const NUM_ROWS: usize = 300;

fn catalog() -> MemDescriptorCatalog {
    let mut catalog = MemDescriptorCatalog::new();
    catalog.register_table(
        ColumnFamilyTable::new(TABLE)
            .with_column("d", "amount")
            .with_column("d", "at")
            .with_column("m", "ok"),
    );
    catalog
        .register_tuple(
            TupleLayoutBuilder::new(1, TABLE)
                .slot(0, 0, SlotType::String)
                .slot(1, 1, SlotType::BigInt)
                .slot(2, 2, SlotType::Timestamp)
                .slot(3, 3, SlotType::Boolean)
                .build(),
        )
        .unwrap();
    catalog
}

fn store() -> Arc<MemColumnFamilyStore> {
    let store = Arc::new(MemColumnFamilyStore::new());
    store.create_table(TABLE).unwrap();
    for i in 0..NUM_ROWS {
        let key = format!("e{i:04}");
        // Every 50th amount is malformed.
        let amount = if i % 50 == 7 {
            "oops".to_string()
        } else {
            (i * 10).to_string()
        };
        store.put(TABLE, key.as_bytes(), "d", "amount", amount).unwrap();
        store
            .put(TABLE, key.as_bytes(), "d", "at", "2024-01-01T00:00:00")
            .unwrap();
        store
            .put(TABLE, key.as_bytes(), "m", "ok", if i % 2 == 0 { "true" } else { "false" })
            .unwrap();
    }
    store
}

fn scan<S: CellScanner>(mut node: ScanNode<S>, catalog: &MemDescriptorCatalog) -> (i64, u64, u64) {
    node.prepare(catalog).unwrap();
    node.open(Vec::new(), Vec::new()).unwrap();
    let mut sum = 0i64;
    loop {
        let (batch, eos) = node.get_next(0).unwrap();
        for row in batch.rows() {
            if let Some(SlotValue::BigInt(amount)) = row.get(1) {
                sum += amount;
            }
            assert_eq!(row.get(2), Some(SlotValue::Timestamp(1_704_067_200_000_000_000)));
        }
        if eos {
            break;
        }
    }
    let report = node.close().unwrap();
    (sum, report.rows_returned, report.num_errors)
}

#[test]
fn disjoint_regions_scan_in_parallel() {
    let store = store();
    let catalog = Arc::new(catalog());
    let regions = MemColumnFamilyStore::region_ranges(&["e0100", "e0200"]);
    assert_eq!(regions.len(), 3);

    let handles: Vec<_> = regions
        .into_iter()
        .enumerate()
        .map(|(idx, range)| {
            let store = Arc::clone(&store);
            let catalog = Arc::clone(&catalog);
            thread::spawn(move || {
                let mut node = ScanNode::new(
                    ScanNodePlan::new(idx as u32, 1, TABLE),
                    ScanNodeConfig::default().with_batch_size(32),
                    MemCellScanner::new(store),
                );
                node.set_scan_range(range).unwrap();
                scan(node, &catalog)
            })
        })
        .collect();

    let results: Vec<(i64, u64, u64)> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    for &(_, rows, errors) in &results {
        assert_eq!(rows, 100);
        assert_eq!(errors, 2);
    }

    let expected: i64 = (0..NUM_ROWS)
        .filter(|i| i % 50 != 7)
        .map(|i| (i * 10) as i64)
        .sum();
    assert_eq!(results.iter().map(|r| r.0).sum::<i64>(), expected);
}

#[test]
fn boxed_and_instrumented_scanners_drive_the_same_node() {
    let store = store();
    let catalog = catalog();

    let boxed: Box<dyn CellScanner> = Box::new(MemCellScanner::new(Arc::clone(&store)));
    let mut node = ScanNode::new(ScanNodePlan::new(0, 1, TABLE), ScanNodeConfig::default(), boxed);
    node.set_scan_range(cfscan::ScanRange::full()).unwrap();
    let (boxed_sum, boxed_rows, boxed_errors) = scan(node, &catalog);

    let (scanner, stats) = InstrumentedCellScanner::new(MemCellScanner::new(Arc::clone(&store)));
    let mut node = ScanNode::new(ScanNodePlan::new(1, 1, TABLE), ScanNodeConfig::default(), scanner);
    node.set_scan_range(cfscan::ScanRange::full()).unwrap();
    let (sum, rows, errors) = scan(node, &catalog);

    assert_eq!((boxed_sum, boxed_rows, boxed_errors), (sum, rows, errors));
    assert_eq!(rows, NUM_ROWS as u64);
    assert_eq!(errors, 6);
    let snapshot = stats.snapshot();
    assert_eq!(snapshot.rows, NUM_ROWS as u64);
    assert_eq!(snapshot.cells, 3 * NUM_ROWS as u64);
    assert_eq!(snapshot.closes, 1);
}
