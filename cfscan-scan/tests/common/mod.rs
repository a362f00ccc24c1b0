//! Fixtures shared by the scan node integration tests.
//!
//! Table `t` maps `rowkey`, `cf:a` (INT) and `cf:b` (STRING); tuple 0
//! requests all three. Slot ids: 1 = row key, 2 = `cf:a`, 3 = `cf:b`.

#![allow(dead_code)]

use std::sync::Arc;

use cfscan_scan::{ScanNode, ScanNodeConfig, ScanNodePlan};
use cfscan_storage::{MemCellScanner, MemColumnFamilyStore};
use cfscan_types::{ColumnFamilyTable, MemDescriptorCatalog, SlotType, TupleLayoutBuilder};

pub const TABLE: &str = "t";
pub const ROW_KEY_SLOT: u32 = 1;
pub const A_SLOT: u32 = 2;
pub const B_SLOT: u32 = 3;

pub fn table() -> ColumnFamilyTable {
    ColumnFamilyTable::new(TABLE)
        .with_column("cf", "a")
        .with_column("cf", "b")
}

pub fn catalog() -> MemDescriptorCatalog {
    catalog_typed(SlotType::Int, SlotType::String)
}

/// Catalog for table `t` with the given slot types for `cf:a` and `cf:b`.
pub fn catalog_typed(a: SlotType, b: SlotType) -> MemDescriptorCatalog {
    let mut catalog = MemDescriptorCatalog::new();
    catalog.register_table(table());
    catalog
        .register_tuple(
            TupleLayoutBuilder::new(0, TABLE)
                .slot(ROW_KEY_SLOT, 0, SlotType::String)
                .slot(A_SLOT, 1, a)
                .slot(B_SLOT, 2, b)
                .build(),
        )
        .unwrap();
    catalog
}

/// Store holding table `t` with the given `(key, a, b)` rows. `None` leaves
/// the cell out of the row.
pub fn store_with(rows: &[(&str, Option<&str>, Option<&str>)]) -> Arc<MemColumnFamilyStore> {
    let store = Arc::new(MemColumnFamilyStore::new());
    store.create_table(TABLE).expect("create table");
    for (key, a, b) in rows {
        if let Some(a) = a {
            store.put(TABLE, *key, "cf", "a", *a).expect("put a");
        }
        if let Some(b) = b {
            store.put(TABLE, *key, "cf", "b", *b).expect("put b");
        }
    }
    store
}

/// Store with `n` well-formed rows `r000..`, `cf:a = i`, `cf:b = "v{i}"`.
pub fn numbered_store(n: usize) -> Arc<MemColumnFamilyStore> {
    let store = Arc::new(MemColumnFamilyStore::new());
    store.create_table(TABLE).expect("create table");
    for i in 0..n {
        let key = format!("r{i:03}");
        store
            .put(TABLE, key.as_bytes(), "cf", "a", i.to_string())
            .expect("put a");
        store
            .put(TABLE, key.as_bytes(), "cf", "b", format!("v{i}"))
            .expect("put b");
    }
    store
}

pub fn plan() -> ScanNodePlan {
    ScanNodePlan::new(7, 0, TABLE)
}

pub fn node(
    store: &Arc<MemColumnFamilyStore>,
    config: ScanNodeConfig,
) -> ScanNode<MemCellScanner> {
    ScanNode::new(plan(), config, MemCellScanner::new(Arc::clone(store)))
}

pub fn prepared_node(
    store: &Arc<MemColumnFamilyStore>,
    config: ScanNodeConfig,
) -> ScanNode<MemCellScanner> {
    let mut node = node(store, config);
    node.prepare(&catalog()).expect("prepare");
    node
}
