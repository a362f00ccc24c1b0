//! cfscan: a scan operator over sparse column-family stores.
//!
//! This crate is the entrypoint of the workspace. It re-exports the scan node
//! together with the types, storage adapters and error type it is driven
//! with.
//!
//! # Quick Start
//!
//! Scan an in-memory table into row batches:
//!
//! ```rust
//! use std::sync::Arc;
//! use cfscan::{
//!     ColumnFamilyTable, MemCellScanner, MemColumnFamilyStore, MemDescriptorCatalog, ScanNode,
//!     ScanNodeConfig, ScanNodePlan, ScanRange, SlotType, SlotValue, TupleLayoutBuilder,
//! };
//!
//! let store = Arc::new(MemColumnFamilyStore::new());
//! store.create_table("t").unwrap();
//! store.put("t", "r1", "cf", "a", "42").unwrap();
//!
//! let mut catalog = MemDescriptorCatalog::new();
//! catalog.register_table(ColumnFamilyTable::new("t").with_column("cf", "a"));
//! catalog
//!     .register_tuple(
//!         TupleLayoutBuilder::new(0, "t")
//!             .slot(0, 0, SlotType::String)
//!             .slot(1, 1, SlotType::Int)
//!             .build(),
//!     )
//!     .unwrap();
//!
//! let mut node = ScanNode::new(
//!     ScanNodePlan::new(0, 0, "t"),
//!     ScanNodeConfig::default(),
//!     MemCellScanner::new(Arc::clone(&store)),
//! );
//! node.prepare(&catalog).unwrap();
//! node.open(vec![ScanRange::full()], Vec::new()).unwrap();
//! let (batch, eos) = node.get_next(0).unwrap();
//! assert!(eos);
//! assert_eq!(batch.row(0).unwrap().get(1), Some(SlotValue::Int(42)));
//! assert_eq!(node.close().unwrap().num_errors, 0);
//! ```
//!
//! # Architecture
//!
//! - **Types** (`cfscan-types`): ids, slot types, tuple descriptors, scan
//!   ranges, filters and the descriptor catalog interface.
//! - **Storage** (`cfscan-storage`): the `CellScanner` interface and an
//!   in-memory sparse column-family store.
//! - **Scan** (`cfscan-scan`): the scan node, value converter, column ordering
//!   and row batches.
//! - **Errors** (`cfscan-result`): the shared `Error` and `Result` types.

pub use cfscan_result::{Error, Result};

pub use cfscan_scan::{
    ColumnOrder, MemPool, OutputSlot, RowBatch, ScanNode, ScanNodeConfig, ScanNodePlan,
    ScanNodeState, ScanReport, SlotValue, TextConverter, TupleLayout, TupleRow,
};

pub use cfscan_types::{
    ColumnFamilyTable, CompareOp, ConversionError, DescriptorCatalog, FilterDescriptor,
    MemDescriptorCatalog, RowCells, ScanRange, SlotType, TableColumn, TupleDescriptor,
    TupleLayoutBuilder,
};

pub mod storage {
    //! Cell scanners and the in-memory column-family store.

    pub use cfscan_storage::{
        CellScanner, InstrumentedCellScanner, MemCellScanner, MemColumnFamilyStore, ScanIoStats,
        ScanIoStatsSnapshot,
    };
}

pub use storage::{CellScanner, MemCellScanner, MemColumnFamilyStore};
