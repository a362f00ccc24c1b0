//! Scan node converting column-family cells into fixed-layout row batches.
//!
//! A [`ScanNode`] binds a plan's tuple descriptor to a table's columns, pulls
//! rows of sorted cells from a [`cfscan_storage::CellScanner`], converts each
//! textual value to its slot type and packs the result into [`RowBatch`]es.
//! Values that fail to convert leave their slot NULL and are counted per row
//! instead of failing the scan.

pub mod batch;
pub mod column_order;
pub mod config;
pub mod converter;
pub mod mem_pool;
pub mod node;
pub mod plan;
pub mod tuple;

pub use batch::RowBatch;
pub use column_order::{CellMatches, ColumnBinding, ColumnOrder};
pub use config::ScanNodeConfig;
pub use converter::{SlotValue, TextConverter, parse_timestamp_nanos};
pub use mem_pool::{MemPool, StringRef};
pub use node::{ScanNode, ScanNodeState, ScanReport};
pub use plan::ScanNodePlan;
pub use tuple::{OutputSlot, ROW_KEY_FIELD_NAME, TupleLayout, TupleRow};
