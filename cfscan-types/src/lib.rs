//! Shared types for cfscan.
//!
//! This crate holds everything the catalog, storage, and scan crates need to
//! agree on: identifiers, slot types, table column mappings, tuple layouts,
//! scan ranges and pushed-down filters, the cell buffers a scanner fills, and
//! the descriptor catalog interface.

pub mod catalog;
pub mod cell;
pub mod column;
pub mod descriptor;
pub mod errors;
pub mod ids;
pub mod range;
pub mod slot_type;

pub use catalog::{DescriptorCatalog, MemDescriptorCatalog, ResolvedColumn};
pub use cell::{Cell, RowCells};
pub use column::{ColumnFamilyTable, TableColumn};
pub use descriptor::{NullIndicator, SlotDescriptor, TupleDescriptor, TupleLayoutBuilder};
pub use errors::ConversionError;
pub use ids::*;
pub use range::{CompareOp, FilterDescriptor, ScanRange};
pub use slot_type::{STRING_SLOT_SIZE, SlotType};
