//! Identifiers shared across cfscan crates.
//!
//! These types live in `cfscan-types` so the catalog, storage, and scan crates
//! can agree on them without depending on each other.

/// Identifier of a tuple descriptor within a plan's descriptor table.
pub type TupleId = u32;

/// Identifier of a slot. Slot ids are unique across the whole descriptor table,
/// not just within one tuple.
pub type SlotId = u32;

/// Identifier of a plan node, used only for diagnostics.
pub type PlanNodeId = u32;

/// Position of a column within a column-family table's column list.
pub type ColumnPos = u32;

/// Column position reserved for the row key of a column-family table.
///
/// Every table maps its row key at position `0`; cell columns start at `1`.
pub const ROW_KEY_COLUMN_POS: ColumnPos = 0;
