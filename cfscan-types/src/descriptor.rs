//! Slot and tuple descriptors.
//!
//! A tuple is a fixed-size byte layout:
//!
//! ```text
//! +------------------------------+ offset 0
//! | null indicator bytes         |  one bit per slot, 1 = NULL
//! +------------------------------+ offset num_null_bytes (aligned up)
//! | slots, largest first         |  each slot naturally aligned
//! +------------------------------+ offset byte_size
//! ```
//!
//! Descriptors normally come from a plan's descriptor table. The
//! [`TupleLayoutBuilder`] produces the same layout for tests and embedders that
//! build plans by hand.

use cfscan_result::{Error, Result};

use crate::{ColumnPos, SlotId, SlotType, TupleId};

/// Location of a slot's null bit inside the tuple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NullIndicator {
    pub byte_offset: usize,
    pub bit_mask: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotDescriptor {
    pub id: SlotId,
    pub column_pos: ColumnPos,
    pub slot_type: SlotType,
    pub byte_offset: usize,
    pub null_indicator: NullIndicator,
    /// Slots that are not materialized occupy no storage the scan writes to.
    pub materialized: bool,
}

impl SlotDescriptor {
    #[inline]
    pub fn end_offset(&self) -> usize {
        self.byte_offset + self.slot_type.byte_size()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TupleDescriptor {
    pub id: TupleId,
    pub table_name: String,
    pub byte_size: usize,
    pub num_null_bytes: usize,
    pub slots: Vec<SlotDescriptor>,
}

impl TupleDescriptor {
    pub fn slot(&self, slot_id: SlotId) -> Option<&SlotDescriptor> {
        self.slots.iter().find(|slot| slot.id == slot_id)
    }

    pub fn materialized_slots(&self) -> impl Iterator<Item = &SlotDescriptor> {
        self.slots.iter().filter(|slot| slot.materialized)
    }

    /// Check that every materialized slot and its null bit fit the tuple and
    /// that no two materialized slots share storage or a null bit.
    pub fn validate(&self) -> Result<()> {
        if self.num_null_bytes > self.byte_size {
            return Err(Error::SchemaError(format!(
                "tuple {} reserves {} null bytes but is only {} bytes wide",
                self.id, self.num_null_bytes, self.byte_size
            )));
        }
        for slot in self.materialized_slots() {
            if slot.byte_offset < self.num_null_bytes || slot.end_offset() > self.byte_size {
                return Err(Error::SchemaError(format!(
                    "slot {} of tuple {} spans bytes {}..{} outside the {}-byte tuple body",
                    slot.id,
                    self.id,
                    slot.byte_offset,
                    slot.end_offset(),
                    self.byte_size
                )));
            }
            if slot.null_indicator.byte_offset >= self.num_null_bytes
                || slot.null_indicator.bit_mask == 0
            {
                return Err(Error::SchemaError(format!(
                    "slot {} of tuple {} has no valid null indicator",
                    slot.id, self.id
                )));
            }
        }

        let mut by_offset: Vec<&SlotDescriptor> = self.materialized_slots().collect();
        by_offset.sort_by_key(|slot| slot.byte_offset);
        for pair in by_offset.windows(2) {
            if pair[1].byte_offset < pair[0].end_offset() {
                return Err(Error::SchemaError(format!(
                    "slots {} and {} of tuple {} overlap at byte {}",
                    pair[0].id, pair[1].id, self.id, pair[1].byte_offset
                )));
            }
        }
        for (idx, slot) in by_offset.iter().enumerate() {
            let shared = by_offset[idx + 1..].iter().find(|other| {
                other.null_indicator.byte_offset == slot.null_indicator.byte_offset
                    && other.null_indicator.bit_mask & slot.null_indicator.bit_mask != 0
            });
            if let Some(other) = shared {
                return Err(Error::SchemaError(format!(
                    "slots {} and {} of tuple {} share a null bit",
                    slot.id, other.id, self.id
                )));
            }
        }
        Ok(())
    }
}

/// Lays out a [`TupleDescriptor`] from `(slot, column, type)` declarations.
///
/// Null bits are assigned in declaration order; storage is assigned largest
/// slot first so every slot lands on its natural alignment without padding
/// between slots.
#[derive(Debug, Clone)]
pub struct TupleLayoutBuilder {
    tuple_id: TupleId,
    table_name: String,
    decls: Vec<(SlotId, ColumnPos, SlotType)>,
}

impl TupleLayoutBuilder {
    pub fn new(tuple_id: TupleId, table_name: impl Into<String>) -> Self {
        Self {
            tuple_id,
            table_name: table_name.into(),
            decls: Vec::new(),
        }
    }

    pub fn slot(mut self, slot_id: SlotId, column_pos: ColumnPos, slot_type: SlotType) -> Self {
        self.decls.push((slot_id, column_pos, slot_type));
        self
    }

    pub fn build(self) -> TupleDescriptor {
        let num_null_bytes = self.decls.len().div_ceil(8);

        let mut by_size: Vec<usize> = (0..self.decls.len()).collect();
        // Stable sort keeps declaration order among equally sized slots.
        by_size.sort_by(|&a, &b| self.decls[b].2.byte_size().cmp(&self.decls[a].2.byte_size()));

        let mut offsets = vec![0usize; self.decls.len()];
        let mut cursor = num_null_bytes;
        let mut max_align = 1;
        for idx in by_size {
            let slot_type = self.decls[idx].2;
            let align = slot_type.alignment();
            max_align = max_align.max(align);
            cursor = cursor.next_multiple_of(align);
            offsets[idx] = cursor;
            cursor += slot_type.byte_size();
        }
        let byte_size = if self.decls.is_empty() {
            0
        } else {
            cursor.next_multiple_of(max_align)
        };

        let slots = self
            .decls
            .iter()
            .enumerate()
            .map(|(idx, &(id, column_pos, slot_type))| SlotDescriptor {
                id,
                column_pos,
                slot_type,
                byte_offset: offsets[idx],
                null_indicator: NullIndicator {
                    byte_offset: idx / 8,
                    bit_mask: 1u8 << (idx % 8),
                },
                materialized: true,
            })
            .collect();

        TupleDescriptor {
            id: self.tuple_id,
            table_name: self.table_name,
            byte_size,
            num_null_bytes,
            slots,
        }
    }
}
