//! Fixed-layout tuple encoding.
//!
//! Slot encodings, all little-endian:
//!
//! | type        | bytes | encoding                                   |
//! |-------------|-------|--------------------------------------------|
//! | `Boolean`   | 1     | `0` or `1`                                 |
//! | integers    | 1..8  | two's complement                           |
//! | `Float`     | 4     | IEEE-754 bits                              |
//! | `Double`    | 8     | IEEE-754 bits                              |
//! | `String`    | 16    | `u64` pool offset, `u32` length, 4 padding |
//! | `Timestamp` | 8     | `i64` nanoseconds since the Unix epoch     |
//!
//! A set null bit means the slot bytes are meaningless.

use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use cfscan_types::{
    ColumnFamilyTable, NullIndicator, SlotDescriptor, SlotId, SlotType, TableColumn,
    TupleDescriptor,
};

use crate::converter::SlotValue;
use crate::mem_pool::{MemPool, StringRef};

/// Output name of the slot holding the row key.
pub const ROW_KEY_FIELD_NAME: &str = "row_key";

/// One materialized slot of the output tuple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputSlot {
    pub slot_id: SlotId,
    /// `row_key` for the row key, `family:qualifier` for cell columns.
    pub name: String,
    pub slot_type: SlotType,
    pub byte_offset: usize,
    pub null_indicator: NullIndicator,
}

/// Byte layout of the tuples a scan node produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TupleLayout {
    pub byte_size: usize,
    pub num_null_bytes: usize,
    pub slots: Vec<OutputSlot>,
}

impl TupleLayout {
    /// Build the layout of `desc`'s materialized slots, naming each slot with
    /// `name_of`.
    pub fn from_descriptor(
        desc: &TupleDescriptor,
        mut name_of: impl FnMut(&SlotDescriptor) -> String,
    ) -> Self {
        let slots = desc
            .materialized_slots()
            .map(|slot| OutputSlot {
                slot_id: slot.id,
                name: name_of(slot),
                slot_type: slot.slot_type,
                byte_offset: slot.byte_offset,
                null_indicator: slot.null_indicator,
            })
            .collect();
        Self {
            byte_size: desc.byte_size,
            num_null_bytes: desc.num_null_bytes,
            slots,
        }
    }

    /// Name slots after the `table` column they read: `row_key` for the row
    /// key and `family:qualifier` for cell columns.
    pub fn for_table(desc: &TupleDescriptor, table: &ColumnFamilyTable) -> Self {
        Self::from_descriptor(desc, |slot| match table.column(slot.column_pos) {
            Some(TableColumn::RowKey) => ROW_KEY_FIELD_NAME.to_string(),
            Some(column) => column.to_string(),
            None => format!("col{}", slot.column_pos),
        })
    }

    pub fn slot(&self, slot_id: SlotId) -> Option<&OutputSlot> {
        self.slots.iter().find(|slot| slot.slot_id == slot_id)
    }

    /// Arrow schema of the columnar form of a batch; every field is nullable.
    pub fn arrow_schema(&self) -> Schema {
        Schema::new(
            self.slots
                .iter()
                .map(|slot| Field::new(&slot.name, arrow_type(slot.slot_type), true))
                .collect::<Vec<_>>(),
        )
    }
}

pub(crate) fn arrow_type(slot_type: SlotType) -> DataType {
    match slot_type {
        SlotType::Boolean => DataType::Boolean,
        SlotType::TinyInt => DataType::Int8,
        SlotType::SmallInt => DataType::Int16,
        SlotType::Int => DataType::Int32,
        SlotType::BigInt => DataType::Int64,
        SlotType::Float => DataType::Float32,
        SlotType::Double => DataType::Float64,
        SlotType::String => DataType::Utf8,
        SlotType::Timestamp => DataType::Timestamp(TimeUnit::Nanosecond, None),
    }
}

/// Mutable view over one tuple's bytes.
pub(crate) struct TupleMut<'a> {
    bytes: &'a mut [u8],
}

impl<'a> TupleMut<'a> {
    pub(crate) fn new(bytes: &'a mut [u8]) -> Self {
        Self { bytes }
    }

    /// Mark every slot of `layout` NULL.
    pub(crate) fn init_nulls(&mut self, layout: &TupleLayout) {
        for slot in &layout.slots {
            self.bytes[slot.null_indicator.byte_offset] |= slot.null_indicator.bit_mask;
        }
    }

    pub(crate) fn clear_null(&mut self, indicator: NullIndicator) {
        self.bytes[indicator.byte_offset] &= !indicator.bit_mask;
    }

    /// Encode `value` at `offset` and clear the slot's null bit. String
    /// payloads are copied into `pool`.
    pub(crate) fn write(
        &mut self,
        offset: usize,
        indicator: NullIndicator,
        value: SlotValue<'_>,
        pool: &mut MemPool,
    ) {
        match value {
            SlotValue::Boolean(v) => self.bytes[offset] = u8::from(v),
            SlotValue::TinyInt(v) => self.put(offset, &v.to_le_bytes()),
            SlotValue::SmallInt(v) => self.put(offset, &v.to_le_bytes()),
            SlotValue::Int(v) => self.put(offset, &v.to_le_bytes()),
            SlotValue::BigInt(v) | SlotValue::Timestamp(v) => self.put(offset, &v.to_le_bytes()),
            SlotValue::Float(v) => self.put(offset, &v.to_le_bytes()),
            SlotValue::Double(v) => self.put(offset, &v.to_le_bytes()),
            SlotValue::String(bytes) => {
                let string_ref = pool.append(bytes);
                self.put(offset, &string_ref.offset.to_le_bytes());
                self.put(offset + 8, &string_ref.len.to_le_bytes());
            }
        }
        self.clear_null(indicator);
    }

    #[inline]
    fn put(&mut self, offset: usize, src: &[u8]) {
        self.bytes[offset..offset + src.len()].copy_from_slice(src);
    }
}

/// Read-only view over one tuple of a batch.
#[derive(Debug, Clone, Copy)]
pub struct TupleRow<'a> {
    bytes: &'a [u8],
    layout: &'a TupleLayout,
    pool: &'a MemPool,
}

impl<'a> TupleRow<'a> {
    pub(crate) fn new(bytes: &'a [u8], layout: &'a TupleLayout, pool: &'a MemPool) -> Self {
        Self {
            bytes,
            layout,
            pool,
        }
    }

    /// Raw tuple bytes, null indicators included.
    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    pub fn is_null(&self, slot: &OutputSlot) -> bool {
        self.bytes[slot.null_indicator.byte_offset] & slot.null_indicator.bit_mask != 0
    }

    /// Value of `slot_id`; `None` when the slot is NULL or not in the layout.
    pub fn get(&self, slot_id: SlotId) -> Option<SlotValue<'a>> {
        self.layout.slot(slot_id).and_then(|slot| self.value(slot))
    }

    /// Decoded value of `slot`, or `None` when it is NULL.
    pub fn value(&self, slot: &OutputSlot) -> Option<SlotValue<'a>> {
        if self.is_null(slot) {
            return None;
        }
        let at = slot.byte_offset;
        let value = match slot.slot_type {
            SlotType::Boolean => SlotValue::Boolean(self.bytes[at] != 0),
            SlotType::TinyInt => SlotValue::TinyInt(i8::from_le_bytes(self.array(at))),
            SlotType::SmallInt => SlotValue::SmallInt(i16::from_le_bytes(self.array(at))),
            SlotType::Int => SlotValue::Int(i32::from_le_bytes(self.array(at))),
            SlotType::BigInt => SlotValue::BigInt(i64::from_le_bytes(self.array(at))),
            SlotType::Float => SlotValue::Float(f32::from_le_bytes(self.array(at))),
            SlotType::Double => SlotValue::Double(f64::from_le_bytes(self.array(at))),
            SlotType::Timestamp => SlotValue::Timestamp(i64::from_le_bytes(self.array(at))),
            SlotType::String => {
                let string_ref = StringRef {
                    offset: u64::from_le_bytes(self.array(at)),
                    len: u32::from_le_bytes(self.array(at + 8)),
                };
                SlotValue::String(self.pool.get(string_ref)?)
            }
        };
        Some(value)
    }

    #[inline]
    fn array<const N: usize>(&self, offset: usize) -> [u8; N] {
        let mut out = [0u8; N];
        out.copy_from_slice(&self.bytes[offset..offset + N]);
        out
    }
}
