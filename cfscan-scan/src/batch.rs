//! Row batches handed to the consumer of a scan node.

use std::sync::Arc;

use arrow::array::{
    ArrayRef, BooleanBuilder, Float32Builder, Float64Builder, Int8Builder, Int16Builder,
    Int32Builder, Int64Builder, StringBuilder, TimestampNanosecondBuilder,
};
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use cfscan_result::{Error, Result};
use cfscan_types::SlotType;

use crate::converter::SlotValue;
use crate::mem_pool::MemPool;
use crate::tuple::{OutputSlot, TupleLayout, TupleMut, TupleRow};

/// Fixed-capacity batch of tuples plus the pool that owns their
/// variable-length payloads.
///
/// The batch exclusively owns its pool: string slots of its tuples stay valid
/// for as long as the batch lives and are released with it.
#[derive(Debug)]
pub struct RowBatch {
    layout: Arc<TupleLayout>,
    tuples: Vec<u8>,
    pool: MemPool,
    num_rows: usize,
    capacity: usize,
}

impl RowBatch {
    pub fn new(layout: Arc<TupleLayout>, capacity: usize) -> Self {
        let tuples = vec![0u8; layout.byte_size * capacity];
        Self {
            layout,
            tuples,
            pool: MemPool::new(),
            num_rows: 0,
            capacity,
        }
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_empty(&self) -> bool {
        self.num_rows == 0
    }

    pub fn is_full(&self) -> bool {
        self.num_rows >= self.capacity
    }

    pub fn layout(&self) -> &TupleLayout {
        &self.layout
    }

    pub fn pool(&self) -> &MemPool {
        &self.pool
    }

    /// Bytes of the fixed-length tuples committed so far.
    pub fn tuple_bytes(&self) -> usize {
        self.num_rows * self.layout.byte_size
    }

    /// Bytes held by the batch: committed tuples plus pooled payloads.
    pub fn memory_bytes(&self) -> usize {
        self.tuple_bytes() + self.pool.allocated_bytes()
    }

    pub fn row(&self, idx: usize) -> Option<TupleRow<'_>> {
        if idx >= self.num_rows {
            return None;
        }
        let stride = self.layout.byte_size;
        let bytes = &self.tuples[idx * stride..(idx + 1) * stride];
        Some(TupleRow::new(bytes, &self.layout, &self.pool))
    }

    pub fn rows(&self) -> impl Iterator<Item = TupleRow<'_>> + '_ {
        (0..self.num_rows).filter_map(move |idx| self.row(idx))
    }

    /// Forget every row and pooled payload so the batch can be refilled.
    pub fn reset(&mut self) {
        self.tuples.fill(0);
        self.pool.clear();
        self.num_rows = 0;
    }

    /// Tuple that the next [`RowBatch::commit_row`] will publish, with the
    /// pool its payloads go into.
    ///
    /// Callers check [`RowBatch::is_full`] first.
    pub(crate) fn next_tuple(&mut self) -> (TupleMut<'_>, &mut MemPool) {
        let stride = self.layout.byte_size;
        let start = self.num_rows * stride;
        let bytes = &mut self.tuples[start..start + stride];
        bytes.fill(0);
        (TupleMut::new(bytes), &mut self.pool)
    }

    pub(crate) fn commit_row(&mut self) {
        debug_assert!(self.num_rows < self.capacity);
        self.num_rows += 1;
    }

    /// Columnar copy of the batch, one Arrow column per output slot.
    ///
    /// String payloads that are not valid UTF-8 cannot be expressed as Arrow
    /// `Utf8` and fail with [`Error::Conversion`].
    pub fn to_record_batch(&self) -> Result<RecordBatch> {
        let schema = Arc::new(self.layout.arrow_schema());
        let columns = self
            .layout
            .slots
            .iter()
            .map(|slot| self.column_array(slot))
            .collect::<Result<Vec<_>>>()?;
        let options = RecordBatchOptions::new().with_row_count(Some(self.num_rows));
        Ok(RecordBatch::try_new_with_options(schema, columns, &options)?)
    }

    fn column_array(&self, slot: &OutputSlot) -> Result<ArrayRef> {
        macro_rules! collect_primitive {
            ($builder:ty, $variant:ident) => {{
                let mut builder = <$builder>::with_capacity(self.num_rows);
                for row in self.rows() {
                    match row.value(slot) {
                        Some(SlotValue::$variant(v)) => builder.append_value(v),
                        _ => builder.append_null(),
                    }
                }
                Arc::new(builder.finish()) as ArrayRef
            }};
        }

        let array = match slot.slot_type {
            SlotType::Boolean => collect_primitive!(BooleanBuilder, Boolean),
            SlotType::TinyInt => collect_primitive!(Int8Builder, TinyInt),
            SlotType::SmallInt => collect_primitive!(Int16Builder, SmallInt),
            SlotType::Int => collect_primitive!(Int32Builder, Int),
            SlotType::BigInt => collect_primitive!(Int64Builder, BigInt),
            SlotType::Float => collect_primitive!(Float32Builder, Float),
            SlotType::Double => collect_primitive!(Float64Builder, Double),
            SlotType::Timestamp => collect_primitive!(TimestampNanosecondBuilder, Timestamp),
            SlotType::String => {
                let mut builder =
                    StringBuilder::with_capacity(self.num_rows, self.pool.allocated_bytes());
                for row in self.rows() {
                    match row.value(slot) {
                        Some(SlotValue::String(bytes)) => {
                            let text = std::str::from_utf8(bytes).map_err(|_| {
                                Error::conversion(format!(
                                    "column {} holds a value that is not valid UTF-8",
                                    slot.name
                                ))
                            })?;
                            builder.append_value(text);
                        }
                        _ => builder.append_null(),
                    }
                }
                Arc::new(builder.finish()) as ArrayRef
            }
        };
        Ok(array)
    }
}
