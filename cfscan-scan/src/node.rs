//! Scan node lifecycle and batch production.
//!
//! ```text
//! Created -> Prepared -> Opened -> Scanning <-> BatchReady
//!    \           \          \          \            \
//!     +-----------+----------+----------+------------+--> Closed
//! ```
//!
//! A fatal error moves the node to `Failed`, from which only `close` is
//! accepted.

use std::fmt;
use std::sync::Arc;

use cfscan_result::{Error, Result};
use cfscan_storage::CellScanner;
use cfscan_types::{
    ConversionError, DescriptorCatalog, FilterDescriptor, NullIndicator, RowCells, ScanRange,
    SlotId, SlotType,
};
use rustc_hash::FxHashMap;
use tracing::{debug, trace, warn};

use crate::batch::RowBatch;
use crate::column_order::{ColumnBinding, ColumnOrder};
use crate::config::ScanNodeConfig;
use crate::converter::TextConverter;
use crate::mem_pool::MemPool;
use crate::plan::ScanNodePlan;
use crate::tuple::{OutputSlot, ROW_KEY_FIELD_NAME, TupleLayout, TupleMut};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScanNodeState {
    Created,
    Prepared,
    Opened,
    Scanning,
    BatchReady,
    Failed,
    Closed,
}

impl ScanNodeState {
    pub fn as_str(self) -> &'static str {
        match self {
            ScanNodeState::Created => "created",
            ScanNodeState::Prepared => "prepared",
            ScanNodeState::Opened => "opened",
            ScanNodeState::Scanning => "scanning",
            ScanNodeState::BatchReady => "batch-ready",
            ScanNodeState::Failed => "failed",
            ScanNodeState::Closed => "closed",
        }
    }
}

impl fmt::Display for ScanNodeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Counters surfaced by [`ScanNode::close`].
///
/// A non-zero `num_errors` is a warning, not a failure of the scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    /// Rows with at least one value that failed to convert.
    pub num_errors: u64,
    /// First conversion failures, capped by
    /// [`ScanNodeConfig::max_error_messages`].
    pub error_messages: Vec<String>,
    pub rows_read: u64,
    pub rows_returned: u64,
    pub batches_returned: u64,
    /// Cells the store returned that no requested column reads.
    pub cells_skipped: u64,
}

/// Plan metadata bound at prepare time.
#[derive(Debug)]
struct BoundScan {
    layout: Arc<TupleLayout>,
    column_order: ColumnOrder,
    row_key: Option<OutputSlot>,
    batch_capacity: usize,
}

#[derive(Debug)]
struct ErrorLog {
    num_errors: u64,
    messages: Vec<String>,
    max_messages: usize,
}

impl ErrorLog {
    fn new(max_messages: usize) -> Self {
        Self {
            num_errors: 0,
            messages: Vec::new(),
            max_messages,
        }
    }

    fn record(&mut self, message: String) {
        if self.messages.len() < self.max_messages {
            self.messages.push(message);
        }
    }
}

/// Scans one table of a column-family store into fixed-layout row batches.
///
/// The node is driven by a single caller: `prepare`, `open`, then `get_next`
/// until it reports end of stream, then `close`. It is not internally
/// parallel; independent nodes over disjoint ranges may run concurrently.
pub struct ScanNode<S: CellScanner> {
    plan: ScanNodePlan,
    config: ScanNodeConfig,
    scanner: S,
    scanner_open: bool,
    state: ScanNodeState,
    bound: Option<BoundScan>,
    scan_ranges: Vec<ScanRange>,
    filters: Vec<FilterDescriptor>,
    converter: TextConverter,
    row: RowCells,
    errors: ErrorLog,
    rows_read: u64,
    rows_returned: u64,
    batches_returned: u64,
    cells_skipped: u64,
    eos: bool,
}

impl<S: CellScanner> ScanNode<S> {
    pub fn new(plan: ScanNodePlan, config: ScanNodeConfig, scanner: S) -> Self {
        let converter = TextConverter::new(config.escape_char);
        let errors = ErrorLog::new(config.max_error_messages);
        Self {
            plan,
            config,
            scanner,
            scanner_open: false,
            state: ScanNodeState::Created,
            bound: None,
            scan_ranges: Vec::new(),
            filters: Vec::new(),
            converter,
            row: RowCells::new(),
            errors,
            rows_read: 0,
            rows_returned: 0,
            batches_returned: 0,
            cells_skipped: 0,
            eos: false,
        }
    }

    /// Bind the plan's tuple to table columns.
    ///
    /// Fails with [`Error::SchemaError`] when a slot does not map to a column
    /// of the table, when two slots read the same column, or when the tuple
    /// layout is inconsistent.
    pub fn prepare(&mut self, catalog: &dyn DescriptorCatalog) -> Result<()> {
        if self.state != ScanNodeState::Created {
            return Err(self.misuse("prepare"));
        }
        match self.bind(catalog) {
            Ok(bound) => {
                debug!(
                    node_id = self.plan.node_id,
                    table = %self.plan.table_name,
                    columns = bound.column_order.len(),
                    row_key = bound.row_key.is_some(),
                    tuple_bytes = bound.layout.byte_size,
                    batch_capacity = bound.batch_capacity,
                    "scan node prepared"
                );
                self.bound = Some(bound);
                self.state = ScanNodeState::Prepared;
                Ok(())
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    fn bind(&self, catalog: &dyn DescriptorCatalog) -> Result<BoundScan> {
        let desc = catalog.tuple_descriptor(self.plan.tuple_id)?;
        if desc.table_name != self.plan.table_name {
            return Err(Error::schema(format!(
                "tuple {} describes table '{}', not '{}'",
                desc.id, desc.table_name, self.plan.table_name
            )));
        }
        desc.validate()?;

        let row_key_slot = catalog.row_key_slot(desc);
        let cell_slots: Vec<SlotId> = desc
            .materialized_slots()
            .map(|slot| slot.id)
            .filter(|&id| Some(id) != row_key_slot)
            .collect();
        let resolved = catalog.resolve_columns(&self.plan.table_name, &cell_slots)?;

        let mut names: FxHashMap<SlotId, String> = FxHashMap::default();
        let mut bindings = Vec::with_capacity(resolved.len());
        for column in resolved {
            let slot = desc.slot(column.slot_id).ok_or_else(|| {
                Error::schema(format!(
                    "slot {} resolved by the catalog is not part of tuple {}",
                    column.slot_id, desc.id
                ))
            })?;
            names.insert(slot.id, format!("{}:{}", column.family, column.qualifier));
            bindings.push(ColumnBinding {
                slot_id: slot.id,
                column_pos: column.column_pos,
                family: column.family,
                qualifier: column.qualifier,
                slot_type: slot.slot_type,
                byte_offset: slot.byte_offset,
                null_indicator: slot.null_indicator,
            });
        }
        let column_order = ColumnOrder::build(bindings)?;

        let layout = TupleLayout::from_descriptor(desc, |slot| {
            if Some(slot.id) == row_key_slot {
                ROW_KEY_FIELD_NAME.to_string()
            } else {
                names
                    .remove(&slot.id)
                    .unwrap_or_else(|| format!("col{}", slot.column_pos))
            }
        });
        let row_key = row_key_slot.and_then(|id| layout.slot(id).cloned());
        let batch_capacity = self.config.batch_capacity(layout.byte_size);

        Ok(BoundScan {
            layout: Arc::new(layout),
            column_order,
            row_key,
            batch_capacity,
        })
    }

    /// Start the cell scanner over the pending ranges followed by `ranges`,
    /// in that order, with `filters` pushed down unmodified.
    ///
    /// Fails with [`Error::ScanUnavailable`] when the store cannot be reached
    /// or the table does not exist.
    pub fn open(&mut self, ranges: Vec<ScanRange>, filters: Vec<FilterDescriptor>) -> Result<()> {
        if self.state != ScanNodeState::Prepared {
            return Err(self.misuse("open"));
        }
        self.scan_ranges.extend(ranges);
        self.filters = filters;
        if let Err(err) = self.start_scanner() {
            return Err(self.fail(err));
        }
        self.state = ScanNodeState::Opened;
        debug!(
            node_id = self.plan.node_id,
            table = %self.plan.table_name,
            ranges = self.scan_ranges.len(),
            filters = self.filters.len(),
            "scan node opened"
        );
        Ok(())
    }

    fn start_scanner(&mut self) -> Result<()> {
        self.scanner
            .open(&self.plan.table_name, &self.scan_ranges, &self.filters)?;
        self.scanner_open = true;
        Ok(())
    }

    /// Queue one more range behind the pending ones.
    ///
    /// Allowed until the first batch is requested; an opened node restarts
    /// its scanner over the updated list.
    pub fn set_scan_range(&mut self, range: ScanRange) -> Result<()> {
        self.update_ranges(|ranges| ranges.push(range))
    }

    /// Replace the pending ranges. Same state rules as
    /// [`ScanNode::set_scan_range`].
    pub fn replace_scan_ranges(&mut self, ranges: Vec<ScanRange>) -> Result<()> {
        self.update_ranges(move |current| *current = ranges)
    }

    fn update_ranges(&mut self, update: impl FnOnce(&mut Vec<ScanRange>)) -> Result<()> {
        match self.state {
            ScanNodeState::Created | ScanNodeState::Prepared => {
                update(&mut self.scan_ranges);
                Ok(())
            }
            ScanNodeState::Opened => {
                update(&mut self.scan_ranges);
                match self.start_scanner() {
                    Ok(()) => {
                        debug!(
                            node_id = self.plan.node_id,
                            ranges = self.scan_ranges.len(),
                            "scan ranges changed, scanner restarted"
                        );
                        Ok(())
                    }
                    Err(err) => Err(self.fail(err)),
                }
            }
            _ => Err(self.misuse("changing scan ranges")),
        }
    }

    /// Fill and return the next batch.
    ///
    /// `capacity_hint` caps the batch's row count; zero means no hint. The
    /// returned flag is `true` once no rows remain, possibly together with a
    /// final non-empty batch. Rows with unconvertible values are still
    /// returned, with the affected slots set to NULL.
    pub fn get_next(&mut self, capacity_hint: usize) -> Result<(RowBatch, bool)> {
        if !matches!(
            self.state,
            ScanNodeState::Opened | ScanNodeState::BatchReady
        ) {
            return Err(self.misuse("get_next"));
        }
        let (layout, configured) = match self.bound.as_ref() {
            Some(bound) => (Arc::clone(&bound.layout), bound.batch_capacity),
            None => {
                return Err(self.fail(Error::Internal(
                    "opened scan node has no bound layout".into(),
                )));
            }
        };
        if configured == 0 {
            return Err(self.fail(Error::resource_exhausted(format!(
                "a {}-byte tuple does not fit in a batch of {} bytes",
                layout.byte_size, self.config.max_batch_bytes
            ))));
        }

        let remaining = self.remaining_limit();
        if self.eos || remaining == Some(0) {
            self.eos = true;
            self.state = ScanNodeState::BatchReady;
            return Ok((RowBatch::new(layout, 0), true));
        }

        let mut capacity = if capacity_hint == 0 {
            configured
        } else {
            capacity_hint.min(configured)
        };
        if let Some(remaining) = remaining {
            capacity = capacity.min(usize::try_from(remaining).unwrap_or(usize::MAX));
        }

        self.state = ScanNodeState::Scanning;
        let mut batch = RowBatch::new(layout, capacity);
        while !batch.is_full() {
            if !batch.is_empty() && batch.memory_bytes() >= self.config.max_batch_bytes {
                break;
            }
            match self.scanner.next_row(&mut self.row) {
                Ok(true) => {}
                Ok(false) => {
                    self.eos = true;
                    break;
                }
                Err(err) => return Err(self.fail(err)),
            }
            self.rows_read += 1;
            self.materialize_row(&mut batch);
        }

        self.rows_returned += batch.num_rows() as u64;
        self.batches_returned += 1;
        if self.remaining_limit() == Some(0) {
            self.eos = true;
        }
        self.state = ScanNodeState::BatchReady;
        trace!(
            node_id = self.plan.node_id,
            rows = batch.num_rows(),
            pool_bytes = batch.pool().allocated_bytes(),
            eos = self.eos,
            "scan node produced batch"
        );
        Ok((batch, self.eos))
    }

    /// Convert the current row into the batch's next tuple and commit it.
    fn materialize_row(&mut self, batch: &mut RowBatch) {
        let Self {
            plan,
            bound,
            converter,
            row,
            errors,
            cells_skipped,
            ..
        } = self;
        let Some(bound) = bound.as_ref() else {
            return;
        };

        let (mut tuple, pool) = batch.next_tuple();
        tuple.init_nulls(&bound.layout);
        let mut row_failed = false;

        if let Some(slot) = &bound.row_key {
            let target = SlotTarget {
                slot_type: slot.slot_type,
                byte_offset: slot.byte_offset,
                null_indicator: slot.null_indicator,
                row_key: true,
            };
            if let Err(err) = write_slot(converter, &mut tuple, pool, row.row_key(), target) {
                row_failed = true;
                report_conversion(plan, errors, ":key", row.row_key(), row.row_key(), &err);
            }
        }

        let mut matches = bound.column_order.matches(row.cells());
        for (binding, cell) in matches.by_ref() {
            if let Err(err) = write_slot(converter, &mut tuple, pool, &cell.value, binding.into())
            {
                row_failed = true;
                let column = format!("{}:{}", binding.family, binding.qualifier);
                report_conversion(plan, errors, &column, &cell.value, row.row_key(), &err);
            }
        }
        *cells_skipped += matches.skipped() as u64;

        if row_failed {
            errors.num_errors += 1;
        }
        batch.commit_row();
    }

    /// Release the scanner and report the scan's counters.
    ///
    /// Idempotent: closing again, or closing a node that was never opened,
    /// returns the same report without touching the scanner.
    pub fn close(&mut self) -> Result<ScanReport> {
        if self.state == ScanNodeState::Closed {
            return Ok(self.report());
        }
        let previous = self.state;
        self.state = ScanNodeState::Closed;

        let closed = if self.scanner_open {
            self.scanner_open = false;
            self.scanner.close()
        } else {
            Ok(())
        };
        self.bound = None;
        self.row = RowCells::new();
        self.converter = TextConverter::new(self.config.escape_char);

        if self.errors.num_errors > 0 {
            warn!(
                node_id = self.plan.node_id,
                table = %self.plan.table_name,
                num_errors = self.errors.num_errors,
                "scan finished with rows that failed conversion"
            );
        }
        debug!(
            node_id = self.plan.node_id,
            previous = %previous,
            rows_returned = self.rows_returned,
            batches = self.batches_returned,
            "scan node closed"
        );
        closed?;
        Ok(self.report())
    }

    pub fn report(&self) -> ScanReport {
        ScanReport {
            num_errors: self.errors.num_errors,
            error_messages: self.errors.messages.clone(),
            rows_read: self.rows_read,
            rows_returned: self.rows_returned,
            batches_returned: self.batches_returned,
            cells_skipped: self.cells_skipped,
        }
    }

    /// One-line rendering for plan dumps, indented by `indent` levels.
    pub fn debug_string(&self, indent: usize) -> String {
        let ranges = self
            .scan_ranges
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        let filters = self
            .filters
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        let limit = self
            .plan
            .limit
            .map_or_else(|| "none".to_string(), |limit| limit.to_string());
        format!(
            "{}ScanNode(tupleid={} table={} ranges=[{ranges}] filters=[{filters}] limit={limit})",
            "  ".repeat(indent),
            self.plan.tuple_id,
            self.plan.table_name,
        )
    }

    pub fn plan(&self) -> &ScanNodePlan {
        &self.plan
    }

    pub fn config(&self) -> &ScanNodeConfig {
        &self.config
    }

    pub fn state(&self) -> ScanNodeState {
        self.state
    }

    pub fn num_errors(&self) -> u64 {
        self.errors.num_errors
    }

    pub fn scan_ranges(&self) -> &[ScanRange] {
        &self.scan_ranges
    }

    pub fn filters(&self) -> &[FilterDescriptor] {
        &self.filters
    }

    /// Output layout, available between prepare and close.
    pub fn layout(&self) -> Option<&TupleLayout> {
        self.bound.as_ref().map(|bound| bound.layout.as_ref())
    }

    pub fn column_order(&self) -> Option<&ColumnOrder> {
        self.bound.as_ref().map(|bound| &bound.column_order)
    }

    pub fn batch_capacity(&self) -> Option<usize> {
        self.bound.as_ref().map(|bound| bound.batch_capacity)
    }

    pub fn scanner(&self) -> &S {
        &self.scanner
    }

    fn remaining_limit(&self) -> Option<u64> {
        self.plan
            .limit
            .map(|limit| limit.saturating_sub(self.rows_returned))
    }

    fn misuse(&mut self, operation: &str) -> Error {
        let err = Error::invalid_state(format!(
            "{operation} is not allowed while the scan node is {}",
            self.state
        ));
        self.fail(err)
    }

    /// Record a fatal error. A closed node stays closed.
    fn fail(&mut self, err: Error) -> Error {
        if self.state != ScanNodeState::Closed {
            self.state = ScanNodeState::Failed;
        }
        debug!(node_id = self.plan.node_id, error = %err, "scan node failed");
        err
    }
}

impl<S: CellScanner> Drop for ScanNode<S> {
    fn drop(&mut self) {
        if self.scanner_open
            && let Err(err) = self.scanner.close()
        {
            warn!(node_id = self.plan.node_id, error = %err, "closing scanner on drop failed");
        }
    }
}

impl<S: CellScanner> fmt::Debug for ScanNode<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScanNode")
            .field("plan", &self.plan)
            .field("state", &self.state)
            .field("scan_ranges", &self.scan_ranges.len())
            .field("num_errors", &self.errors.num_errors)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy)]
struct SlotTarget {
    slot_type: SlotType,
    byte_offset: usize,
    null_indicator: NullIndicator,
    /// Row keys are written without unescaping.
    row_key: bool,
}

impl From<&ColumnBinding> for SlotTarget {
    fn from(binding: &ColumnBinding) -> Self {
        Self {
            slot_type: binding.slot_type,
            byte_offset: binding.byte_offset,
            null_indicator: binding.null_indicator,
            row_key: false,
        }
    }
}

fn write_slot(
    converter: &mut TextConverter,
    tuple: &mut TupleMut<'_>,
    pool: &mut MemPool,
    raw: &[u8],
    target: SlotTarget,
) -> std::result::Result<(), ConversionError> {
    let value = if target.row_key {
        converter.convert_row_key(raw, target.slot_type)?
    } else {
        converter.convert(raw, target.slot_type)?
    };
    tuple.write(target.byte_offset, target.null_indicator, value, pool);
    Ok(())
}

fn report_conversion(
    plan: &ScanNodePlan,
    errors: &mut ErrorLog,
    column: &str,
    raw: &[u8],
    row_key: &[u8],
    err: &ConversionError,
) {
    let message = format!(
        "Error converting column {column} TO {} (Data is: {})",
        err.target(),
        String::from_utf8_lossy(raw)
    );
    let row_key = String::from_utf8_lossy(row_key);
    warn!(
        node_id = plan.node_id,
        table = %plan.table_name,
        row_key = %row_key,
        reason = %err,
        "{message}"
    );
    errors.record(format!("{message}; row key: {row_key}"));
}
