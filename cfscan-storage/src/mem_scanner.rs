use std::sync::Arc;

use cfscan_result::{Error, Result};
use cfscan_types::{FilterDescriptor, RowCells, ScanRange};

use crate::CellScanner;
use crate::mem_store::MemColumnFamilyStore;

/// [`CellScanner`] over a [`MemColumnFamilyStore`].
///
/// The scanner keeps only a cursor (current range and last row key returned),
/// so rows written to the store after `open` become visible if they sort after
/// the cursor.
pub struct MemCellScanner {
    store: Arc<MemColumnFamilyStore>,
    table: String,
    ranges: Vec<ScanRange>,
    filters: Vec<FilterDescriptor>,
    range_idx: usize,
    last_key: Vec<u8>,
    positioned: bool,
    is_open: bool,
}

impl MemCellScanner {
    pub fn new(store: Arc<MemColumnFamilyStore>) -> Self {
        Self {
            store,
            table: String::new(),
            ranges: Vec::new(),
            filters: Vec::new(),
            range_idx: 0,
            last_key: Vec::new(),
            positioned: false,
            is_open: false,
        }
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }
}

impl CellScanner for MemCellScanner {
    fn open(
        &mut self,
        table: &str,
        ranges: &[ScanRange],
        filters: &[FilterDescriptor],
    ) -> Result<()> {
        self.store.ensure_available()?;
        if !self.store.table_exists(table)? {
            return Err(Error::scan_unavailable(format!(
                "table '{table}' does not exist"
            )));
        }

        self.table.clear();
        self.table.push_str(table);
        self.ranges = ranges.to_vec();
        self.filters = filters.to_vec();
        self.range_idx = 0;
        self.last_key.clear();
        self.positioned = false;
        self.is_open = true;
        tracing::debug!(
            table,
            ranges = self.ranges.len(),
            filters = self.filters.len(),
            "mem cell scanner opened"
        );
        Ok(())
    }

    fn next_row(&mut self, row: &mut RowCells) -> Result<bool> {
        if !self.is_open {
            return Err(Error::invalid_state("cell scanner is not open"));
        }

        while let Some(range) = self.ranges.get(self.range_idx) {
            let after = self.positioned.then_some(self.last_key.as_slice());
            if self
                .store
                .read_next_row(&self.table, range, after, &self.filters, row)?
            {
                self.last_key.clear();
                self.last_key.extend_from_slice(row.row_key());
                self.positioned = true;
                return Ok(true);
            }
            tracing::trace!(table = %self.table, range = %range, "scan range exhausted");
            self.range_idx += 1;
            self.positioned = false;
            self.last_key.clear();
        }

        row.clear();
        Ok(false)
    }

    fn close(&mut self) -> Result<()> {
        if self.is_open {
            tracing::debug!(table = %self.table, "mem cell scanner closed");
        }
        self.is_open = false;
        self.ranges.clear();
        self.filters.clear();
        self.range_idx = 0;
        self.last_key.clear();
        self.positioned = false;
        Ok(())
    }
}
