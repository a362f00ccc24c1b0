use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use cfscan_result::Result;
use cfscan_types::{FilterDescriptor, RowCells, ScanRange};

use crate::CellScanner;

/// A thread-safe container for scanner I/O statistics.
#[derive(Debug, Default)]
pub struct ScanIoStats {
    pub opens: AtomicU64,
    pub closes: AtomicU64,
    pub rows: AtomicU64,
    pub cells: AtomicU64,
    pub value_bytes: AtomicU64,
}

impl ScanIoStats {
    /// Capture a point-in-time snapshot of the accumulated metrics.
    pub fn snapshot(&self) -> ScanIoStatsSnapshot {
        ScanIoStatsSnapshot {
            opens: self.opens.load(Ordering::Relaxed),
            closes: self.closes.load(Ordering::Relaxed),
            rows: self.rows.load(Ordering::Relaxed),
            cells: self.cells.load(Ordering::Relaxed),
            value_bytes: self.value_bytes.load(Ordering::Relaxed),
        }
    }

    /// Reset all statistics to zero.
    pub fn reset(&self) {
        self.opens.store(0, Ordering::Relaxed);
        self.closes.store(0, Ordering::Relaxed);
        self.rows.store(0, Ordering::Relaxed);
        self.cells.store(0, Ordering::Relaxed);
        self.value_bytes.store(0, Ordering::Relaxed);
    }
}

/// Immutable copy of [`ScanIoStats`] counters captured at a specific moment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanIoStatsSnapshot {
    pub opens: u64,
    pub closes: u64,
    pub rows: u64,
    pub cells: u64,
    pub value_bytes: u64,
}

impl ScanIoStatsSnapshot {
    /// Compute the delta between two snapshots (`newer - older`). Saturates at zero.
    pub fn delta_since(&self, older: &Self) -> Self {
        macro_rules! delta {
            ($field:ident) => {
                self.$field.saturating_sub(older.$field)
            };
        }
        Self {
            opens: delta!(opens),
            closes: delta!(closes),
            rows: delta!(rows),
            cells: delta!(cells),
            value_bytes: delta!(value_bytes),
        }
    }
}

/// Wraps a [`CellScanner`] and counts what flows through it.
pub struct InstrumentedCellScanner<S: CellScanner> {
    inner: S,
    stats: Arc<ScanIoStats>,
}

impl<S: CellScanner> InstrumentedCellScanner<S> {
    /// Wrap `inner`, returning the scanner and a handle to its statistics.
    pub fn new(inner: S) -> (Self, Arc<ScanIoStats>) {
        let stats = Arc::new(ScanIoStats::default());
        let scanner = Self {
            inner,
            stats: Arc::clone(&stats),
        };
        (scanner, stats)
    }

    pub fn stats(&self) -> &Arc<ScanIoStats> {
        &self.stats
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: CellScanner> CellScanner for InstrumentedCellScanner<S> {
    fn open(
        &mut self,
        table: &str,
        ranges: &[ScanRange],
        filters: &[FilterDescriptor],
    ) -> Result<()> {
        self.stats.opens.fetch_add(1, Ordering::Relaxed);
        self.inner.open(table, ranges, filters)
    }

    fn next_row(&mut self, row: &mut RowCells) -> Result<bool> {
        let more = self.inner.next_row(row)?;
        if more {
            self.stats.rows.fetch_add(1, Ordering::Relaxed);
            self.stats
                .cells
                .fetch_add(row.len() as u64, Ordering::Relaxed);
            self.stats
                .value_bytes
                .fetch_add(row.value_bytes() as u64, Ordering::Relaxed);
        }
        Ok(more)
    }

    fn close(&mut self) -> Result<()> {
        self.stats.closes.fetch_add(1, Ordering::Relaxed);
        self.inner.close()
    }
}
