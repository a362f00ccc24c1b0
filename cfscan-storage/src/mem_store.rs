use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

use cfscan_result::{Error, Result};
use cfscan_types::{FilterDescriptor, RowCells, ScanRange};
use rustc_hash::FxHashMap;

type FamilyQualifier = (String, String);
type StoredRow = BTreeMap<FamilyQualifier, Vec<u8>>;
type StoredTable = BTreeMap<Vec<u8>, StoredRow>;

/// In-memory sparse column-family store used for tests and embedding.
///
/// Rows are kept sorted by row key and each row's cells by
/// `(family, qualifier)`, matching the order a remote store returns them in.
#[allow(clippy::module_name_repetitions)]
pub struct MemColumnFamilyStore {
    tables: RwLock<FxHashMap<String, StoredTable>>,
    available: AtomicBool,
}

impl Default for MemColumnFamilyStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemColumnFamilyStore {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(FxHashMap::default()),
            available: AtomicBool::new(true),
        }
    }

    /// Create an empty table. Creating an existing table is a no-op.
    pub fn create_table(&self, name: &str) -> Result<()> {
        let mut tables = self.write_tables()?;
        tables.entry(name.to_string()).or_default();
        Ok(())
    }

    pub fn drop_table(&self, name: &str) -> Result<()> {
        self.write_tables()?.remove(name);
        Ok(())
    }

    pub fn table_exists(&self, name: &str) -> Result<bool> {
        Ok(self.read_tables()?.contains_key(name))
    }

    /// Write one cell, replacing any previous value of the same column.
    pub fn put(
        &self,
        table: &str,
        row_key: impl Into<Vec<u8>>,
        family: &str,
        qualifier: &str,
        value: impl Into<Vec<u8>>,
    ) -> Result<()> {
        let mut tables = self.write_tables()?;
        let rows = tables.get_mut(table).ok_or_else(|| missing_table(table))?;
        rows.entry(row_key.into())
            .or_default()
            .insert((family.to_string(), qualifier.to_string()), value.into());
        Ok(())
    }

    pub fn delete_row(&self, table: &str, row_key: &[u8]) -> Result<bool> {
        let mut tables = self.write_tables()?;
        let rows = tables.get_mut(table).ok_or_else(|| missing_table(table))?;
        Ok(rows.remove(row_key).is_some())
    }

    pub fn row_count(&self, table: &str) -> Result<usize> {
        let tables = self.read_tables()?;
        let rows = tables.get(table).ok_or_else(|| missing_table(table))?;
        Ok(rows.len())
    }

    /// Simulate the store becoming reachable or unreachable.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    /// Scan ranges for the regions delimited by `split_keys`.
    ///
    /// `n` split keys produce `n + 1` ranges covering the whole key space, in
    /// ascending key order. Duplicate split keys are collapsed.
    pub fn region_ranges<K: AsRef<[u8]>>(split_keys: &[K]) -> Vec<ScanRange> {
        let mut keys: Vec<&[u8]> = split_keys.iter().map(AsRef::as_ref).collect();
        keys.sort_unstable();
        keys.dedup();

        let mut ranges = Vec::with_capacity(keys.len() + 1);
        let mut start: Option<Vec<u8>> = None;
        for key in keys {
            ranges.push(ScanRange {
                start_row: start.take(),
                stop_row: Some(key.to_vec()),
            });
            start = Some(key.to_vec());
        }
        ranges.push(ScanRange {
            start_row: start,
            stop_row: None,
        });
        ranges
    }

    /// Fill `out` with the first row of `range` strictly after `after` that
    /// passes every filter. Returns `false` when the range has no such row.
    pub(crate) fn read_next_row(
        &self,
        table: &str,
        range: &ScanRange,
        after: Option<&[u8]>,
        filters: &[FilterDescriptor],
        out: &mut RowCells,
    ) -> Result<bool> {
        self.ensure_available()?;
        let tables = self.read_tables()?;
        let rows = tables.get(table).ok_or_else(|| missing_table(table))?;

        let lower: Bound<&[u8]> = match (after, range.start_row.as_deref()) {
            (Some(key), _) => Bound::Excluded(key),
            (None, Some(start)) => Bound::Included(start),
            (None, None) => Bound::Unbounded,
        };
        let upper: Bound<&[u8]> = match range.stop_row.as_deref() {
            Some(stop) => Bound::Excluded(stop),
            None => Bound::Unbounded,
        };
        if let (Bound::Excluded(lo) | Bound::Included(lo), Bound::Excluded(hi)) = (lower, upper)
            && lo >= hi
        {
            out.clear();
            return Ok(false);
        }

        for (key, cells) in rows.range::<[u8], _>((lower, upper)) {
            if !passes_filters(cells, filters) {
                continue;
            }
            out.clear();
            out.set_row_key(key);
            for ((family, qualifier), value) in cells {
                out.push(family, qualifier, value);
            }
            return Ok(true);
        }

        out.clear();
        Ok(false)
    }

    pub(crate) fn ensure_available(&self) -> Result<()> {
        if self.is_available() {
            Ok(())
        } else {
            Err(Error::scan_unavailable("column-family store is unreachable"))
        }
    }

    fn read_tables(
        &self,
    ) -> Result<std::sync::RwLockReadGuard<'_, FxHashMap<String, StoredTable>>> {
        self.tables
            .read()
            .map_err(|_| Error::Internal("column-family store read lock poisoned".into()))
    }

    fn write_tables(
        &self,
    ) -> Result<std::sync::RwLockWriteGuard<'_, FxHashMap<String, StoredTable>>> {
        self.tables
            .write()
            .map_err(|_| Error::Internal("column-family store write lock poisoned".into()))
    }
}

fn missing_table(table: &str) -> Error {
    Error::scan_unavailable(format!("table '{table}' does not exist"))
}

/// Single-column-value filter semantics: a row missing the filtered column
/// passes; a present value must satisfy the comparison.
fn passes_filters(cells: &StoredRow, filters: &[FilterDescriptor]) -> bool {
    filters.iter().all(|filter| {
        cells
            .iter()
            .find(|((family, qualifier), _)| {
                *family == filter.family && *qualifier == filter.qualifier
            })
            .is_none_or(|(_, value)| filter.op.matches(value.as_slice().cmp(filter.constant.as_slice())))
    })
}
