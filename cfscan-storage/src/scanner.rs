use cfscan_result::Result;
use cfscan_types::{FilterDescriptor, RowCells, ScanRange};

/// Row-at-a-time reader over one table of a column-family store.
///
/// A scanner is opened against an ordered list of ranges and yields every row
/// of the first range before moving to the next. Within a row, cells arrive
/// sorted by `(family, qualifier)`.
pub trait CellScanner: Send {
    /// Bind the scanner to `table`, `ranges` and `filters` and position it
    /// before the first row. Opening again discards the previous position.
    ///
    /// Fails with `ScanUnavailable` when the store cannot be reached or the
    /// table does not exist.
    fn open(&mut self, table: &str, ranges: &[ScanRange], filters: &[FilterDescriptor])
    -> Result<()>;

    /// Fill `row` with the next row's key and cells.
    ///
    /// Returns `Ok(false)` once every range is exhausted; `row` is left cleared
    /// in that case.
    fn next_row(&mut self, row: &mut RowCells) -> Result<bool>;

    /// Release the scanner's resources. Closing an unopened scanner is a no-op.
    fn close(&mut self) -> Result<()>;
}

impl<S> CellScanner for Box<S>
where
    S: CellScanner + ?Sized,
{
    fn open(
        &mut self,
        table: &str,
        ranges: &[ScanRange],
        filters: &[FilterDescriptor],
    ) -> Result<()> {
        (**self).open(table, ranges, filters)
    }
    fn next_row(&mut self, row: &mut RowCells) -> Result<bool> {
        (**self).next_row(row)
    }
    fn close(&mut self) -> Result<()> {
        (**self).close()
    }
}
