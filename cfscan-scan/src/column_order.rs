//! Requested columns in store order.
//!
//! The store returns a row's cells sorted by `(family, qualifier)`. Keeping
//! the requested columns in the same order lets the scan walk both sequences
//! once per row instead of looking each cell up.

use std::cmp::Ordering;

use cfscan_result::{Error, Result};
use cfscan_types::{Cell, ColumnPos, NullIndicator, SlotId, SlotType};

/// A requested cell column bound to the slot it is written into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnBinding {
    pub slot_id: SlotId,
    pub column_pos: ColumnPos,
    pub family: String,
    pub qualifier: String,
    pub slot_type: SlotType,
    pub byte_offset: usize,
    pub null_indicator: NullIndicator,
}

impl ColumnBinding {
    #[inline]
    fn key(&self) -> (&str, &str) {
        (&self.family, &self.qualifier)
    }

    #[inline]
    fn cmp_cell(&self, cell: &Cell) -> Ordering {
        self.key()
            .cmp(&(cell.family.as_str(), cell.qualifier.as_str()))
    }
}

#[derive(Debug, Clone, Default)]
pub struct ColumnOrder {
    bindings: Vec<ColumnBinding>,
}

impl ColumnOrder {
    /// Sort bindings by `(family, qualifier)`.
    ///
    /// Two bindings reading the same column make the merge ambiguous and are
    /// rejected with [`Error::SchemaError`].
    pub fn build(mut bindings: Vec<ColumnBinding>) -> Result<Self> {
        bindings.sort_by(|a, b| a.key().cmp(&b.key()));
        if let Some(pair) = bindings.windows(2).find(|pair| pair[0].key() == pair[1].key()) {
            return Err(Error::schema(format!(
                "slots {} and {} both read column {}:{}",
                pair[0].slot_id, pair[1].slot_id, pair[0].family, pair[0].qualifier
            )));
        }
        Ok(Self { bindings })
    }

    pub fn bindings(&self) -> &[ColumnBinding] {
        &self.bindings
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Pair each requested column with its cell in `cells`.
    ///
    /// `cells` must be sorted by `(family, qualifier)`. Columns without a cell
    /// are not yielded; cells no column asked for are counted by
    /// [`CellMatches::skipped`].
    pub fn matches<'a>(&'a self, cells: &'a [Cell]) -> CellMatches<'a> {
        CellMatches {
            bindings: &self.bindings,
            cells,
            binding_idx: 0,
            cell_idx: 0,
            skipped: 0,
        }
    }
}

/// Lock-step merge of sorted bindings against a row's sorted cells.
#[derive(Debug)]
pub struct CellMatches<'a> {
    bindings: &'a [ColumnBinding],
    cells: &'a [Cell],
    binding_idx: usize,
    cell_idx: usize,
    skipped: usize,
}

impl CellMatches<'_> {
    /// Cells passed over so far that no requested column reads.
    ///
    /// Once the iterator is exhausted this includes the cells after the last
    /// requested column.
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

impl<'a> Iterator for CellMatches<'a> {
    type Item = (&'a ColumnBinding, &'a Cell);

    fn next(&mut self) -> Option<Self::Item> {
        while let (Some(binding), Some(cell)) = (
            self.bindings.get(self.binding_idx),
            self.cells.get(self.cell_idx),
        ) {
            match binding.cmp_cell(cell) {
                Ordering::Greater => {
                    self.skipped += 1;
                    self.cell_idx += 1;
                }
                Ordering::Less => {
                    self.binding_idx += 1;
                }
                Ordering::Equal => {
                    self.binding_idx += 1;
                    self.cell_idx += 1;
                    return Some((binding, cell));
                }
            }
        }
        if self.binding_idx >= self.bindings.len() && self.cell_idx < self.cells.len() {
            self.skipped += self.cells.len() - self.cell_idx;
            self.cell_idx = self.cells.len();
        }
        None
    }
}
