/// One `(family, qualifier, value)` cell of a row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cell {
    pub family: String,
    pub qualifier: String,
    pub value: Vec<u8>,
}

/// All cells sharing one row key, sorted by `(family, qualifier)`.
///
/// The buffer is reused across rows: [`RowCells::clear`] keeps the cell
/// allocations around and [`RowCells::push`] refills them in place, so a steady
/// scan does not allocate per value.
#[derive(Debug, Clone, Default)]
pub struct RowCells {
    row_key: Vec<u8>,
    cells: Vec<Cell>,
    len: usize,
}

impl RowCells {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.row_key.clear();
        self.len = 0;
    }

    pub fn set_row_key(&mut self, key: &[u8]) {
        self.row_key.clear();
        self.row_key.extend_from_slice(key);
    }

    /// Append a cell. Callers push cells in `(family, qualifier)` order.
    pub fn push(&mut self, family: &str, qualifier: &str, value: &[u8]) {
        if self.len < self.cells.len() {
            let cell = &mut self.cells[self.len];
            cell.family.clear();
            cell.family.push_str(family);
            cell.qualifier.clear();
            cell.qualifier.push_str(qualifier);
            cell.value.clear();
            cell.value.extend_from_slice(value);
        } else {
            self.cells.push(Cell {
                family: family.to_owned(),
                qualifier: qualifier.to_owned(),
                value: value.to_vec(),
            });
        }
        self.len += 1;
    }

    pub fn row_key(&self) -> &[u8] {
        &self.row_key
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Total bytes of cell values currently held.
    pub fn value_bytes(&self) -> usize {
        self.cells().iter().map(|cell| cell.value.len()).sum()
    }
}
