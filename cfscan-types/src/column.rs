use std::fmt;

use crate::{ColumnPos, ROW_KEY_COLUMN_POS};

/// One addressable field of a column-family table.
///
/// Cell columns order by `(family, qualifier)` using byte-wise string
/// comparison, which is the order the store returns cells in. `RowKey` sorts
/// before every cell column.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TableColumn {
    RowKey,
    Cell { family: String, qualifier: String },
}

impl TableColumn {
    pub fn cell(family: impl Into<String>, qualifier: impl Into<String>) -> Self {
        TableColumn::Cell {
            family: family.into(),
            qualifier: qualifier.into(),
        }
    }

    #[inline]
    pub fn is_row_key(&self) -> bool {
        matches!(self, TableColumn::RowKey)
    }

    /// `(family, qualifier)` of a cell column, `None` for the row key.
    pub fn family_qualifier(&self) -> Option<(&str, &str)> {
        match self {
            TableColumn::RowKey => None,
            TableColumn::Cell { family, qualifier } => Some((family, qualifier)),
        }
    }
}

impl fmt::Display for TableColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableColumn::RowKey => f.write_str(":key"),
            TableColumn::Cell { family, qualifier } => write!(f, "{family}:{qualifier}"),
        }
    }
}

/// Column mapping of one table in the column-family store.
///
/// Columns are addressed by [`ColumnPos`]; position `0` is always the row key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnFamilyTable {
    name: String,
    columns: Vec<TableColumn>,
}

impl ColumnFamilyTable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: vec![TableColumn::RowKey],
        }
    }

    /// Append a cell column; it receives the next free column position.
    pub fn with_column(mut self, family: impl Into<String>, qualifier: impl Into<String>) -> Self {
        self.columns.push(TableColumn::cell(family, qualifier));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn column(&self, pos: ColumnPos) -> Option<&TableColumn> {
        self.columns.get(pos as usize)
    }

    pub fn columns(&self) -> &[TableColumn] {
        &self.columns
    }

    /// Position of the given `(family, qualifier)` column, if mapped.
    pub fn position_of(&self, family: &str, qualifier: &str) -> Option<ColumnPos> {
        self.columns
            .iter()
            .position(|col| col.family_qualifier() == Some((family, qualifier)))
            .map(|idx| idx as ColumnPos)
    }

    pub fn row_key_pos(&self) -> ColumnPos {
        ROW_KEY_COLUMN_POS
    }
}
