use std::cmp::Ordering;
use std::fmt;

/// Contiguous portion of a table to scan, bounded by row keys.
///
/// `start_row` is inclusive and `stop_row` exclusive; `None` leaves that side
/// unbounded. The scan node treats ranges as opaque tokens and hands them to the
/// cell scanner in the order it received them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ScanRange {
    pub start_row: Option<Vec<u8>>,
    pub stop_row: Option<Vec<u8>>,
}

impl ScanRange {
    /// A range covering the whole table.
    pub fn full() -> Self {
        Self::default()
    }

    pub fn between(start_row: impl Into<Vec<u8>>, stop_row: impl Into<Vec<u8>>) -> Self {
        Self {
            start_row: Some(start_row.into()),
            stop_row: Some(stop_row.into()),
        }
    }

    pub fn starting_at(start_row: impl Into<Vec<u8>>) -> Self {
        Self {
            start_row: Some(start_row.into()),
            stop_row: None,
        }
    }

    pub fn stopping_before(stop_row: impl Into<Vec<u8>>) -> Self {
        Self {
            start_row: None,
            stop_row: Some(stop_row.into()),
        }
    }

    pub fn contains(&self, row_key: &[u8]) -> bool {
        let after_start = self
            .start_row
            .as_deref()
            .is_none_or(|start| row_key >= start);
        let before_stop = self.stop_row.as_deref().is_none_or(|stop| row_key < stop);
        after_start && before_stop
    }
}

impl fmt::Display for ScanRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let start = self
            .start_row
            .as_deref()
            .map(String::from_utf8_lossy)
            .unwrap_or_else(|| "-inf".into());
        let stop = self
            .stop_row
            .as_deref()
            .map(String::from_utf8_lossy)
            .unwrap_or_else(|| "+inf".into());
        write!(f, "[{start}, {stop})")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Less,
    LessOrEqual,
    Equal,
    NotEqual,
    GreaterOrEqual,
    Greater,
}

impl CompareOp {
    /// Whether `cell_value.cmp(constant)` satisfies this operator.
    pub fn matches(self, ordering: Ordering) -> bool {
        match self {
            CompareOp::Less => ordering == Ordering::Less,
            CompareOp::LessOrEqual => ordering != Ordering::Greater,
            CompareOp::Equal => ordering == Ordering::Equal,
            CompareOp::NotEqual => ordering != Ordering::Equal,
            CompareOp::GreaterOrEqual => ordering != Ordering::Less,
            CompareOp::Greater => ordering == Ordering::Greater,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            CompareOp::Less => "<",
            CompareOp::LessOrEqual => "<=",
            CompareOp::Equal => "=",
            CompareOp::NotEqual => "!=",
            CompareOp::GreaterOrEqual => ">=",
            CompareOp::Greater => ">",
        }
    }
}

/// Predicate pushed down to the store. The scan node only stores and forwards it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FilterDescriptor {
    pub family: String,
    pub qualifier: String,
    pub op: CompareOp,
    pub constant: Vec<u8>,
}

impl FilterDescriptor {
    pub fn new(
        family: impl Into<String>,
        qualifier: impl Into<String>,
        op: CompareOp,
        constant: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            family: family.into(),
            qualifier: qualifier.into(),
            op,
            constant: constant.into(),
        }
    }
}

impl fmt::Display for FilterDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{} {} '{}'",
            self.family,
            self.qualifier,
            self.op.symbol(),
            String::from_utf8_lossy(&self.constant)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_bounds_are_half_open() {
        let range = ScanRange::between("b", "d");
        assert!(!range.contains(b"a"));
        assert!(range.contains(b"b"));
        assert!(range.contains(b"c"));
        assert!(!range.contains(b"d"));
        assert!(ScanRange::full().contains(b""));
        assert_eq!(range.to_string(), "[b, d)");
    }
}
