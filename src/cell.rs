/// Integer (row, column) position in a raster grid.
///
/// `RcIndex::EMPTY` is the "no containing cell" sentinel. Negative indices are
/// valid positions outside the grid, so the sentinel uses `i32::MIN`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RcIndex {
    pub row: i32,
    pub column: i32,
}

impl RcIndex {
    pub const EMPTY: RcIndex = RcIndex {
        row: i32::MIN,
        column: i32::MIN,
    };

    pub const fn new(row: i32, column: i32) -> Self {
        RcIndex { row, column }
    }

    pub const fn is_empty(&self) -> bool {
        self.row == i32::MIN && self.column == i32::MIN
    }

    /// True when the index addresses a cell of a `rows` x `columns` grid.
    pub const fn is_within(&self, rows: i32, columns: i32) -> bool {
        !self.is_empty() && self.row >= 0 && self.column >= 0 && self.row < rows && self.column < columns
    }
}

impl Default for RcIndex {
    fn default() -> Self {
        RcIndex::EMPTY
    }
}

impl std::fmt::Display for RcIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            write!(f, "RcIndex(empty)")
        } else {
            write!(f, "RcIndex(row: {}, column: {})", self.row, self.column)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_sentinel() {
        assert!(RcIndex::EMPTY.is_empty());
        assert!(RcIndex::default().is_empty());
        assert!(!RcIndex::new(-1, -1).is_empty());
        assert!(!RcIndex::new(0, 0).is_empty());
    }

    #[test]
    fn test_is_within() {
        assert!(RcIndex::new(0, 0).is_within(10, 20));
        assert!(RcIndex::new(9, 19).is_within(10, 20));
        assert!(!RcIndex::new(10, 0).is_within(10, 20));
        assert!(!RcIndex::new(0, -1).is_within(10, 20));
        assert!(!RcIndex::EMPTY.is_within(10, 20));
    }
}
