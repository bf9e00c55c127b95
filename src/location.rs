//! Grid coordinates.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Position of a cell in a [`Field`](crate::field::Field).
///
/// Rows grow downwards (up to the field depth) and columns grow to the
/// right (up to the field width).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Location {
    row: usize,
    col: usize,
}

impl Location {
    /// Create a location at the given row and column.
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    pub fn row(&self) -> usize {
        self.row
    }

    pub fn col(&self) -> usize {
        self.col
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn equal_iff_both_components_equal() {
        assert_eq!(Location::new(2, 3), Location::new(2, 3));
        assert_ne!(Location::new(2, 3), Location::new(3, 2));
        assert_ne!(Location::new(2, 3), Location::new(2, 4));
    }

    #[test]
    fn usable_as_map_key() {
        let set: HashSet<_> = [Location::new(0, 1), Location::new(0, 1), Location::new(1, 0)]
            .into_iter()
            .collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn displays_as_pair() {
        assert_eq!(Location::new(4, 7).to_string(), "(4, 7)");
    }
}
