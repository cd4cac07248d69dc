//! Source locations
//!
//! Format: `<file>:<line>:<column>`, both numbers 1-indexed.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A point in a source file.
///
/// Ordering is file, then line, then column, which keeps edge and
/// diagnostic lists deterministic.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    /// File path relative to the project root
    pub file: String,
    /// Line number (1-indexed)
    pub line: u32,
    /// Column number (1-indexed)
    pub column: u32,
}

impl SourceLocation {
    pub fn new(file: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }

    /// Build a location from a zero-based tree-sitter point
    pub fn from_point(file: impl Into<String>, point: tree_sitter::Point) -> Self {
        Self::new(file, point.row as u32 + 1, point.column as u32 + 1)
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_and_order() {
        let a = SourceLocation::new("a.cs", 3, 9);
        let b = SourceLocation::new("a.cs", 10, 1);
        assert_eq!(a.to_string(), "a.cs:3:9");
        assert!(a < b);
    }

    #[test]
    fn test_from_point_is_one_based() {
        let loc = SourceLocation::from_point("x.py", tree_sitter::Point { row: 0, column: 4 });
        assert_eq!((loc.line, loc.column), (1, 5));
    }
}
