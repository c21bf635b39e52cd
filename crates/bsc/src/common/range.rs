//! Source positions and ranges
//!
//! Positions are 0-based line/column pairs. Columns count bytes from the
//! start of the line, which keeps conversion back to byte offsets trivial
//! for the diagnostic renderer.

use std::fmt;

/// A 0-based line/column location in a source file
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line + 1, self.column + 1)
    }
}

/// A half-open span between two positions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Shorthand used mostly by tests
    pub fn from_coords(start_line: u32, start_col: u32, end_line: u32, end_col: u32) -> Self {
        Self {
            start: Position::new(start_line, start_col),
            end: Position::new(end_line, end_col),
        }
    }

    /// Smallest range covering both `self` and `other`
    pub fn merge(self, other: Range) -> Range {
        Range {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Merge every present range into one span. Absent ranges (synthetic
    /// nodes, missing tokens) are skipped; `None` when nothing is present.
    pub fn bounding<I>(ranges: I) -> Option<Range>
    where
        I: IntoIterator<Item = Option<Range>>,
    {
        ranges
            .into_iter()
            .flatten()
            .reduce(Range::merge)
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounding_skips_missing() {
        let a = Range::from_coords(0, 4, 0, 7);
        let b = Range::from_coords(0, 10, 0, 13);
        let merged = Range::bounding([Some(b), None, Some(a)]);
        assert_eq!(merged, Some(Range::from_coords(0, 4, 0, 13)));
    }

    #[test]
    fn test_bounding_all_missing() {
        assert_eq!(Range::bounding([None, None]), None);
    }

    #[test]
    fn test_merge_across_lines() {
        let a = Range::from_coords(2, 8, 2, 12);
        let b = Range::from_coords(1, 0, 1, 3);
        assert_eq!(a.merge(b), Range::from_coords(1, 0, 2, 12));
    }
}
