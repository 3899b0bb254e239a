//! Source location types.
//!
//! Every AST node, IR block, and warning carries a [`Span`] so downstream
//! reporters can point a user at the offending source text.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A single line/column position in a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub line: u32,
    pub column: u32,
}

impl Location {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

/// A byte-span-and-line/column range within one file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub file: PathBuf,
    pub start: Location,
    pub end: Location,
}

impl Span {
    pub fn new(file: impl Into<PathBuf>, start: Location, end: Location) -> Self {
        Self {
            file: file.into(),
            start,
            end,
        }
    }

    pub fn point(file: impl Into<PathBuf>, line: u32, column: u32) -> Self {
        let loc = Location::new(line, column);
        Self::new(file, loc, loc)
    }

    /// A span with no useful location, for synthetic nodes built in tests.
    pub fn zero() -> Self {
        Self::point(PathBuf::new(), 0, 0)
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    pub fn contains_line(&self, line: u32) -> bool {
        self.start.line <= line && line <= self.end.line
    }

    pub fn contains(&self, other: &Span) -> bool {
        self.file == other.file
            && self.start.line <= other.start.line
            && other.end.line <= self.end.line
    }
}

impl Default for Span {
    fn default() -> Self {
        Self::zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_line_is_inclusive() {
        let span = Span::new("a.tact", Location::new(10, 0), Location::new(20, 0));
        assert!(span.contains_line(10));
        assert!(span.contains_line(15));
        assert!(span.contains_line(20));
        assert!(!span.contains_line(9));
        assert!(!span.contains_line(21));
    }

    #[test]
    fn contains_checks_file_identity() {
        let outer = Span::new("a.tact", Location::new(1, 0), Location::new(100, 0));
        let inner = Span::new("a.tact", Location::new(10, 0), Location::new(20, 0));
        let other_file = Span::new("b.tact", Location::new(10, 0), Location::new(20, 0));
        assert!(outer.contains(&inner));
        assert!(!outer.contains(&other_file));
    }
}
