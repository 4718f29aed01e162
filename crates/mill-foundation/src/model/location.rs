//! Source locations used for declarations, usages and edits.

use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::path::{Path, PathBuf};

/// Half-open byte range `[start, end)` within a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextRange {
    pub start: usize,
    pub end: usize,
}

impl TextRange {
    /// Create a range; bounds given in the wrong order are swapped
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start: start.min(end),
            end: start.max(end),
        }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Whether `other` lies entirely within this range (bounds inclusive)
    pub fn contains_range(&self, other: &TextRange) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

impl From<Range<usize>> for TextRange {
    fn from(range: Range<usize>) -> Self {
        Self::new(range.start, range.end)
    }
}

/// A range in a specific file
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub file: PathBuf,
    pub range: TextRange,
}

impl Location {
    pub fn new(file: impl Into<PathBuf>, range: impl Into<TextRange>) -> Self {
        Self {
            file: file.into(),
            range: range.into(),
        }
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    /// Whether `other` is in the same file and inside this location's range
    pub fn contains(&self, other: &Location) -> bool {
        self.file == other.file && self.range.contains_range(&other.range)
    }
}
