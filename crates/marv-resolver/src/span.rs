//! Source locations

use serde::{Deserialize, Serialize};
use std::fmt;

/// Byte range in the source text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    /// Start offset (inclusive)
    pub start: usize,
    /// End offset (exclusive)
    pub end: usize,
}

impl Span {
    /// Create a new span
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Span for synthetic nodes that have no source text (intrinsics, `arguments`)
    pub fn dummy() -> Self {
        Self { start: 0, end: 0 }
    }

    /// Whether this span points at real source text
    pub fn is_dummy(&self) -> bool {
        self.start == 0 && self.end == 0
    }

    /// Length in bytes
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}
