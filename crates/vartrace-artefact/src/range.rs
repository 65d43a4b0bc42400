//! 1-based inclusive line ranges

use crate::error::ArtefactError;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Inclusive span of source lines
///
/// # Invariants
/// - `1 <= start <= end`, enforced at construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LineRange {
    start: usize,
    end: usize,
}

impl LineRange {
    /// Create a range, rejecting inverted or 0-based input
    ///
    /// # Errors
    /// Returns [`ArtefactError::InvalidRange`] if `start` is 0 or exceeds `end`.
    pub fn new(start: usize, end: usize) -> Result<Self, ArtefactError> {
        if start == 0 || start > end {
            return Err(ArtefactError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Single-line range
    #[inline]
    #[must_use]
    pub fn single(line: usize) -> Option<Self> {
        Self::new(line, line).ok()
    }

    /// First line (1-based)
    #[inline]
    #[must_use]
    pub fn start(&self) -> usize {
        self.start
    }

    /// Last line (inclusive)
    #[inline]
    #[must_use]
    pub fn end(&self) -> usize {
        self.end
    }

    /// Number of lines spanned
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }

    /// Whether the range covers the given line
    #[inline]
    #[must_use]
    pub fn contains_line(&self, line: usize) -> bool {
        self.start <= line && line <= self.end
    }

    /// Whether `other` lies fully within this range
    #[inline]
    #[must_use]
    pub fn contains(&self, other: &Self) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Whether the two ranges share at least one line
    #[inline]
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// Iterate the covered lines in order
    pub fn lines(&self) -> impl Iterator<Item = usize> {
        self.start..=self.end
    }
}

impl Display for LineRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}
