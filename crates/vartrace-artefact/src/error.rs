//! Error types for annotation trees

use crate::path::SourcePath;

/// Errors raised by tree construction and queries
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArtefactError {
    /// Line range with `start > end` or a 0 line number
    #[error("invalid line range [{start}, {end}] (lines are 1-based, start <= end)")]
    InvalidRange { start: usize, end: usize },

    /// Malformed block nesting: a data-integrity bug in the upstream
    /// extraction, fatal for the affected commit and never retried
    #[error("ill-formed annotations in `{path}`: {reason} (lines [{start}, {end}])")]
    IllFormedTrace {
        path: SourcePath,
        start: usize,
        end: usize,
        reason: String,
    },

    /// A block node appeared where only directories or files are allowed
    #[error("block node is not a valid child of a directory")]
    BlockOutsideFile,

    /// Queried file is absent from the tree
    #[error("`{path}` is not part of the annotation tree")]
    FileNotFound { path: SourcePath },

    /// Queried line lies outside the file's recorded range
    #[error("line {line} lies outside the recorded range of `{path}`")]
    LineOutOfRange { path: SourcePath, line: usize },
}

impl ArtefactError {
    /// Whether this is a data-integrity violation (fatal for the commit)
    #[inline]
    #[must_use]
    pub fn is_data_integrity(&self) -> bool {
        matches!(
            self,
            Self::InvalidRange { .. } | Self::IllFormedTrace { .. } | Self::BlockOutsideFile
        )
    }

    /// Whether this is a recoverable failed lookup
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::FileNotFound { .. } | Self::LineOutOfRange { .. })
    }
}
