//! Error types for variant generation

use std::path::PathBuf;
use vartrace_artefact::ArtefactError;

/// Errors raised while generating a variant
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    /// Malformed block nesting in the input tree: a data-integrity bug in the
    /// upstream extraction, fatal for the commit and never retried
    #[error(transparent)]
    IllFormed(#[from] ArtefactError),

    /// Filesystem failure, tagged with the offending path
    ///
    /// Recoverable under the SkipFile and TolerateMissingFiles policies;
    /// fatal for the batch under Abort.
    #[error("io error on `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl GenerateError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether the error may be recovered from by skipping the file
    #[inline]
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Io { .. })
    }
}
