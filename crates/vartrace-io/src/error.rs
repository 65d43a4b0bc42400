//! Error types for the persisted formats

use std::path::PathBuf;
use vartrace_artefact::ArtefactError;

/// Errors raised while reading or writing persisted traces and configurations
#[derive(Debug, thiserror::Error)]
pub enum TraceIoError {
    /// Filesystem failure, tagged with the offending path
    #[error("io error on `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File extension does not select a trace flavor
    #[error("`{path}` has no recognized trace extension (.spl.csv or .variant.csv)")]
    UnknownExtension { path: PathBuf },

    /// First line is not the expected column header
    #[error("bad trace header: expected `{expected}`, found `{found}`")]
    BadHeader { expected: String, found: String },

    /// A data row could not be decoded
    #[error("bad trace row {row}: {reason}")]
    BadRow { row: usize, reason: String },

    /// Variant-space traces carry tool-imposed conditions only
    #[error("trace row {row}: internal annotation style is not valid in a variant trace")]
    InternalStyleInVariant { row: usize },

    /// Nesting violation detected while assembling the tree
    #[error(transparent)]
    IllFormed(#[from] ArtefactError),

    /// Configuration JSON failure, tagged with the offending path
    #[error("configuration error on `{path}`: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl TraceIoError {
    /// Whether the error is a data-integrity violation rather than an
    /// environment failure
    #[must_use]
    pub fn is_data_integrity(&self) -> bool {
        match self {
            Self::Io { .. } | Self::UnknownExtension { .. } => false,
            Self::IllFormed(inner) => inner.is_data_integrity(),
            _ => true,
        }
    }
}
