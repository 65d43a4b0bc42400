//! Top-level error type for the pipeline

use vartrace_artefact::ArtefactError;
use vartrace_generate::GenerateError;
use vartrace_history::CommitId;
use vartrace_io::TraceIoError;

/// Main vartrace error type
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Loading or storing a persisted trace failed
    #[error("trace io failed: {0}")]
    TraceIo(#[from] TraceIoError),

    /// Variant generation failed
    #[error("generation failed: {0}")]
    Generate(#[from] GenerateError),

    /// Tree construction or query failed
    #[error("artefact error: {0}")]
    Artefact(#[from] ArtefactError),

    /// The version-control collaborator could not materialize a commit
    #[error("checkout of {commit} failed: {source}")]
    Checkout {
        commit: CommitId,
        #[source]
        source: std::io::Error,
    },
}

impl CoreError {
    /// Whether a batch may continue past this error
    ///
    /// Data-integrity violations are upstream extraction bugs and poison the
    /// affected commit; everything else is an environment failure the batch
    /// can step over.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::TraceIo(inner) => !inner.is_data_integrity(),
            Self::Generate(GenerateError::IllFormed(_)) => false,
            Self::Generate(_) => true,
            Self::Artefact(inner) => !inner.is_data_integrity(),
            Self::Checkout { .. } => true,
        }
    }
}
