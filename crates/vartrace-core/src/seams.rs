//! Seams to the external collaborators
//!
//! Version control, configuration sampling, and persisted-trace storage are
//! consumed at trait boundaries only; the core never implements them beyond
//! the filesystem-backed trace source below.

use crate::error::CoreError;
use std::path::{Path, PathBuf};
use vartrace_artefact::Artefact;
use vartrace_formula::Variant;
use vartrace_history::CommitId;

/// "Materialize commit C's files at path P"
///
/// The runner strictly sequences calls: a commit's checkout completes before
/// any generation for that commit begins, and no other checkout happens
/// until the commit's batch is done.
pub trait WorkingCopy: Send + Sync {
    /// Place the commit's file tree below `destination`
    ///
    /// # Errors
    /// Propagates the collaborator's IO failure; the runner records it and
    /// steps to the next commit.
    fn materialize(&self, commit: &CommitId, destination: &Path) -> std::io::Result<()>;
}

/// "Sample N valid configurations"
///
/// Backed by a feature model and a solver on the collaborator's side; the
/// core only consumes the resulting variants.
pub trait Sampler: Send + Sync {
    /// Up to `count` variants, deterministic per collaborator contract
    fn sample(&self, count: usize) -> Vec<Variant>;
}

/// Source of persisted annotation trees, one per commit
pub trait TraceSource: Send + Sync {
    /// Parse the commit's annotation tree
    ///
    /// Construction is pure and repeatable; the store memoizes the result.
    ///
    /// # Errors
    /// IO failures and data-integrity violations of the persisted trace.
    fn load(&self, commit: &CommitId) -> Result<Artefact, CoreError>;
}

/// Trace source reading `<root>/<commit>.spl.csv`
#[derive(Debug, Clone)]
pub struct TraceDirectory {
    root: PathBuf,
}

impl TraceDirectory {
    /// Create a source rooted at `root`
    #[inline]
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Where the commit's trace is expected
    #[must_use]
    pub fn trace_path(&self, commit: &CommitId) -> PathBuf {
        self.root.join(format!("{commit}.spl.csv"))
    }
}

impl TraceSource for TraceDirectory {
    fn load(&self, commit: &CommitId) -> Result<Artefact, CoreError> {
        Ok(vartrace_io::read_trace(&self.trace_path(commit))?)
    }
}
