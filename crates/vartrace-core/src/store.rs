//! Lazy, cached, forgettable per-commit annotation trees
//!
//! Trees can be huge (tens of gigabytes in aggregate across a history), so
//! the store never relies on automatic reclamation: callers evict a commit's
//! tree explicitly once its generation work is done.

use crate::error::CoreError;
use crate::seams::TraceSource;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;
use vartrace_artefact::Artefact;
use vartrace_history::CommitId;

/// Explicit per-commit cache of loaded annotation trees
///
/// `load` memoizes the source's pure parse; `evict` is the explicit forget
/// operation. Loaded trees are shared immutably via `Arc`, so parallel
/// generation calls read them without locking.
pub struct TraceStore {
    source: Box<dyn TraceSource>,
    cells: Mutex<HashMap<CommitId, Arc<Artefact>>>,
}

impl TraceStore {
    /// Create a store over the given source
    #[must_use]
    pub fn new(source: Box<dyn TraceSource>) -> Self {
        Self {
            source,
            cells: Mutex::new(HashMap::new()),
        }
    }

    /// The commit's tree, parsing it on first use
    ///
    /// Parsing is pure and repeatable, so a racing duplicate parse is
    /// harmless; the first inserted tree wins.
    ///
    /// # Errors
    /// Propagates the source's IO and data-integrity failures.
    pub fn load(&self, commit: &CommitId) -> Result<Arc<Artefact>, CoreError> {
        if let Some(tree) = self.cells.lock().get(commit) {
            return Ok(Arc::clone(tree));
        }
        debug!(%commit, "loading annotation tree");
        let tree = Arc::new(self.source.load(commit)?);
        Ok(Arc::clone(
            self.cells
                .lock()
                .entry(commit.clone())
                .or_insert(tree),
        ))
    }

    /// Forget the commit's tree; returns whether one was loaded
    pub fn evict(&self, commit: &CommitId) -> bool {
        let evicted = self.cells.lock().remove(commit).is_some();
        if evicted {
            debug!(%commit, "evicted annotation tree");
        }
        evicted
    }

    /// Forget every loaded tree
    pub fn evict_all(&self) {
        self.cells.lock().clear();
    }

    /// Whether the commit's tree is currently loaded
    #[must_use]
    pub fn is_loaded(&self, commit: &CommitId) -> bool {
        self.cells.lock().contains_key(commit)
    }

    /// Commits with a loaded tree, in sorted order
    #[must_use]
    pub fn loaded_commits(&self) -> Vec<CommitId> {
        let mut commits: Vec<CommitId> = self.cells.lock().keys().cloned().collect();
        commits.sort();
        commits
    }
}

impl std::fmt::Debug for TraceStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TraceStore")
            .field("loaded", &self.cells.lock().len())
            .finish()
    }
}
