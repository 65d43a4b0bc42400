//! The evolution runner: history × variants → ground truths on disk
//!
//! For each commit of each chain the runner materializes the working tree,
//! loads the annotation tree, generates every variant, writes each variant's
//! ground truth and configuration next to its files, and evicts the tree
//! before moving on. Checkout and generation for one commit are strictly
//! sequenced; generation across the commit's variants is data-parallel.

use crate::error::CoreError;
use crate::report::{BatchReport, FailureRecord, GenerationRecord};
use crate::seams::WorkingCopy;
use crate::store::TraceStore;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use vartrace_artefact::Artefact;
use vartrace_formula::Variant;
use vartrace_generate::{generate_variant, ErrorPolicy, GenerationOptions, GroundTruth};
use vartrace_history::{CommitId, VariabilityHistory};
use vartrace_io::{write_configuration, write_trace};

/// File name of the per-variant ground-truth tree
pub const GROUND_TRUTH_FILE: &str = "ground_truth.variant.csv";

/// File name of the per-variant configuration
pub const CONFIGURATION_FILE: &str = "configuration.json";

/// Where a run reads and writes
#[derive(Debug, Clone)]
pub struct RunLayout {
    /// Directory the working copy materializes each commit into
    pub checkout_root: PathBuf,

    /// Directory receiving `<commit>/<variant>/` outputs
    pub output_root: PathBuf,
}

impl RunLayout {
    /// Create a layout
    #[inline]
    #[must_use]
    pub fn new(checkout_root: impl Into<PathBuf>, output_root: impl Into<PathBuf>) -> Self {
        Self {
            checkout_root: checkout_root.into(),
            output_root: output_root.into(),
        }
    }

    /// Output directory of one (commit, variant) pair
    #[must_use]
    pub fn variant_dir(&self, commit: &CommitId, variant: &Variant) -> PathBuf {
        self.output_root.join(commit.as_str()).join(variant.name())
    }
}

/// Drives generation across a reconstructed history
pub struct EvolutionRunner {
    working_copy: Box<dyn WorkingCopy>,
    store: TraceStore,
    options: GenerationOptions,
}

impl EvolutionRunner {
    /// Create a runner over the collaborator seams
    #[must_use]
    pub fn new(
        working_copy: Box<dyn WorkingCopy>,
        store: TraceStore,
        options: GenerationOptions,
    ) -> Self {
        Self {
            working_copy,
            store,
            options,
        }
    }

    /// Run every (commit, variant) pair of the history
    ///
    /// Failures are recorded in the report and the run continues; a
    /// data-integrity violation abandons its commit without retry. Under
    /// [`ErrorPolicy::Abort`] the first failure ends the batch instead.
    ///
    /// # Errors
    /// Only under the Abort policy.
    pub fn run(
        &self,
        history: &VariabilityHistory,
        variants: &[Variant],
        layout: &RunLayout,
    ) -> Result<BatchReport, CoreError> {
        let mut report = BatchReport::default();
        for chain in history.chains() {
            info!(commits = chain.len(), head = %chain.head(), "running chain");
            for commit in chain.commits() {
                self.run_commit(commit, variants, layout, &mut report)?;
            }
        }
        info!(
            generated = report.generated().len(),
            failures = report.failures().len(),
            "batch finished"
        );
        Ok(report)
    }

    /// Checkout, generate all variants, evict; strictly in that order
    fn run_commit(
        &self,
        commit: &CommitId,
        variants: &[Variant],
        layout: &RunLayout,
        report: &mut BatchReport,
    ) -> Result<(), CoreError> {
        if let Err(source) = self
            .working_copy
            .materialize(commit, &layout.checkout_root)
        {
            let error = CoreError::Checkout {
                commit: commit.clone(),
                source,
            };
            return self.handle_commit_failure(commit, error, report);
        }

        let tree = match self.store.load(commit) {
            Ok(tree) => tree,
            Err(error) => return self.handle_commit_failure(commit, error, report),
        };

        // Independent units of work: immutable tree, immutable
        // configurations, distinct output directories.
        let outcomes: Vec<(usize, Result<GroundTruth, CoreError>)> = variants
            .par_iter()
            .enumerate()
            .map(|(index, variant)| {
                let outcome = self.generate_one(&tree, commit, variant, layout);
                (index, outcome)
            })
            .collect();

        self.store.evict(commit);

        for (index, outcome) in outcomes {
            let variant = &variants[index];
            match outcome {
                Ok(truth) => report.record_generated(GenerationRecord {
                    commit: commit.clone(),
                    variant: variant.name().to_string(),
                    files: truth.files().len(),
                    skipped: truth.skipped().to_vec(),
                }),
                Err(error) => {
                    if self.options.policy() == ErrorPolicy::Abort {
                        return Err(error);
                    }
                    warn!(%commit, variant = %variant, %error, "variant failed");
                    report.record_failure(FailureRecord {
                        commit: commit.clone(),
                        variant: Some(variant.name().to_string()),
                        message: error.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    fn generate_one(
        &self,
        tree: &Artefact,
        commit: &CommitId,
        variant: &Variant,
        layout: &RunLayout,
    ) -> Result<GroundTruth, CoreError> {
        let variant_dir = layout.variant_dir(commit, variant);
        let truth = generate_variant(
            tree,
            &layout.checkout_root,
            &variant_dir,
            variant,
            &self.options,
        )?;
        // Hand the ground truth to the serializer right away; it is not
        // cached anywhere.
        write_trace(truth.variant_tree(), &variant_dir.join(GROUND_TRUTH_FILE))?;
        write_configuration(variant, &variant_dir.join(CONFIGURATION_FILE))?;
        Ok(truth)
    }

    /// A commit-stage failure fails every variant of the commit at once
    ///
    /// Data-integrity violations land here too: they are fatal for the
    /// affected commit and never retried, but the batch steps to the next
    /// commit and reports them in the summary.
    fn handle_commit_failure(
        &self,
        commit: &CommitId,
        error: CoreError,
        report: &mut BatchReport,
    ) -> Result<(), CoreError> {
        if self.options.policy() == ErrorPolicy::Abort {
            return Err(error);
        }
        warn!(%commit, %error, "commit failed, continuing batch");
        report.record_failure(FailureRecord {
            commit: commit.clone(),
            variant: None,
            message: error.to_string(),
        });
        Ok(())
    }

    /// Sample `count` variants from the collaborator and run them
    ///
    /// # Errors
    /// As [`EvolutionRunner::run`].
    pub fn run_sampled(
        &self,
        history: &VariabilityHistory,
        sampler: &dyn crate::seams::Sampler,
        count: usize,
        layout: &RunLayout,
    ) -> Result<BatchReport, CoreError> {
        let variants = sampler.sample(count);
        info!(variants = variants.len(), "sampled configurations");
        self.run(history, &variants, layout)
    }

    /// The runner's trace store, for callers that pre-warm or inspect it
    #[inline]
    #[must_use]
    pub fn store(&self) -> &TraceStore {
        &self.store
    }
}

impl std::fmt::Debug for EvolutionRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvolutionRunner")
            .field("options", &self.options)
            .field("store", &self.store)
            .finish()
    }
}

/// Convenience: `run` over a working copy that copies from fixed
/// pre-materialized directories, used widely in tests
#[derive(Debug, Clone)]
pub struct SnapshotWorkingCopy {
    root: PathBuf,
}

impl SnapshotWorkingCopy {
    /// Serve checkouts from `<root>/<commit>/`
    #[inline]
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn copy_dir(from: &Path, to: &Path) -> std::io::Result<()> {
        std::fs::create_dir_all(to)?;
        for entry in std::fs::read_dir(from)? {
            let entry = entry?;
            let target = to.join(entry.file_name());
            if entry.file_type()?.is_dir() {
                Self::copy_dir(&entry.path(), &target)?;
            } else {
                std::fs::copy(entry.path(), &target)?;
            }
        }
        Ok(())
    }
}

impl WorkingCopy for SnapshotWorkingCopy {
    fn materialize(&self, commit: &CommitId, destination: &Path) -> std::io::Result<()> {
        // Refresh the destination so stale files of the previous commit
        // cannot leak into this one.
        if destination.exists() {
            std::fs::remove_dir_all(destination)?;
        }
        Self::copy_dir(&self.root.join(commit.as_str()), destination)
    }
}
