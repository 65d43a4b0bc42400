//! Batch summary: what a run generated, skipped, and failed

use serde::Serialize;
use vartrace_artefact::SourcePath;
use vartrace_history::CommitId;

/// One successful (commit, variant) generation
#[derive(Debug, Clone, Serialize)]
pub struct GenerationRecord {
    /// Commit the variant was generated for
    pub commit: CommitId,

    /// Name of the generated variant
    pub variant: String,

    /// Number of files with ground truth
    pub files: usize,

    /// Files the configured policy skipped
    pub skipped: Vec<SourcePath>,
}

/// One failed (commit, variant) generation, or a failed commit stage
#[derive(Debug, Clone, Serialize)]
pub struct FailureRecord {
    /// Commit the failure belongs to
    pub commit: CommitId,

    /// Variant name; absent when checkout or trace loading failed before any
    /// variant was attempted
    pub variant: Option<String>,

    /// Rendered error
    pub message: String,
}

/// Summary of a whole batch run
///
/// Batches continue past recoverable errors; the report enumerates failures
/// instead of aborting the run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    generated: Vec<GenerationRecord>,
    failures: Vec<FailureRecord>,
}

impl BatchReport {
    pub(crate) fn record_generated(&mut self, record: GenerationRecord) {
        self.generated.push(record);
    }

    pub(crate) fn record_failure(&mut self, record: FailureRecord) {
        self.failures.push(record);
    }

    /// Successful generations in run order
    #[inline]
    #[must_use]
    pub fn generated(&self) -> &[GenerationRecord] {
        &self.generated
    }

    /// Failures in run order
    #[inline]
    #[must_use]
    pub fn failures(&self) -> &[FailureRecord] {
        &self.failures
    }

    /// Whether the run saw no failure at all
    #[inline]
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Whether any generated file was skipped anywhere in the run
    #[must_use]
    pub fn has_skipped_files(&self) -> bool {
        self.generated.iter().any(|r| !r.skipped.is_empty())
    }
}
