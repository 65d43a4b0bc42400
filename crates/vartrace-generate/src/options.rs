//! Generation options: error policy and file filtering

use std::fmt;
use std::sync::Arc;
use vartrace_artefact::SourcePath;

/// How generation reacts to missing or unreadable source files
///
/// Missing files are a recoverable condition, never fatal by default:
/// extraction is best-effort across a whole history and files legitimately
/// appear and disappear between commits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    /// First IO failure fails the whole batch
    Abort,

    /// Record the failing file as skipped and continue
    SkipFile,

    /// Treat missing files as having zero lines; other IO failures are
    /// recorded as skipped
    #[default]
    TolerateMissingFiles,
}

/// Keep/skip decision per product-line file
///
/// Strategies must be deterministic: generation results are reproducible for
/// a fixed tree, configuration, and filesystem snapshot.
pub trait ArtefactFilter: Send + Sync {
    /// Whether the file takes part in generation
    fn keep(&self, path: &SourcePath) -> bool;

    /// Filter name (for debugging)
    fn name(&self) -> &'static str {
        "filter"
    }
}

/// Filter that keeps every file
#[derive(Debug, Clone, Copy, Default)]
pub struct KeepAll;

impl ArtefactFilter for KeepAll {
    fn keep(&self, _path: &SourcePath) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "keep_all"
    }
}

/// Options for one generation call
///
/// Cheap to clone and shareable across parallel generation calls; the filter
/// is behind an `Arc`.
#[derive(Clone)]
pub struct GenerationOptions {
    policy: ErrorPolicy,
    filter: Arc<dyn ArtefactFilter>,
    simplify_conditions: bool,
}

impl GenerationOptions {
    /// Create options with the given policy and the keep-all filter
    #[must_use]
    pub fn new(policy: ErrorPolicy) -> Self {
        Self {
            policy,
            filter: Arc::new(KeepAll),
            simplify_conditions: false,
        }
    }

    /// Fail the batch on the first IO error
    #[inline]
    #[must_use]
    pub fn abort_on_error() -> Self {
        Self::new(ErrorPolicy::Abort)
    }

    /// Skip failing files, recording them in the ground truth
    #[inline]
    #[must_use]
    pub fn skip_failing_files() -> Self {
        Self::new(ErrorPolicy::SkipFile)
    }

    /// Treat missing files as empty; the default preset
    #[inline]
    #[must_use]
    pub fn tolerate_missing_files() -> Self {
        Self::new(ErrorPolicy::TolerateMissingFiles)
    }

    /// Replace the file filter
    #[must_use]
    pub fn with_filter(mut self, filter: Arc<dyn ArtefactFilter>) -> Self {
        self.filter = filter;
        self
    }

    /// Constant-fold the conditions written into the variant's tree
    ///
    /// Off by default; purely structural folding, no oracle involved.
    #[must_use]
    pub fn with_simplified_conditions(mut self) -> Self {
        self.simplify_conditions = true;
        self
    }

    /// The configured error policy
    #[inline]
    #[must_use]
    pub fn policy(&self) -> ErrorPolicy {
        self.policy
    }

    /// The configured file filter
    #[inline]
    #[must_use]
    pub fn filter(&self) -> &dyn ArtefactFilter {
        self.filter.as_ref()
    }

    /// Whether variant-tree conditions are constant-folded
    #[inline]
    #[must_use]
    pub fn simplify_conditions(&self) -> bool {
        self.simplify_conditions
    }
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self::tolerate_missing_files()
    }
}

impl fmt::Debug for GenerationOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationOptions")
            .field("policy", &self.policy)
            .field("filter", &self.filter.name())
            .field("simplify_conditions", &self.simplify_conditions)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct SourcesOnly;

    impl ArtefactFilter for SourcesOnly {
        fn keep(&self, path: &SourcePath) -> bool {
            path.file_name().is_some_and(|name| name.ends_with(".c"))
        }
    }

    #[test]
    fn keep_all_keeps_everything() {
        assert!(KeepAll.keep(&SourcePath::of(["any", "file.bin"])));
    }

    #[test]
    fn custom_filter_is_honored() {
        let options =
            GenerationOptions::tolerate_missing_files().with_filter(Arc::new(SourcesOnly));
        assert!(options.filter().keep(&SourcePath::of(["a.c"])));
        assert!(!options.filter().keep(&SourcePath::of(["a.txt"])));
    }

    #[test]
    fn default_policy_tolerates_missing_files() {
        assert_eq!(
            GenerationOptions::default().policy(),
            ErrorPolicy::TolerateMissingFiles
        );
    }
}
