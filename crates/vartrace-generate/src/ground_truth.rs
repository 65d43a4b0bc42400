//! Ground truth: provenance from generated lines back to the product line

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use vartrace_artefact::{Artefact, ArtefactError, DirectoryNode, FileNode, LineRange, SourcePath};

/// One maximal run of kept lines
///
/// The source side is the inclusive envelope from the run's first to its last
/// kept line in product-line coordinates; dropped annotation lines may sit
/// inside the envelope and are not referenced. The variant side is contiguous
/// by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvenanceRun {
    source: LineRange,
    variant: LineRange,
}

impl ProvenanceRun {
    /// Pair a source envelope with its variant range
    #[inline]
    #[must_use]
    pub fn new(source: LineRange, variant: LineRange) -> Self {
        Self { source, variant }
    }

    /// Lines in the product line (inclusive envelope)
    #[inline]
    #[must_use]
    pub fn source(&self) -> LineRange {
        self.source
    }

    /// Lines in the generated variant
    #[inline]
    #[must_use]
    pub fn variant(&self) -> LineRange {
        self.variant
    }
}

/// Per-file provenance: the matching between source and variant ranges
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationGroundTruth {
    runs: Vec<ProvenanceRun>,
}

impl AnnotationGroundTruth {
    /// Create from the ordered run list
    #[inline]
    #[must_use]
    pub fn new(runs: Vec<ProvenanceRun>) -> Self {
        Self { runs }
    }

    /// Matching runs in variant order
    #[inline]
    #[must_use]
    pub fn runs(&self) -> &[ProvenanceRun] {
        &self.runs
    }

    /// Number of lines the variant file received
    #[must_use]
    pub fn variant_line_count(&self) -> usize {
        self.runs.iter().map(|r| r.variant().len()).sum()
    }
}

/// Ground truth of one (commit, variant) generation
///
/// Produced fresh per generation call, then serialized or discarded; never
/// cached.
#[derive(Debug, Clone)]
pub struct GroundTruth {
    variant_tree: Artefact,
    files: IndexMap<SourcePath, AnnotationGroundTruth>,
    skipped: Vec<SourcePath>,
}

impl GroundTruth {
    /// The variant's own annotation tree
    ///
    /// Coordinates are relative to the generated files; every block is
    /// External, since generated files carry no literal annotation syntax.
    #[inline]
    #[must_use]
    pub fn variant_tree(&self) -> &Artefact {
        &self.variant_tree
    }

    /// Per-file provenance, keyed by product-line path, in generation order
    #[inline]
    #[must_use]
    pub fn files(&self) -> &IndexMap<SourcePath, AnnotationGroundTruth> {
        &self.files
    }

    /// Files skipped under the SkipFile/TolerateMissingFiles policies
    #[inline]
    #[must_use]
    pub fn skipped(&self) -> &[SourcePath] {
        &self.skipped
    }
}

/// Accumulates per-file outcomes into one [`GroundTruth`]
///
/// Aggregation is best-effort: skipped files are enumerated, not fatal.
/// Failing the whole generation is the engine's job and happens only under
/// the Abort policy.
#[derive(Debug, Default)]
pub(crate) struct GroundTruthAssembler {
    variant_files: Vec<Artefact>,
    files: IndexMap<SourcePath, AnnotationGroundTruth>,
    skipped: Vec<SourcePath>,
}

impl GroundTruthAssembler {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Record a generated file: its provenance and, if any line survived, its
    /// node in the variant tree
    pub(crate) fn record_generated(
        &mut self,
        path: SourcePath,
        truth: AnnotationGroundTruth,
        variant_file: Option<FileNode>,
    ) {
        self.files.insert(path, truth);
        if let Some(file) = variant_file {
            self.variant_files.push(Artefact::File(file));
        }
    }

    /// Record a file that generation had to skip
    pub(crate) fn record_skipped(&mut self, path: SourcePath) {
        self.skipped.push(path);
    }

    pub(crate) fn finish(self) -> Result<GroundTruth, ArtefactError> {
        Ok(GroundTruth {
            variant_tree: Artefact::Directory(DirectoryNode::new(self.variant_files)?),
            files: self.files,
            skipped: self.skipped,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(start: usize, end: usize) -> LineRange {
        LineRange::new(start, end).unwrap()
    }

    #[test]
    fn variant_line_count_sums_runs() {
        let truth = AnnotationGroundTruth::new(vec![
            ProvenanceRun::new(range(1, 5), range(1, 4)),
            ProvenanceRun::new(range(9, 15), range(5, 10)),
        ]);
        assert_eq!(truth.variant_line_count(), 10);
    }

    #[test]
    fn assembler_keeps_generation_order() {
        let mut assembler = GroundTruthAssembler::new();
        assembler.record_generated(
            SourcePath::of(["b.c"]),
            AnnotationGroundTruth::default(),
            None,
        );
        assembler.record_skipped(SourcePath::of(["missing.c"]));
        assembler.record_generated(
            SourcePath::of(["a.c"]),
            AnnotationGroundTruth::default(),
            None,
        );

        let truth = assembler.finish().unwrap();
        let keys: Vec<String> = truth.files().keys().map(ToString::to_string).collect();
        assert_eq!(keys, vec!["b.c".to_string(), "a.c".to_string()]);
        assert_eq!(truth.skipped().len(), 1);
    }
}
