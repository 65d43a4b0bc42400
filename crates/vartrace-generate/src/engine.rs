//! The variant generation engine
//!
//! For every file of the annotation tree the engine classifies each source
//! line, emits the kept lines contiguously renumbered from 1, and records the
//! provenance runs and the surviving block tree in variant coordinates.
//!
//! Line classification: a block is kept iff its condition holds under the
//! variant's configuration and every ancestor block is kept. Directive lines
//! of kept Internal blocks are annotation lines and are never emitted; every
//! line of a dropped block is dropped content. Lines covered by no block are
//! unconditional and kept.

use crate::error::GenerateError;
use crate::ground_truth::{AnnotationGroundTruth, GroundTruth, GroundTruthAssembler, ProvenanceRun};
use crate::options::{ErrorPolicy, GenerationOptions};
use std::path::Path;
use tracing::{debug, warn};
use vartrace_artefact::{
    AnnotationStyle, Artefact, BlockNode, FileNode, LineRange, SourcePath,
};
use vartrace_formula::{Configuration, Variant};

/// What became of one source line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineFate {
    /// Emitted to the variant
    Kept,

    /// Directive line of a kept Internal block: never emitted, but does not
    /// break provenance runs
    Annotation,

    /// Excluded by a false condition: breaks provenance runs
    Dropped,
}

/// Generate one variant of the product line
///
/// Reads each non-filtered file of `tree` below `spl_root`, writes the kept
/// lines below `variant_root` (parent directories are created), and returns
/// the ground truth for the generation.
///
/// # Errors
/// - Data-integrity violations abort the commit regardless of policy.
/// - IO failures abort only under [`ErrorPolicy::Abort`]; otherwise the file
///   is recorded as skipped and generation continues.
pub fn generate_variant(
    tree: &Artefact,
    spl_root: &Path,
    variant_root: &Path,
    variant: &Variant,
    options: &GenerationOptions,
) -> Result<GroundTruth, GenerateError> {
    let mut assembler = GroundTruthAssembler::new();
    let configuration = variant.configuration();

    for file in tree.files() {
        let path = file.path().clone();
        if !options.filter().keep(&path) {
            debug!(%path, variant = %variant, "file filtered out");
            continue;
        }

        let source = match read_source(file, spl_root, options.policy()) {
            Ok(Some(lines)) => lines,
            Ok(None) => {
                warn!(%path, variant = %variant, "skipping unreadable file");
                assembler.record_skipped(path);
                continue;
            }
            Err(error) => return Err(error),
        };

        let outcome = generate_file(file, &source, configuration, options)?;
        write_variant_file(variant_root, &path, &outcome.text)?;
        assembler.record_generated(path, outcome.truth, outcome.variant_file);
    }

    let truth = assembler.finish()?;
    debug!(
        variant = %variant,
        files = truth.files().len(),
        skipped = truth.skipped().len(),
        "variant generated"
    );
    Ok(truth)
}

/// Read a file's lines, applying the error policy
///
/// `Ok(None)` means "skip this file and continue".
fn read_source(
    file: &FileNode,
    spl_root: &Path,
    policy: ErrorPolicy,
) -> Result<Option<Vec<String>>, GenerateError> {
    let on_disk = file.path().below(spl_root);
    match std::fs::read_to_string(&on_disk) {
        Ok(text) => Ok(Some(text.lines().map(str::to_string).collect())),
        Err(source) => match policy {
            ErrorPolicy::Abort => Err(GenerateError::io(on_disk, source)),
            ErrorPolicy::SkipFile => Ok(None),
            ErrorPolicy::TolerateMissingFiles => {
                if source.kind() == std::io::ErrorKind::NotFound {
                    // Files legitimately appear and disappear across the
                    // history; a missing file is a zero-line file.
                    Ok(Some(Vec::new()))
                } else {
                    Ok(None)
                }
            }
        },
    }
}

struct FileOutcome {
    text: String,
    truth: AnnotationGroundTruth,
    variant_file: Option<FileNode>,
}

/// Run the line-fate walk for one file and build its outcome
fn generate_file(
    file: &FileNode,
    source: &[String],
    configuration: &Configuration,
    options: &GenerationOptions,
) -> Result<FileOutcome, GenerateError> {
    // Uncovered lines are unconditional code and default to kept.
    let mut fates = vec![LineFate::Kept; source.len()];
    for block in file.blocks() {
        apply_block(block, configuration, &mut fates);
    }

    // Emit kept lines in original relative order, renumbered from 1 without
    // gaps, and cut provenance runs at dropped content lines.
    let mut text = String::new();
    let mut output_of = vec![None::<usize>; source.len()];
    let mut runs = Vec::new();
    let mut current: Option<RunInProgress> = None;
    let mut emitted = 0usize;

    for (index, line) in source.iter().enumerate() {
        let source_line = index + 1;
        match fates[index] {
            LineFate::Kept => {
                text.push_str(line);
                text.push('\n');
                emitted += 1;
                output_of[index] = Some(emitted);
                match current.as_mut() {
                    Some(run) => run.extend(source_line, emitted),
                    None => current = Some(RunInProgress::starting(source_line, emitted)),
                }
            }
            LineFate::Annotation => {}
            LineFate::Dropped => {
                if let Some(run) = current.take() {
                    runs.push(run.seal()?);
                }
            }
        }
    }
    if let Some(run) = current.take() {
        runs.push(run.seal()?);
    }

    let variant_file = rebuild_variant_file(file, configuration, &output_of, options)?;
    Ok(FileOutcome {
        text,
        truth: AnnotationGroundTruth::new(runs),
        variant_file,
    })
}

/// Mark the fates a block dictates for its range
///
/// Conjunctive containment falls out of the recursion: a dropped block marks
/// its whole range dropped and never visits its children.
fn apply_block(block: &BlockNode, configuration: &Configuration, fates: &mut [LineFate]) {
    if !block.condition().evaluate(configuration) {
        mark(fates, block.range(), LineFate::Dropped);
        return;
    }
    if block.style() == AnnotationStyle::Internal {
        mark_line(fates, block.range().start(), LineFate::Annotation);
        mark_line(fates, block.range().end(), LineFate::Annotation);
    }
    for child in block.children() {
        apply_block(child, configuration, fates);
    }
}

fn mark(fates: &mut [LineFate], range: LineRange, fate: LineFate) {
    for line in range.lines() {
        mark_line(fates, line, fate);
    }
}

fn mark_line(fates: &mut [LineFate], line: usize, fate: LineFate) {
    // The tree may record more lines than the snapshot holds; marks beyond
    // the end of the file are meaningless.
    if let Some(slot) = fates.get_mut(line - 1) {
        *slot = fate;
    }
}

struct RunInProgress {
    source_start: usize,
    source_end: usize,
    variant_start: usize,
    variant_end: usize,
}

impl RunInProgress {
    fn starting(source_line: usize, variant_line: usize) -> Self {
        Self {
            source_start: source_line,
            source_end: source_line,
            variant_start: variant_line,
            variant_end: variant_line,
        }
    }

    /// Extend the run to a later kept line; interior annotation lines widen
    /// the source envelope implicitly
    fn extend(&mut self, source_line: usize, variant_line: usize) {
        self.source_end = source_line;
        self.variant_end = variant_line;
    }

    fn seal(self) -> Result<ProvenanceRun, GenerateError> {
        Ok(ProvenanceRun::new(
            LineRange::new(self.source_start, self.source_end)?,
            LineRange::new(self.variant_start, self.variant_end)?,
        ))
    }
}

/// Rebuild the surviving blocks in variant coordinates
///
/// Style is forced to External: generated files carry no annotation syntax.
/// Blocks whose entire content was dropped have no representable range and
/// are omitted.
fn rebuild_variant_file(
    file: &FileNode,
    configuration: &Configuration,
    output_of: &[Option<usize>],
    options: &GenerationOptions,
) -> Result<Option<FileNode>, GenerateError> {
    let mut roots = Vec::new();
    for block in file.blocks() {
        if let Some(rebuilt) = rebuild_block(block, configuration, output_of, options)? {
            roots.push(rebuilt);
        }
    }
    if roots.is_empty() {
        return Ok(None);
    }
    Ok(Some(FileNode::new(file.path().clone(), roots)?))
}

fn rebuild_block(
    block: &BlockNode,
    configuration: &Configuration,
    output_of: &[Option<usize>],
    options: &GenerationOptions,
) -> Result<Option<BlockNode>, GenerateError> {
    if !block.condition().evaluate(configuration) {
        return Ok(None);
    }

    let mut children = Vec::new();
    for child in block.children() {
        if let Some(rebuilt) = rebuild_block(child, configuration, output_of, options)? {
            children.push(rebuilt);
        }
    }

    // Variant span: the output lines assigned within the block's range.
    let emitted: Vec<usize> = block
        .range()
        .lines()
        .filter_map(|line| output_of.get(line - 1).copied().flatten())
        .collect();
    let Some(start) = emitted.iter().copied().min() else {
        return Ok(None);
    };
    let end = emitted.iter().copied().max().unwrap_or(start);

    let condition = if options.simplify_conditions() {
        block.condition().simplify()
    } else {
        block.condition().clone()
    };
    let rebuilt = BlockNode::with_children(
        condition,
        LineRange::new(start, end)?,
        AnnotationStyle::External,
        children,
    )?;
    Ok(Some(rebuilt))
}

/// Write one generated file below the variant root
///
/// Zero-line files are still created, so the variant mirrors the file set
/// generation visited.
fn write_variant_file(
    variant_root: &Path,
    path: &SourcePath,
    text: &str,
) -> Result<(), GenerateError> {
    let on_disk = path.below(variant_root);
    if let Some(parent) = on_disk.parent() {
        std::fs::create_dir_all(parent).map_err(|e| GenerateError::io(parent, e))?;
    }
    std::fs::write(&on_disk, text).map_err(|e| GenerateError::io(on_disk, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use vartrace_formula::Formula;

    fn range(start: usize, end: usize) -> LineRange {
        LineRange::new(start, end).unwrap()
    }

    fn lines(count: usize) -> Vec<String> {
        (1..=count).map(|i| format!("line {i}")).collect()
    }

    fn internal(condition: &str, start: usize, end: usize) -> BlockNode {
        BlockNode::leaf(
            Formula::parse(condition).unwrap(),
            range(start, end),
            AnnotationStyle::Internal,
        )
    }

    /// External TRUE root over [A [B]] and [(C & D) | E]
    fn foofoo_file() -> FileNode {
        let a = BlockNode::with_children(
            Formula::feature("A"),
            range(4, 11),
            AnnotationStyle::Internal,
            vec![internal("B", 6, 8)],
        )
        .unwrap();
        let root = BlockNode::with_children(
            Formula::True,
            range(1, 21),
            AnnotationStyle::External,
            vec![a, internal("C & D | E", 16, 18)],
        )
        .unwrap();
        FileNode::new(SourcePath::of(["src", "FooFoo.cpp"]), vec![root]).unwrap()
    }

    fn outcome_for(selected: &[&str]) -> FileOutcome {
        let configuration = Configuration::from_features(selected.iter().copied());
        generate_file(
            &foofoo_file(),
            &lines(21),
            &configuration,
            &GenerationOptions::default(),
        )
        .unwrap()
    }

    #[test]
    fn config_just_a_keeps_a_without_b() {
        let outcome = outcome_for(&["A"]);

        // Kept content: 1-3, 5, 9-10, 12-15, 19-21; directives 4 and 11
        // dropped as annotations, blocks 6-8 and 16-18 dropped entirely.
        let expected: Vec<String> = [1, 2, 3, 5, 9, 10, 12, 13, 14, 15, 19, 20, 21]
            .iter()
            .map(|i| format!("line {i}"))
            .collect();
        let emitted: Vec<&str> = outcome.text.lines().collect();
        assert_eq!(emitted, expected.iter().map(String::as_str).collect::<Vec<_>>());

        assert_eq!(
            outcome.truth.runs(),
            &[
                ProvenanceRun::new(range(1, 5), range(1, 4)),
                ProvenanceRun::new(range(9, 15), range(5, 10)),
                ProvenanceRun::new(range(19, 21), range(11, 13)),
            ]
        );
    }

    #[test]
    fn config_abcd_keeps_everything_in_one_run() {
        let outcome = outcome_for(&["A", "B", "C", "D"]);

        // All blocks kept: only the six directive lines vanish, and dropped
        // annotation lines never break a run.
        assert_eq!(outcome.truth.runs(), &[ProvenanceRun::new(range(1, 21), range(1, 15))]);
        assert_eq!(outcome.truth.variant_line_count(), 15);
        assert_eq!(outcome.text.lines().count(), 15);
    }

    #[test]
    fn renumbering_is_contiguous() {
        for selected in [&["A"][..], &["A", "B", "C", "D"][..], &[][..]] {
            let outcome = outcome_for(selected);
            let total: usize = outcome.truth.runs().iter().map(|r| r.variant().len()).sum();
            assert_eq!(total, outcome.text.lines().count());

            let mut next = 1;
            for run in outcome.truth.runs() {
                assert_eq!(run.variant().start(), next);
                next = run.variant().end() + 1;
            }
        }
    }

    #[test]
    fn provenance_references_exactly_the_kept_lines() {
        let outcome = outcome_for(&["A"]);
        let kept: Vec<usize> = vec![1, 2, 3, 5, 9, 10, 12, 13, 14, 15, 19, 20, 21];

        // Source envelopes are disjoint and cover every kept line.
        let mut covered = Vec::new();
        let mut previous_end = 0;
        for run in outcome.truth.runs() {
            assert!(run.source().start() > previous_end);
            previous_end = run.source().end();
            covered.extend(run.source().lines().filter(|l| kept.contains(l)));
        }
        assert_eq!(covered, kept);
    }

    #[test]
    fn variant_tree_is_external_with_rewritten_coordinates() {
        let outcome = outcome_for(&["A"]);
        let file = outcome.variant_file.unwrap();
        let root = &file.blocks()[0];

        assert_eq!(root.style(), AnnotationStyle::External);
        assert!(root.condition().is_true());
        assert_eq!(root.range(), range(1, 13));

        assert_eq!(root.children().len(), 1);
        let a = &root.children()[0];
        assert_eq!(a.style(), AnnotationStyle::External);
        assert_eq!(a.range(), range(4, 6));
        assert!(a.children().is_empty());
    }

    #[test]
    fn variant_tree_keeps_nested_blocks_when_all_selected() {
        let outcome = outcome_for(&["A", "B", "C", "D"]);
        let file = outcome.variant_file.unwrap();
        let root = &file.blocks()[0];
        assert_eq!(root.range(), range(1, 15));

        let a = &root.children()[0];
        assert_eq!(a.range(), range(4, 7));
        assert_eq!(a.children()[0].range(), range(5, 5));

        let cd_or_e = &root.children()[1];
        assert_eq!(cd_or_e.range(), range(12, 12));
    }

    #[test]
    fn false_root_produces_empty_file_without_tree() {
        let file = FileNode::new(
            SourcePath::of(["src", "foo", "bar.cpp"]),
            vec![internal("false", 1, 4)],
        )
        .unwrap();
        let outcome = generate_file(
            &file,
            &lines(4),
            &Configuration::from_features(["A"]),
            &GenerationOptions::default(),
        )
        .unwrap();

        assert!(outcome.text.is_empty());
        assert!(outcome.truth.runs().is_empty());
        assert!(outcome.variant_file.is_none());
    }

    #[test]
    fn kept_block_with_fully_dropped_content_is_omitted_from_tree() {
        // A kept everything-block whose only content is a dropped child.
        let root = BlockNode::with_children(
            Formula::True,
            range(1, 3),
            AnnotationStyle::External,
            vec![internal("X", 1, 3)],
        )
        .unwrap();
        let file = FileNode::new(SourcePath::of(["g.c"]), vec![root]).unwrap();
        let outcome = generate_file(
            &file,
            &lines(3),
            &Configuration::empty(),
            &GenerationOptions::default(),
        )
        .unwrap();

        assert!(outcome.text.is_empty());
        assert!(outcome.variant_file.is_none());
    }

    #[test]
    fn simplified_conditions_fold_constants() {
        let root = BlockNode::with_children(
            Formula::And(vec![Formula::feature("A"), Formula::True]),
            range(1, 2),
            AnnotationStyle::External,
            vec![],
        )
        .unwrap();
        let file = FileNode::new(SourcePath::of(["h.c"]), vec![root]).unwrap();
        let configuration = Configuration::from_features(["A"]);

        let folded = generate_file(
            &file,
            &lines(2),
            &configuration,
            &GenerationOptions::default().with_simplified_conditions(),
        )
        .unwrap();
        let kept_root = folded.variant_file.unwrap();
        assert_eq!(kept_root.blocks()[0].condition(), &Formula::feature("A"));

        let untouched = generate_file(&file, &lines(2), &configuration, &GenerationOptions::default())
            .unwrap();
        let kept_root = untouched.variant_file.unwrap();
        assert_eq!(
            kept_root.blocks()[0].condition(),
            &Formula::And(vec![Formula::feature("A"), Formula::True])
        );
    }

    #[test]
    fn tree_longer_than_snapshot_is_clamped() {
        // Recorded range says 21 lines; the snapshot only has 10.
        let outcome = {
            let configuration = Configuration::from_features(["A"]);
            generate_file(
                &foofoo_file(),
                &lines(10),
                &configuration,
                &GenerationOptions::default(),
            )
            .unwrap()
        };
        // Lines 1-3, 5, 9-10 survive; everything beyond line 10 never existed.
        assert_eq!(outcome.text.lines().count(), 6);
    }
}
