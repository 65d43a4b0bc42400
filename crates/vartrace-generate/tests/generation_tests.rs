//! End-to-end generation against a materialized product line

use pretty_assertions::assert_eq;
use std::path::Path;
use vartrace_artefact::{AnnotationStyle, Artefact, SourcePath};
use vartrace_formula::Formula;
use vartrace_generate::{generate_variant, GenerateError, GenerationOptions};
use vartrace_test_utils::{
    foofoo_path, foofoo_source, foofoo_tree, materialize_product_line, variant,
};

fn read_variant_file(root: &Path, path: &SourcePath) -> String {
    std::fs::read_to_string(path.below(root)).unwrap()
}

#[test]
fn generates_just_a_variant_deterministically() {
    let spl = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    materialize_product_line(spl.path());

    let tree = foofoo_tree();
    let just_a = variant("justA", ["A"]);
    let options = GenerationOptions::tolerate_missing_files();

    let truth = generate_variant(&tree, spl.path(), out.path(), &just_a, &options).unwrap();
    let text = read_variant_file(out.path(), &foofoo_path());

    // Directives and rejected blocks are gone; guarded content under A stays.
    let source = foofoo_source();
    let source_lines: Vec<&str> = source.lines().collect();
    let expected: Vec<&str> = [1, 2, 3, 5, 9, 10, 12, 13, 14, 15, 19, 20, 21]
        .iter()
        .map(|i| source_lines[i - 1])
        .collect();
    assert_eq!(text.lines().collect::<Vec<_>>(), expected);

    // Re-generating over the same snapshot is byte-identical.
    let again = tempfile::tempdir().unwrap();
    generate_variant(&tree, spl.path(), again.path(), &just_a, &options).unwrap();
    assert_eq!(read_variant_file(again.path(), &foofoo_path()), text);

    assert!(truth.skipped().is_empty());
    assert_eq!(truth.files().len(), 1);
}

#[test]
fn generates_full_variant_with_contiguous_numbering() {
    let spl = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    materialize_product_line(spl.path());

    let tree = foofoo_tree();
    let all = variant("all", ["A", "B", "C", "D", "E"]);
    let options = GenerationOptions::tolerate_missing_files();

    let truth = generate_variant(&tree, spl.path(), out.path(), &all, &options).unwrap();
    let text = read_variant_file(out.path(), &foofoo_path());

    // 21 source lines minus 6 directive lines.
    assert_eq!(text.lines().count(), 15);
    let runs = truth.files()[&foofoo_path()].runs();
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].source().start(), 1);
    assert_eq!(runs[0].source().end(), 21);
    assert_eq!(runs[0].variant().start(), 1);
    assert_eq!(runs[0].variant().end(), 15);
}

#[test]
fn every_output_line_belongs_to_exactly_one_run() {
    let spl = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    materialize_product_line(spl.path());

    for v in [
        variant("justA", ["A"]),
        variant("justB", ["B"]),
        variant("all", ["A", "B", "C", "D", "E"]),
        variant("none", []),
    ] {
        let truth = generate_variant(
            &foofoo_tree(),
            spl.path(),
            &out.path().join(v.name()),
            &v,
            &GenerationOptions::tolerate_missing_files(),
        )
        .unwrap();

        let text = read_variant_file(&out.path().join(v.name()), &foofoo_path());
        let runs = truth.files()[&foofoo_path()].runs();

        let mut seen = vec![false; text.lines().count()];
        for run in runs {
            for line in run.variant().lines() {
                assert!(!seen[line - 1], "line {line} covered twice in {v}");
                seen[line - 1] = true;
            }
        }
        assert!(seen.iter().all(|covered| *covered), "gap in runs for {v}");
    }
}

#[test]
fn variant_tree_describes_the_generated_file() {
    let spl = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    materialize_product_line(spl.path());

    let truth = generate_variant(
        &foofoo_tree(),
        spl.path(),
        out.path(),
        &variant("justA", ["A"]),
        &GenerationOptions::tolerate_missing_files(),
    )
    .unwrap();

    let file = truth.variant_tree().find_file(&foofoo_path()).unwrap();
    let root = &file.blocks()[0];
    assert_eq!(root.style(), AnnotationStyle::External);
    assert_eq!(root.range().start(), 1);
    assert_eq!(root.range().end(), 13);

    // Conditions of the generated code can be re-derived from the tree:
    // line 4 of the variant came from the A block.
    let condition = truth
        .variant_tree()
        .presence_condition_of(&foofoo_path(), 4)
        .unwrap();
    assert_eq!(condition, Formula::feature("A"));
}

#[test]
fn missing_file_is_empty_under_tolerate_policy() {
    let spl = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    // Product line never materialized: every file is missing.

    let truth = generate_variant(
        &foofoo_tree(),
        spl.path(),
        out.path(),
        &variant("justA", ["A"]),
        &GenerationOptions::tolerate_missing_files(),
    )
    .unwrap();

    assert_eq!(read_variant_file(out.path(), &foofoo_path()), "");
    assert_eq!(truth.files()[&foofoo_path()].runs().len(), 0);
    assert!(truth.skipped().is_empty());
}

#[test]
fn missing_file_is_skipped_under_skip_policy() {
    let spl = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();

    let truth = generate_variant(
        &foofoo_tree(),
        spl.path(),
        out.path(),
        &variant("justA", ["A"]),
        &GenerationOptions::skip_failing_files(),
    )
    .unwrap();

    assert_eq!(truth.skipped(), &[foofoo_path()]);
    assert!(truth.files().is_empty());
    assert!(!foofoo_path().below(out.path()).exists());
}

#[test]
fn missing_file_fails_batch_under_abort_policy() {
    let spl = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();

    let error = generate_variant(
        &foofoo_tree(),
        spl.path(),
        out.path(),
        &variant("justA", ["A"]),
        &GenerationOptions::abort_on_error(),
    )
    .unwrap_err();

    assert!(matches!(error, GenerateError::Io { .. }));
    assert!(error.is_recoverable());
}

#[test]
fn filtered_files_are_not_generated() {
    struct NoCpp;

    impl vartrace_generate::ArtefactFilter for NoCpp {
        fn keep(&self, path: &SourcePath) -> bool {
            !path.file_name().is_some_and(|name| name.ends_with(".cpp"))
        }
    }

    let spl = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    materialize_product_line(spl.path());

    let truth = generate_variant(
        &foofoo_tree(),
        spl.path(),
        out.path(),
        &variant("justA", ["A"]),
        &GenerationOptions::tolerate_missing_files()
            .with_filter(std::sync::Arc::new(NoCpp)),
    )
    .unwrap();

    assert!(truth.files().is_empty());
    assert!(!foofoo_path().below(out.path()).exists());
}

#[test]
fn generation_conjunctivity_child_needs_every_ancestor() {
    let spl = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    materialize_product_line(spl.path());

    // B alone must not resurrect the content of B: its parent A is rejected.
    let truth = generate_variant(
        &foofoo_tree(),
        spl.path(),
        out.path(),
        &variant("justB", ["B"]),
        &GenerationOptions::tolerate_missing_files(),
    )
    .unwrap();

    let text = read_variant_file(out.path(), &foofoo_path());
    let source = foofoo_source();
    let source_lines: Vec<&str> = source.lines().collect();
    let expected: Vec<&str> = [1, 2, 3, 12, 13, 14, 15, 19, 20, 21]
        .iter()
        .map(|i| source_lines[i - 1])
        .collect();
    assert_eq!(text.lines().collect::<Vec<_>>(), expected);

    let file = truth.variant_tree().find_file(&foofoo_path()).unwrap();
    assert_eq!(file.blocks()[0].children().len(), 0);
}

#[test]
fn variant_tree_is_an_empty_directory_when_nothing_survives() {
    let spl = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();

    // Single file whose root rejects everything.
    let tree = {
        use vartrace_artefact::{BlockNode, DirectoryNode, FileNode, LineRange};
        let root = BlockNode::leaf(
            Formula::False,
            LineRange::new(1, 3).unwrap(),
            AnnotationStyle::External,
        );
        let file = FileNode::new(SourcePath::of(["gone.c"]), vec![root]).unwrap();
        Artefact::Directory(DirectoryNode::new(vec![Artefact::File(file)]).unwrap())
    };
    std::fs::write(spl.path().join("gone.c"), "a\nb\nc\n").unwrap();

    let truth = generate_variant(
        &tree,
        spl.path(),
        out.path(),
        &variant("none", []),
        &GenerationOptions::tolerate_missing_files(),
    )
    .unwrap();

    assert!(truth.variant_tree().files().is_empty());
    assert_eq!(read_variant_file(out.path(), &SourcePath::of(["gone.c"])), "");
}
