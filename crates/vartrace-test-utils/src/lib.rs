//! Testing utilities for the vartrace workspace
//!
//! Shared fixtures and the brute-force equivalence oracle. The canonical
//! fixture is a tiny product line with one file whose block tree exercises
//! nesting, both annotation styles, and a non-trivial condition.

#![allow(missing_docs)]

use std::path::Path;
use vartrace_artefact::{
    AnnotationStyle, Artefact, BlockNode, DirectoryNode, FileNode, LineRange, SourcePath,
};
use vartrace_formula::{Configuration, Formula, SatOracle, Variant};

/// Brute-force satisfiability over the formula's own feature set
///
/// Enumerates every assignment of the referenced features. Test-only: the
/// core never solves satisfiability itself, it consumes it as a capability.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnumerationOracle;

impl SatOracle for EnumerationOracle {
    fn is_satisfiable(&self, formula: &Formula) -> bool {
        let features: Vec<String> = formula.features().into_iter().collect();
        assert!(
            features.len() <= 20,
            "enumeration oracle is for fixture-sized formulas"
        );
        (0u32..1 << features.len()).any(|mask| {
            let selected = features
                .iter()
                .enumerate()
                .filter(|(i, _)| mask & (1 << i) != 0)
                .map(|(_, name)| name.clone());
            formula.evaluate(&Configuration::from_features(selected))
        })
    }
}

/// Path of the fixture file inside the product line
pub fn foofoo_path() -> SourcePath {
    SourcePath::of(["src", "FooFoo.cpp"])
}

/// The fixture's block tree: external TRUE root spanning all 21 lines,
/// internal A (4-11) containing internal B (6-8), internal (C & D) | E
/// (16-18)
pub fn foofoo_file() -> FileNode {
    let range = |s, e| LineRange::new(s, e).unwrap();
    let b = BlockNode::leaf(Formula::feature("B"), range(6, 8), AnnotationStyle::Internal);
    let a = BlockNode::with_children(
        Formula::feature("A"),
        range(4, 11),
        AnnotationStyle::Internal,
        vec![b],
    )
    .unwrap();
    let cd_or_e = BlockNode::leaf(
        Formula::parse("C & D | E").unwrap(),
        range(16, 18),
        AnnotationStyle::Internal,
    );
    let root = BlockNode::with_children(
        Formula::True,
        range(1, 21),
        AnnotationStyle::External,
        vec![a, cd_or_e],
    )
    .unwrap();
    FileNode::new(foofoo_path(), vec![root]).unwrap()
}

/// The fixture tree: a directory holding the fixture file
pub fn foofoo_tree() -> Artefact {
    Artefact::Directory(DirectoryNode::new(vec![Artefact::File(foofoo_file())]).unwrap())
}

/// The fixture file's 21 lines of source text
pub fn foofoo_source() -> String {
    let lines = [
        "#include <iostream>",
        "",
        "int main() {",
        "#ifdef A",
        "    int a = 0;",
        "#ifdef B",
        "    int b = a + 1;",
        "#endif",
        "    a += 2;",
        "    return a;",
        "#endif",
        "    int base = 1;",
        "    base += 1;",
        "    base += 2;",
        "    base += 3;",
        "#if (C && D) || E",
        "    base *= 2;",
        "#endif",
        "    std::cout << base;",
        "    return 0;",
        "}",
    ];
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// Write the fixture product line below `root`
pub fn materialize_product_line(root: &Path) {
    let file = foofoo_path().below(root);
    std::fs::create_dir_all(file.parent().unwrap()).unwrap();
    std::fs::write(file, foofoo_source()).unwrap();
}

/// Variant helper: a named selection of features
pub fn variant<const N: usize>(name: &str, features: [&str; N]) -> Variant {
    Variant::new(name, Configuration::from_features(features))
}
