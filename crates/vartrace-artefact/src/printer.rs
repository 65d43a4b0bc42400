//! Deterministic textual rendering of annotation trees
//!
//! For diagnostics and golden-file tests. Rendering is always document order
//! (root to leaves, children in stored order) and stable across calls, since
//! trees are immutable.

use crate::tree::{Artefact, BlockNode, FileNode};
use std::fmt::Write;

impl Artefact {
    /// Render the tree as indented text
    #[must_use]
    pub fn pretty_print(&self) -> String {
        let mut out = String::new();
        self.print_into(&mut out, 0);
        out
    }

    fn print_into(&self, out: &mut String, depth: usize) {
        match self {
            Self::Directory(dir) => {
                for child in dir.children() {
                    child.print_into(out, depth);
                }
            }
            Self::File(file) => print_file(file, out, depth),
            Self::Block(block) => print_block(block, out, depth),
        }
    }
}

fn print_file(file: &FileNode, out: &mut String, depth: usize) {
    indent(out, depth);
    let _ = writeln!(out, "{}", file.path());
    for block in file.blocks() {
        print_block(block, out, depth + 1);
    }
}

fn print_block(block: &BlockNode, out: &mut String, depth: usize) {
    indent(out, depth);
    let _ = writeln!(
        out,
        "{} {}: {}",
        block.range(),
        block.style(),
        block.condition()
    );
    for child in block.children() {
        print_block(child, out, depth + 1);
    }
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}
