//! Bottom-up tree construction from per-row block records
//!
//! Persisted traces arrive as flat rows (one per annotated range, in no
//! guaranteed nesting order). [`TreeBuilder`] accumulates them per file,
//! nests blocks by containment, and finalizes immutable nodes only once all
//! rows are in. Partial overlap is rejected immediately: it is a
//! data-integrity bug in the upstream extraction, not a recoverable runtime
//! condition.

use crate::error::ArtefactError;
use crate::path::SourcePath;
use crate::range::LineRange;
use crate::tree::{AnnotationStyle, Artefact, BlockNode, DirectoryNode, FileNode};
use indexmap::IndexMap;
use vartrace_formula::Formula;

/// Accumulates block rows and finalizes an immutable [`Artefact`] tree
///
/// Files appear in the finished tree in first-row order; blocks within a file
/// are nested by range containment regardless of row order.
#[derive(Debug, Default)]
pub struct TreeBuilder {
    files: IndexMap<SourcePath, FileAccumulator>,
}

impl TreeBuilder {
    /// Create an empty builder
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one annotated range to the file at `path`
    ///
    /// # Errors
    /// Returns [`ArtefactError::IllFormedTrace`] if the range partially
    /// overlaps an already-recorded block of the same file.
    pub fn add_block(
        &mut self,
        path: SourcePath,
        condition: Formula,
        range: LineRange,
        style: AnnotationStyle,
    ) -> Result<(), ArtefactError> {
        let file = self
            .files
            .entry(path.clone())
            .or_insert_with(|| FileAccumulator::new(path));
        file.insert(PendingBlock {
            condition,
            range,
            style,
            children: Vec::new(),
        })
    }

    /// Number of files accumulated so far
    #[inline]
    #[must_use]
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Finalize the tree: a directory of file nodes in first-row order
    ///
    /// # Errors
    /// Propagates nesting violations detected by the validating node
    /// constructors.
    pub fn finish(self) -> Result<Artefact, ArtefactError> {
        let mut children = Vec::with_capacity(self.files.len());
        for (_, accumulator) in self.files {
            children.push(Artefact::File(accumulator.finish()?));
        }
        Ok(Artefact::Directory(DirectoryNode::new(children)?))
    }
}

/// Mutable working tree for one file, private to the builder
#[derive(Debug)]
struct FileAccumulator {
    path: SourcePath,
    roots: Vec<PendingBlock>,
}

#[derive(Debug)]
struct PendingBlock {
    condition: Formula,
    range: LineRange,
    style: AnnotationStyle,
    children: Vec<PendingBlock>,
}

impl FileAccumulator {
    fn new(path: SourcePath) -> Self {
        Self {
            path,
            roots: Vec::new(),
        }
    }

    fn insert(&mut self, block: PendingBlock) -> Result<(), ArtefactError> {
        let path = self.path.clone();
        insert_into(&mut self.roots, block, &path)
    }

    fn finish(self) -> Result<FileNode, ArtefactError> {
        let path = self.path;
        let blocks = self
            .roots
            .into_iter()
            .map(|root| root.seal(&path))
            .collect::<Result<Vec<_>, _>>()?;
        FileNode::new(path, blocks)
    }
}

impl PendingBlock {
    /// Convert the working block to its immutable form, children first
    fn seal(self, path: &SourcePath) -> Result<BlockNode, ArtefactError> {
        let children = self
            .children
            .into_iter()
            .map(|child| child.seal(path))
            .collect::<Result<Vec<_>, _>>()?;
        BlockNode::with_children_at(path, self.condition, self.range, self.style, children)
    }
}

/// Insert `block` into a sibling list, nesting by containment
///
/// Exactly one of four cases applies against the existing siblings:
/// an existing sibling contains the block (recurse into it), the block
/// contains a consecutive span of siblings (adopt them), the block is
/// disjoint from all siblings (insert in range order), or the block partially
/// overlaps a sibling (reject).
fn insert_into(
    siblings: &mut Vec<PendingBlock>,
    mut block: PendingBlock,
    path: &SourcePath,
) -> Result<(), ArtefactError> {
    // Recurse into a containing sibling if there is one.
    for sibling in siblings.iter_mut() {
        if sibling.range.contains(&block.range) {
            return insert_into(&mut sibling.children, block, path);
        }
    }

    // Adopt the siblings the new block contains; they stay in order.
    let mut adopted = Vec::new();
    let mut index = 0;
    while index < siblings.len() {
        if block.range.contains(&siblings[index].range) {
            adopted.push(siblings.remove(index));
        } else {
            index += 1;
        }
    }
    block.children = adopted;

    // Whatever remains must be fully disjoint from the new block.
    if let Some(clash) = siblings.iter().find(|s| s.range.overlaps(&block.range)) {
        return Err(ArtefactError::IllFormedTrace {
            path: path.clone(),
            start: block.range.start(),
            end: block.range.end(),
            reason: format!("block partially overlaps block {}", clash.range),
        });
    }

    let position = siblings
        .iter()
        .position(|s| s.range.start() > block.range.start())
        .unwrap_or(siblings.len());
    siblings.insert(position, block);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn range(start: usize, end: usize) -> LineRange {
        LineRange::new(start, end).unwrap()
    }

    fn feat(name: &str) -> Formula {
        Formula::feature(name)
    }

    fn add(
        builder: &mut TreeBuilder,
        path: &str,
        condition: Formula,
        start: usize,
        end: usize,
        style: AnnotationStyle,
    ) -> Result<(), ArtefactError> {
        builder.add_block(path.parse().unwrap(), condition, range(start, end), style)
    }

    #[test]
    fn nests_by_containment_in_row_order() {
        let mut builder = TreeBuilder::new();
        add(&mut builder, "src/FooFoo.cpp", Formula::True, 1, 21, AnnotationStyle::External).unwrap();
        add(&mut builder, "src/FooFoo.cpp", feat("A"), 4, 11, AnnotationStyle::Internal).unwrap();
        add(&mut builder, "src/FooFoo.cpp", feat("B"), 6, 8, AnnotationStyle::Internal).unwrap();
        add(&mut builder, "src/FooFoo.cpp", feat("E"), 16, 18, AnnotationStyle::Internal).unwrap();

        let tree = builder.finish().unwrap();
        let file = tree
            .find_file(&SourcePath::of(["src", "FooFoo.cpp"]))
            .unwrap();
        assert_eq!(file.blocks().len(), 1);

        let root = &file.blocks()[0];
        assert_eq!(root.range(), range(1, 21));
        assert_eq!(root.children().len(), 2);
        assert_eq!(root.children()[0].range(), range(4, 11));
        assert_eq!(root.children()[0].children()[0].range(), range(6, 8));
        assert_eq!(root.children()[1].range(), range(16, 18));
    }

    #[test]
    fn nests_regardless_of_row_order() {
        let mut builder = TreeBuilder::new();
        // Innermost first, enclosing root last.
        add(&mut builder, "f.c", feat("B"), 6, 8, AnnotationStyle::Internal).unwrap();
        add(&mut builder, "f.c", feat("A"), 4, 11, AnnotationStyle::Internal).unwrap();
        add(&mut builder, "f.c", Formula::True, 1, 21, AnnotationStyle::External).unwrap();

        let tree = builder.finish().unwrap();
        let file = tree.find_file(&SourcePath::of(["f.c"])).unwrap();
        let root = &file.blocks()[0];
        assert_eq!(root.range(), range(1, 21));
        assert_eq!(root.children()[0].range(), range(4, 11));
        assert_eq!(root.children()[0].children()[0].range(), range(6, 8));
    }

    #[test]
    fn adopts_multiple_contained_siblings() {
        let mut builder = TreeBuilder::new();
        add(&mut builder, "f.c", feat("A"), 2, 3, AnnotationStyle::External).unwrap();
        add(&mut builder, "f.c", feat("B"), 5, 6, AnnotationStyle::External).unwrap();
        add(&mut builder, "f.c", Formula::True, 1, 10, AnnotationStyle::External).unwrap();

        let tree = builder.finish().unwrap();
        let file = tree.find_file(&SourcePath::of(["f.c"])).unwrap();
        assert_eq!(file.blocks().len(), 1);
        assert_eq!(file.blocks()[0].children().len(), 2);
    }

    #[test]
    fn rejects_partial_overlap() {
        let mut builder = TreeBuilder::new();
        add(&mut builder, "f.c", feat("A"), 4, 11, AnnotationStyle::Internal).unwrap();
        let err = add(&mut builder, "f.c", feat("B"), 10, 14, AnnotationStyle::Internal)
            .unwrap_err();
        assert!(err.is_data_integrity());
    }

    #[test]
    fn files_keep_first_row_order() {
        let mut builder = TreeBuilder::new();
        add(&mut builder, "src/z.c", Formula::True, 1, 5, AnnotationStyle::External).unwrap();
        add(&mut builder, "src/a.c", Formula::True, 1, 5, AnnotationStyle::External).unwrap();

        let tree = builder.finish().unwrap();
        let paths: Vec<String> = tree.files().iter().map(|f| f.path().to_string()).collect();
        assert_eq!(paths, vec!["src/z.c".to_string(), "src/a.c".to_string()]);
    }

    #[test]
    fn empty_builder_finishes_to_empty_directory() {
        let tree = TreeBuilder::new().finish().unwrap();
        assert!(tree.files().is_empty());
    }
}
