//! The annotation tree: directories, files, and line blocks
//!
//! Nodes are a tagged union ([`Artefact`]) and traversal is plain recursion
//! over the variants; there is no dynamic dispatch. All nodes are immutable
//! after construction: building happens in [`TreeBuilder`](crate::TreeBuilder),
//! and the validating constructors here are the load-time rejection point for
//! ill-formed data.

use crate::error::ArtefactError;
use crate::path::SourcePath;
use crate::range::LineRange;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;
use vartrace_formula::Formula;

/// How a block's condition exists in the original text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationStyle {
    /// Condition realized as inline conditional-compilation directives; the
    /// first and last line of the range are the directives themselves
    Internal,

    /// Condition imposed by the extraction tool; every line in the range is
    /// ordinary content
    External,
}

impl AnnotationStyle {
    /// Lines trimmed at each end of the range to get the content span
    #[inline]
    #[must_use]
    pub fn annotation_margin(&self) -> usize {
        match self {
            Self::Internal => 1,
            Self::External => 0,
        }
    }

    /// Content span of `range` under this style
    ///
    /// `None` for an `Internal` range too short to hold content between its
    /// directives.
    #[must_use]
    pub fn content_of(&self, range: LineRange) -> Option<LineRange> {
        let margin = self.annotation_margin();
        LineRange::new(range.start() + margin, range.end().checked_sub(margin)?).ok()
    }

    /// Canonical lowercase name, as persisted
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Internal => "internal",
            Self::External => "external",
        }
    }
}

impl Display for AnnotationStyle {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnnotationStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "internal" => Ok(Self::Internal),
            "external" => Ok(Self::External),
            other => Err(format!("unknown annotation style `{other}`")),
        }
    }
}

/// A condition-annotated block of lines, possibly with nested blocks
///
/// # Invariants
/// - every child's range is contained in the parent's range
/// - sibling ranges are non-overlapping and in increasing order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockNode {
    condition: Formula,
    range: LineRange,
    style: AnnotationStyle,
    children: Vec<BlockNode>,
}

impl BlockNode {
    /// Create a leaf block
    #[inline]
    #[must_use]
    pub fn leaf(condition: Formula, range: LineRange, style: AnnotationStyle) -> Self {
        Self {
            condition,
            range,
            style,
            children: Vec::new(),
        }
    }

    /// Create a block with nested children, validating containment
    ///
    /// # Errors
    /// Returns a data-integrity error if a child escapes the parent range or
    /// siblings overlap or are out of order.
    pub fn with_children(
        condition: Formula,
        range: LineRange,
        style: AnnotationStyle,
        children: Vec<BlockNode>,
    ) -> Result<Self, ArtefactError> {
        Self::with_children_at(&SourcePath::of(["<detached>"]), condition, range, style, children)
    }

    /// As [`BlockNode::with_children`], attributing violations to `path`
    pub(crate) fn with_children_at(
        path: &SourcePath,
        condition: Formula,
        range: LineRange,
        style: AnnotationStyle,
        children: Vec<BlockNode>,
    ) -> Result<Self, ArtefactError> {
        let node = Self {
            condition,
            range,
            style,
            children,
        };
        node.validate_shape(path)?;
        Ok(node)
    }

    /// The block's own presence condition (not conjoined with ancestors)
    #[inline]
    #[must_use]
    pub fn condition(&self) -> &Formula {
        &self.condition
    }

    /// Covered line span, directives included for `Internal` blocks
    #[inline]
    #[must_use]
    pub fn range(&self) -> LineRange {
        self.range
    }

    /// Annotation style of this block
    #[inline]
    #[must_use]
    pub fn style(&self) -> AnnotationStyle {
        self.style
    }

    /// Nested blocks in document order
    #[inline]
    #[must_use]
    pub fn children(&self) -> &[BlockNode] {
        &self.children
    }

    /// Content span: the covered lines that are not annotation directives
    #[inline]
    #[must_use]
    pub fn content_range(&self) -> Option<LineRange> {
        self.style.content_of(self.range)
    }

    /// Check nesting invariants for this block and its subtree
    pub(crate) fn validate_shape(&self, path: &SourcePath) -> Result<(), ArtefactError> {
        if self.style == AnnotationStyle::Internal && self.range.len() < 2 {
            return Err(ArtefactError::IllFormedTrace {
                path: path.clone(),
                start: self.range.start(),
                end: self.range.end(),
                reason: "internal annotation shorter than its two directive lines".to_string(),
            });
        }
        validate_siblings(path, self.range, &self.children)?;
        for child in &self.children {
            child.validate_shape(path)?;
        }
        Ok(())
    }

    /// Push the conditions of the blocks enclosing `line`, root to innermost
    ///
    /// Returns false if the line is outside this block entirely.
    fn collect_conditions_at(&self, line: usize, out: &mut Vec<Formula>) -> bool {
        if !self.range.contains_line(line) {
            return false;
        }
        out.push(self.condition.clone());
        // Siblings are disjoint, so at most one child can cover the line.
        for child in &self.children {
            if child.collect_conditions_at(line, out) {
                break;
            }
        }
        true
    }
}

/// Check that `children` stay inside `enclosing` and are ordered and disjoint
pub(crate) fn validate_siblings(
    path: &SourcePath,
    enclosing: LineRange,
    children: &[BlockNode],
) -> Result<(), ArtefactError> {
    let ill = |block: &BlockNode, reason: String| ArtefactError::IllFormedTrace {
        path: path.clone(),
        start: block.range.start(),
        end: block.range.end(),
        reason,
    };
    for (i, child) in children.iter().enumerate() {
        if !enclosing.contains(&child.range) {
            return Err(ill(
                child,
                format!("block escapes its enclosing range {enclosing}"),
            ));
        }
        if let Some(previous) = i.checked_sub(1).and_then(|i| children.get(i)) {
            if previous.range.overlaps(&child.range) {
                return Err(ill(
                    child,
                    format!("block overlaps preceding sibling {}", previous.range),
                ));
            }
            if child.range.start() < previous.range.start() {
                return Err(ill(child, "siblings are not in increasing order".to_string()));
            }
        }
    }
    Ok(())
}

/// A single annotated source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileNode {
    path: SourcePath,
    blocks: Vec<BlockNode>,
}

impl FileNode {
    /// Create a file node, validating the block forest
    ///
    /// # Errors
    /// Returns a data-integrity error on any nesting violation; this is the
    /// load-time rejection point demanded by the containment invariant.
    pub fn new(path: SourcePath, blocks: Vec<BlockNode>) -> Result<Self, ArtefactError> {
        if let Some(span) = envelope(&blocks) {
            validate_siblings(&path, span, &blocks)?;
        }
        for block in &blocks {
            block.validate_shape(&path)?;
        }
        Ok(Self { path, blocks })
    }

    /// Path of the file, relative to the product-line root
    #[inline]
    #[must_use]
    pub fn path(&self) -> &SourcePath {
        &self.path
    }

    /// Top-level blocks in document order
    #[inline]
    #[must_use]
    pub fn blocks(&self) -> &[BlockNode] {
        &self.blocks
    }

    /// The file's recorded line span (envelope of its top-level blocks)
    #[inline]
    #[must_use]
    pub fn recorded_range(&self) -> Option<LineRange> {
        envelope(&self.blocks)
    }

    /// Presence condition of a line of this file
    ///
    /// Conjunction of the conditions of all enclosing blocks, root to
    /// innermost, in the file's own coordinate space. Constant true when no
    /// annotation covers the line.
    ///
    /// # Errors
    /// [`ArtefactError::LineOutOfRange`] if the line lies outside the
    /// recorded range.
    pub fn presence_condition_at(&self, line: usize) -> Result<Formula, ArtefactError> {
        let in_range = self
            .recorded_range()
            .is_some_and(|range| range.contains_line(line));
        if !in_range {
            return Err(ArtefactError::LineOutOfRange {
                path: self.path.clone(),
                line,
            });
        }
        let mut conditions = Vec::new();
        for block in &self.blocks {
            if block.collect_conditions_at(line, &mut conditions) {
                break;
            }
        }
        Ok(Formula::and(conditions))
    }
}

/// Envelope of a top-level block forest
fn envelope(blocks: &[BlockNode]) -> Option<LineRange> {
    let start = blocks.iter().map(|b| b.range().start()).min()?;
    let end = blocks.iter().map(|b| b.range().end()).max()?;
    LineRange::new(start, end).ok()
}

/// An ordered group of files and nested directories
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DirectoryNode {
    children: Vec<Artefact>,
}

impl DirectoryNode {
    /// Create a directory, rejecting block children
    ///
    /// # Errors
    /// [`ArtefactError::BlockOutsideFile`] if a block node is passed.
    pub fn new(children: Vec<Artefact>) -> Result<Self, ArtefactError> {
        if children.iter().any(|c| matches!(c, Artefact::Block(_))) {
            return Err(ArtefactError::BlockOutsideFile);
        }
        Ok(Self { children })
    }

    /// Children in document order
    #[inline]
    #[must_use]
    pub fn children(&self) -> &[Artefact] {
        &self.children
    }
}

/// A node of the annotation tree
///
/// Modeled as a sum type; match on the variants to traverse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Artefact {
    /// Group of files and nested groups
    Directory(DirectoryNode),

    /// Annotated source file
    File(FileNode),

    /// Annotated line block (only valid beneath a file)
    Block(BlockNode),
}

impl Artefact {
    /// Look up a file node by path
    #[must_use]
    pub fn find_file(&self, path: &SourcePath) -> Option<&FileNode> {
        match self {
            Self::File(file) => (file.path() == path).then_some(file),
            Self::Directory(dir) => dir.children().iter().find_map(|c| c.find_file(path)),
            Self::Block(_) => None,
        }
    }

    /// All file nodes of the tree in document order
    #[must_use]
    pub fn files(&self) -> Vec<&FileNode> {
        let mut out = Vec::new();
        self.collect_files(&mut out);
        out
    }

    fn collect_files<'a>(&'a self, out: &mut Vec<&'a FileNode>) {
        match self {
            Self::File(file) => out.push(file),
            Self::Directory(dir) => {
                for child in dir.children() {
                    child.collect_files(out);
                }
            }
            Self::Block(_) => {}
        }
    }

    /// Presence condition of `path` at `line`
    ///
    /// Recursive descent from the root: the conjunction of all enclosing
    /// blocks' conditions in the current coordinate space.
    ///
    /// # Errors
    /// [`ArtefactError::FileNotFound`] if the path is absent,
    /// [`ArtefactError::LineOutOfRange`] if the line is outside the file's
    /// recorded range.
    pub fn presence_condition_of(
        &self,
        path: &SourcePath,
        line: usize,
    ) -> Result<Formula, ArtefactError> {
        let file = self
            .find_file(path)
            .ok_or_else(|| ArtefactError::FileNotFound { path: path.clone() })?;
        file.presence_condition_at(line)
    }
}
