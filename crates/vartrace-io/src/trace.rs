//! The tabular trace codec
//!
//! One row per annotated line range, `;`-separated:
//!
//! ```text
//! Path;Start;End;Condition;Style
//! src/FooFoo.cpp;1;21;true;external
//! src/FooFoo.cpp;4;11;A;internal
//! ```
//!
//! The style column is the flag that distinguishes the two line-numbering
//! conventions: `internal` rows count their annotation lines (product-line
//! coordinates), `external` rows do not. Variant-space traces may contain
//! only `external` rows, since generated files carry no literal annotation
//! syntax. Rows are rendered in document order (files in tree order, blocks
//! pre-order), so rendering is deterministic.

use crate::error::TraceIoError;
use std::fmt::Write as _;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;
use vartrace_artefact::{AnnotationStyle, Artefact, BlockNode, LineRange, SourcePath, TreeBuilder};
use vartrace_formula::Formula;

/// Column header of the trace format
pub const TRACE_HEADER: &str = "Path;Start;End;Condition;Style";

const SEPARATOR: char = ';';

/// The two coordinate flavors of persisted traces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceFlavor {
    /// Product-line coordinates; internal annotations occupy numbered lines
    ProductLine,

    /// Variant coordinates; tool-imposed conditions only
    Variant,
}

impl TraceFlavor {
    /// File extension selecting this flavor
    #[inline]
    #[must_use]
    pub fn extension(&self) -> &'static str {
        match self {
            Self::ProductLine => ".spl.csv",
            Self::Variant => ".variant.csv",
        }
    }

    /// Flavor selected by a file name, if any
    #[must_use]
    pub fn for_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?;
        if name.ends_with(Self::ProductLine.extension()) {
            Some(Self::ProductLine)
        } else if name.ends_with(Self::Variant.extension()) {
            Some(Self::Variant)
        } else {
            None
        }
    }

    fn permits(&self, style: AnnotationStyle) -> bool {
        match self {
            Self::ProductLine => true,
            Self::Variant => style == AnnotationStyle::External,
        }
    }
}

/// Parse a trace from its textual form
///
/// # Errors
/// Header mismatch, undecodable rows, styles invalid for the flavor, and
/// nesting violations all fail the load; ill-formed nesting is a
/// data-integrity error in the upstream extraction.
pub fn parse_trace(text: &str, flavor: TraceFlavor) -> Result<Artefact, TraceIoError> {
    let mut lines = text.lines().enumerate();
    let header = lines.next().map(|(_, l)| l.trim_end()).unwrap_or("");
    if header != TRACE_HEADER {
        return Err(TraceIoError::BadHeader {
            expected: TRACE_HEADER.to_string(),
            found: header.to_string(),
        });
    }

    let mut builder = TreeBuilder::new();
    let mut rows = 0usize;
    // Rows are numbered from 1, not counting the header.
    for (index, line) in lines {
        let row = index;
        let line = line.trim_end();
        if line.is_empty() {
            continue;
        }
        let (path, range, condition, style) = decode_row(row, line)?;
        if !flavor.permits(style) {
            return Err(TraceIoError::InternalStyleInVariant { row });
        }
        builder.add_block(path, condition, range, style)?;
        rows += 1;
    }
    debug!(rows, files = builder.file_count(), "parsed trace");
    builder.finish().map_err(Into::into)
}

fn decode_row(
    row: usize,
    line: &str,
) -> Result<(SourcePath, LineRange, Formula, AnnotationStyle), TraceIoError> {
    let bad = |reason: String| TraceIoError::BadRow { row, reason };

    let columns: Vec<&str> = line.split(SEPARATOR).collect();
    let [path, start, end, condition, style] = columns.as_slice() else {
        return Err(bad(format!(
            "expected 5 columns, found {}",
            columns.len()
        )));
    };

    let path = SourcePath::from_str(path).map_err(|e| bad(e.to_string()))?;
    let start: usize = start
        .trim()
        .parse()
        .map_err(|_| bad(format!("bad start line `{start}`")))?;
    let end: usize = end
        .trim()
        .parse()
        .map_err(|_| bad(format!("bad end line `{end}`")))?;
    let range = LineRange::new(start, end)?;
    let condition = Formula::parse(condition).map_err(|e| bad(e.to_string()))?;
    let style = AnnotationStyle::from_str(style.trim()).map_err(bad)?;
    Ok((path, range, condition, style))
}

/// Render a trace to its textual form
///
/// Rows come out in document order; rendering the same tree twice yields
/// identical text.
///
/// # Errors
/// Rejects styles the flavor does not permit.
pub fn render_trace(tree: &Artefact, flavor: TraceFlavor) -> Result<String, TraceIoError> {
    let mut out = String::new();
    out.push_str(TRACE_HEADER);
    out.push('\n');
    let mut row = 1usize;
    for file in tree.files() {
        for block in file.blocks() {
            render_block(&mut out, file.path(), block, flavor, &mut row)?;
        }
    }
    Ok(out)
}

fn render_block(
    out: &mut String,
    path: &SourcePath,
    block: &BlockNode,
    flavor: TraceFlavor,
    row: &mut usize,
) -> Result<(), TraceIoError> {
    if !flavor.permits(block.style()) {
        return Err(TraceIoError::InternalStyleInVariant { row: *row });
    }
    let _ = writeln!(
        out,
        "{path}{SEPARATOR}{}{SEPARATOR}{}{SEPARATOR}{}{SEPARATOR}{}",
        block.range().start(),
        block.range().end(),
        block.condition(),
        block.style()
    );
    *row += 1;
    for child in block.children() {
        render_block(out, path, child, flavor, row)?;
    }
    Ok(())
}

/// Read a trace file, selecting the flavor from the extension
///
/// # Errors
/// IO failures are tagged with the path; see [`parse_trace`] for the rest.
pub fn read_trace(path: &Path) -> Result<Artefact, TraceIoError> {
    let flavor = TraceFlavor::for_path(path).ok_or_else(|| TraceIoError::UnknownExtension {
        path: path.to_path_buf(),
    })?;
    let text = std::fs::read_to_string(path).map_err(|source| TraceIoError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_trace(&text, flavor)
}

/// Write a trace file, selecting the flavor from the extension
///
/// Parent directories are created as needed.
///
/// # Errors
/// IO failures are tagged with the path; see [`render_trace`] for the rest.
pub fn write_trace(tree: &Artefact, path: &Path) -> Result<(), TraceIoError> {
    let flavor = TraceFlavor::for_path(path).ok_or_else(|| TraceIoError::UnknownExtension {
        path: path.to_path_buf(),
    })?;
    let text = render_trace(tree, flavor)?;
    let tag_io = |source: std::io::Error| TraceIoError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(tag_io)?;
    }
    std::fs::write(path, text).map_err(tag_io)
}
