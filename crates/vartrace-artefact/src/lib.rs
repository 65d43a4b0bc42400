//! Annotation trees for vartrace
//!
//! An annotation tree describes where a product line's source is gated by
//! presence conditions: directories group files, files hold nested line
//! blocks, and every block carries a condition over features.
//!
//! # Core Concepts
//!
//! - [`Artefact`]: tagged union of directory, file, and block nodes
//! - [`SourcePath`]: relative, case-sensitive path of a file in the line
//! - [`LineRange`]: 1-based inclusive line span
//! - [`AnnotationStyle`]: whether a condition exists as literal directives in
//!   the text (`Internal`) or was imposed by the extractor (`External`)
//! - [`TreeBuilder`]: bottom-up construction from per-row block records
//!
//! Trees are immutable once built; the builder is the only mutation path and
//! rejects ill-formed nesting (overlap, inverted ranges) at load time.

#![warn(unreachable_pub)]

mod builder;
mod error;
mod path;
mod printer;
mod range;
mod tree;

pub use builder::TreeBuilder;
pub use error::ArtefactError;
pub use path::{SourcePath, SourcePathParseError};
pub use range::LineRange;
pub use tree::{AnnotationStyle, Artefact, BlockNode, DirectoryNode, FileNode};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
