//! Variant generation for vartrace
//!
//! Takes an annotation tree, a materialized product-line checkout, and a
//! variant's configuration, and deterministically produces the variant's
//! files plus block-level provenance linking every generated line back to the
//! product line.
//!
//! # Core Concepts
//!
//! - [`generate_variant`]: the generation engine
//! - [`GenerationOptions`]: error policy, file filter, optional condition
//!   folding
//! - [`GroundTruth`]: the variant's own annotation tree plus per-file
//!   provenance runs
//!
//! # Example
//!
//! ```rust,ignore
//! use vartrace_generate::{generate_variant, GenerationOptions};
//! use vartrace_formula::{Configuration, Variant};
//!
//! let variant = Variant::new("justA", Configuration::from_features(["A"]));
//! let options = GenerationOptions::tolerate_missing_files();
//! let truth = generate_variant(&tree, spl_root, out_root, &variant, &options)?;
//! ```
//!
//! Generation is deterministic: for a fixed tree, configuration, and
//! filesystem snapshot, output bytes and ground truth are reproducible.

#![warn(unreachable_pub)]

mod engine;
mod error;
mod ground_truth;
mod options;

pub use engine::generate_variant;
pub use error::GenerateError;
pub use ground_truth::{AnnotationGroundTruth, GroundTruth, ProvenanceRun};
pub use options::{ArtefactFilter, ErrorPolicy, GenerationOptions, KeepAll};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
