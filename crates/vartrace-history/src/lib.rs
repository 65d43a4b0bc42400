//! Evolution-history sequencing for vartrace
//!
//! Extraction visits a product line's commits in no particular order and some
//! of them fail. This crate rebuilds the longest possible ordered commit
//! chains from the unordered set of recorded parent/child steps, so that
//! variant generation can walk the history stepwise.
//!
//! # Core Concepts
//!
//! - [`EvolutionStep`]: one recorded parent→child transition
//! - [`StepSet`]: the input edge set with per-commit extraction statuses
//! - [`SequencingStrategy`]: pluggable chain reconstruction;
//!   [`LongestChains`] is the default
//! - [`VariabilityHistory`]: the resulting disjoint ordered chains
//!
//! An empty step set yields an empty history, never an error: a sequencing
//! gap is a result shape, and callers fall back to the unordered per-commit
//! view.

#![warn(unreachable_pub)]

mod commit;
mod sequence;

pub use commit::{CommitId, EvolutionStep, ExtractionStatus, StepSet};
pub use sequence::{sequence, CommitChain, LongestChains, SequencingStrategy, VariabilityHistory};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
