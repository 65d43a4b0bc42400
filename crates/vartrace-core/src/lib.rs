//! Batch orchestration for vartrace
//!
//! Drives the pipeline end to end: reconstructed history → per-commit
//! checkout → annotation-tree load → per-variant generation → ground-truth
//! serialization, continuing past recoverable failures and reporting a
//! summary.
//!
//! # Core Concepts
//!
//! - [`WorkingCopy`] / [`Sampler`] / [`TraceSource`]: seams to the external
//!   collaborators (version control, configuration sampling, persisted
//!   traces)
//! - [`TraceStore`]: lazy, cached, forgettable per-commit annotation trees
//! - [`EvolutionRunner`]: the batch driver
//! - [`BatchReport`]: what was generated, what was skipped, what failed
//!
//! Generation calls for distinct variants of one commit run in parallel; the
//! runner strictly sequences checkout and generation for each commit.

#![warn(unreachable_pub)]

mod error;
mod report;
mod runner;
mod seams;
mod store;

pub use error::CoreError;
pub use report::{BatchReport, FailureRecord, GenerationRecord};
pub use runner::{
    EvolutionRunner, RunLayout, SnapshotWorkingCopy, CONFIGURATION_FILE, GROUND_TRUTH_FILE,
};
pub use seams::{Sampler, TraceDirectory, TraceSource, WorkingCopy};
pub use store::TraceStore;

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for driving the pipeline
    pub use crate::{
        BatchReport, CoreError, EvolutionRunner, RunLayout, Sampler, TraceDirectory, TraceSource,
        TraceStore, WorkingCopy,
    };
    pub use vartrace_formula::{Configuration, Variant};
    pub use vartrace_generate::GenerationOptions;
    pub use vartrace_history::{sequence, StepSet, VariabilityHistory};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
