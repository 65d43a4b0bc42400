//! Presence conditions for vartrace
//!
//! A presence condition is an immutable boolean formula over named features
//! that gates the inclusion of a code block in a generated variant.
//!
//! # Core Concepts
//!
//! - [`Formula`]: boolean expression (features, and/or/not, constants)
//! - [`Assignment`]: source of truth values for features during evaluation
//! - [`Configuration`]: set-based assignment (unassigned features are false)
//! - [`SatOracle`]: seam to an external satisfiability capability; the only
//!   correctness-bearing equality between two conditions
//!
//! # Example
//!
//! ```rust,ignore
//! use vartrace_formula::{Configuration, Formula};
//!
//! let condition = Formula::parse("A & (B | C)")?;
//! let config = Configuration::from_features(["A", "C"]);
//! assert!(condition.evaluate(&config));
//! ```
//!
//! Structurally distinct formulas may be semantically equivalent; where
//! behavioral identity matters, compare through a [`SatOracle`], never with
//! `==`.

#![warn(unreachable_pub)]

mod assignment;
mod error;
mod formula;
mod oracle;
mod parse;
mod variant;

pub use assignment::{Assignment, Configuration, EnableAll};
pub use error::FormulaError;
pub use formula::Formula;
pub use oracle::SatOracle;
pub use variant::Variant;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
