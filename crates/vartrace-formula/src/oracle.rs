//! Satisfiability oracle seam
//!
//! The core never solves SAT itself; it consumes an external capability
//! through [`SatOracle`]. Tests use the brute-force enumeration oracle from
//! `vartrace-test-utils`.

use crate::formula::Formula;

/// External boolean-satisfiability capability
///
/// This is the only correctness-bearing comparison between presence
/// conditions: structurally distinct formulas may be semantically equivalent,
/// so verification code must ask the oracle, never `==`.
pub trait SatOracle {
    /// Whether some assignment satisfies the formula
    fn is_satisfiable(&self, formula: &Formula) -> bool;

    /// Whether the two formulas agree under every assignment
    ///
    /// Equivalent iff their exclusive-or is unsatisfiable.
    fn equivalent(&self, a: &Formula, b: &Formula) -> bool {
        !self.is_satisfiable(&Formula::xor(a.clone(), b.clone()))
    }

    /// Whether the formula holds under every assignment
    fn tautology(&self, formula: &Formula) -> bool {
        !self.is_satisfiable(&Formula::not(formula.clone()))
    }
}
