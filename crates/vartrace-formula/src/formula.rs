//! Boolean formulas over named features
//!
//! Provides [`Formula`], the immutable presence-condition type.

use crate::assignment::Assignment;
use crate::error::FormulaError;
use std::collections::BTreeSet;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Immutable boolean formula over named features
///
/// Connectives are n-ary: `And([])` is true, `Or([])` is false, matching the
/// neutral elements of the operators.
///
/// # Invariants
/// - Immutable after construction; all combinators return new values
/// - Equality is structural. Semantic equivalence must go through a
///   [`SatOracle`](crate::SatOracle)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Formula {
    /// Constant true
    True,

    /// Constant false
    False,

    /// A named feature literal
    Feature(String),

    /// Negation
    Not(Box<Formula>),

    /// N-ary conjunction
    And(Vec<Formula>),

    /// N-ary disjunction
    Or(Vec<Formula>),
}

impl Formula {
    /// Create a feature literal
    #[inline]
    #[must_use]
    pub fn feature(name: impl Into<String>) -> Self {
        Self::Feature(name.into())
    }

    /// Negate a formula, folding constants and double negation
    #[must_use]
    pub fn not(operand: Formula) -> Self {
        match operand {
            Self::True => Self::False,
            Self::False => Self::True,
            Self::Not(inner) => *inner,
            other => Self::Not(Box::new(other)),
        }
    }

    /// Conjoin formulas, flattening nested conjunctions and folding constants
    ///
    /// `False` absorbs the whole conjunction; `True` operands are dropped.
    /// An empty conjunction collapses to `True`, a singleton to its operand.
    #[must_use]
    pub fn and(operands: impl IntoIterator<Item = Formula>) -> Self {
        let mut flat = Vec::new();
        for operand in operands {
            match operand {
                Self::True => {}
                Self::False => return Self::False,
                Self::And(inner) => flat.extend(inner),
                other => flat.push(other),
            }
        }
        match flat.len() {
            0 => Self::True,
            1 => flat.pop().unwrap_or(Self::True),
            _ => Self::And(flat),
        }
    }

    /// Disjoin formulas, flattening nested disjunctions and folding constants
    ///
    /// `True` absorbs the whole disjunction; `False` operands are dropped.
    /// An empty disjunction collapses to `False`, a singleton to its operand.
    #[must_use]
    pub fn or(operands: impl IntoIterator<Item = Formula>) -> Self {
        let mut flat = Vec::new();
        for operand in operands {
            match operand {
                Self::False => {}
                Self::True => return Self::True,
                Self::Or(inner) => flat.extend(inner),
                other => flat.push(other),
            }
        }
        match flat.len() {
            0 => Self::False,
            1 => flat.pop().unwrap_or(Self::False),
            _ => Self::Or(flat),
        }
    }

    /// Exclusive or, expressed through the core connectives
    ///
    /// Used by oracle-based equivalence: `a` and `b` are equivalent iff
    /// `a xor b` is unsatisfiable.
    #[must_use]
    pub fn xor(a: Formula, b: Formula) -> Self {
        Self::or([
            Self::and([a.clone(), Self::not(b.clone())]),
            Self::and([Self::not(a), b]),
        ])
    }

    /// Parse a condition from its textual form
    ///
    /// # Errors
    /// Returns [`FormulaError`] on empty, malformed, or trailing input.
    #[inline]
    pub fn parse(text: &str) -> Result<Self, FormulaError> {
        crate::parse::parse(text)
    }

    /// Evaluate under an assignment
    ///
    /// Total function: unassigned features evaluate to whatever the
    /// assignment answers (false for [`Configuration`](crate::Configuration)).
    #[must_use]
    pub fn evaluate(&self, assignment: &impl Assignment) -> bool {
        match self {
            Self::True => true,
            Self::False => false,
            Self::Feature(name) => assignment.value_of(name),
            Self::Not(operand) => !operand.evaluate(assignment),
            Self::And(operands) => operands.iter().all(|f| f.evaluate(assignment)),
            Self::Or(operands) => operands.iter().any(|f| f.evaluate(assignment)),
        }
    }

    /// Collect the referenced feature names, sorted and deduplicated
    #[must_use]
    pub fn features(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        self.collect_features(&mut out);
        out
    }

    fn collect_features(&self, out: &mut BTreeSet<String>) {
        match self {
            Self::True | Self::False => {}
            Self::Feature(name) => {
                out.insert(name.clone());
            }
            Self::Not(operand) => operand.collect_features(out),
            Self::And(operands) | Self::Or(operands) => {
                for operand in operands {
                    operand.collect_features(out);
                }
            }
        }
    }

    /// Constant-folding simplification
    ///
    /// Rebuilds the formula through the smart constructors, absorbing
    /// constants, flattening nested connectives, and eliminating double
    /// negation. Purely structural: never consults an oracle, so
    /// semantically-but-not-structurally redundant subterms survive.
    #[must_use]
    pub fn simplify(&self) -> Formula {
        match self {
            Self::Not(operand) => Self::not(operand.simplify()),
            Self::And(operands) => Self::and(operands.iter().map(Formula::simplify)),
            Self::Or(operands) => Self::or(operands.iter().map(Formula::simplify)),
            other => other.clone(),
        }
    }

    /// True iff this is the constant `True`
    #[inline]
    #[must_use]
    pub fn is_true(&self) -> bool {
        matches!(self, Self::True)
    }

    /// True iff this is the constant `False`
    #[inline]
    #[must_use]
    pub fn is_false(&self) -> bool {
        matches!(self, Self::False)
    }

    /// Binding strength for minimal-parenthesis rendering
    fn precedence(&self) -> u8 {
        match self {
            Self::Or(operands) if operands.len() > 1 => 1,
            Self::And(operands) if operands.len() > 1 => 2,
            Self::Not(_) => 3,
            _ => 4,
        }
    }

    fn fmt_operand(&self, parent_precedence: u8, f: &mut Formatter<'_>) -> fmt::Result {
        if self.precedence() < parent_precedence {
            write!(f, "({})", self)
        } else {
            write!(f, "{}", self)
        }
    }
}

impl Display for Formula {
    /// Deterministic rendering with minimal parentheses
    ///
    /// Empty and singleton connectives render as their collapsed form, so a
    /// re-parse of the rendering is already normalized.
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::True => write!(f, "true"),
            Self::False => write!(f, "false"),
            Self::Feature(name) => write!(f, "{name}"),
            Self::Not(operand) => {
                write!(f, "!")?;
                operand.fmt_operand(4, f)
            }
            Self::And(operands) => match operands.as_slice() {
                [] => write!(f, "true"),
                [single] => write!(f, "{single}"),
                many => {
                    for (i, operand) in many.iter().enumerate() {
                        if i > 0 {
                            write!(f, " & ")?;
                        }
                        operand.fmt_operand(2, f)?;
                    }
                    Ok(())
                }
            },
            Self::Or(operands) => match operands.as_slice() {
                [] => write!(f, "false"),
                [single] => write!(f, "{single}"),
                many => {
                    for (i, operand) in many.iter().enumerate() {
                        if i > 0 {
                            write!(f, " | ")?;
                        }
                        operand.fmt_operand(1, f)?;
                    }
                    Ok(())
                }
            },
        }
    }
}

impl FromStr for Formula {
    type Err = FormulaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
