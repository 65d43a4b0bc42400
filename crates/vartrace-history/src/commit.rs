//! Commits, extraction statuses, and recorded evolution steps

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};

/// Identity of a commit, as supplied by the version-control collaborator
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CommitId(String);

impl CommitId {
    /// Wrap a commit identity
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identity as text
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for CommitId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CommitId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for CommitId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// How extraction fared for one commit
///
/// Only Success and PartialSuccess commits take part in variant generation;
/// Error commits are hard breaks in any reconstructed history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionStatus {
    /// Extraction produced a complete trace
    #[default]
    Success,

    /// Extraction produced a usable but incomplete trace
    PartialSuccess,

    /// Extraction failed; the commit is excluded from generation
    Error,
}

impl ExtractionStatus {
    /// Whether the commit may take part in variant generation
    #[inline]
    #[must_use]
    pub fn is_eligible(&self) -> bool {
        !matches!(self, Self::Error)
    }
}

/// One recorded parent→child transition
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EvolutionStep {
    parent: CommitId,
    child: CommitId,
}

impl EvolutionStep {
    /// Record a transition
    #[inline]
    #[must_use]
    pub fn new(parent: impl Into<CommitId>, child: impl Into<CommitId>) -> Self {
        Self {
            parent: parent.into(),
            child: child.into(),
        }
    }

    /// The earlier commit
    #[inline]
    #[must_use]
    pub fn parent(&self) -> &CommitId {
        &self.parent
    }

    /// The later commit
    #[inline]
    #[must_use]
    pub fn child(&self) -> &CommitId {
        &self.child
    }
}

impl Display for EvolutionStep {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.parent, self.child)
    }
}

/// The full input to history reconstruction: steps plus per-commit statuses
///
/// Commits without a recorded status count as Success; statuses are kept in a
/// sorted map so iteration is deterministic.
#[derive(Debug, Clone, Default)]
pub struct StepSet {
    steps: Vec<EvolutionStep>,
    statuses: BTreeMap<CommitId, ExtractionStatus>,
}

impl StepSet {
    /// Create an empty step set
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one parent→child step
    pub fn add_step(&mut self, parent: impl Into<CommitId>, child: impl Into<CommitId>) {
        self.steps.push(EvolutionStep::new(parent, child));
    }

    /// Record a commit's extraction status
    pub fn set_status(&mut self, commit: impl Into<CommitId>, status: ExtractionStatus) {
        self.statuses.insert(commit.into(), status);
    }

    /// Status of a commit (Success when unrecorded)
    #[must_use]
    pub fn status_of(&self, commit: &CommitId) -> ExtractionStatus {
        self.statuses.get(commit).copied().unwrap_or_default()
    }

    /// Recorded steps in insertion order
    #[inline]
    #[must_use]
    pub fn steps(&self) -> &[EvolutionStep] {
        &self.steps
    }

    /// Whether no step was recorded
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Whether the set records this exact transition
    #[must_use]
    pub fn contains_step(&self, parent: &CommitId, child: &CommitId) -> bool {
        self.steps
            .iter()
            .any(|s| s.parent() == parent && s.child() == child)
    }
}

impl FromIterator<EvolutionStep> for StepSet {
    fn from_iter<I: IntoIterator<Item = EvolutionStep>>(iter: I) -> Self {
        Self {
            steps: iter.into_iter().collect(),
            statuses: BTreeMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_defaults_to_success() {
        let steps = StepSet::new();
        assert_eq!(
            steps.status_of(&CommitId::from("abc")),
            ExtractionStatus::Success
        );
    }

    #[test]
    fn error_status_is_ineligible() {
        assert!(ExtractionStatus::Success.is_eligible());
        assert!(ExtractionStatus::PartialSuccess.is_eligible());
        assert!(!ExtractionStatus::Error.is_eligible());
    }

    #[test]
    fn step_display_matches_pair_notation() {
        let step = EvolutionStep::new("1", "2");
        assert_eq!(step.to_string(), "(1, 2)");
    }

    #[test]
    fn contains_step_is_directional() {
        let mut steps = StepSet::new();
        steps.add_step("1", "2");
        assert!(steps.contains_step(&"1".into(), &"2".into()));
        assert!(!steps.contains_step(&"2".into(), &"1".into()));
    }
}
