//! Feature assignments for condition evaluation
//!
//! Provides the [`Assignment`] seam plus the two implementations the
//! pipeline needs: sampled [`Configuration`]s and the [`EnableAll`] probe.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Source of truth values for features during evaluation
///
/// Evaluation is total: an assignment must answer for every feature name it
/// is asked about.
pub trait Assignment {
    /// Truth value of the named feature
    fn value_of(&self, feature: &str) -> bool;
}

/// Set-based feature assignment
///
/// Holds the selected features of one sampled configuration. Features not in
/// the set are unselected (open-world literals default to false, per the
/// sampling source's convention).
///
/// # Invariants
/// - Immutable once constructed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Configuration {
    features: BTreeSet<String>,
}

impl Configuration {
    /// Create a configuration from its selected features
    #[must_use]
    pub fn from_features<I, S>(selected: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            features: selected.into_iter().map(Into::into).collect(),
        }
    }

    /// Empty configuration (no feature selected)
    #[inline]
    #[must_use]
    pub fn empty() -> Self {
        Self {
            features: BTreeSet::new(),
        }
    }

    /// Whether the named feature is selected
    #[inline]
    #[must_use]
    pub fn is_selected(&self, feature: &str) -> bool {
        self.features.contains(feature)
    }

    /// Selected features in sorted order
    pub fn features(&self) -> impl Iterator<Item = &str> {
        self.features.iter().map(String::as_str)
    }

    /// Number of selected features
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Whether no feature is selected
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

impl Assignment for Configuration {
    fn value_of(&self, feature: &str) -> bool {
        self.features.contains(feature)
    }
}

/// Assignment that answers true for every feature
///
/// Used to generate the maximal variant of a product line without sampling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnableAll;

impl Assignment for EnableAll {
    fn value_of(&self, _feature: &str) -> bool {
        true
    }
}
