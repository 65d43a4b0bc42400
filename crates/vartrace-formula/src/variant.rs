//! Variants: named configurations of the product line

use crate::assignment::Configuration;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// One concrete product of the line: a name plus the configuration it was
/// sampled from
///
/// # Invariants
/// - Immutable once constructed
/// - Owns no source content; generation binds it to a tree and a filesystem
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    name: String,
    configuration: Configuration,
}

impl Variant {
    /// Create a variant
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>, configuration: Configuration) -> Self {
        Self {
            name: name.into(),
            configuration,
        }
    }

    /// The variant's name, used as its output directory name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The sampled configuration
    #[inline]
    #[must_use]
    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }
}

impl Display for Variant {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
