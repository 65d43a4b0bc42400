//! Case-sensitive relative paths of product-line files
//!
//! Provides [`SourcePath`] for addressing files inside an annotation tree.
//! Comparison is always byte-wise on the segments: `xt_RATEEST.c` and
//! `xt_rateest.c` are distinct files even on case-folding filesystems.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::path::PathBuf;
use std::str::FromStr;

/// Relative, `/`-separated, case-sensitive file path
///
/// # Examples
/// - `["src", "FooFoo.cpp"]` → `src/FooFoo.cpp`
/// - `["net", "netfilter", "xt_RATEEST.c"]` → `net/netfilter/xt_RATEEST.c`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct SourcePath(Vec<String>);

impl SourcePath {
    /// Create a path from segments
    #[inline]
    #[must_use]
    pub fn new(segments: Vec<String>) -> Self {
        Self(segments)
    }

    /// Create a path from string-like segments
    #[must_use]
    pub fn of<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    /// Path segments in order
    #[inline]
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Number of segments
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the path has no segments
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Final segment (the file name), if any
    #[inline]
    #[must_use]
    pub fn file_name(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    /// Append a segment, returning a new path
    #[inline]
    #[must_use]
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut new = self.clone();
        new.0.push(segment.into());
        new
    }

    /// Materialize below a filesystem root
    #[must_use]
    pub fn below(&self, root: &std::path::Path) -> PathBuf {
        let mut out = root.to_path_buf();
        for segment in &self.0 {
            out.push(segment);
        }
        out
    }
}

impl Display for SourcePath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("/"))
    }
}

impl FromStr for SourcePath {
    type Err = SourcePathParseError;

    /// Parse a `/`-separated relative path
    ///
    /// Rejects empty input, absolute paths, and empty segments.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(SourcePathParseError::Empty);
        }
        if s.starts_with('/') {
            return Err(SourcePathParseError::Absolute(s.to_string()));
        }
        let segments: Vec<String> = s.split('/').map(str::to_string).collect();
        if segments.iter().any(String::is_empty) {
            return Err(SourcePathParseError::EmptySegment(s.to_string()));
        }
        Ok(Self(segments))
    }
}

impl From<SourcePath> for String {
    fn from(path: SourcePath) -> Self {
        path.to_string()
    }
}

impl TryFrom<String> for SourcePath {
    type Error = SourcePathParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Errors from parsing a [`SourcePath`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourcePathParseError {
    /// Input was empty
    #[error("empty source path")]
    Empty,

    /// Paths inside a product line are always relative
    #[error("source path `{0}` must be relative")]
    Absolute(String),

    /// Doubled or trailing separators
    #[error("source path `{0}` contains an empty segment")]
    EmptySegment(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_display_round_trip() {
        let path: SourcePath = "src/foo/bar.cpp".parse().unwrap();
        assert_eq!(path.segments().len(), 3);
        assert_eq!(path.to_string(), "src/foo/bar.cpp");
        assert_eq!(path.file_name(), Some("bar.cpp"));
    }

    #[test]
    fn comparison_is_case_sensitive() {
        let shared = SourcePath::of(["net", "netfilter"]);
        let upper = shared.child("xt_RATEEST.c");
        let lower = shared.child("xt_rateest.c");
        assert_ne!(upper, lower);
    }

    #[test]
    fn rejects_malformed_input() {
        assert!("".parse::<SourcePath>().is_err());
        assert!("/abs/path.c".parse::<SourcePath>().is_err());
        assert!("a//b.c".parse::<SourcePath>().is_err());
    }

    #[test]
    fn below_joins_segments() {
        let path = SourcePath::of(["src", "FooFoo.cpp"]);
        let joined = path.below(std::path::Path::new("/tmp/spl"));
        assert_eq!(joined, PathBuf::from("/tmp/spl/src/FooFoo.cpp"));
    }
}
