//! Ordered set of compiled path patterns.

use crate::routing::matcher::{normalize, Matcher, PathPattern, PatternError};

/// Compiled allowlist. Immutable after construction.
#[derive(Debug, Clone, Default)]
pub struct Allowlist {
    patterns: Vec<PathPattern>,
}

impl Allowlist {
    /// Compile every skeleton, preserving order.
    pub fn compile<I, S>(skeletons: I) -> Result<Self, PatternError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = skeletons
            .into_iter()
            .map(|s| PathPattern::compile(s.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    /// Admission decision for a raw request target (path plus optional query).
    pub fn admits(&self, raw_target: &str) -> bool {
        self.matching_pattern(raw_target).is_some()
    }

    /// First pattern matching the normalized target, if any.
    pub fn matching_pattern(&self, raw_target: &str) -> Option<&PathPattern> {
        let normalized = normalize(raw_target);
        self.patterns.iter().find(|p| p.matches(&normalized))
    }

    pub fn iter(&self) -> impl Iterator<Item = &PathPattern> {
        self.patterns.iter()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}
