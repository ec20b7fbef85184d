//! Path normalization and pattern matching.
//!
//! # Responsibilities
//! - Normalize a raw request target before matching
//! - Compile one allowlist skeleton (e.g. `account/{id}/user`) into an anchored regex
//! - Evaluate a whole-string match against a normalized path
//!
//! # Design Decisions
//! - Query string is never part of the match
//! - Matching is case-insensitive (paths are lower-cased, skeletons too)
//! - Exactly one leading and one trailing `/` are trimmed, not runs of them
//! - Patterns are anchored at both ends, substring matches never admit

use regex::Regex;
use thiserror::Error;

/// Placeholder substituted by the identifier wildcard in allowlist skeletons.
pub const ID_PLACEHOLDER: &str = "{id}";

/// Identifier wildcard: letters, then digits, then more alphanumerics.
pub const ID_FORMAT: &str = "[a-z]+[0-9]+[a-z0-9]+";

/// Error compiling an allowlist skeleton.
#[derive(Debug, Error)]
pub enum PatternError {
    #[error("pattern `{0}` contains more than one {{id}} placeholder")]
    MultiplePlaceholders(String),

    #[error("pattern `{pattern}` failed to compile: {source}")]
    Regex {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Normalize a raw request target (path plus optional query) for matching.
pub fn normalize(raw: &str) -> String {
    let path = match raw.split_once('?') {
        Some((path, _)) => path,
        None => raw,
    };
    let lowered = path.to_lowercase();
    let trimmed = lowered.strip_prefix('/').unwrap_or(&lowered);
    let trimmed = trimmed.strip_suffix('/').unwrap_or(trimmed);
    trimmed.to_string()
}

/// Trait for matching normalized paths.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns true if the whole normalized path matches.
    fn matches(&self, normalized: &str) -> bool;
}

/// One compiled allowlist entry.
#[derive(Debug, Clone)]
pub struct PathPattern {
    source: String,
    regex: Regex,
}

impl PathPattern {
    /// Compile a skeleton such as `/account/{id}/user`.
    ///
    /// The skeleton is normalized the same way request paths are, so
    /// `/company/` and `company` compile to the same pattern.
    pub fn compile(skeleton: &str) -> Result<Self, PatternError> {
        let normalized = normalize(skeleton);
        let mut pieces = normalized.split(ID_PLACEHOLDER);

        let mut body = regex::escape(pieces.next().unwrap_or_default());
        if let Some(rest) = pieces.next() {
            if pieces.next().is_some() {
                return Err(PatternError::MultiplePlaceholders(skeleton.to_string()));
            }
            body.push_str("(?:");
            body.push_str(ID_FORMAT);
            body.push(')');
            body.push_str(&regex::escape(rest));
        }

        let regex = Regex::new(&format!("^{}$", body)).map_err(|source| PatternError::Regex {
            pattern: skeleton.to_string(),
            source,
        })?;

        Ok(Self {
            source: skeleton.to_string(),
            regex,
        })
    }

    /// The skeleton this pattern was compiled from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Whether the pattern contains the identifier wildcard.
    pub fn has_wildcard(&self) -> bool {
        self.source.to_lowercase().contains(ID_PLACEHOLDER)
    }
}

impl Matcher for PathPattern {
    fn matches(&self, normalized: &str) -> bool {
        self.regex.is_match(normalized)
    }
}
