//! Method selection by output path.

use regex::Regex;

use crate::error::ConfigError;

/// Pattern that selects every method.
pub const MATCH_ALL: &str = "^.*$";

/// Regex-backed selection predicate over method directories such as
/// `storage/v1/b/{bucket}/GET`. Matching is a search, not a full match.
#[derive(Debug, Clone)]
pub struct PathFilter {
    pattern: Regex,
}

impl PathFilter {
    /// Compile a selection pattern.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidPattern` if the pattern isn't a valid regex.
    pub fn new(pattern: &str) -> Result<Self, ConfigError> {
        let pattern = Regex::new(pattern).map_err(|source| ConfigError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Self { pattern })
    }

    pub fn matches(&self, dir: &str) -> bool {
        self.pattern.is_match(dir)
    }

    pub fn as_str(&self) -> &str {
        self.pattern.as_str()
    }
}

impl Default for PathFilter {
    fn default() -> Self {
        Self {
            pattern: Regex::new(MATCH_ALL).expect("match-all pattern is valid"),
        }
    }
}
