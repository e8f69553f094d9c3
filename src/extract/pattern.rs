//! Pattern matching primitive and built-in patterns
//!
//! Patterns are compiled with Unicode disabled so character classes behave
//! like POSIX extended regex classes in the C locale: they match bytes, `\s`
//! is ASCII whitespace and `[^<]` matches any byte other than `<`.

use crate::config::PatternConfig;
use crate::HarvestError;
use regex::bytes::{Regex, RegexBuilder};
use std::fmt;
use std::ops::Range;

/// Email address pattern
pub const EMAIL_PATTERN: &str = r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}";

/// North American phone number pattern; separators may be `-`, `.` or whitespace
pub const PHONE_PATTERN: &str = r"\(?[0-9]{3}\)?[-.\s]?[0-9]{3}[-.\s]?[0-9]{4}";

/// Sitemap location pattern; group 1 captures the location value
pub const LOC_PATTERN: &str = r"<loc>([^<]+)</loc>";

/// A compiled pattern producing leftmost-first, non-overlapping matches
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    regex: Regex,
}

impl PatternMatcher {
    /// Compiles a pattern
    ///
    /// # Returns
    ///
    /// * `Ok(PatternMatcher)` - The compiled pattern
    /// * `Err(HarvestError::PatternCompile)` - The pattern is malformed
    pub fn new(pattern: &str) -> Result<Self, HarvestError> {
        let regex = RegexBuilder::new(pattern)
            .unicode(false)
            .build()
            .map_err(|source| HarvestError::PatternCompile {
                pattern: pattern.to_string(),
                source,
            })?;

        Ok(Self { regex })
    }

    /// Returns the source text of the pattern
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Returns the byte ranges of every match, left to right
    pub fn find_all(&self, content: &[u8]) -> Vec<Range<usize>> {
        self.regex.find_iter(content).map(|m| m.range()).collect()
    }

    /// Returns the byte ranges of capture group `group` for every match
    ///
    /// Matches in which the group did not participate are skipped.
    pub fn captures_all(&self, content: &[u8], group: usize) -> Vec<Range<usize>> {
        self.regex
            .captures_iter(content)
            .filter_map(|caps| caps.get(group).map(|m| m.range()))
            .collect()
    }
}

/// Which kind of data a run extracts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtractMode {
    Email,
    Phone,
}

impl ExtractMode {
    /// Parses the command-line mode flag (`-email` or `-phone`)
    pub fn from_flag(flag: &str) -> Result<Self, HarvestError> {
        match flag {
            "-email" => Ok(Self::Email),
            "-phone" => Ok(Self::Phone),
            other => Err(HarvestError::InvalidMode(other.to_string())),
        }
    }

    /// Returns the built-in pattern for this mode
    pub fn default_pattern(&self) -> &'static str {
        match self {
            Self::Email => EMAIL_PATTERN,
            Self::Phone => PHONE_PATTERN,
        }
    }

    /// Returns the configured pattern, falling back to the built-in one
    pub fn pattern<'a>(&self, overrides: &'a PatternConfig) -> &'a str {
        let configured = match self {
            Self::Email => overrides.email.as_deref(),
            Self::Phone => overrides.phone.as_deref(),
        };
        configured.unwrap_or_else(|| self.default_pattern())
    }

    /// Returns the name of the results file for this mode
    pub fn results_file_name(&self) -> &'static str {
        match self {
            Self::Email => "emails.txt",
            Self::Phone => "phones.txt",
        }
    }
}

impl fmt::Display for ExtractMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Email => write!(f, "email"),
            Self::Phone => write!(f, "phone"),
        }
    }
}
