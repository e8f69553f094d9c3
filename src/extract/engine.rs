//! Extraction engine applied to every fetched page

use crate::config::Config;
use crate::extract::pattern::{ExtractMode, PatternMatcher};
use crate::HarvestError;

/// Matches found in one document, in match order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionResult {
    pub matches: Vec<String>,
}

impl ExtractionResult {
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.matches.iter().map(String::as_str)
    }
}

/// Scans page content for one configured pattern
///
/// Matches are reported as found: no validation, normalization or
/// de-duplication. A match longer than `max_match_length` bytes is truncated,
/// never dropped.
#[derive(Debug, Clone)]
pub struct ExtractionEngine {
    matcher: PatternMatcher,
    max_match_length: usize,
}

impl ExtractionEngine {
    /// Builds an engine from a pattern
    ///
    /// # Returns
    ///
    /// * `Ok(ExtractionEngine)` - Ready to scan content
    /// * `Err(HarvestError::PatternCompile)` - The pattern is malformed
    pub fn new(pattern: &str, max_match_length: usize) -> Result<Self, HarvestError> {
        Ok(Self {
            matcher: PatternMatcher::new(pattern)?,
            max_match_length,
        })
    }

    /// Builds the engine for a run mode, honoring pattern overrides
    pub fn for_mode(mode: ExtractMode, config: &Config) -> Result<Self, HarvestError> {
        Self::new(
            mode.pattern(&config.patterns),
            config.harvest.max_match_length,
        )
    }

    /// Returns the source text of the active pattern
    pub fn pattern(&self) -> &str {
        self.matcher.as_str()
    }

    /// Returns the truncation ceiling in bytes
    pub fn max_match_length(&self) -> usize {
        self.max_match_length
    }

    /// Extracts every match from `content`, left to right
    ///
    /// # Example
    ///
    /// ```
    /// use sitemap_harvester::extract::{ExtractionEngine, EMAIL_PATTERN};
    ///
    /// let engine = ExtractionEngine::new(EMAIL_PATTERN, 255).unwrap();
    /// let result = engine.extract(b"contact me at a@b.com or c@d.org");
    /// assert_eq!(result.matches, vec!["a@b.com", "c@d.org"]);
    /// ```
    pub fn extract(&self, content: &[u8]) -> ExtractionResult {
        let matches = self
            .matcher
            .find_all(content)
            .into_iter()
            .map(|range| {
                let text = String::from_utf8_lossy(&content[range]).into_owned();
                truncate_match(text, self.max_match_length)
            })
            .collect();

        ExtractionResult { matches }
    }
}

/// Truncates a match to at most `max_len` bytes on a character boundary
pub fn truncate_match(mut text: String, max_len: usize) -> String {
    if text.len() > max_len {
        let mut end = max_len;
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        text.truncate(end);
    }
    text
}
