//! URL handling module for Sitemap Harvester
//!
//! This module classifies `<loc>` values found in sitemap documents and
//! validates the root URL a run starts from.

use crate::HarvestError;

/// Default suffix that marks a location as a nested sitemap document
pub const DEFAULT_SITEMAP_SUFFIX: &str = ".xml";

/// A location found in a sitemap document
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SitemapNode {
    /// Another sitemap document that must be resolved recursively
    IndexSitemap(String),
    /// A page to fetch and scan
    LeafUrl(String),
}

impl SitemapNode {
    /// Classifies a raw `<loc>` value
    ///
    /// The value is trimmed first. Classification is a plain suffix test on the
    /// trimmed text; the document content is never inspected. Empty values
    /// produce `None`.
    ///
    /// # Examples
    ///
    /// ```
    /// use sitemap_harvester::url::SitemapNode;
    ///
    /// let node = SitemapNode::classify("  https://ex.com/sub.xml\n", ".xml");
    /// assert_eq!(
    ///     node,
    ///     Some(SitemapNode::IndexSitemap("https://ex.com/sub.xml".to_string()))
    /// );
    /// assert_eq!(SitemapNode::classify(" \t ", ".xml"), None);
    /// ```
    pub fn classify(raw: &str, sitemap_suffix: &str) -> Option<Self> {
        let location = trim_location(raw);

        if location.is_empty() {
            None
        } else if location.ends_with(sitemap_suffix) {
            Some(Self::IndexSitemap(location.to_string()))
        } else {
            Some(Self::LeafUrl(location.to_string()))
        }
    }

    /// Returns true if this node references another sitemap document
    pub fn is_index(&self) -> bool {
        matches!(self, Self::IndexSitemap(_))
    }
}

/// Trims the whitespace characters that may surround a `<loc>` value
///
/// Only space, tab, carriage return and line feed are stripped.
pub fn trim_location(raw: &str) -> &str {
    raw.trim_matches(|c| matches!(c, ' ' | '\t' | '\n' | '\r'))
}

/// Validates the sitemap root URL given on the command line
///
/// The root must parse as an absolute URL with an `http` or `https` scheme.
pub fn validate_root_url(raw: &str) -> Result<::url::Url, HarvestError> {
    let url = ::url::Url::parse(trim_location(raw))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(HarvestError::InvalidArguments(format!(
            "sitemap URL must use http or https, got '{}'",
            other
        ))),
    }
}
