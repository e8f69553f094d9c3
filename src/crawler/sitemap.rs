//! Sitemap resolution
//!
//! Walks a sitemap document tree and flattens it into the ordered list of
//! leaf page URLs. The walk is depth-first and follows document order: a
//! nested sitemap's leaves are appended before the parent's later entries.

use crate::crawler::fetcher::Fetcher;
use crate::extract::{PatternMatcher, LOC_PATTERN};
use crate::url::{trim_location, SitemapNode};
use crate::HarvestError;
use std::collections::HashSet;
use std::sync::Arc;

/// Leaf URLs in discovery order; duplicates are kept
pub type LeafUrlList = Vec<String>;

/// Counters collected while resolving a sitemap tree
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolveStats {
    /// Sitemap documents requested
    pub sitemaps_fetched: usize,

    /// Sitemap documents whose fetch failed (treated as empty)
    pub sitemaps_failed: usize,

    /// References back to an ancestor sitemap, skipped without refetching
    pub cycles_skipped: usize,

    /// Leaf URLs appended to the result
    pub leaves_found: usize,
}

/// One step of the depth-first walk
enum WalkStep {
    /// Visit a node found in a sitemap document
    Enter(SitemapNode),
    /// All children of this sitemap have been walked
    Leave(String),
}

/// Resolves a sitemap root into its leaf URLs
pub struct SitemapResolver {
    fetcher: Arc<dyn Fetcher>,
    loc_matcher: PatternMatcher,
    sitemap_suffix: String,
}

impl SitemapResolver {
    /// Creates a resolver using the built-in `<loc>` pattern
    pub fn new(fetcher: Arc<dyn Fetcher>, sitemap_suffix: &str) -> Result<Self, HarvestError> {
        Self::with_loc_pattern(fetcher, sitemap_suffix, LOC_PATTERN)
    }

    /// Creates a resolver with a custom location pattern
    ///
    /// Capture group 1 of `loc_pattern` must hold the location value.
    pub fn with_loc_pattern(
        fetcher: Arc<dyn Fetcher>,
        sitemap_suffix: &str,
        loc_pattern: &str,
    ) -> Result<Self, HarvestError> {
        Ok(Self {
            fetcher,
            loc_matcher: PatternMatcher::new(loc_pattern)?,
            sitemap_suffix: sitemap_suffix.to_string(),
        })
    }

    /// Resolves `root_url` into the flat, ordered leaf-URL list
    ///
    /// The root is always treated as a sitemap document. A document that
    /// cannot be fetched contributes nothing and the walk continues.
    pub async fn resolve(&self, root_url: &str) -> LeafUrlList {
        self.resolve_with_stats(root_url).await.0
    }

    /// Same as [`resolve`](Self::resolve), also returning walk counters
    ///
    /// A sitemap that refers back to one of its own ancestors is skipped, so
    /// cycles terminate. A sitemap reached through two different parents is
    /// walked once per reference and its leaves appear each time.
    pub async fn resolve_with_stats(&self, root_url: &str) -> (LeafUrlList, ResolveStats) {
        let mut leaves = LeafUrlList::new();
        let mut stats = ResolveStats::default();
        // Sitemaps on the path from the root to the document being walked
        let mut ancestors: HashSet<String> = HashSet::new();

        // Later document entries sit below earlier ones
        let mut pending = vec![WalkStep::Enter(SitemapNode::IndexSitemap(
            trim_location(root_url).to_string(),
        ))];

        while let Some(step) = pending.pop() {
            match step {
                WalkStep::Enter(SitemapNode::LeafUrl(url)) => {
                    tracing::trace!("Leaf URL: {}", url);
                    leaves.push(url);
                    stats.leaves_found += 1;
                }
                WalkStep::Enter(SitemapNode::IndexSitemap(url)) => {
                    if ancestors.contains(&url) {
                        tracing::warn!("Skipping sitemap {}: it refers back to itself", url);
                        stats.cycles_skipped += 1;
                        continue;
                    }

                    let children = self.scan_document(&url, &mut stats).await;
                    ancestors.insert(url.clone());
                    pending.push(WalkStep::Leave(url));
                    pending.extend(children.into_iter().rev().map(WalkStep::Enter));
                }
                WalkStep::Leave(url) => {
                    ancestors.remove(&url);
                }
            }
        }

        tracing::info!(
            "Resolved {} leaf URLs from {} sitemap documents ({} failed, {} cycles skipped)",
            stats.leaves_found,
            stats.sitemaps_fetched,
            stats.sitemaps_failed,
            stats.cycles_skipped
        );

        (leaves, stats)
    }

    /// Fetches one sitemap document and classifies its `<loc>` entries in order
    async fn scan_document(&self, url: &str, stats: &mut ResolveStats) -> Vec<SitemapNode> {
        tracing::debug!("Fetching sitemap: {}", url);
        stats.sitemaps_fetched += 1;

        let body = match self.fetcher.fetch(url).await.into_body() {
            Some(body) => body,
            None => {
                tracing::debug!("Sitemap {} could not be fetched, treating as empty", url);
                stats.sitemaps_failed += 1;
                return Vec::new();
            }
        };

        let nodes: Vec<SitemapNode> = self
            .loc_matcher
            .captures_all(&body, 1)
            .into_iter()
            .filter_map(|range| {
                let raw = String::from_utf8_lossy(&body[range]);
                SitemapNode::classify(&raw, &self.sitemap_suffix)
            })
            .collect();

        tracing::debug!(
            "Sitemap {}: {} entries, {} nested sitemaps",
            url,
            nodes.len(),
            nodes.iter().filter(|node| node.is_index()).count()
        );
        nodes
    }
}
