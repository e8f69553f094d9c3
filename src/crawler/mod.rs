//! Crawler module for sitemap resolution and the fetch phase
//!
//! This module contains the core harvesting logic, including:
//! - Fetching pages over HTTP (or from memory)
//! - Resolving the sitemap tree into leaf URLs
//! - The pull-based task dispatcher and its workers
//! - Overall run coordination

mod coordinator;
mod dispatcher;
mod fetcher;
mod sitemap;
mod worker;

pub use coordinator::{run_distributed, run_sequential, Harvester, RunShape};
pub use dispatcher::{
    Assignment, DispatchReport, ReadySignal, Task, TaskDispatcher, WorkerChannel, WorkerId,
};
pub use fetcher::{build_http_client, FetchResult, Fetcher, HttpFetcher, MemoryFetcher};
pub use sitemap::{LeafUrlList, ResolveStats, SitemapResolver};
pub use worker::{TaskContext, TaskOutcome, Worker, WorkerReport};

use crate::config::Config;
use crate::extract::ExtractMode;
use crate::output::RunReport;
use crate::HarvestError;

/// Runs a complete harvest over HTTP
///
/// This is the main entry point for a run. It will:
/// 1. Build the HTTP fetcher
/// 2. Resolve the sitemap tree and write the URL hand-off file
/// 3. Fetch and scan every URL, sequentially or on a worker pool
/// 4. Return the run report
///
/// # Arguments
///
/// * `config` - The harvester configuration
/// * `root_url` - The sitemap document to start from
/// * `mode` - Which pattern to extract
/// * `shape` - Sequential or distributed fetch phase
pub async fn harvest(
    config: Config,
    root_url: &str,
    mode: ExtractMode,
    shape: RunShape,
) -> Result<RunReport, HarvestError> {
    Harvester::new(config)?.run(root_url, mode, shape).await
}
