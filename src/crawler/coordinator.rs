//! Harvest coordinator - run orchestration
//!
//! This module drives a whole run:
//! - Building the extraction engine (a bad pattern fails before any work)
//! - Resolving the sitemap tree into the leaf-URL list
//! - Writing the list to the hand-off file and reading it back
//! - Running the fetch phase sequentially or on a worker pool
//! - Timing the fetch phase and producing the run report

use crate::config::Config;
use crate::crawler::dispatcher::{DispatchReport, TaskDispatcher};
use crate::crawler::fetcher::{Fetcher, HttpFetcher};
use crate::crawler::sitemap::{LeafUrlList, ResolveStats, SitemapResolver};
use crate::crawler::worker::{TaskContext, Worker, WorkerReport};
use crate::extract::{ExtractMode, ExtractionEngine, LOC_PATTERN};
use crate::output::{read_url_list, write_url_list, FileSink, ResultSink, RunReport};
use crate::state::WorkerState;
use crate::HarvestError;
use chrono::Utc;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

/// How the fetch phase is executed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunShape {
    /// One loop, URLs in list order, no dispatcher
    Sequential,
    /// One dispatcher and `workers` pulling workers
    Distributed { workers: usize },
}

impl fmt::Display for RunShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sequential => write!(f, "sequential"),
            Self::Distributed { workers } => write!(f, "distributed ({} workers)", workers),
        }
    }
}

/// Main harvest coordinator
pub struct Harvester {
    config: Arc<Config>,
    fetcher: Arc<dyn Fetcher>,
}

impl Harvester {
    /// Creates a harvester fetching over HTTP
    ///
    /// # Returns
    ///
    /// * `Ok(Harvester)` - Ready to run
    /// * `Err(HarvestError)` - The HTTP client could not be built
    pub fn new(config: Config) -> Result<Self, HarvestError> {
        let fetcher = HttpFetcher::new(&config.fetcher)?;
        Ok(Self::with_fetcher(config, Arc::new(fetcher)))
    }

    /// Creates a harvester around any fetcher
    pub fn with_fetcher(config: Config, fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            config: Arc::new(config),
            fetcher,
        }
    }

    /// Resolves the sitemap tree rooted at `root_url`
    ///
    /// A malformed `<loc>` pattern override is reported and yields an empty
    /// list; it does not abort the run.
    pub async fn resolve(&self, root_url: &str) -> (LeafUrlList, ResolveStats) {
        let loc_pattern = self.config.patterns.loc.as_deref().unwrap_or(LOC_PATTERN);

        match SitemapResolver::with_loc_pattern(
            self.fetcher.clone(),
            &self.config.harvest.sitemap_suffix,
            loc_pattern,
        ) {
            Ok(resolver) => resolver.resolve_with_stats(root_url).await,
            Err(e) => {
                tracing::error!("Sitemap resolution skipped: {}", e);
                (LeafUrlList::new(), ResolveStats::default())
            }
        }
    }

    /// Runs a complete harvest
    ///
    /// Only the fetch phase is timed: sitemap resolution happens before the
    /// clock starts.
    ///
    /// # Arguments
    ///
    /// * `root_url` - The sitemap document to start from
    /// * `mode` - Which pattern to extract
    /// * `shape` - Sequential or distributed fetch phase
    pub async fn run(
        &self,
        root_url: &str,
        mode: ExtractMode,
        shape: RunShape,
    ) -> Result<RunReport, HarvestError> {
        let started_at = Utc::now();
        tracing::info!("Starting {} harvest of {} ({})", mode, root_url, shape);

        let engine = Arc::new(ExtractionEngine::for_mode(mode, &self.config)?);
        tracing::debug!(
            "Extracting with pattern {} (matches capped at {} bytes)",
            engine.pattern(),
            engine.max_match_length()
        );

        let (leaves, resolve_stats) = self.resolve(root_url).await;
        let urls_path = Path::new(&self.config.output.urls_path);
        write_url_list(urls_path, &leaves)?;

        let clock = Instant::now();

        let urls = read_url_list(urls_path)?;
        let results_path = Path::new(&self.config.output.output_dir).join(mode.results_file_name());
        let sink = Arc::new(FileSink::create(&results_path, self.config.harvest.echo_matches)?);

        let context = TaskContext {
            fetcher: self.fetcher.clone(),
            engine,
            sink: sink.clone(),
        };

        let totals = match shape {
            RunShape::Sequential => run_sequential(&context, urls).await,
            RunShape::Distributed { workers } => {
                let (_, reports) = run_distributed(context, urls, workers).await;
                let mut totals = WorkerReport::default();
                for report in &reports {
                    totals.absorb(report);
                }
                totals
            }
        };
        sink.flush()?;
        tracing::info!(
            "{} match lines written to {}",
            sink.lines_written(),
            sink.path().display()
        );

        let elapsed = clock.elapsed();
        tracing::info!(
            "Harvest complete: {} pages scanned, {} matches in {:?}",
            totals.tasks_completed,
            totals.matches_written,
            elapsed
        );

        Ok(RunReport {
            started_at,
            mode,
            shape,
            urls_discovered: leaves.len(),
            sitemaps_fetched: resolve_stats.sitemaps_fetched,
            tasks_completed: totals.tasks_completed,
            fetch_failures: totals.fetch_failures,
            matches_written: totals.matches_written,
            elapsed,
            results_path,
        })
    }
}

/// Processes every URL in list order on the current task
pub async fn run_sequential(context: &TaskContext, urls: LeafUrlList) -> WorkerReport {
    let mut report = WorkerReport::new(0);
    let mut state = WorkerState::Idle;

    for (index, url) in urls.iter().enumerate() {
        let outcome = context.process(url, &mut state).await;
        report.record(&outcome);

        if (index + 1) % 50 == 0 {
            tracing::info!("Progress: {} / {} URLs processed", index + 1, urls.len());
        }
    }

    report
}

/// Runs one dispatcher and `workers` workers over `urls`
///
/// Returns the dispatcher's report and one report per worker that finished.
/// A worker that panics loses its in-flight task; the others carry on.
pub async fn run_distributed(
    context: TaskContext,
    urls: LeafUrlList,
    workers: usize,
) -> (DispatchReport, Vec<WorkerReport>) {
    let mut dispatcher = TaskDispatcher::new(urls);

    let handles: Vec<_> = (0..workers.max(1))
        .map(|_| {
            let worker = Worker::new(dispatcher.register_worker(), context.clone());
            tokio::spawn(worker.run())
        })
        .collect();

    let dispatch_report = dispatcher.run().await;

    let mut reports = Vec::with_capacity(handles.len());
    for handle in handles {
        match handle.await {
            Ok(report) => reports.push(report),
            Err(e) => tracing::error!("Worker task failed: {}", e),
        }
    }

    (dispatch_report, reports)
}
