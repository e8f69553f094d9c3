//! End-of-run report
//!
//! Collects the counters produced by the resolution and fetch phases and
//! prints them when a run finishes.

use crate::crawler::RunShape;
use crate::extract::ExtractMode;
use chrono::{DateTime, Utc};
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;

/// Summary of one harvest run
#[derive(Debug, Clone)]
pub struct RunReport {
    /// When the run started
    pub started_at: DateTime<Utc>,

    /// What the run extracted
    pub mode: ExtractMode,

    /// Sequential or distributed fetch phase
    pub shape: RunShape,

    /// Leaf URLs produced by sitemap resolution
    pub urls_discovered: usize,

    /// Sitemap documents fetched during resolution
    pub sitemaps_fetched: usize,

    /// Tasks whose page was fetched and scanned
    pub tasks_completed: usize,

    /// Tasks skipped because the fetch failed
    pub fetch_failures: usize,

    /// Match lines appended to the results
    pub matches_written: usize,

    /// Duration of the timed fetch phase
    pub elapsed: Duration,

    /// Location of the results file
    pub results_path: PathBuf,
}

impl RunReport {
    /// Returns the share of tasks whose fetch succeeded, as a percentage
    pub fn success_rate(&self) -> f64 {
        let attempted = self.tasks_completed + self.fetch_failures;
        if attempted == 0 {
            return 0.0;
        }
        (self.tasks_completed as f64 / attempted as f64) * 100.0
    }

    /// Returns the timing line printed at the end of every run
    pub fn elapsed_line(&self) -> String {
        format!("Elapsed time: {:.6} seconds.", self.elapsed.as_secs_f64())
    }
}

/// Prints the report to stdout in a formatted manner
///
/// Write errors (a closed pipe, for instance) are returned, not panicked on.
pub fn print_report(report: &RunReport) -> io::Result<()> {
    write_report(&mut io::stdout().lock(), report)
}

/// Writes the formatted report to `out`
fn write_report(out: &mut impl Write, report: &RunReport) -> io::Result<()> {
    writeln!(out, "=== Harvest Report ===\n")?;

    writeln!(out, "Run:")?;
    writeln!(out, "  Started: {}", report.started_at.to_rfc3339())?;
    writeln!(out, "  Mode: {}", report.mode)?;
    writeln!(out, "  Shape: {}", report.shape)?;
    writeln!(out)?;

    writeln!(out, "Sitemap:")?;
    writeln!(out, "  Sitemap documents fetched: {}", report.sitemaps_fetched)?;
    writeln!(out, "  Leaf URLs discovered: {}", report.urls_discovered)?;
    writeln!(out)?;

    writeln!(out, "Fetch Phase:")?;
    writeln!(out, "  Pages scanned: {}", report.tasks_completed)?;
    writeln!(out, "  Fetch failures: {}", report.fetch_failures)?;
    writeln!(out, "  Matches written: {}", report.matches_written)?;
    writeln!(out, "  Results file: {}", report.results_path.display())?;
    writeln!(
        out,
        "  Success Rate: {:.1}% ({} / {} pages fetched)",
        report.success_rate(),
        report.tasks_completed,
        report.tasks_completed + report.fetch_failures
    )?;
    writeln!(out)?;

    writeln!(out, "{}", report.elapsed_line())?;
    out.flush()
}
