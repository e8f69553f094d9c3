//! Output sink traits and types
//!
//! This module defines the trait interface for result sinks and the errors
//! they report.

use crate::extract::ExtractionResult;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write output: {0}")]
    Write(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Append-only destination for extracted matches
///
/// A sink is shared by every worker. Implementations must write each
/// `ExtractionResult` as one uninterrupted group of lines: lines from two
/// concurrent appends never interleave.
pub trait ResultSink: Send + Sync {
    /// Appends one document's matches, one per line, in match order
    ///
    /// # Arguments
    ///
    /// * `result` - The matches extracted from a single document
    fn append(&self, result: &ExtractionResult) -> OutputResult<()>;

    /// Flushes any buffered output
    fn flush(&self) -> OutputResult<()>;
}
