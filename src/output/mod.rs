//! Output module for harvest results
//!
//! This module handles:
//! - The result sink shared by all workers
//! - The leaf-URL hand-off file between the resolution and fetch phases
//! - The end-of-run report

mod sink;
pub mod stats;
mod traits;
mod url_list;

pub use sink::{FileSink, MemorySink};
pub use stats::{print_report, RunReport};
pub use traits::{OutputError, OutputResult, ResultSink};
pub use url_list::{read_url_list, write_url_list};
