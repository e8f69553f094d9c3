//! Leaf-URL hand-off file
//!
//! The resolution phase writes one URL per line; the fetch phase reads the
//! file back before dispatching.

use crate::output::traits::OutputResult;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Writes the leaf-URL list, replacing any previous file
pub fn write_url_list(path: &Path, urls: &[String]) -> OutputResult<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    for url in urls {
        writeln!(writer, "{}", url)?;
    }
    writer.flush()?;

    tracing::debug!("Wrote {} URLs to {}", urls.len(), path.display());
    Ok(())
}

/// Reads a leaf-URL list back, trimming each line and skipping blank ones
pub fn read_url_list(path: &Path) -> OutputResult<Vec<String>> {
    let reader = BufReader::new(File::open(path)?);
    let mut urls = Vec::new();

    for line in reader.lines() {
        let line = line?;
        let url = crate::url::trim_location(&line);
        if !url.is_empty() {
            urls.push(url.to_string());
        }
    }

    Ok(urls)
}
