//! Result sink implementations

use crate::extract::ExtractionResult;
use crate::output::traits::{OutputError, OutputResult, ResultSink};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// Writes matches to a results file through one long-lived handle
///
/// The handle sits behind a mutex held for a whole append, so a document's
/// lines land contiguously. The buffer is flushed after every append.
pub struct FileSink {
    path: PathBuf,
    inner: Mutex<SinkWriters>,
    lines_written: AtomicU64,
}

/// Destinations written under the sink lock
struct SinkWriters {
    file: BufWriter<File>,
    /// Copy of every line for the console; dropped after its first error
    echo: Option<Box<dyn Write + Send>>,
}

impl FileSink {
    /// Creates (or truncates) the results file
    ///
    /// # Arguments
    ///
    /// * `path` - Location of the results file
    /// * `echo` - Also print every line to stdout
    pub fn create(path: &Path, echo: bool) -> OutputResult<Self> {
        let echo: Option<Box<dyn Write + Send>> = if echo {
            Some(Box::new(std::io::stdout()))
        } else {
            None
        };
        Self::open(path, echo)
    }

    fn open(path: &Path, echo: Option<Box<dyn Write + Send>>) -> OutputResult<Self> {
        let file = File::create(path)?;
        tracing::debug!("Truncated results file {}", path.display());

        Ok(Self {
            path: path.to_path_buf(),
            inner: Mutex::new(SinkWriters {
                file: BufWriter::new(file),
                echo,
            }),
            lines_written: AtomicU64::new(0),
        })
    }

    /// Returns the path of the results file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the number of match lines written so far
    pub fn lines_written(&self) -> u64 {
        self.lines_written.load(Ordering::Relaxed)
    }
}

impl SinkWriters {
    /// Copies a group to the echo writer; an echo failure never fails the append
    fn echo(&mut self, result: &ExtractionResult) {
        let Some(echo) = self.echo.as_mut() else {
            return;
        };

        let written = result
            .iter()
            .try_for_each(|line| writeln!(echo, "{}", line))
            .and_then(|()| echo.flush());

        if let Err(e) = written {
            tracing::debug!("Disabling match echo: {}", e);
            self.echo = None;
        }
    }
}

impl ResultSink for FileSink {
    fn append(&self, result: &ExtractionResult) -> OutputResult<()> {
        if result.is_empty() {
            return Ok(());
        }

        let mut inner = self
            .inner
            .lock()
            .map_err(|_| OutputError::Write("results writer lock poisoned".to_string()))?;

        for line in result.iter() {
            writeln!(inner.file, "{}", line)?;
        }
        inner.file.flush()?;
        inner.echo(result);

        self.lines_written
            .fetch_add(result.len() as u64, Ordering::Relaxed);
        Ok(())
    }

    fn flush(&self) -> OutputResult<()> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|_| OutputError::Write("results writer lock poisoned".to_string()))?;
        inner.file.flush()?;
        Ok(())
    }
}

/// Keeps results in memory, one group per appended document
#[derive(Debug, Default)]
pub struct MemorySink {
    groups: Mutex<Vec<ExtractionResult>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every appended group in append order
    pub fn groups(&self) -> Vec<ExtractionResult> {
        self.groups
            .lock()
            .map(|groups| groups.clone())
            .unwrap_or_default()
    }

    /// Returns every line in append order
    pub fn lines(&self) -> Vec<String> {
        self.groups()
            .into_iter()
            .flat_map(|group| group.matches)
            .collect()
    }
}

impl ResultSink for MemorySink {
    fn append(&self, result: &ExtractionResult) -> OutputResult<()> {
        let mut groups = self
            .groups
            .lock()
            .map_err(|_| OutputError::Write("memory sink lock poisoned".to_string()))?;
        groups.push(result.clone());
        Ok(())
    }

    fn flush(&self) -> OutputResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tempfile::tempdir;

    fn result(lines: &[&str]) -> ExtractionResult {
        ExtractionResult {
            matches: lines.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_file_sink_writes_lines_in_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("emails.txt");

        let sink = FileSink::create(&path, false).unwrap();
        sink.append(&result(&["a@b.com", "c@d.org"])).unwrap();
        sink.append(&result(&[])).unwrap();
        sink.append(&result(&["e@f.net"])).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "a@b.com\nc@d.org\ne@f.net\n");
        assert_eq!(sink.lines_written(), 3);
        assert_eq!(sink.path(), path.as_path());
    }

    #[test]
    fn test_file_sink_truncates_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("phones.txt");
        std::fs::write(&path, "stale line\n").unwrap();

        let sink = FileSink::create(&path, false).unwrap();
        sink.flush().unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn test_file_sink_concurrent_groups_do_not_interleave() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("emails.txt");
        let sink = Arc::new(FileSink::create(&path, false).unwrap());

        let handles: Vec<_> = (0..8)
            .map(|worker| {
                let sink = Arc::clone(&sink);
                std::thread::spawn(move || {
                    for page in 0..25 {
                        let lines: Vec<String> = (0..4)
                            .map(|i| format!("w{}-p{}-m{}@example.com", worker, page, i))
                            .collect();
                        sink.append(&ExtractionResult { matches: lines }).unwrap();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 8 * 25 * 4);

        // Every group of four lines belongs to the same worker and page
        for group in lines.chunks(4) {
            let prefix = group[0].rsplit_once("-m").unwrap().0;
            for (i, line) in group.iter().enumerate() {
                assert_eq!(*line, format!("{}-m{}@example.com", prefix, i));
            }
        }
    }

    /// Console stand-in that fails like a closed pipe
    struct ClosedPipe {
        attempts: Arc<AtomicU64>,
    }

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            self.attempts.fetch_add(1, Ordering::Relaxed);
            Err(std::io::Error::from(std::io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_failing_echo_does_not_lose_matches() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("emails.txt");
        let attempts = Arc::new(AtomicU64::new(0));
        let echo = ClosedPipe {
            attempts: Arc::clone(&attempts),
        };

        let sink = FileSink::open(&path, Some(Box::new(echo))).unwrap();
        sink.append(&result(&["a@b.com", "c@d.org"])).unwrap();
        sink.append(&result(&["e@f.net"])).unwrap();
        sink.append(&result(&["g@h.io"])).unwrap();

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "a@b.com\nc@d.org\ne@f.net\ng@h.io\n"
        );
        assert_eq!(sink.lines_written(), 4);
        // The echo is dropped after the first failure
        assert_eq!(attempts.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_echo_receives_every_group() {
        #[derive(Clone, Default)]
        struct Captured(Arc<Mutex<Vec<u8>>>);

        impl Write for Captured {
            fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
                self.0.lock().unwrap().extend_from_slice(buf);
                Ok(buf.len())
            }

            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let dir = tempdir().unwrap();
        let captured = Captured::default();
        let sink =
            FileSink::open(&dir.path().join("phones.txt"), Some(Box::new(captured.clone())))
                .unwrap();
        sink.append(&result(&["555-123-4567"])).unwrap();
        sink.append(&result(&[])).unwrap();
        sink.append(&result(&["(555) 987-6543"])).unwrap();

        let echoed = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert_eq!(echoed, "555-123-4567\n(555) 987-6543\n");
    }

    #[test]
    fn test_memory_sink_groups() {
        let sink = MemorySink::new();
        sink.append(&result(&["1", "2"])).unwrap();
        sink.append(&result(&[])).unwrap();

        assert_eq!(sink.groups().len(), 2);
        assert_eq!(sink.lines(), vec!["1", "2"]);
    }
}
