//! Fetch-and-extract worker
//!
//! A worker asks the dispatcher for one URL at a time, fetches it, scans it,
//! appends the matches to the shared sink and asks again. Fetch and extract
//! run strictly in sequence inside one worker; concurrency only exists
//! across workers.

use crate::crawler::dispatcher::{Assignment, ReadySignal, WorkerChannel, WorkerId};
use crate::crawler::fetcher::Fetcher;
use crate::extract::ExtractionEngine;
use crate::output::ResultSink;
use crate::state::WorkerState;
use std::sync::Arc;

/// Everything needed to process one task
///
/// Shared (cheaply cloned) between the workers of a run and the sequential
/// driver so both apply identical semantics.
#[derive(Clone)]
pub struct TaskContext {
    pub fetcher: Arc<dyn Fetcher>,
    pub engine: Arc<ExtractionEngine>,
    pub sink: Arc<dyn ResultSink>,
}

/// How a single task ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    /// The page was fetched and its matches appended
    Extracted { matches: usize },

    /// The fetch failed; nothing was extracted
    FetchFailed,

    /// The page was scanned but appending to the sink failed
    WriteFailed { error: String },
}

impl TaskContext {
    /// Fetches `url`, extracts matches and appends them to the sink
    ///
    /// A failed fetch is skipped silently. `state` follows
    /// `Idle -> Fetching -> Extracting -> Idle` and is `Idle` again on return.
    pub async fn process(&self, url: &str, state: &mut WorkerState) -> TaskOutcome {
        transition(state, WorkerState::Fetching);
        let body = match self.fetcher.fetch(url).await.into_body() {
            Some(body) => body,
            None => {
                tracing::debug!("Skipping {}: fetch failed", url);
                transition(state, WorkerState::Idle);
                return TaskOutcome::FetchFailed;
            }
        };

        transition(state, WorkerState::Extracting);
        let result = self.engine.extract(&body);
        let outcome = match self.sink.append(&result) {
            Ok(()) => {
                tracing::debug!("{} matches in {}", result.len(), url);
                TaskOutcome::Extracted {
                    matches: result.len(),
                }
            }
            Err(e) => {
                tracing::error!("Failed to write matches from {}: {}", url, e);
                TaskOutcome::WriteFailed {
                    error: e.to_string(),
                }
            }
        };

        transition(state, WorkerState::Idle);
        outcome
    }
}

fn transition(state: &mut WorkerState, next: WorkerState) {
    debug_assert!(
        state.can_transition_to(next),
        "invalid worker transition {} -> {}",
        state,
        next
    );
    tracing::trace!("Worker state {} -> {}", state, next);
    *state = next;
}

/// Counters for the tasks one worker handled
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkerReport {
    pub worker_id: WorkerId,

    /// Tasks whose page was fetched and scanned
    pub tasks_completed: usize,

    /// Tasks skipped because the fetch failed
    pub fetch_failures: usize,

    /// Tasks whose matches could not be written
    pub write_failures: usize,

    /// Match lines appended to the sink
    pub matches_written: usize,
}

impl WorkerReport {
    pub fn new(worker_id: WorkerId) -> Self {
        Self {
            worker_id,
            ..Self::default()
        }
    }

    /// Counts one task outcome
    pub fn record(&mut self, outcome: &TaskOutcome) {
        match outcome {
            TaskOutcome::Extracted { matches } => {
                self.tasks_completed += 1;
                self.matches_written += matches;
            }
            TaskOutcome::FetchFailed => self.fetch_failures += 1,
            TaskOutcome::WriteFailed { .. } => {
                self.tasks_completed += 1;
                self.write_failures += 1;
            }
        }
    }

    /// Adds another worker's counters to this one
    pub fn absorb(&mut self, other: &WorkerReport) {
        self.tasks_completed += other.tasks_completed;
        self.fetch_failures += other.fetch_failures;
        self.write_failures += other.write_failures;
        self.matches_written += other.matches_written;
    }
}

/// A worker pulling tasks from the dispatcher
pub struct Worker {
    channel: WorkerChannel,
    context: TaskContext,
    state: WorkerState,
}

impl Worker {
    pub fn new(channel: WorkerChannel, context: TaskContext) -> Self {
        Self {
            channel,
            context,
            state: WorkerState::Idle,
        }
    }

    pub fn id(&self) -> WorkerId {
        self.channel.worker_id
    }

    pub fn state(&self) -> WorkerState {
        self.state
    }

    /// Runs the ready / assignment loop until told to stop
    ///
    /// The loop also ends if the dispatcher disappears.
    pub async fn run(mut self) -> WorkerReport {
        let worker_id = self.id();
        let mut report = WorkerReport::new(worker_id);

        loop {
            if self
                .channel
                .ready_tx
                .send(ReadySignal { worker_id })
                .await
                .is_err()
            {
                tracing::warn!("Worker {}: dispatcher is gone", worker_id);
                break;
            }

            match self.channel.mailbox.recv().await {
                Some(Assignment::RunTask(task)) => {
                    let outcome = self.context.process(&task.url, &mut self.state).await;
                    report.record(&outcome);
                }
                Some(Assignment::Stop) => {
                    tracing::debug!("Worker {} stopping", worker_id);
                    break;
                }
                None => {
                    tracing::warn!("Worker {}: mailbox closed", worker_id);
                    break;
                }
            }
        }

        tracing::debug!(
            "Worker {} done: {} completed, {} fetch failures",
            worker_id,
            report.tasks_completed,
            report.fetch_failures
        );
        report
    }
}
