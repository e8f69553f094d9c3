//! Pull-based task dispatcher
//!
//! The dispatcher owns the task queue for the whole fetch phase. Workers ask
//! for work by sending a `ReadySignal`; each signal is answered with exactly
//! one `Assignment` on the worker's own mailbox: the next queued URL, or
//! `Stop` once the queue is empty. Faster workers ask more often and so get
//! more tasks; nothing is partitioned ahead of time.

use crate::crawler::sitemap::LeafUrlList;
use std::collections::{HashMap, VecDeque};
use tokio::sync::mpsc;

/// Identifies a registered worker
pub type WorkerId = usize;

/// Capacity of the shared ready channel
const READY_CHANNEL_CAPACITY: usize = 64;

/// One unit of work: a leaf URL to fetch and scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub url: String,
}

/// Worker -> dispatcher: "I am idle, send me something"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadySignal {
    pub worker_id: WorkerId,
}

/// Dispatcher -> worker reply to a `ReadySignal`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Assignment {
    /// Fetch and scan this URL, then ask again
    RunTask(Task),
    /// The queue is empty; exit the loop
    Stop,
}

/// The worker's side of the dispatcher protocol
#[derive(Debug)]
pub struct WorkerChannel {
    pub worker_id: WorkerId,
    pub ready_tx: mpsc::Sender<ReadySignal>,
    pub mailbox: mpsc::Receiver<Assignment>,
}

/// What the dispatcher handed out during one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// `RunTask` replies sent
    pub tasks_assigned: usize,

    /// `Stop` replies sent
    pub stops_sent: usize,

    /// Tasks assigned to each worker
    pub assignments_per_worker: HashMap<WorkerId, usize>,

    /// Tasks still queued when the dispatcher exited
    pub tasks_remaining: usize,
}

impl DispatchReport {
    /// Returns the number of tasks assigned to `worker_id`
    pub fn assigned_to(&self, worker_id: WorkerId) -> usize {
        self.assignments_per_worker
            .get(&worker_id)
            .copied()
            .unwrap_or(0)
    }
}

/// Queue and counters behind the dispatcher's replies
struct AssignmentQueue {
    queue: VecDeque<Task>,
    active_workers: usize,
    report: DispatchReport,
}

impl AssignmentQueue {
    fn next_for(&mut self, worker_id: WorkerId) -> Assignment {
        match self.queue.pop_front() {
            Some(task) => {
                self.report.tasks_assigned += 1;
                *self
                    .report
                    .assignments_per_worker
                    .entry(worker_id)
                    .or_insert(0) += 1;
                tracing::trace!("Assigning {} to worker {}", task.url, worker_id);
                Assignment::RunTask(task)
            }
            None => {
                self.report.stops_sent += 1;
                self.active_workers = self.active_workers.saturating_sub(1);
                tracing::debug!(
                    "Stopping worker {} ({} still active)",
                    worker_id,
                    self.active_workers
                );
                Assignment::Stop
            }
        }
    }

    fn into_report(mut self) -> DispatchReport {
        self.report.tasks_remaining = self.queue.len();
        self.report
    }
}

/// Coordinator owning the task queue
pub struct TaskDispatcher {
    assignments: AssignmentQueue,
    ready_tx: mpsc::Sender<ReadySignal>,
    ready_rx: mpsc::Receiver<ReadySignal>,
    mailboxes: HashMap<WorkerId, mpsc::Sender<Assignment>>,
}

impl TaskDispatcher {
    /// Creates a dispatcher that will hand out `urls` front to back
    pub fn new(urls: LeafUrlList) -> Self {
        let (ready_tx, ready_rx) = mpsc::channel(READY_CHANNEL_CAPACITY);

        Self {
            assignments: AssignmentQueue {
                queue: urls.into_iter().map(|url| Task { url }).collect(),
                active_workers: 0,
                report: DispatchReport::default(),
            },
            ready_tx,
            ready_rx,
            mailboxes: HashMap::new(),
        }
    }

    /// Registers a new worker and returns its end of the protocol
    ///
    /// All workers must be registered before [`run`](Self::run) is called.
    pub fn register_worker(&mut self) -> WorkerChannel {
        let worker_id = self.mailboxes.len();
        let (mailbox_tx, mailbox) = mpsc::channel(1);
        self.mailboxes.insert(worker_id, mailbox_tx);
        self.assignments.active_workers += 1;

        WorkerChannel {
            worker_id,
            ready_tx: self.ready_tx.clone(),
            mailbox,
        }
    }

    /// Returns the number of tasks not yet assigned
    pub fn queue_len(&self) -> usize {
        self.assignments.queue.len()
    }

    /// Returns the number of workers not yet told to stop
    pub fn active_workers(&self) -> usize {
        self.assignments.active_workers
    }

    /// Decides the reply to a ready signal from `worker_id`
    ///
    /// Pops the next task, or answers `Stop` and retires the worker when the
    /// queue is empty.
    pub fn on_worker_ready(&mut self, worker_id: WorkerId) -> Assignment {
        self.assignments.next_for(worker_id)
    }

    /// Serves ready signals until every registered worker has been stopped
    ///
    /// There are no retries and no timeouts. A task sent to a worker that has
    /// gone away is lost. If every worker disappears before being stopped the
    /// loop ends instead of waiting forever.
    pub async fn run(self) -> DispatchReport {
        tracing::info!(
            "Dispatching {} tasks to {} workers",
            self.queue_len(),
            self.active_workers()
        );

        let TaskDispatcher {
            mut assignments,
            ready_tx,
            mut ready_rx,
            mailboxes,
        } = self;
        // Only workers hold senders from here on, so the channel closes once they are gone
        drop(ready_tx);

        while assignments.active_workers > 0 {
            let signal = match ready_rx.recv().await {
                Some(signal) => signal,
                None => {
                    tracing::warn!(
                        "All workers disconnected with {} not yet stopped",
                        assignments.active_workers
                    );
                    break;
                }
            };

            let mailbox = match mailboxes.get(&signal.worker_id) {
                Some(mailbox) => mailbox,
                None => {
                    tracing::warn!("Ready signal from unknown worker {}", signal.worker_id);
                    continue;
                }
            };

            let assignment = assignments.next_for(signal.worker_id);
            if let Err(e) = mailbox.send(assignment).await {
                tracing::warn!(
                    "Worker {} is gone, dropped reply {:?}",
                    signal.worker_id,
                    e.0
                );
            }
        }

        let report = assignments.into_report();
        tracing::info!(
            "Dispatcher finished: {} tasks assigned, {} stops sent",
            report.tasks_assigned,
            report.stops_sent
        );
        report
    }
}
