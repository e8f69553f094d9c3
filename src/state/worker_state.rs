//! Worker state definitions for tracking task progress
//!
//! A worker's state lives only as long as one task; nothing is persisted.

use std::fmt;

/// Represents what a worker is currently doing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WorkerState {
    /// No task assigned; the worker is waiting for the dispatcher
    #[default]
    Idle,

    /// Downloading the page for the assigned task
    Fetching,

    /// Scanning fetched content and appending matches
    Extracting,
}

impl WorkerState {
    /// Returns true if moving from this state to `next` follows the task lifecycle
    ///
    /// The lifecycle is `Idle -> Fetching -> (Extracting ->) Idle`. A failed
    /// fetch goes straight back to `Idle`.
    pub fn can_transition_to(&self, next: WorkerState) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Fetching)
                | (Self::Fetching, Self::Extracting)
                | (Self::Fetching, Self::Idle)
                | (Self::Extracting, Self::Idle)
        )
    }

    /// Returns a short lowercase label used in log output
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Fetching => "fetching",
            Self::Extracting => "extracting",
        }
    }
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
