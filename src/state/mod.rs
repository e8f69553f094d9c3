//! State module for tracking worker progress
//!
//! - `WorkerState`: what a worker is doing with its current task (idle, fetching, extracting)

mod worker_state;

pub use worker_state::WorkerState;
