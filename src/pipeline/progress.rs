//! Per-batch progress counters.

use std::sync::atomic::{AtomicU32, Ordering};

/// Progress for one batch submission, owned by the result streamer.
///
/// `completed` only moves forward; `record_completion` is an indivisible
/// increment-and-read so the terminal count is observed exactly once.
#[derive(Debug)]
pub struct BatchProgress {
    completed: AtomicU32,
    total: u32,
}

impl BatchProgress {
    pub fn new(total: u32) -> Self {
        Self {
            completed: AtomicU32::new(0),
            total,
        }
    }

    /// Counts one finished work unit and returns the new completed count.
    pub fn record_completion(&self) -> u32 {
        self.completed.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn completed(&self) -> u32 {
        self.completed.load(Ordering::SeqCst)
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    /// True once every label in the batch has completed.
    pub fn is_terminal(&self) -> bool {
        self.completed() == self.total
    }
}
