//! Shared progress and cancellation state
//!
//! The only mutable state workers share: a byte counter they add to and a
//! cancel flag they read. Both are advisory, so relaxed ordering is enough.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

#[derive(Debug)]
pub struct ProgressTracker {
    bytes_total: u64,
    bytes_processed: AtomicU64,
    cancelled: AtomicBool,
}

impl ProgressTracker {
    pub fn new(bytes_total: u64) -> Self {
        Self {
            bytes_total,
            bytes_processed: AtomicU64::new(0),
            cancelled: AtomicBool::new(false),
        }
    }

    pub fn bytes_total(&self) -> u64 {
        self.bytes_total
    }

    pub fn add_bytes(&self, bytes: u64) {
        if bytes > 0 {
            self.bytes_processed.fetch_add(bytes, Ordering::Relaxed);
        }
    }

    pub fn bytes_processed(&self) -> u64 {
        self.bytes_processed.load(Ordering::Relaxed)
    }

    /// Processed fraction clamped to `0.0..=1.0`. An unknown or zero total
    /// reports 0 until the run ends.
    pub fn fraction(&self) -> f64 {
        if self.bytes_total == 0 {
            return 0.0;
        }
        (self.bytes_processed() as f64 / self.bytes_total as f64).clamp(0.0, 1.0)
    }

    /// Only ever goes from false to true.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Ask the progress callback whether to continue, cancelling if not.
    /// Returns the callback's answer.
    pub fn report<F>(&self, progress: &mut F) -> bool
    where
        F: FnMut(f64) -> bool + ?Sized,
    {
        let keep_going = progress(self.fraction());
        if !keep_going {
            self.cancel();
        }
        keep_going
    }
}
