//! Type definitions for the queue system
//!
//! Statistics snapshots and the counters behind them.

use std::sync::atomic::{AtomicU64, Ordering};

/// Point-in-time statistics for a queue
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueueStats {
    /// Items accepted into the buffer
    pub enqueued: u64,
    /// Items whose handler returned successfully
    pub processed: u64,
    /// Items whose handler returned an error or panicked
    pub failed: u64,
    /// Enqueue attempts refused because the queue was shutting down
    pub rejected: u64,
    /// Buffered items dropped by dispose
    pub abandoned: u64,
    /// Items buffered and not yet picked up by a worker
    pub pending: usize,
    /// Workers currently running the handler
    pub active_workers: usize,
}

#[derive(Debug, Default)]
pub(crate) struct Counters {
    enqueued: AtomicU64,
    processed: AtomicU64,
    failed: AtomicU64,
    rejected: AtomicU64,
    abandoned: AtomicU64,
}

impl Counters {
    pub(crate) fn record_enqueued(&self) {
        self.enqueued.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_processed(&self) {
        self.processed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_abandoned(&self, count: usize) {
        self.abandoned.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self, pending: usize, active_workers: usize) -> QueueStats {
        QueueStats {
            enqueued: self.enqueued.load(Ordering::Relaxed),
            processed: self.processed.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            abandoned: self.abandoned.load(Ordering::Relaxed),
            pending,
            active_workers,
        }
    }
}
