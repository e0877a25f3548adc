//! Dissolve worker counters.

use std::sync::atomic::{AtomicU64, Ordering};

/// Lock-free counters updated by the dissolve worker.
#[derive(Debug, Default)]
pub struct DissolveMetrics {
    unions_run: AtomicU64,
    empty_short_circuits: AtomicU64,
    superseded: AtomicU64,
    failures: AtomicU64,
}

impl DissolveMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn union_run(&self) {
        self.unions_run.fetch_add(1, Ordering::Relaxed);
    }

    pub fn empty_short_circuit(&self) {
        self.empty_short_circuits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn requests_superseded(&self, count: u64) {
        self.superseded.fetch_add(count, Ordering::Relaxed);
    }

    pub fn failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time copy of all counters.
    pub fn snapshot(&self) -> DissolveSnapshot {
        DissolveSnapshot {
            unions_run: self.unions_run.load(Ordering::Relaxed),
            empty_short_circuits: self.empty_short_circuits.load(Ordering::Relaxed),
            superseded: self.superseded.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of [`DissolveMetrics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DissolveSnapshot {
    /// Batches that went through the union.
    pub unions_run: u64,
    /// Empty batches answered without a union.
    pub empty_short_circuits: u64,
    /// Queued requests dropped in favour of a newer one.
    pub superseded: u64,
    /// Batches whose union failed.
    pub failures: u64,
}
