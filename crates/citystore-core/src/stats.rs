//! Operation counters for a running store.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counts of store operations by outcome since the store was created.
#[derive(Debug, Default)]
pub struct StoreStats {
    inserts: AtomicU64,
    removals: AtomicU64,
    conflicts: AtomicU64,
    misses: AtomicU64,
    queries: AtomicU64,
}

/// Point-in-time copy of [`StoreStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatsSnapshot {
    /// Successful inserts
    pub inserts: u64,
    /// Successful removals
    pub removals: u64,
    /// Inserts rejected as duplicates
    pub conflicts: u64,
    /// Removals of records that were not stored
    pub misses: u64,
    /// Traversals served
    pub queries: u64,
}

impl StoreStats {
    /// Create zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_insert(&self) {
        self.inserts.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_removal(&self) {
        self.removals.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_conflict(&self) {
        self.conflicts.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_query(&self) {
        self.queries.fetch_add(1, Ordering::Relaxed);
    }

    /// Read all counters.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            inserts: self.inserts.load(Ordering::Relaxed),
            removals: self.removals.load(Ordering::Relaxed),
            conflicts: self.conflicts.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            queries: self.queries.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters() {
        let stats = StoreStats::new();
        assert_eq!(stats.snapshot(), StatsSnapshot::default());

        stats.record_insert();
        stats.record_insert();
        stats.record_conflict();
        stats.record_removal();
        stats.record_miss();
        stats.record_query();

        let snap = stats.snapshot();
        assert_eq!(snap.inserts, 2);
        assert_eq!(snap.conflicts, 1);
        assert_eq!(snap.removals, 1);
        assert_eq!(snap.misses, 1);
        assert_eq!(snap.queries, 1);
    }
}
