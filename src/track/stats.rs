//! Tracker statistics
//!
//! Atomic counters covering registry membership churn, lookup outcomes, and
//! deferred-packet movement. Purely observational: nothing in the tracker
//! depends on these being read.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Atomic tracker statistics
#[derive(Debug, Default)]
pub struct RegistryStats {
    /// Records inserted into the registry
    inserted: AtomicU64,
    /// Records removed from the registry
    removed: AtomicU64,
    /// Recency refreshes (`touch`)
    touched: AtomicU64,
    /// Lookups that found a record
    lookup_hits: AtomicU64,
    /// Lookups that found nothing
    lookup_misses: AtomicU64,
    /// Packets buffered for later reinjection
    packets_deferred: AtomicU64,
    /// Packets successfully handed to the transport stack
    packets_reinjected: AtomicU64,
    /// Packets rejected by the transport stack during a drain
    reinjection_failures: AtomicU64,
    /// Packets dropped on record destruction or registry teardown
    packets_discarded: AtomicU64,
}

impl RegistryStats {
    /// Create new tracker statistics
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a registry insertion
    pub fn record_insert(&self) {
        self.inserted.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a registry removal
    pub fn record_remove(&self) {
        self.removed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a recency refresh
    pub fn record_touch(&self) {
        self.touched.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a lookup outcome
    pub fn record_lookup(&self, hit: bool) {
        if hit {
            self.lookup_hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.lookup_misses.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record a deferred packet
    pub fn record_deferred(&self) {
        self.packets_deferred.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a successful reinjection
    pub fn record_reinjected(&self) {
        self.packets_reinjected.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a failed reinjection
    pub fn record_reinjection_failure(&self) {
        self.reinjection_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Record discarded packets
    pub fn record_discarded(&self, count: u64) {
        self.packets_discarded.fetch_add(count, Ordering::Relaxed);
    }

    /// Get records inserted
    #[must_use]
    pub fn inserted(&self) -> u64 {
        self.inserted.load(Ordering::Relaxed)
    }

    /// Get records removed
    #[must_use]
    pub fn removed(&self) -> u64 {
        self.removed.load(Ordering::Relaxed)
    }

    /// Get recency refreshes
    #[must_use]
    pub fn touched(&self) -> u64 {
        self.touched.load(Ordering::Relaxed)
    }

    /// Get lookup hits
    #[must_use]
    pub fn lookup_hits(&self) -> u64 {
        self.lookup_hits.load(Ordering::Relaxed)
    }

    /// Get lookup misses
    #[must_use]
    pub fn lookup_misses(&self) -> u64 {
        self.lookup_misses.load(Ordering::Relaxed)
    }

    /// Get packets deferred
    #[must_use]
    pub fn packets_deferred(&self) -> u64 {
        self.packets_deferred.load(Ordering::Relaxed)
    }

    /// Get packets reinjected
    #[must_use]
    pub fn packets_reinjected(&self) -> u64 {
        self.packets_reinjected.load(Ordering::Relaxed)
    }

    /// Get reinjection failures
    #[must_use]
    pub fn reinjection_failures(&self) -> u64 {
        self.reinjection_failures.load(Ordering::Relaxed)
    }

    /// Get packets discarded
    #[must_use]
    pub fn packets_discarded(&self) -> u64 {
        self.packets_discarded.load(Ordering::Relaxed)
    }

    /// Get a snapshot of all statistics
    #[must_use]
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            inserted: self.inserted(),
            removed: self.removed(),
            touched: self.touched(),
            lookup_hits: self.lookup_hits(),
            lookup_misses: self.lookup_misses(),
            packets_deferred: self.packets_deferred(),
            packets_reinjected: self.packets_reinjected(),
            reinjection_failures: self.reinjection_failures(),
            packets_discarded: self.packets_discarded(),
            timestamp_ms: std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_millis() as u64,
        }
    }
}

/// Snapshot of tracker statistics at a point in time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsSnapshot {
    /// Records inserted
    pub inserted: u64,
    /// Records removed
    pub removed: u64,
    /// Recency refreshes
    pub touched: u64,
    /// Lookup hits
    pub lookup_hits: u64,
    /// Lookup misses
    pub lookup_misses: u64,
    /// Packets deferred
    pub packets_deferred: u64,
    /// Packets reinjected
    pub packets_reinjected: u64,
    /// Reinjection failures
    pub reinjection_failures: u64,
    /// Packets discarded
    pub packets_discarded: u64,
    /// Timestamp in milliseconds
    pub timestamp_ms: u64,
}
