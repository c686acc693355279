//! Process-wide connection registry
//!
//! A single mutex-guarded sequence of connection records, ordered by recency:
//! the most recently inserted or touched record sits at the tail. Lookups
//! scan tail-to-head, so among several key-matching records the most recently
//! active one wins (the "tail-wins" rule).
//!
//! The registry mutex guards membership only. No registry operation ever
//! acquires a record's queue mutex or calls into the transport stack, so the
//! two lock tiers are never held together and no lock-ordering deadlock is
//! possible.

use std::net::Ipv4Addr;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info};

use super::key::{ConnectionKey, SocketHandle};
use super::record::ConnectionRecord;
use super::stats::RegistryStats;
use crate::config::{DestinationMatch, TrackerConfig};

/// Process-wide set of tracked connections, ordered by recency.
#[derive(Debug)]
pub struct ConnectionRegistry {
    /// Membership sequence; tail = most recently inserted or touched
    members: Mutex<Vec<Arc<ConnectionRecord>>>,
    /// Matching strategy for `find_by_key`
    matching: DestinationMatch,
    /// Shared statistics
    stats: Arc<RegistryStats>,
}

impl ConnectionRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new(config: &TrackerConfig) -> Self {
        Self {
            members: Mutex::new(Vec::new()),
            matching: config.destination_match,
            stats: Arc::new(RegistryStats::new()),
        }
    }

    /// Append a record at the tail.
    ///
    /// O(1). No uniqueness check is performed: callers must not insert a
    /// record that is already a member.
    pub fn insert(&self, record: Arc<ConnectionRecord>) {
        let key = *record.key();
        let socket = record.socket();
        self.members.lock().push(record);
        self.stats.record_insert();
        debug!("Tracking {} on socket {}", key, socket);
    }

    /// Remove the given record from the sequence.
    ///
    /// Matches by pointer identity. Silently a no-op (returns `false`) when
    /// the record is not a member.
    pub fn remove(&self, record: &Arc<ConnectionRecord>) -> bool {
        let removed = {
            let mut members = self.members.lock();
            match members.iter().position(|m| Arc::ptr_eq(m, record)) {
                Some(idx) => {
                    members.remove(idx);
                    true
                }
                None => false,
            }
        };
        if removed {
            self.stats.record_remove();
            debug!("Untracked {} on socket {}", record.key(), record.socket());
        }
        removed
    }

    /// Find the most recently touched record with the given socket handle.
    ///
    /// Scans tail-to-head. Duplicate handles should not occur, but if they
    /// do, the most recently active record wins.
    #[must_use]
    pub fn find_by_socket(&self, handle: SocketHandle) -> Option<Arc<ConnectionRecord>> {
        let found = {
            let members = self.members.lock();
            members
                .iter()
                .rev()
                .find(|m| m.socket() == handle)
                .cloned()
        };
        self.stats.record_lookup(found.is_some());
        found
    }

    /// Find the most recently touched record whose destination side matches.
    ///
    /// Source address/port are intentionally ignored here, preserving the
    /// original interception layer's behavior. Use [`Self::find_by_key`] with
    /// [`DestinationMatch::FullTuple`] configured for strict matching.
    #[must_use]
    pub fn find_by_destination(
        &self,
        dst_addr: Ipv4Addr,
        dst_port: u16,
    ) -> Option<Arc<ConnectionRecord>> {
        let found = {
            let members = self.members.lock();
            members
                .iter()
                .rev()
                .find(|m| m.key().matches_destination(dst_addr, dst_port))
                .cloned()
        };
        self.stats.record_lookup(found.is_some());
        found
    }

    /// Find the most recently touched record matching `key` under the
    /// configured matching strategy.
    #[must_use]
    pub fn find_by_key(&self, key: &ConnectionKey) -> Option<Arc<ConnectionRecord>> {
        let found = {
            let members = self.members.lock();
            members
                .iter()
                .rev()
                .find(|m| match self.matching {
                    DestinationMatch::DestinationOnly => {
                        m.key().matches_destination(key.dst_addr, key.dst_port)
                    }
                    DestinationMatch::FullTuple => m.key() == key,
                })
                .cloned()
        };
        self.stats.record_lookup(found.is_some());
        found
    }

    /// Refresh the record's recency rank by moving it to the tail.
    ///
    /// Silently a no-op (returns `false`) when the record is not a member.
    pub fn touch(&self, record: &Arc<ConnectionRecord>) -> bool {
        let touched = {
            let mut members = self.members.lock();
            match members.iter().position(|m| Arc::ptr_eq(m, record)) {
                Some(idx) => {
                    let r = members.remove(idx);
                    members.push(r);
                    true
                }
                None => false,
            }
        };
        if touched {
            self.stats.record_touch();
        }
        touched
    }

    /// Number of tracked connections
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.lock().len()
    }

    /// Check whether the registry is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.lock().is_empty()
    }

    /// Remove every member, releasing the registry's references.
    ///
    /// Records whose last reference this was discard their buffered packets
    /// on drop. Mirrors shutdown teardown: nothing is forwarded. Returns the
    /// number of records released.
    pub fn clear(&self) -> usize {
        let drained: Vec<_> = {
            let mut members = self.members.lock();
            members.drain(..).collect()
        };
        let count = drained.len();
        // Drop outside the registry lock: a record's drop may take its own
        // queue mutex, and the two tiers are never held together.
        drop(drained);
        if count > 0 {
            info!("Registry cleared, {} records released", count);
        }
        count
    }

    /// Consistency walk: the keys of all members, head to tail.
    #[must_use]
    pub fn snapshot_keys(&self) -> Vec<ConnectionKey> {
        self.members.lock().iter().map(|m| *m.key()).collect()
    }

    /// Shared statistics
    #[must_use]
    pub fn stats(&self) -> &RegistryStats {
        &self.stats
    }

    /// Clone the shared statistics handle, for wiring into records and the
    /// reinjection driver.
    #[must_use]
    pub fn stats_handle(&self) -> Arc<RegistryStats> {
        Arc::clone(&self.stats)
    }
}
