//! Connection records
//!
//! One `ConnectionRecord` per tracked connection: its address tuple, the
//! transport stack's socket handle, and the connection's own deferred-packet
//! queue. Records are shared as `Arc<ConnectionRecord>` and compared by
//! pointer identity, never by key equality, so two records with identical
//! tuples remain distinct members.
//!
//! Lifecycle: a record is constructed unregistered, inserted into exactly one
//! registry by the interception point, removed again on connection teardown,
//! and destroyed when the last reference drops. Destruction discards any
//! still-buffered packets without submitting them; only an explicit drain via
//! [`crate::reinject::ReinjectionDriver`] ever forwards buffered traffic.

use std::net::SocketAddrV4;
use std::sync::Arc;

use bytes::Bytes;
use tracing::debug;

use super::key::{ConnectionKey, SocketHandle, SubmitFlags};
use super::queue::DeferredPacketQueue;
use super::stats::RegistryStats;
use crate::config::TrackerConfig;
use crate::error::TrackError;

/// One tracked connection
#[derive(Debug)]
pub struct ConnectionRecord {
    key: ConnectionKey,
    socket: SocketHandle,
    queue: DeferredPacketQueue,
    stats: Arc<RegistryStats>,
}

impl ConnectionRecord {
    /// Create a new, unregistered record with an empty queue.
    ///
    /// `stats` is normally the owning registry's handle
    /// ([`crate::track::ConnectionRegistry::stats_handle`]), shared so that
    /// packet movement on this record shows up in the same snapshot.
    #[must_use]
    pub fn new(
        key: ConnectionKey,
        socket: SocketHandle,
        config: &TrackerConfig,
        stats: Arc<RegistryStats>,
    ) -> Arc<Self> {
        Arc::new(Self {
            key,
            socket,
            queue: DeferredPacketQueue::new(config.max_deferred_packets),
            stats,
        })
    }

    /// The record's address tuple
    #[must_use]
    pub fn key(&self) -> &ConnectionKey {
        &self.key
    }

    /// The transport stack's handle for this connection
    #[must_use]
    pub fn socket(&self) -> SocketHandle {
        self.socket
    }

    /// The record's deferred-packet queue
    #[must_use]
    pub fn queue(&self) -> &DeferredPacketQueue {
        &self.queue
    }

    /// Buffer an outbound packet for later reinjection.
    ///
    /// # Errors
    ///
    /// Returns `TrackError::QueueFull` when the per-connection buffer is at
    /// capacity; the packet is not stored and no partial state remains.
    pub fn defer_packet(
        &self,
        payload: Bytes,
        control: Option<Bytes>,
        flags: SubmitFlags,
        destination: SocketAddrV4,
    ) -> Result<(), TrackError> {
        self.queue.enqueue(payload, control, flags, destination)?;
        self.stats.record_deferred();
        debug!(
            "Deferred packet for {} on socket {} ({} buffered)",
            self.key,
            self.socket,
            self.queue.len()
        );
        Ok(())
    }

    /// Check whether two record handles refer to the same record
    #[must_use]
    pub fn same_record(a: &Arc<Self>, b: &Arc<Self>) -> bool {
        Arc::ptr_eq(a, b)
    }
}

impl Drop for ConnectionRecord {
    fn drop(&mut self) {
        // Teardown path: buffered packets are dropped, never forwarded
        let discarded = self.queue.discard_all();
        if discarded > 0 {
            self.stats.record_discarded(discarded as u64);
            debug!(
                "Destroying record for {} with {} packets discarded",
                self.key, discarded
            );
        }
    }
}
