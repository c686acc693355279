//! Deferred-packet reinjection
//!
//! The [`ReinjectionDriver`] is the only place where the tracking core
//! crosses into the transport stack: once the interception point decides a
//! connection may proceed, the driver drains that connection's deferred
//! queue and hands every packet to the configured [`PacketSink`].
//!
//! A failing submission does not stop the drain; the queue is always empty
//! afterwards and the last failure code is surfaced to the caller.

use std::net::SocketAddrV4;
use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, warn};

use crate::error::{SubmitError, TrackError};
use crate::track::{ConnectionRecord, RegistryStats, SocketHandle, SubmitFlags};

/// Transport-stack packet submission interface.
///
/// Implementations take ownership of `payload` and `control` on every call,
/// success or failure; the core never retains them afterwards.
pub trait PacketSink: Send + Sync {
    /// Submit one packet for normal delivery.
    ///
    /// # Errors
    ///
    /// Returns the transport stack's rejection code for this packet.
    fn submit(
        &self,
        socket: SocketHandle,
        destination: SocketAddrV4,
        payload: Bytes,
        control: Option<Bytes>,
        flags: SubmitFlags,
    ) -> Result<(), SubmitError>;
}

/// Drains a record's deferred queue into a [`PacketSink`].
pub struct ReinjectionDriver {
    sink: Arc<dyn PacketSink>,
    stats: Arc<RegistryStats>,
}

impl ReinjectionDriver {
    /// Create a driver forwarding to `sink`.
    ///
    /// `stats` is normally the registry's shared handle
    /// ([`crate::track::ConnectionRegistry::stats_handle`]).
    #[must_use]
    pub fn new(sink: Arc<dyn PacketSink>, stats: Arc<RegistryStats>) -> Self {
        Self { sink, stats }
    }

    /// Drain the record's queue, submitting every buffered packet in FIFO
    /// order with the record's socket handle.
    ///
    /// # Errors
    ///
    /// Returns the last failing submission's code if any packet was
    /// rejected. The queue is empty afterwards either way.
    pub fn drain(&self, record: &ConnectionRecord) -> Result<(), TrackError> {
        let socket = record.socket();
        debug!("Reinjecting deferred packets for {}", record.key());

        let result = record.queue().drain_and_reinject(|packet| {
            let outcome = self.sink.submit(
                socket,
                packet.destination,
                packet.payload,
                packet.control,
                packet.flags,
            );
            match outcome {
                Ok(()) => self.stats.record_reinjected(),
                Err(e) => {
                    self.stats.record_reinjection_failure();
                    warn!(
                        "Reinjection on socket {} failed with code {}",
                        socket, e.code
                    );
                }
            }
            outcome
        });

        if result.is_ok() {
            debug!("Drain complete for socket {}", socket);
        }
        result
    }
}
