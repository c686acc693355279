//! Per-connection deferred-packet buffering
//!
//! Outbound packets that arrive before a connection's disposition is known
//! are parked here in arrival order. Once the interception point decides to
//! let the connection proceed, the queue is drained head-first and every
//! packet is handed to the transport stack's submission interface. If the
//! connection is torn down instead, the queue is discarded without any
//! submission call.
//!
//! The queue's mutex guards only this queue; it is never held together with
//! the registry lock.

use std::collections::VecDeque;
use std::net::SocketAddrV4;

use bytes::Bytes;
use parking_lot::Mutex;
use tracing::{debug, warn};

use super::key::SubmitFlags;
use crate::error::{SubmitError, TrackError};

/// One packet awaiting replay.
///
/// Ownership of the buffers transfers to the submission call on reinjection,
/// success or failure; a packet still queued when the owning record is
/// destroyed is simply dropped.
#[derive(Debug, Clone)]
pub struct DeferredPacket {
    /// Packet data
    pub payload: Bytes,
    /// Ancillary/out-of-band data, if any
    pub control: Option<Bytes>,
    /// Direction/OOB hints for the submission call
    pub flags: SubmitFlags,
    /// Address to submit to
    pub destination: SocketAddrV4,
}

/// Ordered, mutex-guarded buffer of packets awaiting reinjection.
#[derive(Debug)]
pub struct DeferredPacketQueue {
    packets: Mutex<VecDeque<DeferredPacket>>,
    capacity: usize,
}

impl DeferredPacketQueue {
    /// Create an empty queue bounded at `capacity` packets
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            packets: Mutex::new(VecDeque::new()),
            capacity,
        }
    }

    /// Append a packet at the tail.
    ///
    /// # Errors
    ///
    /// Returns `TrackError::QueueFull` when the queue is at capacity; the
    /// queue is left unchanged in that case.
    pub fn enqueue(
        &self,
        payload: Bytes,
        control: Option<Bytes>,
        flags: SubmitFlags,
        destination: SocketAddrV4,
    ) -> Result<(), TrackError> {
        let mut packets = self.packets.lock();

        if packets.len() >= self.capacity {
            warn!(
                "Deferred queue full ({}/{}), dropping packet for {}",
                packets.len(),
                self.capacity,
                destination
            );
            return Err(TrackError::queue_full(packets.len(), self.capacity));
        }

        packets.push_back(DeferredPacket {
            payload,
            control,
            flags,
            destination,
        });

        Ok(())
    }

    /// Drain the queue head-first, submitting every packet.
    ///
    /// Packets are removed and submitted in FIFO order. A failing `submit`
    /// call does NOT stop the drain: every packet is removed from the queue
    /// regardless, so nothing is left orphaned behind an earlier failure.
    /// The queue mutex is held across the whole drain, so concurrent
    /// enqueuers are ordered entirely before or after it.
    ///
    /// # Errors
    ///
    /// Returns the error of the *last* failing submission, if any.
    pub fn drain_and_reinject<F>(&self, mut submit: F) -> Result<(), TrackError>
    where
        F: FnMut(DeferredPacket) -> Result<(), SubmitError>,
    {
        let mut packets = self.packets.lock();
        let mut last_err: Option<SubmitError> = None;

        while let Some(packet) = packets.pop_front() {
            if let Err(e) = submit(packet) {
                debug!("Packet submission failed with code {}", e.code);
                last_err = Some(e);
            }
        }

        match last_err {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }

    /// Remove and drop every packet without submitting any of them.
    ///
    /// Returns the number of packets discarded.
    pub fn discard_all(&self) -> usize {
        let mut packets = self.packets.lock();
        let count = packets.len();
        packets.clear();
        count
    }

    /// Number of packets currently buffered
    #[must_use]
    pub fn len(&self) -> usize {
        self.packets.lock().len()
    }

    /// Check whether the queue is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.packets.lock().is_empty()
    }
}
