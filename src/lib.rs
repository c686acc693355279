//! intercept-track: connection-tracking core for a transparent interception layer
//!
//! This crate maintains the in-memory registry of connections observed by a
//! packet/socket interposition point, and buffers outbound packets that
//! arrive before a connection's disposition is known, replaying them in
//! order once a decision is made.
//!
//! # Architecture
//!
//! ```text
//! Interception point ──> ConnectionRegistry ──> ConnectionRecord
//!        │                  (recency list)       (deferred queue)
//!        │                                             │
//!        └──────────> ReinjectionDriver ──────> PacketSink (transport stack)
//! ```
//!
//! The interception point creates a [`ConnectionRecord`] on first sight of a
//! connection and inserts it into the [`ConnectionRegistry`]. Later packets
//! on the same connection are matched by socket handle or destination tuple
//! and, while the disposition is pending, parked on the record's deferred
//! queue. Once cleared, the [`ReinjectionDriver`] drains the queue into the
//! transport stack's [`PacketSink`] in arrival order. On teardown the record
//! is removed and dropped; anything still buffered is discarded, never
//! forwarded.
//!
//! # Quick Start
//!
//! ```
//! use std::net::{Ipv4Addr, SocketAddrV4};
//! use std::sync::Arc;
//!
//! use bytes::Bytes;
//! use intercept_track::{
//!     ConnectionKey, ConnectionRecord, ConnectionRegistry, PacketSink,
//!     ReinjectionDriver, SocketHandle, SubmitError, SubmitFlags, TrackerConfig,
//! };
//!
//! struct NullSink;
//! impl PacketSink for NullSink {
//!     fn submit(
//!         &self,
//!         _socket: SocketHandle,
//!         _destination: SocketAddrV4,
//!         _payload: Bytes,
//!         _control: Option<Bytes>,
//!         _flags: SubmitFlags,
//!     ) -> Result<(), SubmitError> {
//!         Ok(())
//!     }
//! }
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = TrackerConfig::default();
//! let registry = ConnectionRegistry::new(&config);
//!
//! let key = ConnectionKey::new(
//!     Ipv4Addr::new(10, 0, 0, 2), 49152,
//!     Ipv4Addr::new(93, 184, 216, 34), 443,
//! );
//! let record = ConnectionRecord::new(key, SocketHandle(7), &config, registry.stats_handle());
//! registry.insert(Arc::clone(&record));
//!
//! // A packet arrives before the disposition is known: park it.
//! record.defer_packet(
//!     Bytes::from_static(b"hello"),
//!     None,
//!     SubmitFlags::NONE,
//!     SocketAddrV4::new(Ipv4Addr::new(93, 184, 216, 34), 443),
//! )?;
//!
//! // Decision made: replay everything in order.
//! let driver = ReinjectionDriver::new(Arc::new(NullSink), registry.stats_handle());
//! driver.drain(&record)?;
//!
//! // Teardown: remove, then drop. Buffered packets would be discarded.
//! registry.remove(&record);
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - [`config`]: Configuration types and loading
//! - [`error`]: Error types
//! - [`reinject`]: Reinjection driver and the transport-stack boundary
//! - [`track`]: Registry, records, and deferred-packet queues

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod config;
pub mod error;
pub mod reinject;
pub mod track;

// Re-export commonly used types at the crate root
pub use config::{load_config, load_config_str, DestinationMatch, TrackerConfig};
pub use error::{ConfigError, InterceptError, SubmitError, TrackError};
pub use reinject::{PacketSink, ReinjectionDriver};
pub use track::{
    ConnectionKey, ConnectionRecord, ConnectionRegistry, DeferredPacket, DeferredPacketQueue,
    RegistryStats, SocketHandle, StatsSnapshot, SubmitFlags,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
