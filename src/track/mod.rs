//! Connection tracking core
//!
//! This module provides the in-memory tracking state:
//! - [`ConnectionKey`] / [`SocketHandle`]: connection identity
//! - [`DeferredPacketQueue`]: per-connection packet buffering
//! - [`ConnectionRecord`]: one tracked connection
//! - [`ConnectionRegistry`]: the process-wide recency-ordered set
//! - [`RegistryStats`]: shared observability counters

pub mod key;
pub mod queue;
pub mod record;
pub mod registry;
pub mod stats;

pub use key::{ConnectionKey, SocketHandle, SubmitFlags};
pub use queue::{DeferredPacket, DeferredPacketQueue};
pub use record::ConnectionRecord;
pub use registry::ConnectionRegistry;
pub use stats::{RegistryStats, StatsSnapshot};
