//! Connection identity types
//!
//! A tracked connection is identified two ways: by the opaque socket handle
//! the transport stack assigned to it, and by its IPv4 address/port tuple.
//! Both are fixed at record construction and never change afterwards.

use std::fmt;
use std::net::Ipv4Addr;
use std::ops::BitOr;

use serde::{Deserialize, Serialize};

/// IPv4 address/port tuple identifying a tracked connection.
///
/// Immutable once set on a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct ConnectionKey {
    /// Source (local) address
    pub src_addr: Ipv4Addr,
    /// Destination (remote) address
    pub dst_addr: Ipv4Addr,
    /// Source (local) port
    pub src_port: u16,
    /// Destination (remote) port
    pub dst_port: u16,
}

impl ConnectionKey {
    /// Create a new connection key
    #[must_use]
    pub const fn new(src_addr: Ipv4Addr, src_port: u16, dst_addr: Ipv4Addr, dst_port: u16) -> Self {
        Self {
            src_addr,
            dst_addr,
            src_port,
            dst_port,
        }
    }

    /// Check whether this key's destination side matches the given endpoint
    #[must_use]
    pub fn matches_destination(&self, dst_addr: Ipv4Addr, dst_port: u16) -> bool {
        self.dst_addr == dst_addr && self.dst_port == dst_port
    }
}

impl fmt::Display for ConnectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{} <-> {}:{}",
            self.src_addr, self.src_port, self.dst_addr, self.dst_port
        )
    }
}

/// Opaque handle correlating a record with the transport stack's own
/// connection object.
///
/// Compared by identity only; the core never interprets the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct SocketHandle(pub u64);

impl fmt::Display for SocketHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:x}", self.0)
    }
}

/// Direction and out-of-band hints passed through to the transport stack's
/// submission call.
///
/// The core stores these untouched alongside each deferred packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct SubmitFlags(u32);

impl SubmitFlags {
    /// No hints
    pub const NONE: Self = Self(0);
    /// Out-of-band (urgent) data
    pub const OOB: Self = Self(1);
    /// Record (datagram) boundary
    pub const RECORD: Self = Self(1 << 1);

    /// Construct from a raw bit pattern
    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Raw bit pattern
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Check whether all bits of `other` are set
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for SubmitFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}
