//! Error types for intercept-track
//!
//! This module defines the error hierarchy for the connection-tracking core.
//! Errors are categorized by subsystem and include recovery hints.
//!
//! A failed lookup is *not* an error: `find_by_socket` and friends return
//! `Option` because absence is a normal outcome for a tracker.

use std::io;

use thiserror::Error;

/// Top-level error type for intercept-track
#[derive(Debug, Error)]
pub enum InterceptError {
    /// Configuration errors (file parsing, validation)
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Tracking and reinjection errors
    #[error("Tracking error: {0}")]
    Track(#[from] TrackError),

    /// I/O errors not covered by other categories
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl InterceptError {
    /// Check if this error is recoverable (can retry operation)
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Config(e) => e.is_recoverable(),
            Self::Track(e) => e.is_recoverable(),
            Self::Io(e) => matches!(
                e.kind(),
                io::ErrorKind::TimedOut
                    | io::ErrorKind::Interrupted
                    | io::ErrorKind::WouldBlock
            ),
        }
    }
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File not found or inaccessible
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },

    /// JSON parsing error
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Validation error (invalid values, missing required fields)
    #[error("Configuration validation failed: {0}")]
    ValidationError(String),

    /// I/O error while reading config
    #[error("I/O error reading configuration: {0}")]
    IoError(#[from] io::Error),
}

impl ConfigError {
    /// Config errors are generally not recoverable without user intervention
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        false
    }
}

/// Tracking and reinjection errors
#[derive(Debug, Error)]
pub enum TrackError {
    /// Deferred-packet queue at capacity; the packet was not stored.
    ///
    /// This is the crate's allocation-failure surface: the failed enqueue
    /// leaves no partial state behind.
    #[error("Deferred queue full ({len}/{capacity})")]
    QueueFull { len: usize, capacity: usize },

    /// The transport stack rejected at least one packet during a drain.
    ///
    /// Carries the code of the *last* failing submission; earlier failures
    /// in the same drain are logged but not surfaced.
    #[error("Reinjection failed: {0}")]
    Submission(#[from] SubmitError),
}

impl TrackError {
    /// Check if this error is recoverable
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        match self {
            // Queue pressure clears as packets are reinjected or discarded
            Self::QueueFull { .. } => true,
            // The drain completed; the caller may retry upstream if desired
            Self::Submission(_) => true,
        }
    }

    /// Create a queue-full error
    #[must_use]
    pub const fn queue_full(len: usize, capacity: usize) -> Self {
        Self::QueueFull { len, capacity }
    }
}

/// Rejection of a single packet by the transport-stack submission interface.
///
/// The code is the raw errno-style value returned by the collaborator; the
/// core records it without interpreting it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("transport stack returned code {code}")]
pub struct SubmitError {
    /// Raw error code from the submission call
    pub code: i32,
}

impl SubmitError {
    /// Wrap a raw submission error code
    #[must_use]
    pub const fn new(code: i32) -> Self {
        Self { code }
    }
}

/// Type alias for Result with InterceptError
pub type Result<T> = std::result::Result<T, InterceptError>;
