//! Canonical error types for the crate.
//!
//! [`LinkError`] is what applications see from [`Link`](crate::Link);
//! [`ConfigError`] is returned when a [`LinkConfig`](crate::LinkConfig)
//! fails validation.

use std::io;

use thiserror::Error;
use tokio::task::JoinError;

use crate::frame::FrameError;

/// Errors surfaced by a [`Link`](crate::Link).
///
/// Checksum failures never appear here: they are answered with a RETX frame
/// inside the controller.
#[derive(Debug, Error)]
pub enum LinkError {
    /// Reading from or writing to the transport failed.
    #[error("transport error: {0}")]
    Io(#[from] io::Error),

    /// The frame to send was malformed.
    #[error("invalid frame: {0}")]
    Frame(#[from] FrameError),

    /// The receive loop has ended and every queued frame has been consumed,
    /// or a send was attempted after the write loop stopped.
    #[error("link closed")]
    Closed,

    /// No frame arrived within the receive timeout.
    #[error("timed out waiting for a frame")]
    Timeout,

    /// Too many consecutive checksum failures, which usually means frame
    /// boundaries have drifted after a lost or injected byte.
    #[error("suspected stream desynchronisation after {consecutive} consecutive checksum failures")]
    SuspectedDesync {
        /// Number of consecutive corrupt frames observed.
        consecutive: usize,
    },

    /// A link task panicked or was aborted.
    #[error("link task failed: {0}")]
    Task(#[from] JoinError),
}

impl LinkError {
    /// Returns true if the link ended without a failure.
    #[must_use]
    pub fn is_closed(&self) -> bool { matches!(self, Self::Closed) }
}

/// Invalid [`LinkConfig`](crate::LinkConfig) values.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Transport reads need a buffer of at least one byte.
    #[error("read chunk size must be at least 1 byte")]
    ZeroReadChunk,

    /// A zero threshold would fire before any frame is seen.
    #[error("desync threshold must be at least 1")]
    ZeroDesyncThreshold,

    /// A zero timeout would fail every receive immediately.
    #[error("receive timeout must be non-zero")]
    ZeroReceiveTimeout,
}
