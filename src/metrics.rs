//! Metric helpers for `serialframe`.
//!
//! This module defines metric names and simple helper functions wrapping
//! the [`metrics`](https://docs.rs/metrics) crate. With the `metrics`
//! feature disabled the helpers compile to no-ops.

#[cfg(feature = "metrics")]
use metrics::counter;

/// Name of the counter tracking frames moved across the link.
pub const FRAMES_TOTAL: &str = "serialframe_frames_total";
/// Name of the counter tracking frames rejected by their checksum.
pub const CRC_ERRORS_TOTAL: &str = "serialframe_crc_errors_total";
/// Name of the counter tracking frames resent on a peer's request.
pub const RETRANSMISSIONS_TOTAL: &str = "serialframe_retransmissions_total";

/// Direction of frame processing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// Frames received from the peer.
    Inbound,
    /// Frames written to the peer.
    Outbound,
}

impl Direction {
    /// Label value used for this direction.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Inbound => "inbound",
            Direction::Outbound => "outbound",
        }
    }
}

/// Record a frame for the given direction.
pub fn inc_frames(direction: Direction) {
    #[cfg(feature = "metrics")]
    counter!(FRAMES_TOTAL, "direction" => direction.as_str()).increment(1);
    #[cfg(not(feature = "metrics"))]
    let _ = direction;
}

/// Record a checksum failure.
pub fn inc_crc_errors() {
    #[cfg(feature = "metrics")]
    counter!(CRC_ERRORS_TOTAL).increment(1);
}

/// Record a retransmission served from the last-sent cache.
pub fn inc_retransmissions() {
    #[cfg(feature = "metrics")]
    counter!(RETRANSMISSIONS_TOTAL).increment(1);
}
