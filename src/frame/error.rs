//! Errors raised while building or validating frames.

use thiserror::Error;

use super::PAYLOAD_LEN;

/// Frame construction and validation failures.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum FrameError {
    /// Length byte outside the `1..=16` range.
    #[error("invalid frame length {length}: must be between 1 and {max}", max = PAYLOAD_LEN)]
    InvalidLength {
        /// Rejected length value.
        length: u8,
    },

    /// More payload bytes than fit in a frame.
    #[error("payload of {len} bytes exceeds the {max}-byte frame capacity", max = PAYLOAD_LEN)]
    PayloadTooLong {
        /// Length of the rejected payload.
        len: usize,
    },

    /// Carried checksum differs from the recomputed one.
    #[error("frame checksum mismatch: expected {expected:#04x}, got {actual:#04x}")]
    ChecksumMismatch {
        /// Checksum recomputed over the length and payload.
        expected: u8,
        /// Checksum carried by the frame.
        actual: u8,
    },
}
