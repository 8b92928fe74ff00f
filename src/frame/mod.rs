//! Fixed-size frame model and its wire encoding.
//!
//! Every frame occupies exactly [`FRAME_LEN`] bytes on the wire:
//!
//! ```text
//! [length:1][payload:16][crc:1]
//! ```
//!
//! The first `length` payload bytes carry data and the rest are padded with
//! [`PADDING`]. The trailing byte is the CRC-8 of the length byte followed by
//! all sixteen payload bytes. Decoding never validates; call
//! [`Frame::verify`] to check the carried checksum.

mod error;
mod kind;

pub use error::FrameError;
pub use kind::FrameKind;

use crate::crc;

/// Largest valid value of the length byte.
pub const MAX_LENGTH: u8 = 16;
/// Number of payload bytes carried by every frame, padding included.
pub const PAYLOAD_LEN: usize = MAX_LENGTH as usize;
/// Total size of an encoded frame.
pub const FRAME_LEN: usize = PAYLOAD_LEN + 2;
/// Number of leading bytes covered by the checksum.
pub const CRC_INPUT_LEN: usize = PAYLOAD_LEN + 1;
/// Value used to fill unused payload bytes.
pub const PADDING: u8 = 0xFF;
/// Sentinel carried by an acknowledgement frame.
pub const ACK: u8 = 0x15;
/// Sentinel carried by a retransmission request frame.
pub const RETX: u8 = 0x19;

/// A single frame as carried on the wire.
///
/// Fields are public so that received frames can be inspected verbatim. A
/// frame built with [`Frame::new`] always has `0xFF` padding and a correct
/// checksum; a frame obtained from [`decode`] carries whatever arrived.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Frame {
    /// Number of meaningful payload bytes, `1..=16` for well-formed frames.
    pub length: u8,
    /// Payload bytes followed by padding.
    pub payload: [u8; PAYLOAD_LEN],
    /// Checksum as carried on the wire.
    pub crc: u8,
}

impl Frame {
    /// Build a frame carrying the first `length` bytes of `payload`.
    ///
    /// Bytes past `length` are dropped and the rest of the sixteen-byte
    /// payload is filled with [`PADDING`]. The checksum is computed over the
    /// length byte and the padded payload.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::PayloadTooLong`] if `payload` exceeds sixteen
    /// bytes and [`FrameError::InvalidLength`] if `length` is outside `1..=16`.
    ///
    /// # Examples
    ///
    /// ```
    /// use serialframe::frame::{Frame, PADDING};
    ///
    /// let frame = Frame::new(4, &[5, 6, 7, 8]).expect("valid frame");
    /// assert_eq!(frame.data(), &[5, 6, 7, 8]);
    /// assert!(frame.payload[4..].iter().all(|&b| b == PADDING));
    /// assert!(frame.verify().is_ok());
    /// ```
    pub fn new(length: u8, payload: &[u8]) -> Result<Self, FrameError> {
        if payload.len() > PAYLOAD_LEN {
            return Err(FrameError::PayloadTooLong { len: payload.len() });
        }
        if length == 0 || length > MAX_LENGTH {
            return Err(FrameError::InvalidLength { length });
        }
        let carried = payload.len().min(usize::from(length));
        let mut padded = [PADDING; PAYLOAD_LEN];
        padded[..carried].copy_from_slice(&payload[..carried]);
        Ok(Self::sealed(length, padded))
    }

    /// Build a frame whose length is taken from `data`.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError`] if `data` is empty or longer than sixteen bytes.
    pub fn from_data(data: &[u8]) -> Result<Self, FrameError> {
        let length = u8::try_from(data.len())
            .map_err(|_| FrameError::PayloadTooLong { len: data.len() })?;
        Self::new(length, data)
    }

    /// The acknowledgement control frame.
    #[must_use]
    pub const fn ack() -> Self { Self::control(ACK) }

    /// The retransmission request control frame.
    #[must_use]
    pub const fn retx() -> Self { Self::control(RETX) }

    const fn control(sentinel: u8) -> Self {
        let mut payload = [PADDING; PAYLOAD_LEN];
        payload[0] = sentinel;
        Self::sealed(1, payload)
    }

    const fn sealed(length: u8, payload: [u8; PAYLOAD_LEN]) -> Self {
        Self {
            length,
            payload,
            crc: checksum(length, &payload),
        }
    }

    /// Checksum the frame should carry given its length and payload.
    #[must_use]
    pub const fn expected_crc(&self) -> u8 { checksum(self.length, &self.payload) }

    /// Check the carried checksum against the recomputed one.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::ChecksumMismatch`] when they differ.
    pub fn verify(&self) -> Result<(), FrameError> {
        let expected = self.expected_crc();
        if expected == self.crc {
            Ok(())
        } else {
            Err(FrameError::ChecksumMismatch {
                expected,
                actual: self.crc,
            })
        }
    }

    /// Whether the carried checksum is correct.
    #[must_use]
    pub fn is_valid(&self) -> bool { self.verify().is_ok() }

    /// Classify the frame as acknowledgement, retransmission request or data.
    ///
    /// A frame is a control frame only if it matches the control frame
    /// exactly, padding and checksum included.
    #[must_use]
    pub fn kind(&self) -> FrameKind {
        if *self == Self::ack() {
            FrameKind::Ack
        } else if *self == Self::retx() {
            FrameKind::Retx
        } else {
            FrameKind::Data
        }
    }

    /// Meaningful payload bytes.
    ///
    /// Lengths above sixteen, which only a misbehaving peer can produce, are
    /// clamped to the payload size.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        let len = usize::from(self.length).min(PAYLOAD_LEN);
        &self.payload[..len]
    }

    /// Wire representation, carrying the stored checksum verbatim.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; FRAME_LEN] {
        let mut out = [0u8; FRAME_LEN];
        out[0] = self.length;
        out[1..=PAYLOAD_LEN].copy_from_slice(&self.payload);
        out[FRAME_LEN - 1] = self.crc;
        out
    }
}

const fn checksum(length: u8, payload: &[u8; PAYLOAD_LEN]) -> u8 {
    let mut covered = [0u8; CRC_INPUT_LEN];
    covered[0] = length;
    let mut i = 0;
    while i < PAYLOAD_LEN {
        covered[i + 1] = payload[i];
        i += 1;
    }
    crc::compute(&covered)
}

/// Encode `length` and `payload` into an 18-byte frame.
///
/// # Errors
///
/// See [`Frame::new`].
///
/// # Examples
///
/// ```
/// use serialframe::frame::encode;
///
/// let bytes = encode(7, b"ABCDEFG").expect("valid frame");
/// assert_eq!(bytes[0], 7);
/// assert_eq!(bytes[17], 0x39);
/// ```
pub fn encode(length: u8, payload: &[u8]) -> Result<[u8; FRAME_LEN], FrameError> {
    Frame::new(length, payload).map(|frame| frame.to_bytes())
}

/// Split an 18-byte frame into its fields without validating it.
#[must_use]
pub fn decode(bytes: &[u8; FRAME_LEN]) -> Frame {
    let mut payload = [0u8; PAYLOAD_LEN];
    payload.copy_from_slice(&bytes[1..=PAYLOAD_LEN]);
    Frame {
        length: bytes[0],
        payload,
        crc: bytes[FRAME_LEN - 1],
    }
}
