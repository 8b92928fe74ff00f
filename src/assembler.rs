//! Reassembly of fixed-size frames from an arbitrary chunked byte stream.
//!
//! Bytes are appended in arrival order and sliced into consecutive
//! [`FRAME_LEN`]-byte frames from the head of the buffer. There is no
//! synchronisation marker in the wire format, so alignment is assumed: a
//! single lost or injected byte shifts every later frame boundary. Corrupted
//! frames produced this way are still rejected by their checksum, but the
//! assembler itself never realigns.

use bytes::{Buf, BytesMut};

use crate::frame::{FRAME_LEN, Frame, decode};

/// Growable receive buffer yielding whole frames.
///
/// # Examples
///
/// ```
/// use serialframe::{StreamAssembler, frame::Frame};
///
/// let bytes = Frame::from_data(b"hi").expect("valid frame").to_bytes();
/// let mut assembler = StreamAssembler::new();
/// assembler.push(&bytes[..10]);
/// assert!(assembler.next_frame().is_none());
/// assembler.push(&bytes[10..]);
/// assert_eq!(assembler.next_frame().expect("complete frame").data(), b"hi");
/// ```
#[derive(Debug, Default)]
pub struct StreamAssembler {
    buffer: BytesMut,
}

impl StreamAssembler {
    /// Create an empty assembler.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Create an assembler with room for `capacity` bytes before reallocating.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(capacity),
        }
    }

    /// Append newly received bytes.
    pub fn push(&mut self, chunk: &[u8]) { self.buffer.extend_from_slice(chunk); }

    /// Remove and decode the oldest complete frame, if one is buffered.
    pub fn next_frame(&mut self) -> Option<Frame> { split_frame(&mut self.buffer) }

    /// Iterate over every complete frame currently buffered.
    ///
    /// Frames are removed as the iterator advances; bytes that do not yet
    /// form a whole frame stay buffered.
    pub fn frames(&mut self) -> impl Iterator<Item = Frame> + '_ {
        std::iter::from_fn(move || self.next_frame())
    }

    /// Number of buffered bytes not yet consumed as a frame.
    #[must_use]
    pub fn pending(&self) -> usize { self.buffer.len() }

    /// Drop all buffered bytes.
    pub fn clear(&mut self) { self.buffer.clear(); }
}

/// Take one frame off the head of `src` when at least [`FRAME_LEN`] bytes
/// are available.
pub(crate) fn split_frame(src: &mut BytesMut) -> Option<Frame> {
    let head: &[u8; FRAME_LEN] = src.get(..FRAME_LEN)?.try_into().ok()?;
    let frame = decode(head);
    src.advance(FRAME_LEN);
    Some(frame)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn stream_of(frames: &[Frame]) -> Vec<u8> {
        frames.iter().flat_map(Frame::to_bytes).collect()
    }

    fn sample_frames() -> Vec<Frame> {
        vec![
            Frame::from_data(b"first").expect("valid frame"),
            Frame::ack(),
            Frame::from_data(b"sixteen bytes!!!").expect("valid frame"),
        ]
    }

    #[rstest]
    #[case(1)]
    #[case(7)]
    #[case(17)]
    #[case(18)]
    #[case(19)]
    #[case(64)]
    fn reassembles_across_chunk_boundaries(#[case] chunk_size: usize) {
        let frames = sample_frames();
        let bytes = stream_of(&frames);
        let mut assembler = StreamAssembler::new();
        let mut out = Vec::new();
        for chunk in bytes.chunks(chunk_size) {
            assembler.push(chunk);
            out.extend(assembler.frames());
        }
        assert_eq!(out, frames);
        assert_eq!(assembler.pending(), 0);
    }

    #[test]
    fn keeps_partial_tail_buffered() {
        let bytes = stream_of(&sample_frames());
        let mut assembler = StreamAssembler::with_capacity(64);
        assembler.push(&bytes[..FRAME_LEN + 5]);
        assert_eq!(assembler.frames().count(), 1);
        assert_eq!(assembler.pending(), 5);
    }

    #[test]
    fn lost_byte_misaligns_following_frames() {
        let frames = sample_frames();
        let mut bytes = stream_of(&frames);
        bytes.remove(3);
        let mut assembler = StreamAssembler::new();
        assembler.push(&bytes);
        let decoded: Vec<Frame> = assembler.frames().collect();
        assert_eq!(decoded.len(), 2);
        assert!(decoded.iter().all(|frame| !frame.is_valid()));
        assert_eq!(assembler.pending(), FRAME_LEN - 1);
    }

    #[test]
    fn clear_discards_buffered_bytes() {
        let mut assembler = StreamAssembler::new();
        assembler.push(&[1, 2, 3]);
        assembler.clear();
        assert_eq!(assembler.pending(), 0);
        assert!(assembler.next_frame().is_none());
    }
}
