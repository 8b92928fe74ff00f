//! Tokio codec for the fixed-size frame format.
//!
//! [`FrameCodec`] plugs the frame layout into `tokio_util::codec`, so a
//! transport can be wrapped in `FramedRead`/`FramedWrite` when the caller
//! wants a plain stream of frames. Like [`StreamAssembler`], the decoder
//! slices the stream every [`FRAME_LEN`] bytes and does not validate
//! checksums; the retransmission logic lives in [`crate::controller`].
//!
//! [`StreamAssembler`]: crate::StreamAssembler

use std::io;

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};

use crate::{
    assembler::split_frame,
    frame::{FRAME_LEN, Frame},
};

pub mod error;

pub use error::{CodecError, EofError};

/// Decoder and encoder for 18-byte frames.
///
/// # Examples
///
/// ```
/// use bytes::BytesMut;
/// use serialframe::{codec::FrameCodec, frame::Frame};
/// use tokio_util::codec::{Decoder, Encoder};
///
/// let mut codec = FrameCodec::new();
/// let mut buf = BytesMut::new();
/// codec
///     .encode(Frame::ack(), &mut buf)
///     .expect("encoding into memory cannot fail");
/// let frame = codec.decode(&mut buf).expect("decode").expect("complete frame");
/// assert_eq!(frame, Frame::ack());
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameCodec;

impl FrameCodec {
    /// Construct a new codec.
    #[must_use]
    pub const fn new() -> Self { Self }
}

impl Decoder for FrameCodec {
    type Item = Frame;
    type Error = io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.len() < FRAME_LEN {
            src.reserve(FRAME_LEN - src.len());
            return Ok(None);
        }
        Ok(split_frame(src))
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(frame) = self.decode(src)? {
            return Ok(Some(frame));
        }
        if src.is_empty() {
            return Ok(None);
        }
        let err = CodecError::Eof(EofError::MidFrame {
            bytes_received: src.len(),
            expected: FRAME_LEN,
        });
        tracing::debug!(error = %err, "partial frame at end of stream");
        Err(err.into())
    }
}

impl Encoder<Frame> for FrameCodec {
    type Error = io::Error;

    fn encode(&mut self, item: Frame, dst: &mut BytesMut) -> Result<(), Self::Error> {
        dst.extend_from_slice(&item.to_bytes());
        Ok(())
    }
}
