//! In-memory peer harness for driving a [`Link`] from the remote side.

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use serialframe::{Frame, FrameCodec, Link, LinkConfig};
use tokio::io::{AsyncWriteExt, DuplexStream, duplex};
use tokio_util::codec::Framed;

/// Buffer size of each direction of the in-memory transport.
pub const DEFAULT_CAPACITY: usize = 4096;

/// How long [`Peer::expect_frame`] waits before failing the test.
pub const PEER_TIMEOUT: Duration = Duration::from_secs(2);

/// Start a link with the default configuration and return it with its peer.
///
/// Must be called inside a Tokio runtime.
#[must_use]
pub fn connected() -> (Link, Peer) { connected_with_config(LinkConfig::default()) }

/// Start a link with `config` and return it with its peer.
#[must_use]
pub fn connected_with_config(config: LinkConfig) -> (Link, Peer) {
    let (local, remote) = duplex(DEFAULT_CAPACITY);
    (Link::with_config(local, config), Peer::new(remote))
}

/// Build a valid data frame carrying `data`.
///
/// # Panics
///
/// Panics if `data` is longer than a frame payload.
#[must_use]
pub fn data_frame(data: &[u8]) -> Frame { Frame::from_data(data).expect("test payload fits a frame") }

/// Copy of `frame` whose checksum no longer matches.
#[must_use]
pub fn corrupted(frame: Frame) -> Frame {
    let mut bad = frame;
    bad.crc ^= 0xA5;
    bad
}

/// The remote end of a link, speaking raw frames.
///
/// The peer runs no protocol of its own: it writes exactly what the test
/// asks for and reports every frame the link writes, ACKs and RETX requests
/// included.
#[derive(Debug)]
pub struct Peer {
    framed: Framed<DuplexStream, FrameCodec>,
}

impl Peer {
    /// Wrap the remote half of a transport.
    #[must_use]
    pub fn new(io: DuplexStream) -> Self {
        Self {
            framed: Framed::new(io, FrameCodec::new()),
        }
    }

    /// Write `frame` to the link, checksum and all.
    ///
    /// # Panics
    ///
    /// Panics if the link side has gone away.
    pub async fn send_frame(&mut self, frame: Frame) {
        self.framed.send(frame).await.expect("peer write failed");
    }

    /// Write arbitrary bytes to the link without framing them.
    ///
    /// # Panics
    ///
    /// Panics if the link side has gone away.
    pub async fn send_raw(&mut self, bytes: &[u8]) {
        let io = self.framed.get_mut();
        io.write_all(bytes).await.expect("peer write failed");
        io.flush().await.expect("peer flush failed");
    }

    /// Wait up to [`PEER_TIMEOUT`] for the next frame written by the link.
    ///
    /// Returns `None` on timeout or once the link's write side is closed.
    ///
    /// # Panics
    ///
    /// Panics if the link leaves a partial frame behind at EOF.
    pub async fn next_frame(&mut self) -> Option<Frame> {
        self.next_frame_within(PEER_TIMEOUT).await
    }

    /// As [`next_frame`](Self::next_frame) with an explicit wait.
    ///
    /// # Panics
    ///
    /// Panics if the link leaves a partial frame behind at EOF.
    pub async fn next_frame_within(&mut self, wait: Duration) -> Option<Frame> {
        tokio::time::timeout(wait, self.framed.next())
            .await
            .ok()
            .flatten()
            .map(|res| res.expect("link wrote a malformed stream"))
    }

    /// Wait for the next frame and fail the test if none arrives.
    ///
    /// # Panics
    ///
    /// Panics on timeout or EOF.
    pub async fn expect_frame(&mut self) -> Frame {
        self.next_frame()
            .await
            .expect("expected a frame from the link")
    }

    /// Close the peer's side, which the link sees as EOF.
    pub fn close(self) { drop(self.framed); }
}
