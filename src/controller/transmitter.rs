//! Write side of a link: the outbound writer and the last-sent cache.

use std::io;

use tokio::{
    io::{AsyncWrite, AsyncWriteExt},
    sync::watch,
};
use tracing::{debug, error, warn};

use crate::{
    frame::Frame,
    metrics::{self, Direction},
    queue::Outbound,
};

/// What a [`Transmitter`] wrote for one request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transmission {
    /// The requested frame was written.
    Sent(Frame),
    /// The cached frame was written again.
    Retransmitted(Frame),
    /// A retransmission was requested before anything was sent.
    RetxIgnored,
}

/// Serial writer owning the single-slot cache of the last transmitted frame.
///
/// Requests are executed one at a time in the order they are given, so the
/// cache always reflects the last frame actually written and a
/// retransmission resends exactly that frame. The cache is published on a
/// `watch` channel for observers.
#[derive(Debug)]
pub struct Transmitter<W> {
    writer: W,
    last_sent: watch::Sender<Option<Frame>>,
}

impl<W> Transmitter<W>
where
    W: AsyncWrite + Unpin,
{
    /// Create a transmitter writing to `writer` with an empty cache.
    pub fn new(writer: W) -> Self {
        let (last_sent, _) = watch::channel(None);
        Self { writer, last_sent }
    }

    /// Observe the last-sent cache.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<Frame>> { self.last_sent.subscribe() }

    /// Transmit `frame` and remember it as the last frame sent.
    ///
    /// The cache is only updated once the bytes have been written and
    /// flushed.
    ///
    /// # Errors
    ///
    /// Returns the transport's write or flush error.
    pub async fn write_frame(&mut self, frame: Frame) -> io::Result<()> {
        if let Err(e) = self.write_bytes(&frame.to_bytes()).await {
            error!(kind = %frame.kind(), error = %e, "frame send failed");
            return Err(e);
        }
        self.last_sent.send_replace(Some(frame));
        metrics::inc_frames(Direction::Outbound);
        debug!(kind = %frame.kind(), length = frame.length, "frame sent");
        Ok(())
    }

    async fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.writer.write_all(bytes).await?;
        self.writer.flush().await
    }

    /// Resend the cached frame verbatim, checksum included.
    ///
    /// # Errors
    ///
    /// Returns the transport's write or flush error.
    pub async fn retransmit(&mut self) -> io::Result<Transmission> {
        let Some(cached) = self.last_sent() else {
            warn!("retransmission requested before any frame was sent");
            return Ok(Transmission::RetxIgnored);
        };
        metrics::inc_retransmissions();
        debug!(kind = %cached.kind(), "retransmitting last frame");
        self.write_frame(cached).await?;
        Ok(Transmission::Retransmitted(cached))
    }

    /// Carry out one outbound request.
    ///
    /// A confirmed frame reports its own outcome to the waiting sender
    /// before this returns.
    ///
    /// # Errors
    ///
    /// Returns the transport's write or flush error.
    pub async fn execute(&mut self, request: Outbound) -> io::Result<Transmission> {
        match request {
            Outbound::Retransmit => self.retransmit().await,
            Outbound::Frame { frame, done: None } => {
                self.write_frame(frame).await?;
                Ok(Transmission::Sent(frame))
            }
            Outbound::Frame {
                frame,
                done: Some(done),
            } => {
                let result = self.write_frame(frame).await;
                let outcome = match &result {
                    Ok(()) => Ok(Transmission::Sent(frame)),
                    Err(e) => Err(io::Error::new(e.kind(), e.to_string())),
                };
                // The sender may have stopped waiting.
                let _ = done.send(result);
                outcome
            }
        }
    }

    /// The most recently transmitted frame, if any.
    #[must_use]
    pub fn last_sent(&self) -> Option<Frame> { *self.last_sent.borrow() }

    /// Borrow the transport's write side.
    pub fn writer(&self) -> &W { &self.writer }
}

#[cfg(test)]
mod tests {
    use std::{
        pin::Pin,
        task::{Context, Poll},
    };

    use rstest::{fixture, rstest};

    use super::*;
    use crate::{frame::FRAME_LEN, queue};

    #[fixture]
    #[allow(
        unused_braces,
        reason = "rustc false positive for single line rstest fixtures"
    )]
    fn transmitter() -> Transmitter<Vec<u8>> { Transmitter::new(Vec::new()) }

    fn data(bytes: &[u8]) -> Frame { Frame::from_data(bytes).expect("valid frame") }

    #[rstest]
    #[tokio::test]
    async fn retransmit_resends_cached_bytes_verbatim(mut transmitter: Transmitter<Vec<u8>>) {
        transmitter
            .write_frame(Frame::new(4, &[5, 6, 7, 8]).expect("valid frame"))
            .await
            .expect("send");
        let sent = transmitter.writer().clone();

        let outcome = transmitter.retransmit().await.expect("retransmit");

        assert!(matches!(outcome, Transmission::Retransmitted(_)));
        assert_eq!(&transmitter.writer()[FRAME_LEN..], sent.as_slice());
    }

    #[rstest]
    #[tokio::test]
    async fn retransmit_reuses_stored_checksum(mut transmitter: Transmitter<Vec<u8>>) {
        let mut odd = data(b"abc");
        odd.crc = 0x00;
        transmitter.write_frame(odd).await.expect("send");

        transmitter.retransmit().await.expect("retransmit");

        assert_eq!(transmitter.writer().len(), 2 * FRAME_LEN);
        assert_eq!(transmitter.writer()[2 * FRAME_LEN - 1], 0x00);
    }

    #[rstest]
    #[tokio::test]
    async fn retransmit_with_empty_cache_is_ignored(mut transmitter: Transmitter<Vec<u8>>) {
        let outcome = transmitter.retransmit().await.expect("retransmit");

        assert_eq!(outcome, Transmission::RetxIgnored);
        assert!(transmitter.writer().is_empty());
        assert!(transmitter.last_sent().is_none());
    }

    #[rstest]
    #[tokio::test]
    async fn every_transmission_replaces_cache(mut transmitter: Transmitter<Vec<u8>>) {
        let watcher = transmitter.subscribe();
        transmitter.write_frame(data(b"first")).await.expect("send");
        transmitter.write_frame(data(b"second")).await.expect("send");
        assert_eq!(transmitter.last_sent(), Some(data(b"second")));

        transmitter.write_frame(Frame::ack()).await.expect("send");
        assert_eq!(transmitter.last_sent(), Some(Frame::ack()));
        assert_eq!(*watcher.borrow(), Some(Frame::ack()));
    }

    #[rstest]
    #[tokio::test]
    async fn requests_are_written_in_queue_order(mut transmitter: Transmitter<Vec<u8>>) {
        let (tx, mut rx) = queue::outbound();
        tx.push(data(b"one"));
        tx.request_retransmit();
        let confirm = tx.push_confirmed(data(b"two")).expect("queue open");

        let mut outcomes = Vec::new();
        while let Some(request) = rx.try_pop() {
            outcomes.push(transmitter.execute(request).await.expect("write"));
        }

        assert_eq!(
            outcomes,
            vec![
                Transmission::Sent(data(b"one")),
                Transmission::Retransmitted(data(b"one")),
                Transmission::Sent(data(b"two")),
            ]
        );
        assert!(confirm.await.expect("confirmed").is_ok());
    }

    /// Writer whose every write fails.
    struct BrokenPipe;

    impl AsyncWrite for BrokenPipe {
        fn poll_write(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            _buf: &[u8],
        ) -> Poll<io::Result<usize>> {
            Poll::Ready(Err(io::Error::from(io::ErrorKind::BrokenPipe)))
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    #[tokio::test]
    async fn write_failure_is_reported_to_sender_and_cache_untouched() {
        let mut transmitter = Transmitter::new(BrokenPipe);
        let (tx, mut rx) = queue::outbound();
        let confirm = tx.push_confirmed(data(b"lost")).expect("queue open");
        let request = rx.try_pop().expect("queued");

        let err = transmitter
            .execute(request)
            .await
            .expect_err("write must fail");

        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
        let reported = confirm
            .await
            .expect("outcome delivered")
            .expect_err("sender sees failure");
        assert_eq!(reported.kind(), io::ErrorKind::BrokenPipe);
        assert!(transmitter.last_sent().is_none());
    }
}
