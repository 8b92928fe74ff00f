//! Unbounded FIFO channels around the controller.
//!
//! Inbound: the controller holds the [`InboundSender`] and the application
//! awaits validated data frames on the [`InboundQueue`]. Waiting suspends the
//! task on the channel rather than polling, so the receive loop keeps running
//! while the consumer waits.
//!
//! Outbound: every transmission, from the application or from the controller,
//! is pushed as an [`Outbound`] request through an [`OutboundSender`] and
//! written by whoever drains the [`OutboundQueue`]. Pushing never waits on
//! the transport.

use std::io;

use tokio::sync::{mpsc, oneshot};

use crate::frame::Frame;

/// Create a connected sender and queue pair.
///
/// # Examples
///
/// ```
/// use serialframe::{frame::Frame, queue};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let (tx, mut rx) = queue::inbound();
/// let frame = Frame::from_data(b"hello").expect("valid frame");
/// assert!(tx.push(frame));
/// assert_eq!(rx.pop_wait().await, Some(frame));
/// # }
/// ```
#[must_use]
pub fn inbound() -> (InboundSender, InboundQueue) {
    let (tx, rx) = mpsc::unbounded_channel();
    (InboundSender { tx }, InboundQueue { rx })
}

/// Producer side of the inbound queue, owned by the controller.
#[derive(Clone, Debug)]
pub struct InboundSender {
    tx: mpsc::UnboundedSender<Frame>,
}

impl InboundSender {
    /// Append a frame at the tail.
    ///
    /// Returns `false` if the consumer has gone away and the frame was dropped.
    pub fn push(&self, frame: Frame) -> bool { self.tx.send(frame).is_ok() }

    /// Whether the consumer side has been dropped.
    #[must_use]
    pub fn is_closed(&self) -> bool { self.tx.is_closed() }
}

/// Consumer side of the inbound queue.
#[derive(Debug)]
pub struct InboundQueue {
    rx: mpsc::UnboundedReceiver<Frame>,
}

impl InboundQueue {
    /// Remove and return the oldest frame, waiting until one is available.
    ///
    /// Returns `None` once every sender has been dropped and the queue is
    /// empty.
    pub async fn pop_wait(&mut self) -> Option<Frame> { self.rx.recv().await }

    /// Remove and return the oldest frame without waiting.
    pub fn try_pop(&mut self) -> Option<Frame> { self.rx.try_recv().ok() }

    /// Number of frames waiting to be consumed.
    #[must_use]
    pub fn len(&self) -> usize { self.rx.len() }

    /// Whether no frames are waiting.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.rx.is_empty() }
}

/// Completion signal for a confirmed transmission.
pub type SendResult = oneshot::Receiver<io::Result<()>>;

/// A transmission waiting to be written.
#[derive(Debug)]
pub enum Outbound {
    /// Write `frame`, reporting the outcome on `done` when present.
    Frame {
        /// Frame to transmit.
        frame: Frame,
        /// Notified once the frame is written or the write fails.
        done: Option<oneshot::Sender<io::Result<()>>>,
    },
    /// Resend the last transmitted frame verbatim.
    Retransmit,
}

/// Create a connected outbound sender and queue pair.
#[must_use]
pub fn outbound() -> (OutboundSender, OutboundQueue) {
    let (tx, rx) = mpsc::unbounded_channel();
    (OutboundSender { tx }, OutboundQueue { rx })
}

/// Producer side of the outbound queue.
#[derive(Clone, Debug)]
pub struct OutboundSender {
    tx: mpsc::UnboundedSender<Outbound>,
}

impl OutboundSender {
    /// Queue `frame` for transmission without waiting for the write.
    ///
    /// Returns `false` if the writer has gone away.
    pub fn push(&self, frame: Frame) -> bool {
        self.tx.send(Outbound::Frame { frame, done: None }).is_ok()
    }

    /// Queue `frame` and return a receiver resolved once it is written.
    ///
    /// Returns `None` if the writer has gone away.
    #[must_use]
    pub fn push_confirmed(&self, frame: Frame) -> Option<SendResult> {
        let (done, result) = oneshot::channel();
        self.tx
            .send(Outbound::Frame {
                frame,
                done: Some(done),
            })
            .ok()
            .map(|()| result)
    }

    /// Queue a retransmission of whatever was last written.
    ///
    /// Returns `false` if the writer has gone away.
    pub fn request_retransmit(&self) -> bool { self.tx.send(Outbound::Retransmit).is_ok() }

    /// Whether the writer side has been dropped.
    #[must_use]
    pub fn is_closed(&self) -> bool { self.tx.is_closed() }
}

/// Consumer side of the outbound queue, drained by the writer.
#[derive(Debug)]
pub struct OutboundQueue {
    rx: mpsc::UnboundedReceiver<Outbound>,
}

impl OutboundQueue {
    /// Remove and return the oldest request, waiting until one is available.
    ///
    /// Returns `None` once every sender has been dropped and the queue is
    /// empty.
    pub async fn pop_wait(&mut self) -> Option<Outbound> { self.rx.recv().await }

    /// Remove and return the oldest request without waiting.
    pub fn try_pop(&mut self) -> Option<Outbound> { self.rx.try_recv().ok() }

    /// Number of requests waiting to be written.
    #[must_use]
    pub fn len(&self) -> usize { self.rx.len() }

    /// Whether no requests are waiting.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.rx.is_empty() }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::timeout;

    use super::*;

    fn frame(byte: u8) -> Frame { Frame::from_data(&[byte]).expect("valid frame") }

    #[tokio::test]
    async fn pops_in_push_order() {
        let (tx, mut rx) = inbound();
        for byte in 1..=3 {
            assert!(tx.push(frame(byte)));
        }
        assert_eq!(rx.len(), 3);
        for byte in 1..=3 {
            assert_eq!(rx.pop_wait().await, Some(frame(byte)));
        }
        assert!(rx.is_empty());
    }

    #[tokio::test]
    async fn pop_wait_suspends_until_push() {
        let (tx, mut rx) = inbound();
        let consumer = tokio::spawn(async move { rx.pop_wait().await });
        tokio::task::yield_now().await;
        assert!(!consumer.is_finished());
        tx.push(frame(9));
        let got = timeout(Duration::from_secs(1), consumer)
            .await
            .expect("consumer woke")
            .expect("consumer task");
        assert_eq!(got, Some(frame(9)));
    }

    #[tokio::test]
    async fn drains_before_reporting_close() {
        let (tx, mut rx) = inbound();
        tx.push(frame(1));
        drop(tx);
        assert_eq!(rx.pop_wait().await, Some(frame(1)));
        assert_eq!(rx.pop_wait().await, None);
    }

    #[test]
    fn push_reports_dropped_consumer() {
        let (tx, rx) = inbound();
        drop(rx);
        assert!(tx.is_closed());
        assert!(!tx.push(frame(1)));
    }

    #[test]
    fn try_pop_does_not_wait() {
        let (tx, mut rx) = inbound();
        assert!(rx.try_pop().is_none());
        tx.push(frame(4));
        assert_eq!(rx.try_pop(), Some(frame(4)));
    }

    #[tokio::test]
    async fn outbound_keeps_request_order() {
        let (tx, mut rx) = outbound();
        assert!(tx.push(frame(1)));
        assert!(tx.request_retransmit());
        let _confirm = tx.push_confirmed(frame(2)).expect("writer alive");

        assert!(matches!(
            rx.pop_wait().await,
            Some(Outbound::Frame { frame: f, done: None }) if f == frame(1)
        ));
        assert!(matches!(rx.pop_wait().await, Some(Outbound::Retransmit)));
        assert!(matches!(
            rx.try_pop(),
            Some(Outbound::Frame { frame: f, done: Some(_) }) if f == frame(2)
        ));
        assert!(rx.is_empty());
    }

    #[tokio::test]
    async fn confirmation_carries_write_outcome() {
        let (tx, mut rx) = outbound();
        let confirm = tx.push_confirmed(frame(3)).expect("writer alive");
        let Some(Outbound::Frame { done: Some(done), .. }) = rx.try_pop() else {
            panic!("expected a confirmed frame");
        };
        done.send(Ok(())).expect("caller waiting");
        assert!(confirm.await.expect("completed").is_ok());
    }

    #[test]
    fn outbound_push_reports_dropped_writer() {
        let (tx, rx) = outbound();
        drop(rx);
        assert!(tx.is_closed());
        assert!(!tx.push(frame(1)));
        assert!(!tx.request_retransmit());
        assert!(tx.push_confirmed(frame(1)).is_none());
    }
}
