//! Async link tying a byte transport to the retransmission controller.
//!
//! A [`Link`] splits its transport in two and runs one task per half. The
//! receive loop reads chunks as they arrive and feeds them through the
//! [`RetransmissionController`]; it never waits on a write, so a peer that is
//! busy sending is always drained. Every transmission, from the application
//! or from the controller, is queued on one outbound channel and written in
//! order by the write loop, which owns the last-sent cache. Validated data
//! frames reach the application through the inbound queue.

use std::{fmt, time::Duration};

use log::{error, info, warn};
use tokio::{
    io::{AsyncRead, AsyncReadExt, AsyncWrite, ReadHalf, WriteHalf},
    sync::watch,
    task::JoinHandle,
};
use tokio_util::sync::CancellationToken;

use crate::{
    config::LinkConfig,
    controller::{RetransmissionController, Transmitter},
    error::LinkError,
    frame::Frame,
    queue::{self, InboundQueue, OutboundQueue, OutboundSender},
};

/// Trait alias for byte streams a [`Link`] can run over.
pub trait Transport: AsyncRead + AsyncWrite + Send + 'static {}
impl<T> Transport for T where T: AsyncRead + AsyncWrite + Send + 'static {}

type LoopHandle = JoinHandle<Result<(), LinkError>>;

/// Reliable frame link over an unreliable byte stream.
///
/// Dropping the link stops both of its tasks.
///
/// # Examples
///
/// ```
/// use serialframe::Link;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), serialframe::LinkError> {
/// let (left, right) = tokio::io::duplex(256);
/// let a = Link::new(left);
/// let mut b = Link::new(right);
///
/// a.send_data(b"hello").await?;
/// let frame = b.receive().await?;
/// assert_eq!(frame.data(), b"hello");
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Link {
    outbound: OutboundSender,
    inbound: InboundQueue,
    last_sent: watch::Receiver<Option<Frame>>,
    task: Option<LoopHandle>,
    shutdown: CancellationToken,
    config: LinkConfig,
}

impl Link {
    /// Start a link over `transport` with the default configuration.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    #[must_use]
    pub fn new<T: Transport>(transport: T) -> Self {
        Self::with_config(transport, LinkConfig::default())
    }

    /// Start a link over `transport`.
    ///
    /// The receive loop is spawned immediately and runs until the transport
    /// reaches EOF, a transport error occurs, the desync threshold trips, or
    /// [`shutdown`](Self::shutdown) is called. The write loop runs until
    /// shutdown, a write failure, or the link and all its senders are gone.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    #[must_use]
    pub fn with_config<T: Transport>(transport: T, config: LinkConfig) -> Self {
        let (reader, writer) = tokio::io::split(transport);
        let (inbound_tx, inbound) = queue::inbound();
        let (outbound, requests) = queue::outbound();
        let transmitter = Transmitter::new(writer);
        let last_sent = transmitter.subscribe();
        let shutdown = CancellationToken::new();

        let writer_task = tokio::spawn(write_loop(transmitter, requests, shutdown.clone()));
        let controller = RetransmissionController::new(inbound_tx, outbound.clone());
        let task = tokio::spawn(receive_loop(
            reader,
            controller,
            writer_task,
            config,
            shutdown.clone(),
        ));
        Self {
            outbound,
            inbound,
            last_sent,
            task: Some(task),
            shutdown,
            config,
        }
    }

    /// A cloneable handle for sending from other tasks.
    #[must_use]
    pub fn sender(&self) -> LinkSender {
        LinkSender {
            outbound: self.outbound.clone(),
        }
    }

    /// Send the first `length` bytes of `payload` as one frame.
    ///
    /// Returns once the frame has been written and cached. Bytes of
    /// `payload` past `length` are not sent.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::Frame`] for out-of-range input,
    /// [`LinkError::Io`] if the transport write fails, and
    /// [`LinkError::Closed`] once the write loop has stopped. Failed writes
    /// are not retried.
    pub async fn send(&self, length: u8, payload: &[u8]) -> Result<(), LinkError> {
        transmit(&self.outbound, Frame::new(length, payload)?).await
    }

    /// Send `data` as one frame, taking the length from the slice.
    ///
    /// # Errors
    ///
    /// See [`send`](Self::send).
    pub async fn send_data(&self, data: &[u8]) -> Result<(), LinkError> {
        transmit(&self.outbound, Frame::from_data(data)?).await
    }

    /// Wait for the next validated data frame.
    ///
    /// Frames are returned in arrival order. Once the receive loop has ended
    /// and the queue is empty, the reason is returned instead: the loop's
    /// error if it failed, otherwise [`LinkError::Closed`].
    ///
    /// # Errors
    ///
    /// See above; also [`LinkError::Timeout`] when a receive timeout is
    /// configured and elapses.
    pub async fn receive(&mut self) -> Result<Frame, LinkError> {
        match self.config.receive_timeout() {
            Some(limit) => self.receive_timeout(limit).await,
            None => self.next_frame().await,
        }
    }

    /// Wait at most `limit` for the next validated data frame.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::Timeout`] if nothing arrives in time, otherwise as
    /// [`receive`](Self::receive).
    pub async fn receive_timeout(&mut self, limit: Duration) -> Result<Frame, LinkError> {
        tokio::time::timeout(limit, self.next_frame())
            .await
            .map_err(|_| LinkError::Timeout)?
    }

    /// Take the next queued data frame without waiting.
    pub fn try_receive(&mut self) -> Option<Frame> { self.inbound.try_pop() }

    /// The frame most recently written to the transport.
    #[must_use]
    pub fn last_sent(&self) -> Option<Frame> { *self.last_sent.borrow() }

    /// Ask both loops to stop.
    pub fn shutdown(&self) { self.shutdown.cancel(); }

    /// Wait for the receive loop to finish and return its outcome.
    ///
    /// The loop only finishes on EOF, a failure, or after
    /// [`shutdown`](Self::shutdown).
    ///
    /// Returns `Ok(())` if the outcome was already reported by
    /// [`receive`](Self::receive).
    ///
    /// # Errors
    ///
    /// Returns the error that ended the loop.
    pub async fn join(mut self) -> Result<(), LinkError> {
        match self.task.take() {
            Some(handle) => handle.await?,
            None => Ok(()),
        }
    }

    async fn next_frame(&mut self) -> Result<Frame, LinkError> {
        tokio::select! {
            biased;
            frame = self.inbound.pop_wait() => frame.ok_or(LinkError::Closed),
            err = loop_exit(&mut self.task) => Err(err),
        }
    }
}

impl Drop for Link {
    fn drop(&mut self) { self.shutdown.cancel(); }
}

/// Cloneable send handle for a [`Link`].
///
/// Sends fail with [`LinkError::Closed`] once the link is dropped or shut
/// down.
#[derive(Clone, Debug)]
pub struct LinkSender {
    outbound: OutboundSender,
}

impl LinkSender {
    /// See [`Link::send`].
    ///
    /// # Errors
    ///
    /// See [`Link::send`].
    pub async fn send(&self, length: u8, payload: &[u8]) -> Result<(), LinkError> {
        transmit(&self.outbound, Frame::new(length, payload)?).await
    }

    /// See [`Link::send_data`].
    ///
    /// # Errors
    ///
    /// See [`Link::send`].
    pub async fn send_data(&self, data: &[u8]) -> Result<(), LinkError> {
        transmit(&self.outbound, Frame::from_data(data)?).await
    }
}

async fn transmit(outbound: &OutboundSender, frame: Frame) -> Result<(), LinkError> {
    let done = outbound.push_confirmed(frame).ok_or(LinkError::Closed)?;
    done.await
        .map_err(|_| LinkError::Closed)?
        .map_err(LinkError::Io)
}

async fn loop_exit(task: &mut Option<LoopHandle>) -> LinkError {
    let Some(handle) = task.as_mut() else {
        return LinkError::Closed;
    };
    let outcome = handle.await;
    *task = None;
    match outcome {
        Ok(Ok(())) => LinkError::Closed,
        Ok(Err(err)) => err,
        Err(join) => LinkError::Task(join),
    }
}

/// Why a loop stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ExitReason {
    Eof,
    Shutdown,
    Closed,
    TransportError,
    Desync,
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Eof => "eof",
            Self::Shutdown => "shutdown",
            Self::Closed => "closed",
            Self::TransportError => "transport_error",
            Self::Desync => "desync",
        })
    }
}

fn log_exit(task: &str, reason: ExitReason, result: &Result<(), LinkError>) {
    match result {
        Ok(()) => info!("link {task} loop stopped: reason={reason}"),
        Err(LinkError::SuspectedDesync { .. }) => warn!("link {task} loop stopped: reason={reason}"),
        Err(err) => error!("link {task} loop stopped: reason={reason}, error={err}"),
    }
}

async fn receive_loop<T: Transport>(
    mut reader: ReadHalf<T>,
    mut controller: RetransmissionController,
    mut writer_task: LoopHandle,
    config: LinkConfig,
    shutdown: CancellationToken,
) -> Result<(), LinkError> {
    info!(
        "link receive loop started: read_chunk_size={}, desync_threshold={:?}",
        config.read_chunk_size(),
        config.desync_threshold(),
    );
    let mut buf = vec![0u8; config.read_chunk_size()];
    let (reason, result) = loop {
        let read = tokio::select! {
            biased;
            () = shutdown.cancelled() => break (ExitReason::Shutdown, Ok(())),
            written = &mut writer_task => break match written {
                Ok(Ok(())) => (ExitReason::Shutdown, Ok(())),
                Ok(Err(err)) => (ExitReason::TransportError, Err(err)),
                Err(join) => (ExitReason::TransportError, Err(LinkError::Task(join))),
            },
            read = reader.read(&mut buf) => read,
        };
        let n = match read {
            Ok(0) => break (ExitReason::Eof, Ok(())),
            Ok(n) => n,
            Err(e) => break (ExitReason::TransportError, Err(LinkError::Io(e))),
        };

        controller.ingest(&buf[..n]);
        let consecutive = controller.consecutive_crc_failures();
        if config
            .desync_threshold()
            .is_some_and(|threshold| consecutive >= threshold.get())
        {
            break (
                ExitReason::Desync,
                Err(LinkError::SuspectedDesync { consecutive }),
            );
        }
    };

    log_exit("receive", reason, &result);
    result
}

async fn write_loop<T: Transport>(
    mut transmitter: Transmitter<WriteHalf<T>>,
    mut requests: OutboundQueue,
    shutdown: CancellationToken,
) -> Result<(), LinkError> {
    let (reason, result) = loop {
        let request = tokio::select! {
            biased;
            () = shutdown.cancelled() => break (ExitReason::Shutdown, Ok(())),
            request = requests.pop_wait() => request,
        };
        let Some(request) = request else {
            break (ExitReason::Closed, Ok(()));
        };
        let written = tokio::select! {
            biased;
            () = shutdown.cancelled() => break (ExitReason::Shutdown, Ok(())),
            written = transmitter.execute(request) => written,
        };
        if let Err(e) = written {
            break (ExitReason::TransportError, Err(LinkError::Io(e)));
        }
    };

    log_exit("write", reason, &result);
    result
}
