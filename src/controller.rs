//! Stop-and-wait retransmission state machine.
//!
//! [`RetransmissionController`] owns the inbound side of one link: the
//! receive buffer, the producer side of the inbound queue and a handle for
//! queueing transmissions. Each decoded frame is handled independently, in
//! this order:
//!
//! 1. A checksum mismatch is answered with a RETX frame and the frame is discarded.
//! 2. A RETX frame is answered by resending the last transmitted frame verbatim.
//! 3. An ACK frame is observed and nothing else happens.
//! 4. Anything else is data: it is queued for the application and acknowledged.
//!
//! Handling a frame never touches the transport. Responses are pushed onto
//! the outbound queue and written, in order, by a [`Transmitter`], which
//! also holds the single-slot cache of the last transmitted frame.

use tracing::{debug, warn};

use crate::{
    assembler::StreamAssembler,
    frame::{Frame, FrameKind},
    metrics::{self, Direction},
    queue::{InboundSender, OutboundSender},
};

mod transmitter;

pub use transmitter::{Transmission, Transmitter};

/// What the controller did with one inbound frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Disposition {
    /// Checksum mismatch; a RETX was queued and the frame dropped.
    Corrupt,
    /// The peer asked for a retransmission of our last frame.
    RetransmitRequested,
    /// The peer acknowledged our last frame.
    Acknowledged,
    /// A data frame was queued for the application and acknowledged.
    Delivered(Frame),
}

/// Per-link protocol state driving validation, acknowledgement and
/// retransmission requests.
///
/// Reads are fed in through [`ingest`](Self::ingest); responses go to the
/// outbound queue, so the caller never waits on the transport.
///
/// # Examples
///
/// ```
/// use serialframe::{
///     RetransmissionController,
///     frame::Frame,
///     queue::{self, Outbound},
/// };
///
/// let (inbound_tx, mut inbound) = queue::inbound();
/// let (outbound_tx, mut outbound) = queue::outbound();
/// let mut controller = RetransmissionController::new(inbound_tx, outbound_tx);
///
/// let incoming = Frame::from_data(b"ping").expect("valid frame");
/// controller.ingest(&incoming.to_bytes());
///
/// assert_eq!(inbound.try_pop(), Some(incoming));
/// assert!(matches!(
///     outbound.try_pop(),
///     Some(Outbound::Frame { frame, .. }) if frame == Frame::ack()
/// ));
/// ```
#[derive(Debug)]
pub struct RetransmissionController {
    assembler: StreamAssembler,
    inbound: InboundSender,
    outbound: OutboundSender,
    consecutive_crc_failures: usize,
}

impl RetransmissionController {
    /// Create a controller delivering data frames to `inbound` and queueing
    /// its responses on `outbound`.
    #[must_use]
    pub fn new(inbound: InboundSender, outbound: OutboundSender) -> Self {
        Self {
            assembler: StreamAssembler::new(),
            inbound,
            outbound,
            consecutive_crc_failures: 0,
        }
    }

    /// Buffer newly received bytes and handle every complete frame.
    ///
    /// Returns the disposition of each frame handled, oldest first.
    pub fn ingest(&mut self, chunk: &[u8]) -> Vec<Disposition> {
        self.assembler.push(chunk);
        let mut handled = Vec::new();
        while let Some(frame) = self.assembler.next_frame() {
            handled.push(self.handle_frame(frame));
        }
        handled
    }

    /// Validate, classify and act on a single decoded frame.
    pub fn handle_frame(&mut self, frame: Frame) -> Disposition {
        metrics::inc_frames(Direction::Inbound);
        if let Err(err) = frame.verify() {
            self.consecutive_crc_failures += 1;
            metrics::inc_crc_errors();
            warn!(
                error = %err,
                consecutive = self.consecutive_crc_failures,
                "checksum mismatch, requesting retransmission"
            );
            self.respond(Frame::retx());
            return Disposition::Corrupt;
        }
        self.consecutive_crc_failures = 0;

        match frame.kind() {
            FrameKind::Retx => {
                if !self.outbound.request_retransmit() {
                    debug!("outbound queue closed, retransmission not sent");
                }
                Disposition::RetransmitRequested
            }
            FrameKind::Ack => {
                debug!("acknowledgement received");
                Disposition::Acknowledged
            }
            FrameKind::Data => {
                debug!(length = frame.length, "data frame received");
                if !self.inbound.push(frame) {
                    debug!("inbound queue closed, frame dropped after validation");
                }
                self.respond(Frame::ack());
                Disposition::Delivered(frame)
            }
        }
    }

    fn respond(&self, control: Frame) {
        if !self.outbound.push(control) {
            debug!(kind = %control.kind(), "outbound queue closed, response not sent");
        }
    }

    /// Number of checksum failures since the last valid frame.
    #[must_use]
    pub fn consecutive_crc_failures(&self) -> usize { self.consecutive_crc_failures }

    /// Bytes received but not yet forming a whole frame.
    #[must_use]
    pub fn pending_bytes(&self) -> usize { self.assembler.pending() }
}
