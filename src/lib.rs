#![doc(html_root_url = "https://docs.rs/serialframe/latest")]
//! Public API for the `serialframe` library.
//!
//! This crate moves fixed-size, CRC-8 protected frames over an unreliable
//! byte stream such as a UART. Corrupt frames are answered with a RETX
//! request, good data frames with an ACK, and the last transmitted frame is
//! kept so it can be resent verbatim when the peer asks for it.
//!
//! The layers, bottom up:
//!
//! - [`crc`] and [`frame`] define the wire format.
//! - [`StreamAssembler`] and [`FrameCodec`] cut a byte stream into frames.
//! - [`RetransmissionController`] runs the acknowledgement protocol and
//!   [`Transmitter`] writes its responses, keeping the last-sent cache.
//! - [`Link`] drives the controller over an async transport.

pub mod assembler;
pub mod codec;
pub mod config;
pub mod controller;
pub mod crc;
pub mod error;
pub mod frame;
pub mod link;
pub mod metrics;
pub mod queue;

pub use assembler::StreamAssembler;
pub use codec::{CodecError, EofError, FrameCodec};
pub use config::{LinkConfig, LinkConfigBuilder};
pub use controller::{Disposition, RetransmissionController, Transmission, Transmitter};
pub use error::{ConfigError, LinkError};
pub use frame::{Frame, FrameError, FrameKind};
pub use link::{Link, LinkSender, Transport};
pub use metrics::{CRC_ERRORS_TOTAL, Direction, FRAMES_TOTAL, RETRANSMISSIONS_TOTAL};
pub use queue::{InboundQueue, InboundSender, Outbound, OutboundQueue, OutboundSender};
