//! Utilities for exercising a [`Link`](serialframe::Link) against a scripted
//! peer during tests.
//!
//! [`connected`] spawns a link on one half of a `tokio::io::duplex` stream
//! and hands back a [`Peer`] driving the other half, so tests can play the
//! remote side byte for byte.
//!
//! ```rust
//! use serialframe_testing::connected;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let (link, mut peer) = connected();
//! link.send_data(b"ping").await.expect("send");
//! let frame = peer.expect_frame().await;
//! assert_eq!(frame.data(), b"ping");
//! # }
//! ```

pub mod helpers;
pub mod logging;
pub mod macros;

pub use helpers::{
    DEFAULT_CAPACITY,
    PEER_TIMEOUT,
    Peer,
    connected,
    connected_with_config,
    corrupted,
    data_frame,
};
pub use logging::{LoggerHandle, logger};
