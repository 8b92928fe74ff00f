//! Frame classification.

use std::fmt;

/// Role of a checksum-valid frame in the retransmission protocol.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FrameKind {
    /// Acknowledges the peer's last data frame.
    Ack,
    /// Asks the peer to resend its last frame.
    Retx,
    /// Carries application bytes.
    Data,
}

impl FrameKind {
    /// Whether this kind is one of the control frames.
    #[must_use]
    pub const fn is_control(self) -> bool { matches!(self, Self::Ack | Self::Retx) }

    fn as_str(self) -> &'static str {
        match self {
            Self::Ack => "ack",
            Self::Retx => "retx",
            Self::Data => "data",
        }
    }
}

impl fmt::Display for FrameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}
