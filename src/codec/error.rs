//! Error types for the codec layer.
//!
//! [`EofError`] describes a stream that ends inside a frame; [`CodecError`]
//! wraps it together with transport failures.

use std::io;

use thiserror::Error;

/// End-of-stream conditions the decoder reports.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum EofError {
    /// EOF received with a partial frame buffered.
    #[error("premature EOF: {bytes_received} bytes of {expected} byte frame received")]
    MidFrame {
        /// Bytes received before EOF.
        bytes_received: usize,
        /// Size of a complete frame.
        expected: usize,
    },
}

/// Top-level codec error taxonomy.
///
/// # Examples
///
/// ```
/// use serialframe::codec::{CodecError, EofError};
///
/// let err = CodecError::Eof(EofError::MidFrame { bytes_received: 3, expected: 18 });
/// assert_eq!(err.error_type(), "eof");
/// assert_eq!(std::io::Error::from(err).kind(), std::io::ErrorKind::UnexpectedEof);
/// ```
#[derive(Debug, Error)]
pub enum CodecError {
    /// Transport layer I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The stream ended inside a frame.
    #[error("EOF: {0}")]
    Eof(#[from] EofError),
}

impl CodecError {
    /// Returns the error category as a string for logging.
    ///
    /// One of: `"io"` or `"eof"`.
    #[must_use]
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::Io(_) => "io",
            Self::Eof(_) => "eof",
        }
    }
}

impl From<CodecError> for io::Error {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::Io(e) => e,
            CodecError::Eof(e) => io::Error::new(io::ErrorKind::UnexpectedEof, e),
        }
    }
}
