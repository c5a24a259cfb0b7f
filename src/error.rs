//! Error types for response reading.

use thiserror::Error;

/// The errors produced while reading a response off a socket.
#[derive(Debug, Error)]
pub enum Error {
    /// The peer closed the connection before the response was complete.
    ///
    /// During construction this means the header block never terminated;
    /// during body streaming it means fewer than `Content-Length` bytes
    /// arrived.
    #[error("Connection closed before the response completed")]
    IncompleteResponse,
    /// The first line did not match `HTTP/<version> <status> ...`.
    #[error("Malformed status line")]
    MalformedStatusLine,
    /// A header line carried no `:` separator.
    #[error("Malformed header line {0:?}")]
    MalformedHeader(String),
    /// The `Content-Length` value did not parse as an integer.
    #[error("Invalid Content-Length value {0:?}")]
    InvalidContentLength(String),
    /// A status or header line exceeded the read buffer capacity before its
    /// terminator was seen.
    #[error("Line exceeds read buffer capacity")]
    LineTooLong,
    /// An underlying I/O error occurred.
    #[error("IO Error")]
    Io(#[from] std::io::Error),
}

/// A `Result` alias where the `Err` case is [`crate::Error`].
pub type Result<T> = std::result::Result<T, Error>;
