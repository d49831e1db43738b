//! Codec error types.

use thiserror::Error;

/// Errors raised by the framing layer.
///
/// All of these are fatal to the connection: once framing is in doubt the
/// stream cannot be resynchronized.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Underlying transport failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Wire-level protocol violation (bad header, sequence mismatch).
    #[error("protocol error: {0}")]
    Protocol(#[from] maria_protocol::ProtocolError),

    /// The transport closed mid-message.
    #[error("connection closed")]
    ConnectionClosed,
}
