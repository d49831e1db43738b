//! Protocol error types.

use thiserror::Error;

/// Errors produced while encoding or decoding wire data.
///
/// All variants indicate either malformed bytes from the server or an
/// internal framing violation. Frame-level errors are fatal to the
/// connection; the client layer maps them accordingly.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Not enough bytes to decode the expected structure.
    #[error("incomplete packet: expected {expected} bytes, got {actual}")]
    IncompletePacket {
        /// Number of bytes required.
        expected: usize,
        /// Number of bytes available.
        actual: usize,
    },

    /// The initial handshake carried an unsupported protocol version.
    #[error("unexpected initial handshake protocol value [{0}]")]
    UnsupportedProtocolVersion(u8),

    /// A packet arrived with an out-of-order sequence id.
    #[error("sequence mismatch: expected {expected}, got {actual}")]
    SequenceMismatch {
        /// Sequence id the connection expected.
        expected: u8,
        /// Sequence id carried by the packet.
        actual: u8,
    },

    /// A length field exceeds what the protocol permits.
    #[error("invalid length {0}")]
    InvalidLength(u64),

    /// A length-encoded integer started with the NULL marker (0xfb) where a
    /// value was required.
    #[error("unexpected NULL length-encoded value")]
    UnexpectedNull,

    /// A server message did not match the current connection phase.
    #[error("unexpected message 0x{first_byte:02x} in {phase} phase")]
    UnexpectedMessage {
        /// First payload byte of the offending message.
        first_byte: u8,
        /// Phase the connection was in.
        phase: &'static str,
    },

    /// A string field was not valid UTF-8.
    #[error("invalid utf-8 in {0}")]
    InvalidUtf8(&'static str),

    /// An unknown column type byte was received.
    #[error("unknown column type 0x{0:02x}")]
    UnknownColumnType(u8),
}
