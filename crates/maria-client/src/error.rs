//! Client error types and SQLSTATE classification.

use maria_protocol::ErrPacket;
use thiserror::Error;

/// Classification of a server-signalled error, derived from its SQLSTATE.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerErrorKind {
    /// Syntax or grammar error (class `42`). Statement-scoped.
    BadGrammar,
    /// Data integrity violation (classes `22`, `23`). Statement-scoped.
    DataIntegrity,
    /// Permission denied (class `28`). Statement-scoped.
    PermissionDenied,
    /// Rollback or serialization failure (class `40`). Transient.
    TransientRollback,
    /// Connection-level failure (class `08`). Transient, connection lost.
    ConnectionFailure,
    /// Anything else; carries the native code for callers that map further.
    Other,
}

impl ServerErrorKind {
    /// Derive the kind from a five-character SQLSTATE.
    #[must_use]
    pub fn from_sql_state(sql_state: &str) -> Self {
        match sql_state.get(..2) {
            Some("42") => Self::BadGrammar,
            Some("22") | Some("23") => Self::DataIntegrity,
            Some("28") => Self::PermissionDenied,
            Some("40") => Self::TransientRollback,
            Some("08") | Some("70") => Self::ConnectionFailure,
            _ => Self::Other,
        }
    }
}

/// Errors surfaced by the connection engine.
#[derive(Debug, Error)]
pub enum Error {
    /// Transport failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Framing failure; the connection closes.
    #[error(transparent)]
    Codec(#[from] maria_codec::CodecError),

    /// Malformed server bytes; the connection closes.
    #[error(transparent)]
    Protocol(#[from] maria_protocol::ProtocolError),

    /// Authentication flow failure.
    #[error(transparent)]
    Auth(#[from] maria_auth::AuthError),

    /// Value conversion failure. Statement-scoped; the connection stays
    /// usable unless the protocol stream itself is out of sync.
    #[error(transparent)]
    Type(#[from] maria_types::TypeError),

    /// Error packet from the server.
    #[error("server error {code} ({sql_state}): {message}")]
    Server {
        /// Native error code.
        code: u16,
        /// Five-character SQLSTATE.
        sql_state: String,
        /// Server-provided message.
        message: String,
        /// SQL that triggered the error, when statement-bound.
        sql: Option<String>,
        /// SQLSTATE-derived classification.
        kind: ServerErrorKind,
    },

    /// A message arrived that does not fit the connection phase.
    #[error("unexpected packet 0x{first_byte:02x} during {phase}")]
    UnexpectedPacket {
        /// First payload byte.
        first_byte: u8,
        /// Connection phase.
        phase: &'static str,
    },

    /// A declared parameter index was never bound.
    #[error("parameter at index {index} is not set")]
    ParameterMissing {
        /// Missing index.
        index: usize,
    },

    /// Bound parameter count does not match the statement.
    #[error("statement expects {expected} parameters, {actual} bound")]
    ParameterCount {
        /// Parameters the statement declares.
        expected: usize,
        /// Parameters actually bound.
        actual: usize,
    },

    /// Configuration rejected before any IO.
    #[error("configuration error: {0}")]
    Config(String),

    /// A row getter named a column the result does not carry.
    #[error("no column named '{0}' in result")]
    UnknownColumn(String),

    /// A row getter indexed past the result width.
    #[error("column index {index} out of range ({count} columns)")]
    ColumnIndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of columns in the result.
        count: usize,
    },

    /// The server closed the connection or it was already closed.
    #[error("connection closed")]
    ConnectionClosed,

    /// The per-frame read inactivity timer fired.
    #[error("socket read timed out")]
    SocketTimeout,

    /// LOCAL INFILE was requested but is not permitted.
    #[error("server requested local file '{0}' but allow_local_infile is disabled")]
    LocalInfileDenied(String),
}

impl Error {
    /// Build a statement-bound server error from an ERR packet.
    #[must_use]
    pub fn from_err_packet(err: ErrPacket, sql: Option<&str>) -> Self {
        let kind = ServerErrorKind::from_sql_state(&err.sql_state);
        Self::Server {
            code: err.code,
            sql_state: err.sql_state,
            message: err.message,
            sql: sql.map(str::to_string),
            kind,
        }
    }

    /// Whether a retry may succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Io(_) | Self::ConnectionClosed | Self::SocketTimeout => true,
            Self::Server { kind, .. } => matches!(
                kind,
                ServerErrorKind::TransientRollback | ServerErrorKind::ConnectionFailure
            ),
            _ => false,
        }
    }

    /// Whether the connection must be closed after this error.
    ///
    /// Frame and protocol errors always close the connection; statement
    /// errors leave it usable.
    #[must_use]
    pub fn closes_connection(&self) -> bool {
        match self {
            Self::Io(_)
            | Self::Codec(_)
            | Self::Protocol(_)
            | Self::UnexpectedPacket { .. }
            | Self::ConnectionClosed
            | Self::SocketTimeout => true,
            Self::Server { kind, .. } => *kind == ServerErrorKind::ConnectionFailure,
            _ => false,
        }
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, Error>;
