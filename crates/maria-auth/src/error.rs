//! Authentication error types.

use thiserror::Error;

/// Errors raised by authentication plugin flows.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// The server advertised a plugin this driver does not implement.
    #[error("client does not support authentication plugin '{0}' requested by server")]
    UnknownPlugin(String),

    /// The plugin requires a clear password exchange but the transport is
    /// neither TLS nor a unix socket.
    #[error("plugin '{0}' requires a secure transport (TLS or unix socket)")]
    SecureTransportRequired(&'static str),

    /// The server sent an auth-more payload the plugin cannot interpret.
    #[error("unexpected authentication data 0x{0:02x}")]
    UnexpectedAuthData(u8),
}
