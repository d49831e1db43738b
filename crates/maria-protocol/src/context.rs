//! Per-connection protocol context.

use crate::constants::{collations, Capabilities, ServerStatus};
use crate::version::ServerVersion;

/// Per-connection state shared with codecs and message builders.
///
/// Created once per connection after the initial handshake and mutated only
/// by the connection state machine between command boundaries, never while
/// a command is in flight.
#[derive(Debug, Clone)]
pub struct ConnectionContext {
    version: ServerVersion,
    capabilities: Capabilities,
    thread_id: u32,
    server_status: ServerStatus,
    client_collation: u8,
    results_collation: u8,
}

impl ConnectionContext {
    /// Create a context from negotiated handshake data.
    #[must_use]
    pub fn new(
        version: ServerVersion,
        capabilities: Capabilities,
        thread_id: u32,
        server_status: ServerStatus,
        client_collation: u8,
    ) -> Self {
        Self {
            version,
            capabilities,
            thread_id,
            server_status,
            client_collation,
            results_collation: client_collation,
        }
    }

    /// Parsed server version.
    #[must_use]
    pub fn version(&self) -> &ServerVersion {
        &self.version
    }

    /// Negotiated capability bitmask.
    #[must_use]
    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    /// Server thread id for this connection.
    #[must_use]
    pub fn thread_id(&self) -> u32 {
        self.thread_id
    }

    /// Most recent server status flags.
    #[must_use]
    pub fn server_status(&self) -> ServerStatus {
        self.server_status
    }

    /// Update server status from an OK/EOF packet. Called between commands.
    pub fn set_server_status(&mut self, status: ServerStatus) {
        self.server_status = status;
    }

    /// Collation the client sends text in.
    #[must_use]
    pub fn client_collation(&self) -> u8 {
        self.client_collation
    }

    /// Collation the server returns results in.
    #[must_use]
    pub fn results_collation(&self) -> u8 {
        self.results_collation
    }

    /// Update collations after a successful `SET NAMES`.
    pub fn set_collations(&mut self, client: u8, results: u8) {
        self.client_collation = client;
        self.results_collation = results;
    }

    /// Whether the server runs with `NO_BACKSLASH_ESCAPES`.
    #[must_use]
    pub fn no_backslash_escapes(&self) -> bool {
        self.server_status.contains(ServerStatus::NO_BACKSLASH_ESCAPES)
    }

    /// Whether EOF packets are replaced by OK packets.
    #[must_use]
    pub fn eof_deprecated(&self) -> bool {
        self.capabilities.contains(Capabilities::CLIENT_DEPRECATE_EOF)
    }

    /// Context with fixed values for unit tests.
    #[doc(hidden)]
    #[must_use]
    pub fn for_tests(server_status: ServerStatus) -> Self {
        Self {
            version: ServerVersion::parse("10.6.12-MariaDB"),
            capabilities: Capabilities::PROTOCOL_41
                | Capabilities::SECURE_CONNECTION
                | Capabilities::PLUGIN_AUTH,
            thread_id: 42,
            server_status,
            client_collation: collations::UTF8MB4_UNICODE_CI,
            results_collation: collations::UTF8MB4_UNICODE_CI,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_updates() {
        let mut context = ConnectionContext::for_tests(ServerStatus::AUTOCOMMIT);
        assert!(!context.no_backslash_escapes());
        context.set_server_status(ServerStatus::NO_BACKSLASH_ESCAPES);
        assert!(context.no_backslash_escapes());
    }

    #[test]
    fn test_eof_deprecated_follows_capability() {
        let mut context = ConnectionContext::for_tests(ServerStatus::AUTOCOMMIT);
        assert!(!context.eof_deprecated());
        context.capabilities |= Capabilities::CLIENT_DEPRECATE_EOF;
        assert!(context.eof_deprecated());
    }
}
