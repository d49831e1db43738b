//! Connection configuration.

use std::time::Duration;

use maria_protocol::constants::collations;

/// TLS posture requested for the connection.
///
/// Transport setup itself is the caller's concern; the engine only needs
/// to know whether the byte stream it was handed counts as secure (which
/// gates clear-password authentication exchanges).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SslMode {
    /// Plain TCP.
    #[default]
    Disable,
    /// TLS without certificate validation.
    Trust,
    /// TLS, validate the certificate chain.
    VerifyCa,
    /// TLS, validate chain and host name.
    VerifyFull,
    /// The stream is already wrapped (proxy or caller-managed TLS).
    Tunnel,
}

impl SslMode {
    /// Whether the resulting transport counts as secure.
    #[must_use]
    pub fn is_secure(self) -> bool {
        !matches!(self, Self::Disable)
    }
}

/// Connection configuration.
///
/// Built with chained setters; every field has a usable default except
/// the user name.
#[derive(Debug, Clone)]
pub struct Config {
    /// TCP target host. Consumed by the connection factory; the engine
    /// itself receives an established stream.
    pub host: String,
    /// TCP target port.
    pub port: u16,
    /// Unix domain socket path, mutually exclusive with `host`.
    pub socket: Option<String>,
    /// Login user name.
    pub username: String,
    /// Login password.
    pub password: Option<String>,
    /// Default database.
    pub database: Option<String>,
    /// TLS posture of the provided transport.
    pub ssl_mode: SslMode,
    /// Permit the `LOCAL_FILES` capability (LOAD DATA LOCAL INFILE).
    pub allow_local_infile: bool,
    /// Prepared-statement cache capacity; 0 disables caching.
    pub prepare_cache_size: usize,
    /// Socket-level connect timeout, applied by the factory when dialing.
    pub connect_timeout: Option<Duration>,
    /// Per-frame read inactivity timeout.
    pub socket_timeout: Option<Duration>,
    /// Server-enforced statement timeout (MariaDB `SET STATEMENT`).
    pub statement_timeout: Option<Duration>,
    /// Initial client collation id.
    pub collation: u8,
    /// Session variables applied at connect (`SET key=value`).
    pub session_variables: Vec<(String, String)>,
    /// Initial autocommit setting; `None` leaves the server default.
    pub autocommit: Option<bool>,
    /// Enable TCP keep-alive on the socket (factory concern).
    pub tcp_keep_alive: bool,
    /// Close with RST instead of FIN (factory concern).
    pub tcp_abortive_close: bool,
}

/// Default prepared-statement cache capacity.
pub const DEFAULT_PREPARE_CACHE_SIZE: usize = 250;

impl Config {
    /// Create a configuration for the given user.
    #[must_use]
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            host: "localhost".to_string(),
            port: 3306,
            socket: None,
            username: username.into(),
            password: None,
            database: None,
            ssl_mode: SslMode::Disable,
            allow_local_infile: false,
            prepare_cache_size: DEFAULT_PREPARE_CACHE_SIZE,
            connect_timeout: None,
            socket_timeout: None,
            statement_timeout: None,
            collation: collations::UTF8MB4_UNICODE_CI,
            session_variables: Vec::new(),
            autocommit: None,
            tcp_keep_alive: false,
            tcp_abortive_close: false,
        }
    }

    /// Set the TCP target.
    #[must_use]
    pub fn host(mut self, host: impl Into<String>, port: u16) -> Self {
        self.host = host.into();
        self.port = port;
        self
    }

    /// Connect over a unix domain socket instead of TCP.
    #[must_use]
    pub fn socket(mut self, path: impl Into<String>) -> Self {
        self.socket = Some(path.into());
        self
    }

    /// Set the socket-level connect timeout.
    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Enable TCP keep-alive.
    #[must_use]
    pub fn tcp_keep_alive(mut self, enable: bool) -> Self {
        self.tcp_keep_alive = enable;
        self
    }

    /// Close abortively (RST) instead of a graceful FIN.
    #[must_use]
    pub fn tcp_abortive_close(mut self, enable: bool) -> Self {
        self.tcp_abortive_close = enable;
        self
    }

    /// Set the password.
    #[must_use]
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Set the default database.
    #[must_use]
    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    /// Set the TLS posture.
    #[must_use]
    pub fn ssl_mode(mut self, mode: SslMode) -> Self {
        self.ssl_mode = mode;
        self
    }

    /// Permit LOAD DATA LOCAL INFILE.
    #[must_use]
    pub fn allow_local_infile(mut self, allow: bool) -> Self {
        self.allow_local_infile = allow;
        self
    }

    /// Set the prepared-statement cache capacity (0 disables).
    #[must_use]
    pub fn prepare_cache_size(mut self, size: usize) -> Self {
        self.prepare_cache_size = size;
        self
    }

    /// Set the per-frame read inactivity timeout.
    #[must_use]
    pub fn socket_timeout(mut self, timeout: Duration) -> Self {
        self.socket_timeout = Some(timeout);
        self
    }

    /// Set the server-enforced statement timeout.
    #[must_use]
    pub fn statement_timeout(mut self, timeout: Duration) -> Self {
        self.statement_timeout = Some(timeout);
        self
    }

    /// Set the initial collation id.
    #[must_use]
    pub fn collation(mut self, collation: u8) -> Self {
        self.collation = collation;
        self
    }

    /// Add a session variable applied at connect.
    #[must_use]
    pub fn session_variable(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.session_variables.push((key.into(), value.into()));
        self
    }

    /// Set the initial autocommit mode.
    #[must_use]
    pub fn autocommit(mut self, autocommit: bool) -> Self {
        self.autocommit = Some(autocommit);
        self
    }

    /// Whether the transport counts as secure for authentication.
    #[must_use]
    pub fn secure_transport(&self) -> bool {
        self.socket.is_some() || self.ssl_mode.is_secure()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::new("app");
        assert_eq!(config.prepare_cache_size, DEFAULT_PREPARE_CACHE_SIZE);
        assert_eq!(config.collation, collations::UTF8MB4_UNICODE_CI);
        assert!(!config.secure_transport());
        assert!(config.autocommit.is_none());
    }

    #[test]
    fn test_builder_chain() {
        let config = Config::new("app")
            .password("secret")
            .database("test")
            .ssl_mode(SslMode::VerifyFull)
            .prepare_cache_size(10)
            .session_variable("sql_mode", "ANSI_QUOTES")
            .autocommit(false);
        assert_eq!(config.database.as_deref(), Some("test"));
        assert!(config.secure_transport());
        assert_eq!(config.session_variables.len(), 1);
        assert_eq!(config.autocommit, Some(false));
    }

    #[test]
    fn test_unix_socket_is_secure() {
        assert!(Config::new("app")
            .socket("/run/mysqld/mysqld.sock")
            .secure_transport())
    }
}
