//! Plugin contract and dispatch.

use crate::caching_sha2::CachingSha2Plugin;
use crate::clear::ClearPasswordPlugin;
use crate::ed25519::Ed25519Plugin;
use crate::error::AuthError;
use crate::native::NativePasswordPlugin;

/// Login credentials and transport facts the plugins act on.
#[derive(Clone)]
pub struct Credentials {
    /// Login user name.
    pub username: String,
    /// Login password; `None` and `""` both mean no password.
    pub password: Option<String>,
    /// Whether the transport is TLS or a unix socket. Gates plugins that
    /// would otherwise leak the clear password.
    pub secure_transport: bool,
}

impl Credentials {
    /// Create credentials for a plain TCP connection.
    #[must_use]
    pub fn new(username: impl Into<String>, password: Option<String>) -> Self {
        Self {
            username: username.into(),
            password,
            secure_transport: false,
        }
    }

    /// Mark the transport as secure (TLS or unix socket).
    #[must_use]
    pub fn secure(mut self) -> Self {
        self.secure_transport = true;
        self
    }

    /// Password bytes, empty when unset.
    #[must_use]
    pub fn password_bytes(&self) -> &[u8] {
        self.password.as_deref().unwrap_or("").as_bytes()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("secure_transport", &self.secure_transport)
            .finish()
    }
}

/// One step of an authentication exchange.
///
/// `seed` is the current server challenge (refreshed by an auth switch);
/// `auth_more` carries the payload of the most recent `AuthMoreData`
/// packet, absent on the first exchange. Returning `None` means the plugin
/// has nothing to send and expects the server's verdict next.
pub trait AuthenticationPlugin: Send + Sync + std::fmt::Debug {
    /// Plugin name as advertised by the server.
    fn name(&self) -> &'static str;

    /// Produce the next client payload.
    fn next(
        &self,
        credentials: &Credentials,
        seed: &[u8],
        auth_more: Option<&[u8]>,
    ) -> Result<Option<Vec<u8>>, AuthError>;
}

static NATIVE: NativePasswordPlugin = NativePasswordPlugin;
static CLEAR: ClearPasswordPlugin = ClearPasswordPlugin;
static CACHING_SHA2: CachingSha2Plugin = CachingSha2Plugin;
static ED25519: Ed25519Plugin = Ed25519Plugin;

/// Resolve a plugin by its server-advertised name.
///
/// An `AuthSwitchRequest` re-enters here with the new name and seed.
pub fn plugin_for(name: &str) -> Result<&'static dyn AuthenticationPlugin, AuthError> {
    match name {
        "mysql_native_password" | "" => Ok(&NATIVE),
        "mysql_clear_password" => Ok(&CLEAR),
        "caching_sha2_password" => Ok(&CACHING_SHA2),
        "client_ed25519" => Ok(&ED25519),
        other => Err(AuthError::UnknownPlugin(other.to_string())),
    }
}
