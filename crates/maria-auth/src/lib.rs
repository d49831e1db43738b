//! # maria-auth
//!
//! Authentication plugin flows for the MariaDB/MySQL client protocol.
//!
//! The server advertises a plugin name in the initial handshake; the
//! client answers with that plugin's response to the random seed. The
//! server may switch plugins mid-flight (`AuthSwitchRequest`) or ask for
//! another round (`AuthMoreData`); each plugin is a small state machine
//! consuming the server's last payload and producing the next client one.
//!
//! Supported plugins:
//!
//! | Plugin | Mechanism |
//! |--------|-----------|
//! | `mysql_native_password` | SHA-1 challenge/response |
//! | `mysql_clear_password` | Clear text (TLS/socket deployments) |
//! | `caching_sha2_password` | SHA-256 scramble with full-auth fallback |
//! | `client_ed25519` | Ed25519 signature over the seed |

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod caching_sha2;
pub mod clear;
pub mod ed25519;
pub mod error;
pub mod native;
pub mod plugin;

pub use error::AuthError;
pub use plugin::{plugin_for, AuthenticationPlugin, Credentials};
