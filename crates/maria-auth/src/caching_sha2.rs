//! `caching_sha2_password` plugin.

use sha2::{Digest, Sha256};

use crate::error::AuthError;
use crate::plugin::{AuthenticationPlugin, Credentials};

/// Server signal: the scramble hit the server-side cache.
const FAST_AUTH_SUCCESS: u8 = 0x03;
/// Server signal: full authentication required.
const PERFORM_FULL_AUTHENTICATION: u8 = 0x04;

/// SHA-256 caching authentication.
///
/// The first exchange sends the 32-byte scramble
/// `SHA256(password) XOR SHA256(seed ∥ SHA256(SHA256(password)))`. If the
/// server's credential cache misses it answers `0x04` and the clear
/// password must follow, which is only permitted over TLS or a unix
/// socket; `0x03` confirms the fast path and an OK packet follows.
#[derive(Debug)]
pub struct CachingSha2Plugin;

/// Compute the caching-SHA2 scramble.
#[must_use]
pub fn scramble_sha256(password: &[u8], seed: &[u8]) -> Vec<u8> {
    let stage1 = Sha256::digest(password);
    let stage2 = Sha256::digest(stage1);

    let mut hasher = Sha256::new();
    hasher.update(seed);
    hasher.update(stage2);
    let seeded = hasher.finalize();

    stage1
        .iter()
        .zip(seeded.iter())
        .map(|(a, b)| a ^ b)
        .collect()
}

impl AuthenticationPlugin for CachingSha2Plugin {
    fn name(&self) -> &'static str {
        "caching_sha2_password"
    }

    fn next(
        &self,
        credentials: &Credentials,
        seed: &[u8],
        auth_more: Option<&[u8]>,
    ) -> Result<Option<Vec<u8>>, AuthError> {
        let Some(more) = auth_more else {
            let password = credentials.password_bytes();
            if password.is_empty() {
                return Ok(Some(Vec::new()));
            }
            return Ok(Some(scramble_sha256(password, seed)));
        };

        match more.first().copied() {
            Some(FAST_AUTH_SUCCESS) => {
                tracing::debug!("caching_sha2_password fast authentication succeeded");
                Ok(None)
            }
            Some(PERFORM_FULL_AUTHENTICATION) => {
                if !credentials.secure_transport {
                    return Err(AuthError::SecureTransportRequired("caching_sha2_password"));
                }
                let mut payload = credentials.password_bytes().to_vec();
                payload.push(0);
                Ok(Some(payload))
            }
            other => Err(AuthError::UnexpectedAuthData(other.unwrap_or(0))),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_scramble_length_and_structure() {
        let seed = [7u8; 20];
        let scramble = scramble_sha256(b"secret", &seed);
        assert_eq!(scramble.len(), 32);

        let stage1 = Sha256::digest(b"secret");
        let stage2 = Sha256::digest(stage1);
        let mut h = Sha256::new();
        h.update(seed);
        h.update(stage2);
        let rhs = h.finalize();
        for (i, byte) in scramble.iter().enumerate() {
            assert_eq!(*byte, stage1[i] ^ rhs[i]);
        }
    }

    #[test]
    fn test_fast_path_sends_nothing() {
        let plugin = CachingSha2Plugin;
        let creds = Credentials::new("app", Some("pwd".to_string()));
        let next = plugin.next(&creds, &[0u8; 20], Some(&[0x03])).unwrap();
        assert!(next.is_none());
    }

    #[test]
    fn test_full_auth_requires_secure_transport() {
        let plugin = CachingSha2Plugin;
        let creds = Credentials::new("app", Some("pwd".to_string()));
        let err = plugin
            .next(&creds, &[0u8; 20], Some(&[0x04]))
            .unwrap_err();
        assert_eq!(
            err,
            AuthError::SecureTransportRequired("caching_sha2_password")
        );
    }

    #[test]
    fn test_full_auth_over_tls_sends_clear_password() {
        let plugin = CachingSha2Plugin;
        let creds = Credentials::new("app", Some("pwd".to_string())).secure();
        let payload = plugin
            .next(&creds, &[0u8; 20], Some(&[0x04]))
            .unwrap()
            .unwrap();
        assert_eq!(payload, b"pwd\0");
    }
}
