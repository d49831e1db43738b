//! `client_ed25519` plugin (MariaDB).

use ed25519_dalek::hazmat::{raw_sign, ExpandedSecretKey};
use ed25519_dalek::VerifyingKey;
use sha2::{Digest, Sha512};

use crate::error::AuthError;
use crate::plugin::{AuthenticationPlugin, Credentials};

/// Ed25519 signature authentication.
///
/// The expanded secret is `SHA-512(password)` with the standard RFC 8032
/// clamping; the client signs the server seed and sends the 64-byte
/// `R ∥ S` signature. No password yields an empty payload.
#[derive(Debug)]
pub struct Ed25519Plugin;

/// Sign the server seed with the password-derived Ed25519 key.
#[must_use]
pub fn sign_with_password(password: &[u8], seed: &[u8]) -> [u8; 64] {
    let hash: [u8; 64] = Sha512::digest(password).into();
    let expanded = ExpandedSecretKey::from_bytes(&hash);
    let verifying_key = VerifyingKey::from(&expanded);
    raw_sign::<Sha512>(&expanded, seed, &verifying_key).to_bytes()
}

impl AuthenticationPlugin for Ed25519Plugin {
    fn name(&self) -> &'static str {
        "client_ed25519"
    }

    fn next(
        &self,
        credentials: &Credentials,
        seed: &[u8],
        _auth_more: Option<&[u8]>,
    ) -> Result<Option<Vec<u8>>, AuthError> {
        let password = credentials.password_bytes();
        if password.is_empty() {
            return Ok(Some(Vec::new()));
        }
        Ok(Some(sign_with_password(password, seed).to_vec()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_verifies_under_derived_key() {
        let seed = [0x5au8; 32];
        let signature = sign_with_password(b"secret", &seed);
        assert_eq!(signature.len(), 64);

        let hash: [u8; 64] = Sha512::digest(b"secret").into();
        let expanded = ExpandedSecretKey::from_bytes(&hash);
        let verifying_key = VerifyingKey::from(&expanded);
        let sig = ed25519_dalek::Signature::from_bytes(&signature);
        verifying_key.verify_strict(&seed, &sig).unwrap();
    }

    #[test]
    fn test_signature_is_deterministic() {
        let seed = [1u8; 32];
        assert_eq!(sign_with_password(b"pwd", &seed), sign_with_password(b"pwd", &seed));
    }

    #[test]
    fn test_different_seeds_differ() {
        assert_ne!(
            sign_with_password(b"pwd", &[1u8; 32]),
            sign_with_password(b"pwd", &[2u8; 32])
        );
    }
}
