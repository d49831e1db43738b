//! `mysql_native_password` plugin.

use sha1::{Digest, Sha1};

use crate::error::AuthError;
use crate::plugin::{AuthenticationPlugin, Credentials};

/// SHA-1 challenge/response authentication.
///
/// The response is `SHA1(password) XOR SHA1(seed ∥ SHA1(SHA1(password)))`,
/// a fixed 20-byte payload. An empty password answers with an empty
/// payload.
#[derive(Debug)]
pub struct NativePasswordPlugin;

/// Compute the native-password scramble.
#[must_use]
pub fn scramble_native(password: &[u8], seed: &[u8]) -> Vec<u8> {
    let stage1 = Sha1::digest(password);
    let stage2 = Sha1::digest(stage1);

    let mut hasher = Sha1::new();
    hasher.update(seed);
    hasher.update(stage2);
    let seeded = hasher.finalize();

    stage1
        .iter()
        .zip(seeded.iter())
        .map(|(a, b)| a ^ b)
        .collect()
}

impl AuthenticationPlugin for NativePasswordPlugin {
    fn name(&self) -> &'static str {
        "mysql_native_password"
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
        Ok(Some(scramble_native(password, seed)))
    }
}
