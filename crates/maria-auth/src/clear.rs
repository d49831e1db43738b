//! `mysql_clear_password` plugin.

use crate::error::AuthError;
use crate::plugin::{AuthenticationPlugin, Credentials};

/// Clear-text password authentication.
///
/// Sends the UTF-8 password followed by a terminating NUL. Intended for
/// PAM-style server plugins; deployments are expected to run it over TLS
/// or a unix socket.
#[derive(Debug)]
pub struct ClearPasswordPlugin;

impl AuthenticationPlugin for ClearPasswordPlugin {
    fn name(&self) -> &'static str {
        "mysql_clear_password"
    }

    fn next(
        &self,
        credentials: &Credentials,
        _seed: &[u8],
        _auth_more: Option<&[u8]>,
    ) -> Result<Option<Vec<u8>>, AuthError> {
        let mut payload = credentials.password_bytes().to_vec();
        payload.push(0);
        Ok(Some(payload))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_is_null_terminated() {
        let plugin = ClearPasswordPlugin;
        let creds = Credentials::new("app", Some("pwd".to_string()));
        let payload = plugin.next(&creds, &[], None).unwrap().unwrap();
        assert_eq!(payload, b"pwd\0");
    }

    #[test]
    fn test_empty_password() {
        let plugin = ClearPasswordPlugin;
        let creds = Credentials::new("app", None);
        let payload = plugin.next(&creds, &[], None).unwrap().unwrap();
        assert_eq!(payload, b"\0");
    }
}
