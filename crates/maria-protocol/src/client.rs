//! Client message building.
//!
//! Each message encodes itself into a payload; framing (length prefix,
//! sequencing, chunking) is applied by the codec layer. Builders take the
//! connection context so capability-dependent fields follow negotiation.

use bytes::{BufMut, Bytes, BytesMut};

use crate::buffer::{write_length_encoded_bytes, write_null_terminated, write_zero_fill};
use crate::constants::{Capabilities, Command};
use crate::context::ConnectionContext;

/// Max packet size announced in the handshake response (16 MiB).
pub const MAX_PACKET_SIZE_ANNOUNCED: u32 = 0x0100_0000;

/// A message sent to the server.
#[derive(Debug, Clone)]
pub enum ClientMessage {
    /// TLS upgrade request (first 32 handshake-response bytes only).
    SslRequest(SslRequest),
    /// Handshake response completing capability negotiation.
    HandshakeResponse(HandshakeResponse),
    /// Raw authentication continuation payload.
    AuthMoreRaw(Bytes),
    /// COM_QUIT.
    Quit,
    /// COM_PING.
    Ping,
    /// COM_RESET_CONNECTION.
    ResetConnection,
    /// COM_INIT_DB.
    InitDb(String),
    /// COM_QUERY.
    Query(String),
    /// COM_STMT_PREPARE.
    StmtPrepare(String),
    /// COM_STMT_EXECUTE.
    StmtExecute(StmtExecute),
    /// COM_STMT_CLOSE.
    StmtClose(u32),
    /// COM_STMT_RESET.
    StmtReset(u32),
    /// COM_STMT_FETCH.
    StmtFetch {
        /// Statement id.
        statement_id: u32,
        /// Number of rows to fetch.
        rows: u32,
    },
    /// COM_CHANGE_USER.
    ChangeUser(ChangeUser),
}

impl ClientMessage {
    /// Encode the message payload.
    #[must_use]
    pub fn encode(&self, context: &ConnectionContext) -> Bytes {
        match self {
            Self::SslRequest(req) => req.encode(),
            Self::HandshakeResponse(resp) => resp.encode(),
            Self::AuthMoreRaw(raw) => raw.clone(),
            Self::Quit => command_only(Command::Quit),
            Self::Ping => command_only(Command::Ping),
            Self::ResetConnection => command_only(Command::ResetConnection),
            Self::InitDb(database) => command_with_text(Command::InitDb, database),
            Self::Query(sql) => command_with_text(Command::Query, sql),
            Self::StmtPrepare(sql) => command_with_text(Command::StmtPrepare, sql),
            Self::StmtExecute(execute) => execute.encode(),
            Self::StmtClose(statement_id) => command_with_id(Command::StmtClose, *statement_id),
            Self::StmtReset(statement_id) => command_with_id(Command::StmtReset, *statement_id),
            Self::StmtFetch {
                statement_id,
                rows,
            } => {
                let mut buf = BytesMut::with_capacity(9);
                buf.put_u8(Command::StmtFetch as u8);
                buf.put_u32_le(*statement_id);
                buf.put_u32_le(*rows);
                buf.freeze()
            }
            Self::ChangeUser(change) => change.encode(context),
        }
    }

    /// Whether this message opens a fresh command boundary (sequence id 0).
    #[must_use]
    pub fn resets_sequence(&self) -> bool {
        !matches!(
            self,
            Self::SslRequest(_) | Self::HandshakeResponse(_) | Self::AuthMoreRaw(_)
        )
    }
}

fn command_only(command: Command) -> Bytes {
    let mut buf = BytesMut::with_capacity(1);
    buf.put_u8(command as u8);
    buf.freeze()
}

fn command_with_text(command: Command, text: &str) -> Bytes {
    let mut buf = BytesMut::with_capacity(1 + text.len());
    buf.put_u8(command as u8);
    buf.put_slice(text.as_bytes());
    buf.freeze()
}

fn command_with_id(command: Command, statement_id: u32) -> Bytes {
    let mut buf = BytesMut::with_capacity(5);
    buf.put_u8(command as u8);
    buf.put_u32_le(statement_id);
    buf.freeze()
}

/// TLS upgrade request.
///
/// Carries the same leading 32 bytes as the handshake response with the
/// `SSL` capability set, and nothing else; the TLS handshake follows on
/// the raw stream.
#[derive(Debug, Clone)]
pub struct SslRequest {
    /// Client capabilities (must include [`Capabilities::SSL`]).
    pub capabilities: Capabilities,
    /// Client collation.
    pub collation: u8,
}

impl SslRequest {
    fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(32);
        put_capability_header(&mut buf, self.capabilities, self.collation);
        buf.freeze()
    }
}

/// Handshake response completing authentication setup.
#[derive(Debug, Clone)]
pub struct HandshakeResponse {
    /// Negotiated client capabilities.
    pub capabilities: Capabilities,
    /// Client collation.
    pub collation: u8,
    /// Login user name.
    pub username: String,
    /// Initial authentication plugin response.
    pub auth_response: Vec<u8>,
    /// Default database, when `CONNECT_WITH_DB` is negotiated.
    pub database: Option<String>,
    /// Authentication plugin name, when `PLUGIN_AUTH` is negotiated.
    pub auth_plugin: Option<String>,
}

impl HandshakeResponse {
    fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(128);
        put_capability_header(&mut buf, self.capabilities, self.collation);
        write_null_terminated(&mut buf, &self.username);

        if self
            .capabilities
            .contains(Capabilities::PLUGIN_AUTH_LENENC_CLIENT_DATA)
        {
            write_length_encoded_bytes(&mut buf, &self.auth_response);
        } else if self.capabilities.contains(Capabilities::SECURE_CONNECTION) {
            buf.put_u8(self.auth_response.len() as u8);
            buf.put_slice(&self.auth_response);
        } else {
            buf.put_slice(&self.auth_response);
            buf.put_u8(0);
        }

        if self.capabilities.contains(Capabilities::CONNECT_WITH_DB) {
            write_null_terminated(&mut buf, self.database.as_deref().unwrap_or(""));
        }
        if self.capabilities.contains(Capabilities::PLUGIN_AUTH) {
            write_null_terminated(&mut buf, self.auth_plugin.as_deref().unwrap_or(""));
        }
        buf.freeze()
    }
}

// Shared 32-byte prefix of SslRequest and HandshakeResponse: low
// capabilities, max packet size, collation, 19 filler bytes, then the
// MariaDB extended capabilities (or zeros for a MySQL-flavored exchange).
fn put_capability_header(buf: &mut BytesMut, capabilities: Capabilities, collation: u8) {
    buf.put_u32_le((capabilities.bits() & 0xffff_ffff) as u32);
    buf.put_u32_le(MAX_PACKET_SIZE_ANNOUNCED);
    buf.put_u8(collation);
    write_zero_fill(buf, 19);
    if capabilities.contains(Capabilities::CLIENT_MYSQL) {
        write_zero_fill(buf, 4);
    } else {
        buf.put_u32_le((capabilities.bits() >> 32) as u32);
    }
}

/// A parameter bound for `COM_STMT_EXECUTE`.
///
/// Values are pre-encoded by the type codecs; NULL parameters carry no
/// payload bytes and are signalled through the null bitmap.
#[derive(Debug, Clone)]
pub struct BoundParameter {
    /// Wire type byte.
    pub type_byte: u8,
    /// Whether the value is unsigned.
    pub unsigned: bool,
    /// Binary-encoded value; `None` for SQL NULL.
    pub value: Option<Bytes>,
}

/// COM_STMT_EXECUTE message.
#[derive(Debug, Clone)]
pub struct StmtExecute {
    /// Statement id from the prepare response.
    pub statement_id: u32,
    /// Bound parameters, dense by index.
    pub parameters: Vec<BoundParameter>,
}

impl StmtExecute {
    fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(64);
        buf.put_u8(Command::StmtExecute as u8);
        buf.put_u32_le(self.statement_id);
        buf.put_u8(0); // CURSOR_TYPE_NO_CURSOR
        buf.put_u32_le(1); // iteration count

        if !self.parameters.is_empty() {
            let mut bitmap = vec![0u8; (self.parameters.len() + 7) / 8];
            for (i, param) in self.parameters.iter().enumerate() {
                if param.value.is_none() {
                    bitmap[i / 8] |= 1 << (i % 8);
                }
            }
            buf.put_slice(&bitmap);
            buf.put_u8(1); // new params bound
            for param in &self.parameters {
                buf.put_u8(param.type_byte);
                buf.put_u8(if param.unsigned { 0x80 } else { 0 });
            }
            for param in &self.parameters {
                if let Some(value) = &param.value {
                    buf.put_slice(value);
                }
            }
        }
        buf.freeze()
    }
}

/// COM_CHANGE_USER message.
#[derive(Debug, Clone)]
pub struct ChangeUser {
    /// New user name.
    pub username: String,
    /// Authentication plugin response for the new user.
    pub auth_response: Vec<u8>,
    /// Default database.
    pub database: Option<String>,
    /// Client collation.
    pub collation: u8,
    /// Authentication plugin name.
    pub auth_plugin: Option<String>,
}

impl ChangeUser {
    fn encode(&self, context: &ConnectionContext) -> Bytes {
        let capabilities = context.capabilities();
        let mut buf = BytesMut::with_capacity(64);
        buf.put_u8(Command::ChangeUser as u8);
        write_null_terminated(&mut buf, &self.username);
        if capabilities.contains(Capabilities::SECURE_CONNECTION) {
            buf.put_u8(self.auth_response.len() as u8);
            buf.put_slice(&self.auth_response);
        } else {
            buf.put_slice(&self.auth_response);
            buf.put_u8(0);
        }
        write_null_terminated(&mut buf, self.database.as_deref().unwrap_or(""));
        buf.put_u16_le(u16::from(self.collation));
        if capabilities.contains(Capabilities::PLUGIN_AUTH) {
            write_null_terminated(&mut buf, self.auth_plugin.as_deref().unwrap_or(""));
        }
        buf.freeze()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::constants::ServerStatus;

    fn context() -> ConnectionContext {
        ConnectionContext::for_tests(ServerStatus::AUTOCOMMIT)
    }

    #[test]
    fn test_simple_commands() {
        let context = context();
        assert_eq!(ClientMessage::Quit.encode(&context).as_ref(), &[0x01]);
        assert_eq!(ClientMessage::Ping.encode(&context).as_ref(), &[0x0e]);
        assert_eq!(
            ClientMessage::ResetConnection.encode(&context).as_ref(),
            &[0x1f]
        );
    }

    #[test]
    fn test_query_payload() {
        let payload = ClientMessage::Query("SELECT 1".to_string()).encode(&context());
        assert_eq!(payload[0], 0x03);
        assert_eq!(&payload[1..], b"SELECT 1");
    }

    #[test]
    fn test_stmt_close_payload() {
        let payload = ClientMessage::StmtClose(0x0102_0304).encode(&context());
        assert_eq!(payload.as_ref(), &[0x19, 0x04, 0x03, 0x02, 0x01]);
    }

    #[test]
    fn test_handshake_response_layout() {
        let capabilities = Capabilities::PROTOCOL_41
            | Capabilities::SECURE_CONNECTION
            | Capabilities::PLUGIN_AUTH
            | Capabilities::CONNECT_WITH_DB;
        let response = HandshakeResponse {
            capabilities,
            collation: 224,
            username: "app".to_string(),
            auth_response: vec![0xaa; 20],
            database: Some("test".to_string()),
            auth_plugin: Some("mysql_native_password".to_string()),
        };
        let payload = ClientMessage::HandshakeResponse(response).encode(&context());

        assert_eq!(
            u32::from_le_bytes([payload[0], payload[1], payload[2], payload[3]]),
            (capabilities.bits() & 0xffff_ffff) as u32
        );
        assert_eq!(
            u32::from_le_bytes([payload[4], payload[5], payload[6], payload[7]]),
            MAX_PACKET_SIZE_ANNOUNCED
        );
        assert_eq!(payload[8], 224);
        // Extended capability slot follows 19 filler bytes.
        assert_eq!(&payload[9..28], &[0u8; 19]);
        assert_eq!(&payload[32..36], b"app\0");
        assert_eq!(payload[36], 20); // auth response length
        assert_eq!(&payload[37..57], &[0xaa; 20]);
        assert_eq!(&payload[57..62], b"test\0");
        assert_eq!(&payload[62..], b"mysql_native_password\0");
    }

    #[test]
    fn test_ssl_request_is_header_only() {
        let request = SslRequest {
            capabilities: Capabilities::PROTOCOL_41 | Capabilities::SSL,
            collation: 224,
        };
        let payload = ClientMessage::SslRequest(request).encode(&context());
        assert_eq!(payload.len(), 32);
    }

    #[test]
    fn test_stmt_execute_null_bitmap() {
        let execute = StmtExecute {
            statement_id: 7,
            parameters: vec![
                BoundParameter {
                    type_byte: 8,
                    unsigned: false,
                    value: Some(Bytes::from_static(&[1, 0, 0, 0, 0, 0, 0, 0])),
                },
                BoundParameter {
                    type_byte: 6,
                    unsigned: false,
                    value: None,
                },
            ],
        };
        let payload = ClientMessage::StmtExecute(execute).encode(&context());
        assert_eq!(payload[0], 0x17);
        assert_eq!(u32::from_le_bytes([payload[1], payload[2], payload[3], payload[4]]), 7);
        assert_eq!(payload[5], 0); // no cursor
        assert_eq!(u32::from_le_bytes([payload[6], payload[7], payload[8], payload[9]]), 1);
        assert_eq!(payload[10], 0b0000_0010); // second parameter null
        assert_eq!(payload[11], 1); // new params bound
        assert_eq!(&payload[12..16], &[8, 0, 6, 0]); // type/flag pairs
        assert_eq!(&payload[16..], &[1, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_sequence_reset_classification() {
        assert!(ClientMessage::Query("SELECT 1".into()).resets_sequence());
        assert!(!ClientMessage::AuthMoreRaw(Bytes::new()).resets_sequence());
    }
}
