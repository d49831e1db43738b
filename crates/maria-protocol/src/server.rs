//! Server message parsing.
//!
//! Messages are decoded from complete, reassembled payloads. The first
//! payload byte selects the message type, disambiguated by the connection
//! phase (an `0xfe` byte is an EOF packet in a result set but an
//! auth-switch request during authentication; a leading `0x00` is an OK
//! packet outside a result window but a binary row inside one). Phase
//! tracking lives in the connection layer; this module provides the
//! per-message parsers.
//!
//! Every parsed message answers [`ServerMessage::ending`], which the
//! result pipeline uses to cut streaming windows.

use bytes::{Buf, Bytes};

use crate::buffer::{
    read_length_encoded, read_length_encoded_bytes, read_length_encoded_required,
    read_length_encoded_string, read_null_terminated,
};
use crate::constants::{Capabilities, ColumnFlags, ServerStatus};
use crate::error::ProtocolError;
use crate::types::DataType;
use crate::version::ServerVersion;

/// Marker byte of ERR packets.
pub const ERR_HEADER: u8 = 0xff;
/// Marker byte of EOF and auth-switch packets.
pub const EOF_HEADER: u8 = 0xfe;
/// Marker byte of LOCAL INFILE requests.
pub const LOCAL_INFILE_HEADER: u8 = 0xfb;

/// A message received from the server.
#[derive(Debug, Clone)]
pub enum ServerMessage {
    /// Initial handshake opening the connection.
    InitialHandshake(InitialHandshake),
    /// OK packet.
    Ok(OkPacket),
    /// ERR packet.
    Err(ErrPacket),
    /// EOF packet (legacy result terminator / column separator).
    Eof(EofPacket),
    /// Authentication plugin switch request.
    AuthSwitchRequest(AuthSwitchRequest),
    /// Additional authentication data.
    AuthMoreData(AuthMoreData),
    /// Column count opening a result set.
    ColumnCount(u64),
    /// Column definition.
    ColumnDefinition(ColumnDefinition),
    /// Raw text-protocol row.
    TextRow(Bytes),
    /// Raw binary-protocol row.
    BinaryRow(Bytes),
    /// Prepare response header.
    PrepareResult(PrepareResult),
    /// Server requests a local file.
    LocalInfileRequest(LocalInfileRequest),
}

impl ServerMessage {
    /// Whether this message terminates the current streaming window.
    #[must_use]
    pub fn ending(&self) -> bool {
        match self {
            Self::InitialHandshake(_) | Self::Err(_) => true,
            Self::Ok(ok) => ok.ending(),
            Self::Eof(eof) => eof.ending,
            Self::PrepareResult(prepare) => !prepare.continue_on_end,
            Self::AuthSwitchRequest(_)
            | Self::AuthMoreData(_)
            | Self::ColumnCount(_)
            | Self::ColumnDefinition(_)
            | Self::TextRow(_)
            | Self::BinaryRow(_)
            | Self::LocalInfileRequest(_) => false,
        }
    }
}

/// Initial handshake packet.
#[derive(Debug, Clone)]
pub struct InitialHandshake {
    /// Parsed server version.
    pub version: ServerVersion,
    /// Server thread id for this connection.
    pub thread_id: u32,
    /// Authentication seed (seed1 ∥ seed2).
    pub seed: Vec<u8>,
    /// Server capability bitmask (64-bit once merged).
    pub capabilities: Capabilities,
    /// Server default collation.
    pub default_collation: u8,
    /// Server status flags.
    pub server_status: ServerStatus,
    /// Advertised authentication plugin, when `PLUGIN_AUTH` is set.
    pub auth_plugin: Option<String>,
}

impl InitialHandshake {
    /// Parse the initial handshake payload.
    pub fn decode(mut src: Bytes) -> Result<Self, ProtocolError> {
        if src.remaining() < 1 {
            return Err(ProtocolError::IncompletePacket {
                expected: 1,
                actual: 0,
            });
        }
        let protocol_version = src.get_u8();
        if protocol_version != 0x0a {
            return Err(ProtocolError::UnsupportedProtocolVersion(protocol_version));
        }

        let raw_version = read_null_terminated(&mut src, "server version")?;
        ensure_remaining(&src, 4 + 8 + 1 + 2 + 1 + 2 + 2 + 1 + 6 + 4)?;
        let thread_id = src.get_u32_le();
        let mut seed = Vec::with_capacity(20);
        seed.extend_from_slice(&src.split_to(8));
        src.advance(1);

        let caps_low = u64::from(src.get_u16_le());
        let default_collation = src.get_u8();
        let server_status = ServerStatus::from_bits_truncate(src.get_u16_le());
        let caps_32 = caps_low | (u64::from(src.get_u16_le()) << 16);

        let salt_length = if caps_32 & Capabilities::PLUGIN_AUTH.bits() != 0 {
            (i32::from(src.get_u8()) - 9).max(12) as usize
        } else {
            src.advance(1);
            0
        };
        src.advance(6);

        // Filled only by MariaDB 10.2+; zero otherwise.
        let extended_caps = u64::from(src.get_u32_le());

        if caps_32 & Capabilities::SECURE_CONNECTION.bits() != 0 {
            if salt_length > 0 {
                ensure_remaining(&src, salt_length)?;
                seed.extend_from_slice(&src.split_to(salt_length));
            } else {
                while src.has_remaining() {
                    let b = src.get_u8();
                    if b == 0 {
                        break;
                    }
                    seed.push(b);
                }
            }
        }
        if src.has_remaining() {
            src.advance(1);
        }

        let (stripped, mut mariadb) =
            match raw_version.strip_prefix(crate::version::MARIADB_RPL_HACK_PREFIX) {
                Some(stripped) => (stripped, true),
                None => (raw_version.as_str(), raw_version.contains("MariaDB")),
            };

        // The extended capability field is only ever filled by MariaDB 10.2+.
        let capabilities = if caps_32 & Capabilities::CLIENT_MYSQL.bits() == 0 {
            mariadb = true;
            Capabilities::from_bits_truncate(caps_32 | (extended_caps << 32))
        } else {
            Capabilities::from_bits_truncate(caps_32)
        };
        let version = ServerVersion::new(stripped, mariadb);

        let auth_plugin = if capabilities.contains(Capabilities::PLUGIN_AUTH) {
            Some(read_plugin_name(&mut src)?)
        } else {
            None
        };

        Ok(Self {
            version,
            thread_id,
            seed,
            capabilities,
            default_collation,
            server_status,
            auth_plugin,
        })
    }
}

fn read_plugin_name(src: &mut Bytes) -> Result<String, ProtocolError> {
    // Some servers omit the trailing null on the plugin name.
    let mut bytes = Vec::new();
    while src.has_remaining() {
        let b = src.get_u8();
        if b == 0 {
            break;
        }
        bytes.push(b);
    }
    String::from_utf8(bytes).map_err(|_| ProtocolError::InvalidUtf8("auth plugin"))
}

fn ensure_remaining(src: &Bytes, needed: usize) -> Result<(), ProtocolError> {
    if src.remaining() < needed {
        return Err(ProtocolError::IncompletePacket {
            expected: needed,
            actual: src.remaining(),
        });
    }
    Ok(())
}

/// OK packet.
#[derive(Debug, Clone)]
pub struct OkPacket {
    /// Rows affected by the command.
    pub affected_rows: u64,
    /// Last auto-generated id.
    pub last_insert_id: u64,
    /// Server status flags.
    pub server_status: ServerStatus,
    /// Warning count.
    pub warnings: u16,
}

impl OkPacket {
    /// Parse an OK payload (first byte `0x00` or a repurposed `0xfe`).
    pub fn decode(mut src: Bytes, _capabilities: Capabilities) -> Result<Self, ProtocolError> {
        if !src.has_remaining() {
            return Err(ProtocolError::IncompletePacket {
                expected: 1,
                actual: 0,
            });
        }
        src.advance(1);
        let affected_rows = read_length_encoded_required(&mut src)?;
        let last_insert_id = read_length_encoded_required(&mut src)?;
        ensure_remaining(&src, 4)?;
        let server_status = ServerStatus::from_bits_truncate(src.get_u16_le());
        let warnings = src.get_u16_le();
        // Session-track payload may follow; the driver does not consume it.
        Ok(Self {
            affected_rows,
            last_insert_id,
            server_status,
            warnings,
        })
    }

    /// Whether this OK terminates the exchange (no further result sets).
    #[must_use]
    pub fn ending(&self) -> bool {
        !self.server_status.contains(ServerStatus::MORE_RESULTS_EXISTS)
    }
}

/// ERR packet.
#[derive(Debug, Clone)]
pub struct ErrPacket {
    /// Native error code.
    pub code: u16,
    /// Five-character SQLSTATE.
    pub sql_state: String,
    /// Error message.
    pub message: String,
}

impl ErrPacket {
    /// Parse an ERR payload (first byte `0xff`).
    pub fn decode(mut src: Bytes) -> Result<Self, ProtocolError> {
        ensure_remaining(&src, 3)?;
        src.advance(1);
        let code = src.get_u16_le();
        let mut sql_state = String::from("HY000");
        if src.has_remaining() && src[0] == b'#' {
            ensure_remaining(&src, 6)?;
            src.advance(1);
            let state = src.split_to(5);
            sql_state =
                String::from_utf8(state.to_vec()).map_err(|_| ProtocolError::InvalidUtf8("sqlstate"))?;
        }
        let message = String::from_utf8_lossy(&src).into_owned();
        Ok(Self {
            code,
            sql_state,
            message,
        })
    }
}

/// EOF packet (payload `0xfe`, length < 9).
#[derive(Debug, Clone)]
pub struct EofPacket {
    /// Warning count.
    pub warnings: u16,
    /// Server status flags.
    pub server_status: ServerStatus,
    /// Whether this EOF terminates the streaming window.
    pub ending: bool,
}

impl EofPacket {
    /// Parse an EOF payload. `ending` is false for the EOF separating
    /// column definitions from rows, true for a result terminator (unless
    /// more results follow).
    pub fn decode(mut src: Bytes, result_terminator: bool) -> Result<Self, ProtocolError> {
        ensure_remaining(&src, 5)?;
        src.advance(1);
        let warnings = src.get_u16_le();
        let server_status = ServerStatus::from_bits_truncate(src.get_u16_le());
        let ending =
            result_terminator && !server_status.contains(ServerStatus::MORE_RESULTS_EXISTS);
        Ok(Self {
            warnings,
            server_status,
            ending,
        })
    }
}

/// Authentication switch request.
#[derive(Debug, Clone)]
pub struct AuthSwitchRequest {
    /// Plugin the server wants to switch to.
    pub plugin: String,
    /// Fresh authentication seed.
    pub seed: Vec<u8>,
}

impl AuthSwitchRequest {
    /// Parse an auth-switch payload (first byte `0xfe`, length ≥ 9).
    pub fn decode(mut src: Bytes) -> Result<Self, ProtocolError> {
        ensure_remaining(&src, 1)?;
        src.advance(1);
        let plugin = read_null_terminated(&mut src, "auth plugin")?;
        let mut seed = src.to_vec();
        if seed.last() == Some(&0) {
            seed.pop();
        }
        Ok(Self { plugin, seed })
    }
}

/// Additional authentication data (first byte `0x01`).
#[derive(Debug, Clone)]
pub struct AuthMoreData {
    /// Plugin-specific payload.
    pub data: Bytes,
}

impl AuthMoreData {
    /// Parse an auth-more-data payload.
    pub fn decode(mut src: Bytes) -> Result<Self, ProtocolError> {
        ensure_remaining(&src, 1)?;
        src.advance(1);
        Ok(Self { data: src })
    }
}

/// Column definition packet.
#[derive(Debug, Clone)]
pub struct ColumnDefinition {
    /// Catalog (always `def`).
    pub catalog: String,
    /// Schema name.
    pub schema: String,
    /// Table alias.
    pub table: String,
    /// Original table name.
    pub org_table: String,
    /// Column alias.
    pub name: String,
    /// Original column name.
    pub org_name: String,
    /// Collation id.
    pub collation: u16,
    /// Maximum display length.
    pub length: u32,
    /// Column data type.
    pub data_type: DataType,
    /// Column flags.
    pub flags: ColumnFlags,
    /// Decimal digits (scale, or microsecond precision for temporal types).
    pub decimals: u8,
}

impl ColumnDefinition {
    /// Parse a column definition payload.
    pub fn decode(mut src: Bytes) -> Result<Self, ProtocolError> {
        let catalog = read_length_encoded_string(&mut src, "catalog")?;
        let schema = read_length_encoded_string(&mut src, "schema")?;
        let table = read_length_encoded_string(&mut src, "table")?;
        let org_table = read_length_encoded_string(&mut src, "org_table")?;
        let name = read_length_encoded_string(&mut src, "name")?;
        let org_name = read_length_encoded_string(&mut src, "org_name")?;
        // Fixed-length block: lenenc 0x0c, charset, length, type, flags, decimals.
        let _fixed = read_length_encoded_required(&mut src)?;
        ensure_remaining(&src, 10)?;
        let collation = src.get_u16_le();
        let length = src.get_u32_le();
        let type_byte = src.get_u8();
        let flags = ColumnFlags::from_bits_truncate(src.get_u16_le());
        let decimals = src.get_u8();
        let data_type = DataType::from_server(type_byte, (collation & 0xff) as u8)?;
        Ok(Self {
            catalog,
            schema,
            table,
            org_table,
            name,
            org_name,
            collation,
            length,
            data_type,
            flags,
            decimals,
        })
    }

    /// Whether the column is signed.
    #[must_use]
    pub fn is_signed(&self) -> bool {
        !self.flags.contains(ColumnFlags::UNSIGNED)
    }

    /// Whether the column zero-fills on display.
    #[must_use]
    pub fn is_zero_fill(&self) -> bool {
        self.flags.contains(ColumnFlags::ZEROFILL)
    }

    /// Synthetic definition for tests and generated-key results.
    #[must_use]
    pub fn synthetic(name: &str, data_type: DataType, flags: ColumnFlags) -> Self {
        Self {
            catalog: "def".to_string(),
            schema: String::new(),
            table: String::new(),
            org_table: String::new(),
            name: name.to_string(),
            org_name: name.to_string(),
            collation: 224,
            length: 21,
            data_type,
            flags,
            decimals: 0,
        }
    }
}

/// Prepare response header (`COM_STMT_PREPARE` OK).
#[derive(Debug, Clone)]
pub struct PrepareResult {
    /// Server-assigned statement id.
    pub statement_id: u32,
    /// Number of result columns.
    pub num_columns: u16,
    /// Number of parameters.
    pub num_params: u16,
    /// Warning count.
    pub warnings: u16,
    /// When true, an execute is pipelined behind this prepare and the
    /// window stays open.
    pub continue_on_end: bool,
}

impl PrepareResult {
    /// Parse a prepare OK payload.
    pub fn decode(mut src: Bytes, continue_on_end: bool) -> Result<Self, ProtocolError> {
        ensure_remaining(&src, 12)?;
        src.advance(1);
        let statement_id = src.get_u32_le();
        let num_columns = src.get_u16_le();
        let num_params = src.get_u16_le();
        src.advance(1);
        let warnings = src.get_u16_le();
        Ok(Self {
            statement_id,
            num_columns,
            num_params,
            warnings,
            continue_on_end,
        })
    }
}

/// LOCAL INFILE request.
#[derive(Debug, Clone)]
pub struct LocalInfileRequest {
    /// File the server asks the client to stream.
    pub file_name: String,
}

impl LocalInfileRequest {
    /// Parse a LOCAL INFILE payload (first byte `0xfb`).
    pub fn decode(mut src: Bytes) -> Result<Self, ProtocolError> {
        ensure_remaining(&src, 1)?;
        src.advance(1);
        let file_name = String::from_utf8_lossy(&src).into_owned();
        Ok(Self { file_name })
    }
}

/// Cursor over the fields of a text-protocol row.
///
/// Each field is a length-encoded byte string, or NULL (`0xfb`).
#[derive(Debug)]
pub struct TextRowReader {
    src: Bytes,
}

impl TextRowReader {
    /// Wrap a raw text row payload.
    #[must_use]
    pub fn new(src: Bytes) -> Self {
        Self { src }
    }

    /// Read the next field; `None` means SQL NULL.
    pub fn next_field(&mut self) -> Result<Option<Bytes>, ProtocolError> {
        read_length_encoded_bytes(&mut self.src)
    }
}

/// Cursor over the fields of a binary-protocol row.
///
/// The payload starts with `0x00` followed by a null bitmap of
/// ⌈(columns + 2) / 8⌉ bytes whose bit positions are offset by 2.
/// Remaining fields are concatenated with type-specific widths.
#[derive(Debug)]
pub struct BinaryRowReader {
    src: Bytes,
    null_bitmap: Bytes,
    index: usize,
}

impl BinaryRowReader {
    /// Wrap a raw binary row payload.
    pub fn new(mut src: Bytes, column_count: usize) -> Result<Self, ProtocolError> {
        ensure_remaining(&src, 1)?;
        src.advance(1);
        let bitmap_len = (column_count + 2 + 7) / 8;
        ensure_remaining(&src, bitmap_len)?;
        let null_bitmap = src.split_to(bitmap_len);
        Ok(Self {
            src,
            null_bitmap,
            index: 0,
        })
    }

    /// Read the next field for `column`; `None` means SQL NULL.
    pub fn next_field(&mut self, column: &ColumnDefinition) -> Result<Option<Bytes>, ProtocolError> {
        let bit = self.index + 2;
        self.index += 1;
        if self.null_bitmap[bit / 8] & (1 << (bit % 8)) != 0 {
            return Ok(None);
        }
        let width = match column.data_type {
            DataType::TinyInt => 1,
            DataType::SmallInt | DataType::Year => 2,
            DataType::Integer | DataType::MediumInt | DataType::Float => 4,
            DataType::BigInt | DataType::Double => 8,
            DataType::Date
            | DataType::NewDate
            | DataType::Time
            | DataType::DateTime
            | DataType::Timestamp => {
                ensure_remaining(&self.src, 1)?;
                usize::from(self.src.get_u8())
            }
            _ => {
                let len = read_length_encoded(&mut self.src)?
                    .ok_or(ProtocolError::UnexpectedNull)?;
                usize::try_from(len).map_err(|_| ProtocolError::InvalidLength(len))?
            }
        };
        ensure_remaining(&self.src, width)?;
        Ok(Some(self.src.split_to(width)))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use bytes::{BufMut, BytesMut};

    fn sample_handshake(caps_low: u32, extended: u32, plugin: Option<&str>) -> Bytes {
        let mut buf = BytesMut::new();
        buf.put_u8(0x0a);
        buf.put_slice(b"5.5.5-10.6.12-MariaDB\0");
        buf.put_u32_le(42); // thread id
        buf.put_slice(&[1, 2, 3, 4, 5, 6, 7, 8]); // seed1
        buf.put_u8(0);
        buf.put_u16_le((caps_low & 0xffff) as u16);
        buf.put_u8(224); // collation
        buf.put_u16_le(0x0002); // autocommit
        buf.put_u16_le((caps_low >> 16) as u16);
        if caps_low & Capabilities::PLUGIN_AUTH.bits() as u32 != 0 {
            buf.put_u8(21); // salt length byte -> 12 bytes of seed2
        } else {
            buf.put_u8(0);
        }
        buf.put_slice(&[0u8; 6]);
        buf.put_u32_le(extended);
        buf.put_slice(&[9, 10, 11, 12, 13, 14, 15, 16, 17, 18, 19, 20]); // seed2
        buf.put_u8(0);
        if let Some(plugin) = plugin {
            buf.put_slice(plugin.as_bytes());
            buf.put_u8(0);
        }
        buf.freeze()
    }

    #[test]
    fn test_initial_handshake_mariadb() {
        let caps_low = (Capabilities::PROTOCOL_41
            | Capabilities::SECURE_CONNECTION
            | Capabilities::PLUGIN_AUTH)
            .bits() as u32;
        let extended = 0x1f;
        let handshake = InitialHandshake::decode(sample_handshake(
            caps_low,
            extended,
            Some("mysql_native_password"),
        ))
        .unwrap();

        assert!(handshake.version.is_mariadb());
        assert_eq!(handshake.version.major(), 10);
        assert_eq!(handshake.thread_id, 42);
        assert_eq!(handshake.seed.len(), 20);
        assert_eq!(handshake.seed[0], 1);
        assert_eq!(handshake.seed[8], 9);
        assert_eq!(
            handshake.auth_plugin.as_deref(),
            Some("mysql_native_password")
        );
        // CLIENT_MYSQL unset -> extended capabilities land in the high 32 bits.
        assert!(handshake
            .capabilities
            .contains(Capabilities::MARIADB_CLIENT_PROGRESS));
    }

    #[test]
    fn test_initial_handshake_rejects_protocol() {
        let mut buf = BytesMut::new();
        buf.put_u8(0x09);
        assert!(matches!(
            InitialHandshake::decode(buf.freeze()),
            Err(ProtocolError::UnsupportedProtocolVersion(0x09))
        ));
    }

    #[test]
    fn test_ok_packet() {
        let mut buf = BytesMut::new();
        buf.put_u8(0x00);
        buf.put_u8(3); // affected rows
        buf.put_u8(7); // last insert id
        buf.put_u16_le(0x0002);
        buf.put_u16_le(0);
        let ok = OkPacket::decode(buf.freeze(), Capabilities::PROTOCOL_41).unwrap();
        assert_eq!(ok.affected_rows, 3);
        assert_eq!(ok.last_insert_id, 7);
        assert!(ok.server_status.contains(ServerStatus::AUTOCOMMIT));
        assert!(ok.ending());
    }

    #[test]
    fn test_ok_packet_more_results() {
        let mut buf = BytesMut::new();
        buf.put_u8(0x00);
        buf.put_u8(0);
        buf.put_u8(0);
        buf.put_u16_le(ServerStatus::MORE_RESULTS_EXISTS.bits());
        buf.put_u16_le(0);
        let ok = OkPacket::decode(buf.freeze(), Capabilities::PROTOCOL_41).unwrap();
        assert!(!ok.ending());
    }

    #[test]
    fn test_err_packet_with_sqlstate() {
        let mut buf = BytesMut::new();
        buf.put_u8(0xff);
        buf.put_u16_le(1064);
        buf.put_slice(b"#42000syntax error");
        let err = ErrPacket::decode(buf.freeze()).unwrap();
        assert_eq!(err.code, 1064);
        assert_eq!(err.sql_state, "42000");
        assert_eq!(err.message, "syntax error");
    }

    #[test]
    fn test_err_packet_without_sqlstate() {
        let mut buf = BytesMut::new();
        buf.put_u8(0xff);
        buf.put_u16_le(1045);
        buf.put_slice(b"denied");
        let err = ErrPacket::decode(buf.freeze()).unwrap();
        assert_eq!(err.sql_state, "HY000");
    }

    #[test]
    fn test_eof_packet_ending_rules() {
        let mut buf = BytesMut::new();
        buf.put_u8(0xfe);
        buf.put_u16_le(0);
        buf.put_u16_le(0);
        let eof = EofPacket::decode(buf.clone().freeze(), false).unwrap();
        assert!(!eof.ending);
        let eof = EofPacket::decode(buf.freeze(), true).unwrap();
        assert!(eof.ending);
    }

    #[test]
    fn test_auth_switch_request() {
        let mut buf = BytesMut::new();
        buf.put_u8(0xfe);
        buf.put_slice(b"client_ed25519\0");
        buf.put_slice(&[1, 2, 3, 4, 0]);
        let switch = AuthSwitchRequest::decode(buf.freeze()).unwrap();
        assert_eq!(switch.plugin, "client_ed25519");
        assert_eq!(switch.seed, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_column_definition() {
        let mut buf = BytesMut::new();
        for field in ["def", "test", "t", "t", "id", "id"] {
            buf.put_u8(field.len() as u8);
            buf.put_slice(field.as_bytes());
        }
        buf.put_u8(0x0c);
        buf.put_u16_le(63);
        buf.put_u32_le(11);
        buf.put_u8(3); // INTEGER
        buf.put_u16_le(ColumnFlags::NOT_NULL.bits() | ColumnFlags::PRIMARY_KEY.bits());
        buf.put_u8(0);
        buf.put_u16_le(0);
        let column = ColumnDefinition::decode(buf.freeze()).unwrap();
        assert_eq!(column.name, "id");
        assert_eq!(column.data_type, DataType::Integer);
        assert!(column.is_signed());
        assert!(column.flags.contains(ColumnFlags::PRIMARY_KEY));
    }

    #[test]
    fn test_prepare_result() {
        let mut buf = BytesMut::new();
        buf.put_u8(0x00);
        buf.put_u32_le(17);
        buf.put_u16_le(2);
        buf.put_u16_le(1);
        buf.put_u8(0);
        buf.put_u16_le(0);
        let prepare = PrepareResult::decode(buf.freeze(), false).unwrap();
        assert_eq!(prepare.statement_id, 17);
        assert_eq!(prepare.num_columns, 2);
        assert_eq!(prepare.num_params, 1);
        assert!(ServerMessage::PrepareResult(prepare).ending());
    }

    #[test]
    fn test_text_row_reader() {
        let mut buf = BytesMut::new();
        buf.put_u8(2);
        buf.put_slice(b"42");
        buf.put_u8(0xfb);
        buf.put_u8(3);
        buf.put_slice(b"abc");
        let mut row = TextRowReader::new(buf.freeze());
        assert_eq!(row.next_field().unwrap().unwrap().as_ref(), b"42");
        assert!(row.next_field().unwrap().is_none());
        assert_eq!(row.next_field().unwrap().unwrap().as_ref(), b"abc");
    }

    #[test]
    fn test_binary_row_reader_null_bitmap() {
        // Two columns: INTEGER NULL, VARSTRING "ab".
        let columns = [
            ColumnDefinition::synthetic("a", DataType::Integer, ColumnFlags::empty()),
            ColumnDefinition::synthetic("b", DataType::VarString, ColumnFlags::empty()),
        ];
        let mut buf = BytesMut::new();
        buf.put_u8(0x00);
        buf.put_u8(0b0000_0100); // column 0 null (bit offset 2)
        buf.put_u8(2);
        buf.put_slice(b"ab");
        let mut row = BinaryRowReader::new(buf.freeze(), 2).unwrap();
        assert!(row.next_field(&columns[0]).unwrap().is_none());
        assert_eq!(row.next_field(&columns[1]).unwrap().unwrap().as_ref(), b"ab");
    }
}
