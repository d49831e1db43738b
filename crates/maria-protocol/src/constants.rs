//! Protocol constants: capabilities, server status, commands, column flags.

use bitflags::bitflags;

bitflags! {
    /// Client/server capability bitmask.
    ///
    /// The low 32 bits are the classic MySQL capability flags; the high 32
    /// bits are MariaDB extended capabilities, advertised through a
    /// dedicated handshake field when the server negotiates without
    /// [`Capabilities::CLIENT_MYSQL`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Capabilities: u64 {
        /// MySQL compatibility (also the legacy LONG_PASSWORD flag).
        const CLIENT_MYSQL = 1;
        /// Return the number of found (matched) rows, not affected rows.
        const FOUND_ROWS = 1 << 1;
        /// Longer flags in column definitions.
        const LONG_FLAG = 1 << 2;
        /// A database name can be specified on connect.
        const CONNECT_WITH_DB = 1 << 3;
        /// Do not allow `database.table.column` syntax.
        const NO_SCHEMA = 1 << 4;
        /// Compression protocol.
        const COMPRESS = 1 << 5;
        /// ODBC client.
        const ODBC = 1 << 6;
        /// LOAD DATA LOCAL INFILE.
        const LOCAL_FILES = 1 << 7;
        /// Ignore spaces before `(`.
        const IGNORE_SPACE = 1 << 8;
        /// 4.1+ protocol.
        const PROTOCOL_41 = 1 << 9;
        /// Interactive client (wait_timeout vs interactive_timeout).
        const INTERACTIVE = 1 << 10;
        /// Switch to TLS after the handshake.
        const SSL = 1 << 11;
        /// Ignore SIGPIPE.
        const IGNORE_SIGPIPE = 1 << 12;
        /// Transaction status awareness.
        const TRANSACTIONS = 1 << 13;
        /// Reserved (old secure connection).
        const RESERVED = 1 << 14;
        /// 4.1+ authentication.
        const SECURE_CONNECTION = 1 << 15;
        /// Multiple statements per COM_QUERY.
        const MULTI_STATEMENTS = 1 << 16;
        /// Multiple result sets.
        const MULTI_RESULTS = 1 << 17;
        /// Multiple result sets from prepared statements.
        const PS_MULTI_RESULTS = 1 << 18;
        /// Pluggable authentication.
        const PLUGIN_AUTH = 1 << 19;
        /// Connection attributes.
        const CONNECT_ATTRS = 1 << 20;
        /// Length-encoded authentication response.
        const PLUGIN_AUTH_LENENC_CLIENT_DATA = 1 << 21;
        /// Client can handle expired passwords.
        const CAN_HANDLE_EXPIRED_PASSWORDS = 1 << 22;
        /// Session state tracking in OK packets.
        const CLIENT_SESSION_TRACK = 1 << 23;
        /// EOF packets replaced by OK packets.
        const CLIENT_DEPRECATE_EOF = 1 << 24;
        /// MariaDB: progress reporting.
        const MARIADB_CLIENT_PROGRESS = 1 << 32;
        /// MariaDB: COM_MULTI batching.
        const MARIADB_CLIENT_COM_MULTI = 1 << 33;
        /// MariaDB: bulk execute for prepared statements.
        const MARIADB_CLIENT_STMT_BULK_OPERATIONS = 1 << 34;
        /// MariaDB: extended type information in column definitions.
        const MARIADB_CLIENT_EXTENDED_TYPE_INFO = 1 << 35;
        /// MariaDB: result-set metadata may be skipped when cached.
        const MARIADB_CLIENT_CACHE_METADATA = 1 << 36;
    }
}

bitflags! {
    /// Server status flags carried by OK and EOF packets.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ServerStatus: u16 {
        /// A transaction is open.
        const IN_TRANSACTION = 1;
        /// Autocommit is enabled.
        const AUTOCOMMIT = 1 << 1;
        /// More result sets follow this one.
        const MORE_RESULTS_EXISTS = 1 << 3;
        /// No good index was used.
        const QUERY_NO_GOOD_INDEX_USED = 1 << 4;
        /// No index was used.
        const QUERY_NO_INDEX_USED = 1 << 5;
        /// A read-only cursor is open.
        const CURSOR_EXISTS = 1 << 6;
        /// The last row of the cursor has been sent.
        const LAST_ROW_SENT = 1 << 7;
        /// The current database was dropped.
        const DB_DROPPED = 1 << 8;
        /// Backslash is not an escape character.
        const NO_BACKSLASH_ESCAPES = 1 << 9;
        /// Result-set metadata changed.
        const METADATA_CHANGED = 1 << 10;
        /// The query was logged as slow.
        const QUERY_WAS_SLOW = 1 << 11;
        /// This result set carries output parameters.
        const PS_OUT_PARAMS = 1 << 12;
        /// A read-only transaction is open.
        const IN_TRANSACTION_READONLY = 1 << 13;
        /// Session state information follows in the OK packet.
        const SESSION_STATE_CHANGED = 1 << 14;
    }
}

bitflags! {
    /// Column definition flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ColumnFlags: u16 {
        /// Column cannot be NULL.
        const NOT_NULL = 1;
        /// Column is part of the primary key.
        const PRIMARY_KEY = 1 << 1;
        /// Column is part of a unique key.
        const UNIQUE_KEY = 1 << 2;
        /// Column is part of a non-unique key.
        const MULTIPLE_KEY = 1 << 3;
        /// Column holds a BLOB.
        const BLOB = 1 << 4;
        /// Column is unsigned.
        const UNSIGNED = 1 << 5;
        /// Column is zero-filled on display.
        const ZEROFILL = 1 << 6;
        /// Column uses a binary collation.
        const BINARY = 1 << 7;
        /// Column is an ENUM.
        const ENUM = 1 << 8;
        /// Column auto-increments.
        const AUTO_INCREMENT = 1 << 9;
        /// Column is a TIMESTAMP.
        const TIMESTAMP = 1 << 10;
        /// Column is a SET.
        const SET = 1 << 11;
        /// Column has no default value.
        const NO_DEFAULT_VALUE = 1 << 12;
    }
}

/// Client command bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Command {
    /// Close the connection.
    Quit = 0x01,
    /// Change the default schema.
    InitDb = 0x02,
    /// Text-protocol query.
    Query = 0x03,
    /// Keep-alive check.
    Ping = 0x0e,
    /// Re-authenticate as a different user.
    ChangeUser = 0x11,
    /// Prepare a statement.
    StmtPrepare = 0x16,
    /// Execute a prepared statement (binary protocol).
    StmtExecute = 0x17,
    /// Deallocate a prepared statement.
    StmtClose = 0x19,
    /// Reset a prepared statement's accumulated data.
    StmtReset = 0x1a,
    /// Fetch rows from an open cursor.
    StmtFetch = 0x1c,
    /// Reset the session state.
    ResetConnection = 0x1f,
}

/// Collation ids the driver uses directly.
pub mod collations {
    /// `utf8_general_ci`.
    pub const UTF8_GENERAL_CI: u8 = 33;
    /// `binary`.
    pub const BINARY: u8 = 63;
    /// `utf8mb4_unicode_ci`, the default client collation.
    pub const UTF8MB4_UNICODE_CI: u8 = 224;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capability_values() {
        assert_eq!(Capabilities::PROTOCOL_41.bits(), 0x0200);
        assert_eq!(Capabilities::SECURE_CONNECTION.bits(), 0x8000);
        assert_eq!(Capabilities::PLUGIN_AUTH.bits(), 0x0008_0000);
        assert_eq!(Capabilities::CLIENT_DEPRECATE_EOF.bits(), 0x0100_0000);
        assert!(Capabilities::MARIADB_CLIENT_CACHE_METADATA.bits() > u64::from(u32::MAX));
    }

    #[test]
    fn test_command_bytes() {
        assert_eq!(Command::Quit as u8, 0x01);
        assert_eq!(Command::Query as u8, 0x03);
        assert_eq!(Command::StmtPrepare as u8, 0x16);
        assert_eq!(Command::StmtExecute as u8, 0x17);
        assert_eq!(Command::StmtFetch as u8, 0x1c);
        assert_eq!(Command::ResetConnection as u8, 0x1f);
    }

    #[test]
    fn test_status_split_from_low_32() {
        let merged = Capabilities::from_bits_truncate(
            u64::from(u32::MAX) | Capabilities::MARIADB_CLIENT_PROGRESS.bits(),
        );
        assert!(merged.contains(Capabilities::MARIADB_CLIENT_PROGRESS));
    }
}
