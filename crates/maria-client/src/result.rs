//! Command result summaries.

use std::sync::Arc;

use bytes::{BufMut, BytesMut};
use maria_protocol::{
    ColumnDefinition, ColumnFlags, ConnectionContext, DataType, EofPacket, OkPacket, ServerStatus,
};

use crate::row::Row;

/// Summary of a completed command window.
#[derive(Debug, Clone, Default)]
pub struct QueryResult {
    /// Rows affected by the command (0 for plain selects).
    pub affected_rows: u64,
    /// Last auto-generated id, when the server reported one.
    pub last_insert_id: u64,
    /// Warning count.
    pub warnings: u16,
    /// Rows streamed through this window.
    pub row_count: u64,
    /// Server status flags at window close.
    pub server_status: ServerStatus,
}

impl QueryResult {
    pub(crate) fn from_ok(ok: &OkPacket) -> Self {
        Self {
            affected_rows: ok.affected_rows,
            last_insert_id: ok.last_insert_id,
            warnings: ok.warnings,
            row_count: 0,
            server_status: ok.server_status,
        }
    }

    pub(crate) fn from_eof(eof: &EofPacket) -> Self {
        Self {
            affected_rows: 0,
            last_insert_id: 0,
            warnings: eof.warnings,
            row_count: 0,
            server_status: eof.server_status,
        }
    }

    /// Whether further result sets follow this window.
    #[must_use]
    pub fn has_more_results(&self) -> bool {
        self.server_status
            .contains(ServerStatus::MORE_RESULTS_EXISTS)
    }
}

/// Build the synthetic generated-keys row used when the server cannot
/// surface `RETURNING` rows: one `BIGINT UNSIGNED` column named
/// `insert_id` holding `LAST_INSERT_ID()`.
#[must_use]
pub fn generated_key_row(context: Arc<ConnectionContext>, last_insert_id: u64) -> Row {
    let column = ColumnDefinition::synthetic(
        "insert_id",
        DataType::BigInt,
        ColumnFlags::NOT_NULL | ColumnFlags::UNSIGNED,
    );
    let mut field = BytesMut::new();
    field.put_slice(last_insert_id.to_string().as_bytes());
    Row::new(
        Arc::new(vec![column]),
        context,
        vec![Some(field.freeze())],
        false,
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_key_row_decodes() {
        let context = Arc::new(ConnectionContext::for_tests(ServerStatus::AUTOCOMMIT));
        let row = generated_key_row(context, 1234);
        assert_eq!(row.columns()[0].name, "insert_id");
        assert_eq!(row.get::<u64>(0).unwrap(), 1234);
    }

    #[test]
    fn test_more_results_flag() {
        let result = QueryResult {
            server_status: ServerStatus::MORE_RESULTS_EXISTS,
            ..QueryResult::default()
        };
        assert!(result.has_more_results());
    }
}
