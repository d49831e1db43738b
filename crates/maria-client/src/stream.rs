//! Demand-driven row streaming.
//!
//! A [`RowStream`] is a pull contract: each [`RowStream::next_row`] call
//! is one unit of downstream demand and reads at most one row off the
//! wire, so TCP backpressure propagates to the server while an idle
//! consumer holds the window open. [`RowStream::cancel`] drains the
//! current result set to its terminator (the wire must stay aligned),
//! discarding row payloads, and is idempotent.

use std::sync::Arc;

use maria_protocol::server::{BinaryRowReader, TextRowReader};
use maria_protocol::{ColumnDefinition, ErrPacket};
use tokio::io::{AsyncRead, AsyncWrite};

use crate::connection::Connection;
use crate::error::{Error, Result};
use crate::result::QueryResult;
use crate::row::Row;

/// How a result window opened.
#[derive(Debug)]
pub(crate) enum WindowStart {
    /// No rows: an OK packet summarized the command.
    Done(QueryResult),
    /// A column-definition block opened a row window.
    Rows(Arc<Vec<ColumnDefinition>>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StreamState {
    Rows,
    Done,
}

/// Streaming result rows for one command.
///
/// Holds the connection mutably for the duration of the window; dropping
/// the stream early leaves the connection to drain the remainder before
/// its next command.
pub struct RowStream<'a, T>
where
    T: AsyncRead + AsyncWrite,
{
    conn: &'a mut Connection<T>,
    sql: String,
    columns: Arc<Vec<ColumnDefinition>>,
    binary: bool,
    statement_id: Option<u32>,
    state: StreamState,
    summary: QueryResult,
    row_count: u64,
    cancelled: bool,
}

impl<'a, T> RowStream<'a, T>
where
    T: AsyncRead + AsyncWrite + Unpin,
{
    pub(crate) fn from_window(
        conn: &'a mut Connection<T>,
        sql: String,
        binary: bool,
        statement_id: Option<u32>,
        start: WindowStart,
    ) -> Self {
        match start {
            WindowStart::Done(summary) => {
                conn.set_pending(false, statement_id);
                Self {
                    conn,
                    sql,
                    columns: Arc::new(Vec::new()),
                    binary,
                    statement_id,
                    state: StreamState::Done,
                    summary,
                    row_count: 0,
                    cancelled: false,
                }
            }
            WindowStart::Rows(columns) => {
                conn.set_pending(true, statement_id);
                Self {
                    conn,
                    sql,
                    columns,
                    binary,
                    statement_id,
                    state: StreamState::Rows,
                    summary: QueryResult::default(),
                    row_count: 0,
                    cancelled: false,
                }
            }
        }
    }

    /// Column metadata of the current result set.
    #[must_use]
    pub fn columns(&self) -> &[ColumnDefinition] {
        &self.columns
    }

    /// Pull the next row; `None` at the end of the result set.
    pub async fn next_row(&mut self) -> Result<Option<Row>> {
        if self.state == StreamState::Done {
            return Ok(None);
        }
        loop {
            let payload = self.conn.read_payload().await?;
            match payload.first().copied() {
                Some(0xff) => {
                    let err = ErrPacket::decode(payload)?;
                    self.state = StreamState::Done;
                    self.conn.set_pending(false, self.statement_id);
                    self.release_if_prepared().await?;
                    return Err(Error::from_err_packet(err, Some(&self.sql)));
                }
                Some(0xfe) if self.conn.is_window_end(&payload) => {
                    let (summary, more) = self.conn.parse_terminator(payload)?;
                    self.conn.update_status(summary.server_status);
                    self.summary = QueryResult {
                        row_count: self.row_count,
                        ..summary
                    };
                    self.state = StreamState::Done;
                    if !more {
                        self.conn.set_pending(false, self.statement_id);
                        self.release_if_prepared().await?;
                    }
                    return Ok(None);
                }
                Some(_) if self.cancelled => {
                    // Draining: row payloads are discarded unread.
                }
                Some(_) => {
                    let row = self.decode_row(payload)?;
                    self.row_count += 1;
                    return Ok(Some(row));
                }
                None => {
                    self.conn.mark_closed();
                    return Err(Error::ConnectionClosed);
                }
            }
        }
    }

    /// Cancel the stream: remaining rows of this result set are drained
    /// off the wire and discarded. Idempotent.
    pub async fn cancel(&mut self) -> Result<()> {
        if self.state == StreamState::Done || self.cancelled {
            self.cancelled = true;
            return Ok(());
        }
        self.cancelled = true;
        while self.state == StreamState::Rows {
            self.next_row().await?;
        }
        Ok(())
    }

    /// Drain any remaining rows and return the window summary.
    pub async fn finish(mut self) -> Result<QueryResult> {
        self.cancelled = true;
        while self.state == StreamState::Rows {
            self.next_row().await?;
        }
        Ok(self.summary)
    }

    /// Collect every remaining row into memory.
    pub async fn collect_rows(mut self) -> Result<Vec<Row>> {
        let mut rows = Vec::new();
        while let Some(row) = self.next_row().await? {
            rows.push(row);
        }
        Ok(rows)
    }

    /// Advance to the next result set of a multi-result command.
    ///
    /// Returns `false` when no further result set follows.
    pub async fn next_result(&mut self) -> Result<bool> {
        // Close out the current window first.
        while self.state == StreamState::Rows {
            self.cancelled = true;
            self.next_row().await?;
        }
        if !self.summary.has_more_results() {
            return Ok(false);
        }
        let start = self.conn.read_window_start(&self.sql, self.binary).await?;
        match start {
            WindowStart::Done(summary) => {
                self.summary = summary;
                self.state = StreamState::Done;
                if !self.summary.has_more_results() {
                    self.conn.set_pending(false, self.statement_id);
                    self.release_if_prepared().await?;
                }
            }
            WindowStart::Rows(columns) => {
                self.columns = columns;
                self.state = StreamState::Rows;
                self.row_count = 0;
                self.cancelled = false;
                self.conn.set_pending(true, self.statement_id);
            }
        }
        Ok(true)
    }

    /// Summary of the most recently completed window.
    #[must_use]
    pub fn summary(&self) -> &QueryResult {
        &self.summary
    }

    async fn release_if_prepared(&mut self) -> Result<()> {
        if let Some(statement_id) = self.statement_id.take() {
            self.conn.set_pending(false, None);
            self.conn.release_statement(statement_id).await?;
        }
        Ok(())
    }

    fn decode_row(&self, payload: bytes::Bytes) -> Result<Row> {
        let mut fields = Vec::with_capacity(self.columns.len());
        if self.binary {
            let mut reader = BinaryRowReader::new(payload, self.columns.len())?;
            for column in self.columns.iter() {
                fields.push(reader.next_field(column)?);
            }
        } else {
            let mut reader = TextRowReader::new(payload);
            for _ in 0..self.columns.len() {
                fields.push(reader.next_field()?);
            }
        }
        Ok(Row::new(
            Arc::clone(&self.columns),
            self.conn.shared_context(),
            fields,
            self.binary,
        ))
    }
}

impl<T> std::fmt::Debug for RowStream<'_, T>
where
    T: AsyncRead + AsyncWrite,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RowStream")
            .field("columns", &self.columns.len())
            .field("binary", &self.binary)
            .field("rows_seen", &self.row_count)
            .field("done", &(self.state == StreamState::Done))
            .finish_non_exhaustive()
    }
}
