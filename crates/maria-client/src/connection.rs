//! Connection state machine and command dispatch.
//!
//! One logical task owns the outbound write half, another the inbound
//! parse half; the sequence counter is handed across the split at each
//! exchange. Only one command is in flight at a time; the handshake
//! setup batch is the single pipelined exception.

use std::sync::Arc;

use bytes::Bytes;
use futures_util::{SinkExt, StreamExt};
use maria_auth::{plugin_for, AuthenticationPlugin, Credentials};
use maria_codec::{MessageAssembler, PacketReader, PacketWriter};
use maria_protocol::client::{BoundParameter, HandshakeResponse, StmtExecute};
use maria_protocol::{
    AuthMoreData, AuthSwitchRequest, Capabilities, ClientMessage, ColumnDefinition,
    ConnectionContext, EofPacket, ErrPacket, InitialHandshake, OkPacket, PrepareResult,
};
use maria_types::{CodecRegistry, Value};
use tokio::io::{AsyncRead, AsyncWrite, ReadHalf, WriteHalf};

use crate::binding::{augment, Binding};
use crate::cache::{PrepareCache, ServerPrepareResult};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::result::{generated_key_row, QueryResult};
use crate::row::Row;
use crate::stream::{RowStream, WindowStart};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Ready,
    Closed,
}

/// A connection in the command phase.
///
/// Created by [`Connection::handshake`], which drives the full
/// `CONNECTING → HANDSHAKE_RECEIVED → AUTHENTICATING → READY` transition
/// before returning.
pub struct Connection<T>
where
    T: AsyncRead + AsyncWrite,
{
    reader: PacketReader<ReadHalf<T>>,
    writer: PacketWriter<WriteHalf<T>>,
    assembler: MessageAssembler,
    context: Arc<ConnectionContext>,
    cache: PrepareCache,
    config: Config,
    credentials: Credentials,
    registry: CodecRegistry,
    state: State,
    // A result window is open on the wire (stream dropped before its
    // terminator); drained before the next command.
    pending_rows: bool,
    pending_statement: Option<u32>,
}

impl<T> Connection<T>
where
    T: AsyncRead + AsyncWrite + Unpin,
{
    /// Establish a connection over an already-connected transport.
    ///
    /// TLS and unix-socket setup belong to the caller; `config.ssl_mode`
    /// tells the engine whether the stream counts as secure, which gates
    /// clear-password authentication exchanges.
    pub async fn handshake(transport: T, config: Config) -> Result<Self> {
        let (read_half, write_half) = tokio::io::split(transport);
        let credentials = Credentials {
            username: config.username.clone(),
            password: config.password.clone(),
            secure_transport: config.secure_transport(),
        };
        let mut conn = Self {
            reader: PacketReader::new(read_half),
            writer: PacketWriter::new(write_half),
            assembler: MessageAssembler::new(),
            context: Arc::new(ConnectionContext::new(
                maria_protocol::ServerVersion::parse("0.0.0"),
                Capabilities::empty(),
                0,
                maria_protocol::ServerStatus::empty(),
                config.collation,
            )),
            cache: PrepareCache::new(config.prepare_cache_size),
            credentials,
            config,
            registry: CodecRegistry::global(),
            state: State::Ready,
            pending_rows: false,
            pending_statement: None,
        };

        let payload = conn.read_payload().await?;
        let handshake = InitialHandshake::decode(payload)?;
        tracing::debug!(
            version = %handshake.version,
            thread_id = handshake.thread_id,
            plugin = handshake.auth_plugin.as_deref().unwrap_or(""),
            "received initial handshake"
        );

        let capabilities = conn.negotiate_capabilities(&handshake);
        conn.context = Arc::new(ConnectionContext::new(
            handshake.version.clone(),
            capabilities,
            handshake.thread_id,
            handshake.server_status,
            conn.config.collation,
        ));

        conn.authenticate(&handshake).await?;
        conn.run_setup_batch().await?;
        tracing::debug!("connection ready");
        Ok(conn)
    }

    fn negotiate_capabilities(&self, handshake: &InitialHandshake) -> Capabilities {
        let mut wanted = Capabilities::PROTOCOL_41
            | Capabilities::SECURE_CONNECTION
            | Capabilities::PLUGIN_AUTH
            | Capabilities::PLUGIN_AUTH_LENENC_CLIENT_DATA
            | Capabilities::TRANSACTIONS
            | Capabilities::MULTI_RESULTS
            | Capabilities::PS_MULTI_RESULTS
            | Capabilities::CLIENT_DEPRECATE_EOF;
        // Bit 1 doubles as LONG_PASSWORD (MySQL) and CLIENT_MYSQL
        // (MariaDB); setting it against a MariaDB server would disable the
        // extended capability field.
        if !handshake.version.is_mariadb() {
            wanted |= Capabilities::CLIENT_MYSQL;
        }
        if self.config.allow_local_infile {
            wanted |= Capabilities::LOCAL_FILES;
        }
        if self.config.database.is_some() {
            wanted |= Capabilities::CONNECT_WITH_DB;
        }
        wanted & handshake.capabilities
    }

    async fn authenticate(&mut self, handshake: &InitialHandshake) -> Result<()> {
        let mut plugin: &'static dyn AuthenticationPlugin =
            plugin_for(handshake.auth_plugin.as_deref().unwrap_or(""))?;
        let mut seed = handshake.seed.clone();

        let auth_response = plugin
            .next(&self.credentials, &seed, None)?
            .unwrap_or_default();
        let response = ClientMessage::HandshakeResponse(HandshakeResponse {
            capabilities: self.context.capabilities(),
            collation: self.config.collation,
            username: self.credentials.username.clone(),
            auth_response,
            database: self.config.database.clone(),
            auth_plugin: Some(plugin.name().to_string()),
        });
        self.send_message(&response).await?;

        loop {
            let payload = self.read_payload().await?;
            match payload.first().copied() {
                Some(0x00) => {
                    let ok = OkPacket::decode(payload, self.context.capabilities())?;
                    self.context_mut().set_server_status(ok.server_status);
                    return Ok(());
                }
                Some(0xff) => {
                    let err = ErrPacket::decode(payload)?;
                    self.state = State::Closed;
                    return Err(Error::from_err_packet(err, None));
                }
                Some(0xfe) => {
                    let switch = AuthSwitchRequest::decode(payload)?;
                    tracing::debug!(plugin = %switch.plugin, "authentication switch");
                    plugin = plugin_for(&switch.plugin)?;
                    seed = switch.seed;
                    if let Some(next) = plugin.next(&self.credentials, &seed, None)? {
                        self.send_message(&ClientMessage::AuthMoreRaw(Bytes::from(next)))
                            .await?;
                    }
                }
                Some(0x01) => {
                    let more = AuthMoreData::decode(payload)?;
                    if let Some(next) =
                        plugin.next(&self.credentials, &seed, Some(&more.data))?
                    {
                        self.send_message(&ClientMessage::AuthMoreRaw(Bytes::from(next)))
                            .await?;
                    }
                }
                Some(other) => {
                    self.state = State::Closed;
                    return Err(Error::UnexpectedPacket {
                        first_byte: other,
                        phase: "authentication",
                    });
                }
                None => {
                    self.state = State::Closed;
                    return Err(Error::ConnectionClosed);
                }
            }
        }
    }

    // Post-login setup, pipelined: all commands are written before any
    // response is read. Each response window is a single OK or ERR.
    async fn run_setup_batch(&mut self) -> Result<()> {
        let mut commands = Vec::new();
        if let Some(names) = collation_set_names(self.config.collation) {
            commands.push(names);
        }
        if !self.config.session_variables.is_empty() {
            let assignments: Vec<String> = self
                .config
                .session_variables
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect();
            commands.push(format!("SET {}", assignments.join(",")));
        }
        if let Some(autocommit) = self.config.autocommit {
            commands.push(format!("SET autocommit={}", u8::from(autocommit)));
        }
        if commands.is_empty() {
            return Ok(());
        }

        for sql in &commands {
            let message = ClientMessage::Query(sql.clone());
            self.send_message(&message).await?;
        }
        for sql in &commands {
            let payload = self.read_payload_at_command_start().await?;
            match payload.first().copied() {
                Some(0x00) => {
                    let ok = OkPacket::decode(payload, self.context.capabilities())?;
                    self.context_mut().set_server_status(ok.server_status);
                }
                Some(0xff) => {
                    let err = ErrPacket::decode(payload)?;
                    return Err(Error::from_err_packet(err, Some(sql)));
                }
                other => {
                    self.state = State::Closed;
                    return Err(Error::UnexpectedPacket {
                        first_byte: other.unwrap_or(0),
                        phase: "setup",
                    });
                }
            }
        }
        Ok(())
    }

    /// Per-connection metadata view: server version, capabilities, thread
    /// id, current collations and status.
    #[must_use]
    pub fn context(&self) -> &ConnectionContext {
        &self.context
    }

    /// Whether the connection has been closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.state == State::Closed
    }

    /// Run a text-protocol query and stream its rows.
    pub async fn query(&mut self, sql: &str) -> Result<RowStream<'_, T>> {
        self.begin_command().await?;
        let sql = self.apply_statement_timeout(sql);
        self.send_message(&ClientMessage::Query(sql.clone())).await?;
        let start = self.read_window_start(&sql, false).await?;
        Ok(RowStream::from_window(self, sql, false, None, start))
    }

    /// Execute a statement through the binary protocol, preparing (or
    /// reusing a cached prepare) as needed.
    pub async fn execute(&mut self, sql: &str, binding: Binding) -> Result<RowStream<'_, T>> {
        self.begin_command().await?;
        let prepare = match self.cache_get(sql) {
            Some(hit) => hit,
            None => self.prepare_statement(sql).await?,
        };

        binding.validate(prepare.num_params())?;
        let values = binding.into_values();
        let parameters = self.encode_parameters(&values)?;

        let execute = ClientMessage::StmtExecute(StmtExecute {
            statement_id: prepare.statement_id,
            parameters,
        });
        self.send_message(&execute).await?;
        let start = self.read_window_start(sql, true).await?;
        Ok(RowStream::from_window(
            self,
            sql.to_string(),
            true,
            Some(prepare.statement_id),
            start,
        ))
    }

    /// Execute a statement and drain its (usually empty) result.
    pub async fn execute_update(&mut self, sql: &str, binding: Binding) -> Result<QueryResult> {
        let stream = self.execute(sql, binding).await?;
        stream.finish().await
    }

    /// Execute a data-change statement and surface its generated keys.
    ///
    /// On MariaDB ≥ 10.5.1 the statement is augmented with a `RETURNING`
    /// clause and the server's rows are returned. Elsewhere a synthetic
    /// single-row result carries `LAST_INSERT_ID()`.
    pub async fn execute_returning(
        &mut self,
        sql: &str,
        binding: Binding,
        generated_columns: &[String],
    ) -> Result<Vec<Row>> {
        if self.context.version().support_returning() {
            let augmented = augment(sql, generated_columns);
            let stream = self.execute(&augmented, binding).await?;
            return stream.collect_rows().await;
        }
        let result = self.execute_update(sql, binding).await?;
        Ok(vec![generated_key_row(
            Arc::clone(&self.context),
            result.last_insert_id,
        )])
    }

    /// Check the connection with `COM_PING`.
    pub async fn ping(&mut self) -> Result<()> {
        self.begin_command().await?;
        self.send_message(&ClientMessage::Ping).await?;
        self.read_ok("COM_PING").await
    }

    /// Change the default database with `COM_INIT_DB`.
    pub async fn init_db(&mut self, database: &str) -> Result<()> {
        self.begin_command().await?;
        self.send_message(&ClientMessage::InitDb(database.to_string()))
            .await?;
        self.read_ok("COM_INIT_DB").await
    }

    /// Reset session state with `COM_RESET_CONNECTION`.
    ///
    /// Server-side prepared statements do not survive the reset; the
    /// cache is dropped with it.
    pub async fn reset(&mut self) -> Result<()> {
        self.begin_command().await?;
        self.cache.clear();
        self.send_message(&ClientMessage::ResetConnection).await?;
        self.read_ok("COM_RESET_CONNECTION").await
    }

    /// Re-authenticate as a different user with `COM_CHANGE_USER`.
    pub async fn change_user(
        &mut self,
        username: &str,
        password: Option<&str>,
        database: Option<&str>,
    ) -> Result<()> {
        self.begin_command().await?;
        self.cache.clear();
        self.credentials = Credentials {
            username: username.to_string(),
            password: password.map(str::to_string),
            secure_transport: self.credentials.secure_transport,
        };
        let change = maria_protocol::client::ChangeUser {
            username: username.to_string(),
            auth_response: Vec::new(),
            database: database.map(str::to_string),
            collation: self.config.collation,
            auth_plugin: Some("mysql_native_password".to_string()),
        };
        self.send_message(&ClientMessage::ChangeUser(change)).await?;

        // The server answers with an auth switch carrying a fresh seed.
        let mut plugin: &'static dyn AuthenticationPlugin = plugin_for("mysql_native_password")?;
        let mut seed: Vec<u8> = Vec::new();
        loop {
            let payload = self.read_payload().await?;
            match payload.first().copied() {
                Some(0x00) => {
                    let ok = OkPacket::decode(payload, self.context.capabilities())?;
                    self.context_mut().set_server_status(ok.server_status);
                    return Ok(());
                }
                Some(0xff) => {
                    let err = ErrPacket::decode(payload)?;
                    return Err(Error::from_err_packet(err, None));
                }
                Some(0xfe) => {
                    let switch = AuthSwitchRequest::decode(payload)?;
                    plugin = plugin_for(&switch.plugin)?;
                    seed = switch.seed;
                    if let Some(next) = plugin.next(&self.credentials, &seed, None)? {
                        self.send_message(&ClientMessage::AuthMoreRaw(Bytes::from(next)))
                            .await?;
                    }
                }
                Some(0x01) => {
                    let more = AuthMoreData::decode(payload)?;
                    if let Some(next) =
                        plugin.next(&self.credentials, &seed, Some(&more.data))?
                    {
                        self.send_message(&ClientMessage::AuthMoreRaw(Bytes::from(next)))
                            .await?;
                    }
                }
                other => {
                    self.state = State::Closed;
                    return Err(Error::UnexpectedPacket {
                        first_byte: other.unwrap_or(0),
                        phase: "change user",
                    });
                }
            }
        }
    }

    /// Send `COM_QUIT` and close the connection.
    pub async fn close(mut self) -> Result<()> {
        if self.state == State::Closed {
            return Ok(());
        }
        let _ = self.send_message(&ClientMessage::Quit).await;
        self.state = State::Closed;
        let _ = self.writer.close().await;
        Ok(())
    }

    // ---- internals shared with RowStream ----------------------------------

    pub(crate) fn shared_context(&self) -> Arc<ConnectionContext> {
        Arc::clone(&self.context)
    }

    fn context_mut(&mut self) -> &mut ConnectionContext {
        Arc::make_mut(&mut self.context)
    }

    pub(crate) fn update_status(&mut self, status: maria_protocol::ServerStatus) {
        self.context_mut().set_server_status(status);
    }

    pub(crate) fn set_pending(&mut self, rows: bool, statement: Option<u32>) {
        self.pending_rows = rows;
        self.pending_statement = statement;
    }

    pub(crate) fn mark_closed(&mut self) {
        self.state = State::Closed;
    }

    /// Release an execute's reference on its statement, closing it on the
    /// wire when the cache has let go of it.
    pub(crate) async fn release_statement(&mut self, statement_id: u32) -> Result<()> {
        if let Some(close_id) = self.cache.release(statement_id) {
            self.send_message(&ClientMessage::StmtClose(close_id)).await?;
        }
        Ok(())
    }

    fn cache_get(&mut self, sql: &str) -> Option<ServerPrepareResult> {
        self.cache.get(sql)
    }

    async fn begin_command(&mut self) -> Result<()> {
        if self.state == State::Closed {
            return Err(Error::ConnectionClosed);
        }
        // A dropped stream leaves its window open; drain to the
        // terminator to realign before the next command.
        while self.pending_rows {
            let payload = self.read_payload().await?;
            match payload.first().copied() {
                Some(0xff) => {
                    self.pending_rows = false;
                }
                Some(0xfe) if self.is_window_end(&payload) => {
                    let (summary, more) = self.parse_terminator(payload)?;
                    self.update_status(summary.server_status);
                    if !more {
                        self.pending_rows = false;
                    }
                }
                _ => {}
            }
        }
        if let Some(statement_id) = self.pending_statement.take() {
            self.release_statement(statement_id).await?;
        }
        Ok(())
    }

    pub(crate) fn is_window_end(&self, payload: &[u8]) -> bool {
        payload.first() == Some(&0xfe) && (payload.len() < 9 || self.context.eof_deprecated())
    }

    /// Parse a window terminator; returns the window summary and whether
    /// more result sets follow.
    pub(crate) fn parse_terminator(&self, payload: Bytes) -> Result<(QueryResult, bool)> {
        if self.context.eof_deprecated() && payload.len() >= 7 {
            let ok = OkPacket::decode(payload, self.context.capabilities())?;
            let more = !ok.ending();
            Ok((QueryResult::from_ok(&ok), more))
        } else {
            let eof = EofPacket::decode(payload, true)?;
            let more = !eof.ending;
            Ok((QueryResult::from_eof(&eof), more))
        }
    }

    async fn read_ok(&mut self, phase: &'static str) -> Result<()> {
        let payload = self.read_payload().await?;
        match payload.first().copied() {
            Some(0x00) => {
                let ok = OkPacket::decode(payload, self.context.capabilities())?;
                self.context_mut().set_server_status(ok.server_status);
                Ok(())
            }
            Some(0xff) => {
                let err = ErrPacket::decode(payload)?;
                Err(Error::from_err_packet(err, None))
            }
            other => {
                self.state = State::Closed;
                Err(Error::UnexpectedPacket {
                    first_byte: other.unwrap_or(0),
                    phase,
                })
            }
        }
    }

    /// Send a client message. Commands reset the shared sequence counter;
    /// authentication continuations pick it up from the last read frame.
    pub(crate) async fn send_message(&mut self, message: &ClientMessage) -> Result<()> {
        if message.resets_sequence() {
            self.writer.codec_mut().reset_sequence();
        } else {
            self.writer
                .codec_mut()
                .set_sequence(self.reader.codec().sequence());
        }
        let payload = message.encode(&self.context);
        if let Err(e) = self.writer.send(payload).await {
            self.state = State::Closed;
            return Err(e.into());
        }
        // The server's next frame continues the counter.
        self.reader
            .codec_mut()
            .set_sequence(self.writer.codec().sequence());
        Ok(())
    }

    /// Read one complete (reassembled) message payload.
    pub(crate) async fn read_payload(&mut self) -> Result<Bytes> {
        loop {
            let next = if let Some(timeout) = self.config.socket_timeout {
                match tokio::time::timeout(timeout, self.reader.next()).await {
                    Ok(next) => next,
                    Err(_) => {
                        self.state = State::Closed;
                        return Err(Error::SocketTimeout);
                    }
                }
            } else {
                self.reader.next().await
            };
            match next {
                Some(Ok(packet)) => {
                    if let Some(payload) = self.assembler.push(packet) {
                        return Ok(payload);
                    }
                }
                Some(Err(e)) => {
                    self.state = State::Closed;
                    return Err(e.into());
                }
                None => {
                    self.state = State::Closed;
                    return Err(Error::ConnectionClosed);
                }
            }
        }
    }

    // The setup batch pipelines several commands; each response window
    // restarts its sequence at 1 (command seq 0 was the request).
    async fn read_payload_at_command_start(&mut self) -> Result<Bytes> {
        self.reader.codec_mut().set_sequence(1);
        self.read_payload().await
    }

    /// Read the opening of a result window: an OK (no rows), a LOCAL
    /// INFILE request, an ERR, or a column-definition block.
    pub(crate) async fn read_window_start(
        &mut self,
        sql: &str,
        _binary: bool,
    ) -> Result<WindowStart> {
        let payload = self.read_payload().await?;
        match payload.first().copied() {
            Some(0x00) => {
                let ok = OkPacket::decode(payload, self.context.capabilities())?;
                self.context_mut().set_server_status(ok.server_status);
                Ok(WindowStart::Done(QueryResult::from_ok(&ok)))
            }
            Some(0xff) => {
                let err = ErrPacket::decode(payload)?;
                Err(Error::from_err_packet(err, Some(sql)))
            }
            Some(0xfb) => {
                let request = maria_protocol::LocalInfileRequest::decode(payload)?;
                // Keep the stream aligned: answer with an empty file and
                // consume the server's verdict either way.
                self.send_local_infile_tail().await?;
                let verdict = self.read_ok("LOCAL INFILE").await;
                if self.config.allow_local_infile {
                    verdict?;
                    Ok(WindowStart::Done(QueryResult::default()))
                } else {
                    Err(Error::LocalInfileDenied(request.file_name))
                }
            }
            Some(_) => {
                let mut count_buf = payload;
                let count = maria_protocol::buffer::read_length_encoded_required(&mut count_buf)?;
                let columns = self.read_column_block(count as usize).await?;
                Ok(WindowStart::Rows(Arc::new(columns)))
            }
            None => {
                self.state = State::Closed;
                Err(Error::ConnectionClosed)
            }
        }
    }

    async fn send_local_infile_tail(&mut self) -> Result<()> {
        // File content would be streamed here; the terminating empty
        // packet continues the current sequence.
        self.writer
            .codec_mut()
            .set_sequence(self.reader.codec().sequence());
        self.writer.send(Bytes::new()).await.map_err(Error::from)?;
        self.reader
            .codec_mut()
            .set_sequence(self.writer.codec().sequence());
        Ok(())
    }

    pub(crate) async fn read_column_block(
        &mut self,
        count: usize,
    ) -> Result<Vec<ColumnDefinition>> {
        let mut columns = Vec::with_capacity(count);
        for _ in 0..count {
            let payload = self.read_payload().await?;
            columns.push(ColumnDefinition::decode(payload)?);
        }
        if count > 0 && !self.context.eof_deprecated() {
            let payload = self.read_payload().await?;
            let eof = maria_protocol::EofPacket::decode(payload, false)?;
            self.update_status(eof.server_status);
        }
        Ok(columns)
    }

    async fn prepare_statement(&mut self, sql: &str) -> Result<ServerPrepareResult> {
        self.send_message(&ClientMessage::StmtPrepare(sql.to_string()))
            .await?;
        let payload = self.read_payload().await?;
        let header = match payload.first().copied() {
            Some(0x00) => PrepareResult::decode(payload, false)?,
            Some(0xff) => {
                let err = ErrPacket::decode(payload)?;
                return Err(Error::from_err_packet(err, Some(sql)));
            }
            other => {
                self.state = State::Closed;
                return Err(Error::UnexpectedPacket {
                    first_byte: other.unwrap_or(0),
                    phase: "prepare",
                });
            }
        };

        let parameters = self.read_column_block(usize::from(header.num_params)).await?;
        let columns = self.read_column_block(usize::from(header.num_columns)).await?;
        let prepare = ServerPrepareResult {
            statement_id: header.statement_id,
            parameters,
            columns,
        };
        for close_id in self.cache.insert(sql.to_string(), prepare.clone()) {
            self.send_message(&ClientMessage::StmtClose(close_id)).await?;
        }
        tracing::debug!(
            statement_id = prepare.statement_id,
            params = prepare.num_params(),
            "prepared statement"
        );
        Ok(prepare)
    }

    fn encode_parameters(&self, values: &[Value]) -> Result<Vec<BoundParameter>> {
        let mut parameters = Vec::with_capacity(values.len());
        for value in values {
            let (type_byte, unsigned) = self.registry.parameter_type(value)?;
            let encoded = if value.is_null() {
                None
            } else {
                let mut buf = bytes::BytesMut::new();
                self.registry.encode_binary(&mut buf, value)?;
                Some(buf.freeze())
            };
            parameters.push(BoundParameter {
                type_byte,
                unsigned,
                value: encoded,
            });
        }
        Ok(parameters)
    }

    // MariaDB ≥ 10.1.2 enforces statement timeouts server-side.
    fn apply_statement_timeout(&self, sql: &str) -> String {
        match self.config.statement_timeout {
            Some(timeout)
                if self.context.version().is_mariadb()
                    && self.context.version().is_at_least(10, 1, 2) =>
            {
                format!(
                    "SET STATEMENT max_statement_time={} FOR {sql}",
                    timeout.as_secs_f64()
                )
            }
            _ => sql.to_string(),
        }
    }
}

impl<T> std::fmt::Debug for Connection<T>
where
    T: AsyncRead + AsyncWrite,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("thread_id", &self.context.thread_id())
            .field("state", &self.state)
            .field("cached_statements", &self.cache.len())
            .finish_non_exhaustive()
    }
}

fn collation_set_names(collation: u8) -> Option<String> {
    use maria_protocol::constants::collations;
    match collation {
        collations::UTF8MB4_UNICODE_CI => {
            Some("SET NAMES utf8mb4 COLLATE utf8mb4_unicode_ci".to_string())
        }
        collations::UTF8_GENERAL_CI => Some("SET NAMES utf8".to_string()),
        _ => None,
    }
}
