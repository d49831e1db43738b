//! Protocol conformance tests against a scripted in-memory server.
//!
//! Each test drives a real [`Connection`] over a `tokio::io::duplex` pair
//! while the other end replays a canned server script and records the
//! client's commands.

#![allow(clippy::unwrap_used)]

use bytes::{BufMut, BytesMut};
use maria_client::{Binding, Config, Connection};
use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream};

const CAPS_LOW: u32 = 0x0200 | 0x8000 | 0x0008_0000; // PROTOCOL_41 | SECURE_CONNECTION | PLUGIN_AUTH

struct ScriptedServer {
    stream: DuplexStream,
}

impl ScriptedServer {
    fn new(stream: DuplexStream) -> Self {
        Self { stream }
    }

    async fn write_frame(&mut self, sequence: u8, payload: &[u8]) {
        let mut frame = BytesMut::with_capacity(4 + payload.len());
        frame.put_u8((payload.len() & 0xff) as u8);
        frame.put_u8(((payload.len() >> 8) & 0xff) as u8);
        frame.put_u8(((payload.len() >> 16) & 0xff) as u8);
        frame.put_u8(sequence);
        frame.put_slice(payload);
        self.stream.write_all(&frame).await.unwrap();
    }

    async fn read_frame(&mut self) -> (u8, Vec<u8>) {
        let mut header = [0u8; 4];
        self.stream.read_exact(&mut header).await.unwrap();
        let length =
            usize::from(header[0]) | (usize::from(header[1]) << 8) | (usize::from(header[2]) << 16);
        let mut payload = vec![0u8; length];
        self.stream.read_exact(&mut payload).await.unwrap();
        (header[3], payload)
    }

    async fn send_handshake(&mut self, plugin: &str) {
        let mut payload = BytesMut::new();
        payload.put_u8(0x0a);
        payload.put_slice(b"5.5.5-10.6.12-MariaDB\0");
        payload.put_u32_le(99); // thread id
        payload.put_slice(&[1, 2, 3, 4, 5, 6, 7, 8]); // seed1
        payload.put_u8(0);
        payload.put_u16_le((CAPS_LOW & 0xffff) as u16);
        payload.put_u8(224);
        payload.put_u16_le(0x0002); // autocommit
        payload.put_u16_le((CAPS_LOW >> 16) as u16);
        payload.put_u8(21); // salt length -> 12 byte seed2
        payload.put_slice(&[0u8; 6]);
        payload.put_u32_le(0); // no extended capabilities in this script
        payload.put_slice(&[9, 10, 11, 12, 13, 14, 15, 16, 17, 18, 19, 20]);
        payload.put_u8(0);
        payload.put_slice(plugin.as_bytes());
        payload.put_u8(0);
        self.write_frame(0, &payload).await;
    }

    async fn send_ok(&mut self, sequence: u8, affected: u8, insert_id: u8) {
        self.write_frame(sequence, &[0x00, affected, insert_id, 0x02, 0x00, 0x00, 0x00])
            .await;
    }

    async fn send_eof(&mut self, sequence: u8) {
        self.write_frame(sequence, &[0xfe, 0x00, 0x00, 0x02, 0x00]).await;
    }

    async fn send_column(&mut self, sequence: u8, name: &str, type_byte: u8) {
        let mut payload = BytesMut::new();
        for field in ["def", "test", "t", "t", name, name] {
            payload.put_u8(field.len() as u8);
            payload.put_slice(field.as_bytes());
        }
        payload.put_u8(0x0c);
        payload.put_u16_le(63);
        payload.put_u32_le(11);
        payload.put_u8(type_byte);
        payload.put_u16_le(0);
        payload.put_u8(0);
        payload.put_u16_le(0);
        self.write_frame(sequence, &payload).await;
    }

    /// Complete the handshake exchange for a native-password login.
    async fn accept_login(&mut self) {
        self.send_handshake("mysql_native_password").await;
        let (sequence, payload) = self.read_frame().await;
        assert_eq!(sequence, 1);
        // Client capabilities echo what the server offered.
        let caps = u32::from_le_bytes([payload[0], payload[1], payload[2], payload[3]]);
        assert_eq!(caps & 0x0200, 0x0200, "PROTOCOL_41 must be set");
        self.send_ok(2, 0, 0).await;
    }
}

fn test_config() -> Config {
    // Collation 45 keeps the setup batch empty for scripted exchanges.
    Config::new("app").password("secret").collation(45)
}

#[tokio::test]
async fn test_handshake_native_password() {
    let (client, server) = tokio::io::duplex(65536);
    let server_task = tokio::spawn(async move {
        let mut server = ScriptedServer::new(server);
        server.send_handshake("mysql_native_password").await;
        let (sequence, payload) = server.read_frame().await;
        assert_eq!(sequence, 1);
        // username follows the fixed 32-byte capability header
        let username_at = 32;
        assert_eq!(&payload[username_at..username_at + 4], b"app\0");
        // length-encoded auth response: 20-byte native scramble
        assert_eq!(payload[username_at + 4], 20);
        server.send_ok(2, 0, 0).await;
        server
    });

    let conn = Connection::handshake(client, test_config()).await.unwrap();
    assert_eq!(conn.context().thread_id(), 99);
    assert!(conn.context().version().is_mariadb());
    assert_eq!(conn.context().version().major(), 10);
    server_task.await.unwrap();
}

#[tokio::test]
async fn test_auth_switch_to_ed25519() {
    let (client, server) = tokio::io::duplex(65536);
    let server_task = tokio::spawn(async move {
        let mut server = ScriptedServer::new(server);
        server.send_handshake("mysql_native_password").await;
        let _ = server.read_frame().await;
        // Ask the client to switch plugins with a fresh seed.
        let mut switch = BytesMut::new();
        switch.put_u8(0xfe);
        switch.put_slice(b"client_ed25519\0");
        switch.put_slice(&[7u8; 32]);
        server.write_frame(2, &switch).await;
        let (sequence, signature) = server.read_frame().await;
        assert_eq!(sequence, 3);
        assert_eq!(signature.len(), 64, "Ed25519 signature is R || S");
        server.send_ok(4, 0, 0).await;
    });

    let conn = Connection::handshake(client, test_config()).await.unwrap();
    assert!(!conn.is_closed());
    server_task.await.unwrap();
}

#[tokio::test]
async fn test_authentication_failure_closes() {
    let (client, server) = tokio::io::duplex(65536);
    tokio::spawn(async move {
        let mut server = ScriptedServer::new(server);
        server.send_handshake("mysql_native_password").await;
        let _ = server.read_frame().await;
        let mut err = BytesMut::new();
        err.put_u8(0xff);
        err.put_u16_le(1045);
        err.put_slice(b"#28000Access denied for user 'app'");
        server.write_frame(2, &err).await;
    });

    let result = Connection::handshake(client, test_config()).await;
    let err = result.unwrap_err();
    assert!(err.to_string().contains("Access denied"));
    assert!(!err.is_transient());
}

#[tokio::test]
async fn test_query_streams_text_rows() {
    let (client, server) = tokio::io::duplex(65536);
    let server_task = tokio::spawn(async move {
        let mut server = ScriptedServer::new(server);
        server.accept_login().await;

        let (sequence, payload) = server.read_frame().await;
        assert_eq!(sequence, 0);
        assert_eq!(payload[0], 0x03); // COM_QUERY
        assert_eq!(&payload[1..], b"SELECT id FROM t");

        server.write_frame(1, &[0x01]).await; // one column
        server.send_column(2, "id", 0x08).await; // BIGINT
        server.send_eof(3).await;
        server.write_frame(4, &[0x02, b'4', b'2']).await;
        server.write_frame(5, &[0x01, b'7']).await;
        server.send_eof(6).await;
    });

    let mut conn = Connection::handshake(client, test_config()).await.unwrap();
    let mut rows = conn.query("SELECT id FROM t").await.unwrap();
    assert_eq!(rows.columns().len(), 1);
    assert_eq!(rows.columns()[0].name, "id");

    let first = rows.next_row().await.unwrap().unwrap();
    assert_eq!(first.get::<i64>(0).unwrap(), 42);
    let second = rows.next_row().await.unwrap().unwrap();
    assert_eq!(second.get::<i64>(0).unwrap(), 7);
    assert!(rows.next_row().await.unwrap().is_none());
    server_task.await.unwrap();
}

#[tokio::test]
async fn test_query_server_error_keeps_connection() {
    let (client, server) = tokio::io::duplex(65536);
    let server_task = tokio::spawn(async move {
        let mut server = ScriptedServer::new(server);
        server.accept_login().await;

        let _ = server.read_frame().await;
        let mut err = BytesMut::new();
        err.put_u8(0xff);
        err.put_u16_le(1064);
        err.put_slice(b"#42000You have an error in your SQL syntax");
        server.write_frame(1, &err).await;

        // The connection stays usable: answer the follow-up ping.
        let (sequence, payload) = server.read_frame().await;
        assert_eq!(sequence, 0);
        assert_eq!(payload[0], 0x0e);
        server.send_ok(1, 0, 0).await;
    });

    let mut conn = Connection::handshake(client, test_config()).await.unwrap();
    let err = conn.query("SELEC 1").await.unwrap_err();
    assert!(!err.closes_connection());
    assert!(err.to_string().contains("42000"));
    conn.ping().await.unwrap();
    server_task.await.unwrap();
}

#[tokio::test]
async fn test_prepare_cached_across_executes() {
    let (client, server) = tokio::io::duplex(65536);
    let server_task = tokio::spawn(async move {
        let mut server = ScriptedServer::new(server);
        server.accept_login().await;

        // COM_STMT_PREPARE
        let (sequence, payload) = server.read_frame().await;
        assert_eq!(sequence, 0);
        assert_eq!(payload[0], 0x16);
        assert_eq!(&payload[1..], b"SELECT ?");
        let mut prepare_ok = BytesMut::new();
        prepare_ok.put_u8(0x00);
        prepare_ok.put_u32_le(1); // statement id
        prepare_ok.put_u16_le(1); // one column
        prepare_ok.put_u16_le(1); // one parameter
        prepare_ok.put_u8(0);
        prepare_ok.put_u16_le(0);
        server.write_frame(1, &prepare_ok).await;
        server.send_column(2, "?", 0x08).await;
        server.send_eof(3).await;
        server.send_column(4, "v", 0x08).await;
        server.send_eof(5).await;

        let mut prepare_count = 1;
        let mut execute_count = 0;
        for _ in 0..2 {
            let (sequence, payload) = server.read_frame().await;
            assert_eq!(sequence, 0);
            match payload[0] {
                0x16 => prepare_count += 1,
                0x17 => execute_count += 1,
                other => panic!("unexpected command 0x{other:02x}"),
            }
            // Binary result: one BIGINT row.
            server.write_frame(1, &[0x01]).await;
            server.send_column(2, "v", 0x08).await;
            server.send_eof(3).await;
            let mut row = BytesMut::new();
            row.put_u8(0x00);
            row.put_u8(0x00); // null bitmap
            row.put_u64_le(5);
            server.write_frame(4, &row).await;
            server.send_eof(5).await;
        }
        (prepare_count, execute_count)
    });

    let mut conn = Connection::handshake(client, test_config()).await.unwrap();

    for _ in 0..2 {
        let mut binding = Binding::new(1);
        binding.bind(0, 5i64).unwrap();
        let rows = conn
            .execute("SELECT ?", binding)
            .await
            .unwrap()
            .collect_rows()
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get::<i64>(0).unwrap(), 5);
    }

    let (prepare_count, execute_count) = server_task.await.unwrap();
    assert_eq!(prepare_count, 1, "second execute must reuse the cached prepare");
    assert_eq!(execute_count, 2);
}

#[tokio::test]
async fn test_execute_update_reports_generated_key() {
    let (client, server) = tokio::io::duplex(65536);
    let server_task = tokio::spawn(async move {
        let mut server = ScriptedServer::new(server);
        server.accept_login().await;

        let (_, payload) = server.read_frame().await;
        assert_eq!(payload[0], 0x16);
        let mut prepare_ok = BytesMut::new();
        prepare_ok.put_u8(0x00);
        prepare_ok.put_u32_le(3);
        prepare_ok.put_u16_le(0); // no columns
        prepare_ok.put_u16_le(0); // no parameters
        prepare_ok.put_u8(0);
        prepare_ok.put_u16_le(0);
        server.write_frame(1, &prepare_ok).await;

        let (_, payload) = server.read_frame().await;
        assert_eq!(payload[0], 0x17);
        server.send_ok(1, 1, 9).await;
    });

    let mut conn = Connection::handshake(client, test_config()).await.unwrap();
    let result = conn
        .execute_update("INSERT INTO t VALUES (1)", Binding::new(0))
        .await
        .unwrap();
    assert_eq!(result.affected_rows, 1);
    assert_eq!(result.last_insert_id, 9);
    server_task.await.unwrap();
}

#[tokio::test]
async fn test_cancel_drains_to_terminator() {
    let (client, server) = tokio::io::duplex(65536);
    let server_task = tokio::spawn(async move {
        let mut server = ScriptedServer::new(server);
        server.accept_login().await;

        let _ = server.read_frame().await;
        server.write_frame(1, &[0x01]).await;
        server.send_column(2, "id", 0x08).await;
        server.send_eof(3).await;
        for sequence in 4..14 {
            server.write_frame(sequence, &[0x01, b'1']).await;
        }
        server.send_eof(14).await;

        // Wire stays aligned: the next command parses cleanly.
        let (sequence, payload) = server.read_frame().await;
        assert_eq!(sequence, 0);
        assert_eq!(payload[0], 0x0e);
        server.send_ok(1, 0, 0).await;
    });

    let mut conn = Connection::handshake(client, test_config()).await.unwrap();
    let mut rows = conn.query("SELECT id FROM big").await.unwrap();
    let first = rows.next_row().await.unwrap().unwrap();
    assert_eq!(first.get::<i64>(0).unwrap(), 1);
    rows.cancel().await.unwrap();
    rows.cancel().await.unwrap(); // idempotent
    drop(rows);
    conn.ping().await.unwrap();
    server_task.await.unwrap();
}
