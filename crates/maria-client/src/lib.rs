//! # maria-client
//!
//! The connection engine of the MariaDB/MySQL driver: handshake and
//! authentication orchestration, command dispatch (text and prepared),
//! demand-driven row streaming and the prepared-statement cache.
//!
//! The engine owns an established duplex byte stream (plain TCP, TLS or a
//! unix socket; transport setup belongs to the caller) and exposes three
//! surfaces: a command sink ([`Connection`] methods), a result source
//! ([`RowStream`]) and a metadata view ([`Connection::context`]).
//!
//! ## Example
//!
//! ```rust,ignore
//! use maria_client::{Config, Connection};
//!
//! let stream = tokio::net::TcpStream::connect(("127.0.0.1", 3306)).await?;
//! let config = Config::new("app").password("secret").database("test");
//! let mut conn = Connection::handshake(stream, config).await?;
//!
//! let mut rows = conn.query("SELECT id, name FROM users").await?;
//! while let Some(row) = rows.next_row().await? {
//!     let id: i64 = row.get(0)?;
//!     let name: String = row.get(1)?;
//! }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod binding;
pub mod cache;
pub mod config;
pub mod connection;
pub mod error;
pub mod result;
pub mod row;
pub mod stream;

pub use binding::Binding;
pub use cache::{PrepareCache, ServerPrepareResult};
pub use config::{Config, SslMode};
pub use connection::Connection;
pub use error::{Error, Result};
pub use result::QueryResult;
pub use row::Row;
pub use stream::RowStream;
