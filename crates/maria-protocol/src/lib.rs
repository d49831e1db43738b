//! # maria-protocol
//!
//! Pure implementation of the MariaDB/MySQL client-server wire protocol.
//!
//! This crate provides the byte-level protocol model: packet framing
//! primitives, length-encoded buffer utilities, capability negotiation
//! constants, server message parsing, and client message building.
//!
//! ## Design Philosophy
//!
//! This crate is intentionally IO-agnostic. It contains no networking logic
//! and makes no assumptions about the async runtime. Higher-level crates
//! build upon this foundation to provide async I/O capabilities.
//!
//! ## Wire Format
//!
//! Every packet begins with a 4-byte header: a 3-byte little-endian payload
//! length followed by a 1-byte sequence id. Payloads of 16 MiB − 1 bytes
//! signal a continuation; the logical message is the concatenation of all
//! frames up to (and including) the first one shorter than 16 MiB − 1.
//!
//! ## Example
//!
//! ```rust,ignore
//! use maria_protocol::packet::{PacketHeader, Sequencer};
//!
//! let mut seq = Sequencer::new();
//! let header = PacketHeader::new(5, seq.next());
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod buffer;
pub mod client;
pub mod constants;
pub mod context;
pub mod error;
pub mod packet;
pub mod server;
pub mod types;
pub mod version;

pub use client::ClientMessage;
pub use constants::{Capabilities, ColumnFlags, Command, ServerStatus};
pub use context::ConnectionContext;
pub use error::ProtocolError;
pub use packet::{MAX_PAYLOAD_SIZE, PACKET_HEADER_SIZE, PacketHeader, Sequencer};
pub use server::{
    AuthMoreData, AuthSwitchRequest, ColumnDefinition, EofPacket, ErrPacket, InitialHandshake,
    LocalInfileRequest, OkPacket, PrepareResult, ServerMessage,
};
pub use types::DataType;
pub use version::ServerVersion;
