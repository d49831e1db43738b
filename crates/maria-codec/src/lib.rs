//! # maria-codec
//!
//! Async packet framing for the MariaDB/MySQL client protocol.
//!
//! This crate bridges the IO-agnostic wire model of `maria-protocol` onto
//! tokio transports: a [`PacketCodec`] for tokio-util framing, a
//! [`MessageAssembler`] that joins continuation frames into logical
//! payloads, and split stream/sink wrappers so one task can own the read
//! half while another owns the write half.

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod error;
pub mod framed;
pub mod message;
pub mod packet_codec;

pub use error::CodecError;
pub use framed::{PacketReader, PacketStream, PacketWriter};
pub use message::MessageAssembler;
pub use packet_codec::{Packet, PacketCodec};
