//! # maria-types
//!
//! Column type to Rust type mappings and value codecs for the MariaDB/MySQL
//! client protocol.
//!
//! Each server column format (text and binary) is translated to and from
//! native values by a small codec. Codecs are collected in an ordered
//! [`CodecRegistry`]; resolution scans the list and the first codec that
//! accepts the (column, target) pair wins, so the list order is part of the
//! crate's contract.
//!
//! ## Type Mappings
//!
//! | Server type | Rust type |
//! |-------------|-----------|
//! | `TINYINT` | `i8` |
//! | `SMALLINT` | `i16` |
//! | `INT`/`MEDIUMINT` | `i32` |
//! | `BIGINT` | `i64` (`u64` when unsigned) |
//! | `FLOAT` | `f32` |
//! | `DOUBLE` | `f64` |
//! | `DECIMAL` | `rust_decimal::Decimal` |
//! | `CHAR`/`VARCHAR`/`TEXT` | `String` |
//! | `BLOB` | `bytes::Bytes` |
//! | `DATE` | `chrono::NaiveDate` |
//! | `TIME` | `chrono::NaiveTime` / `chrono::Duration` |
//! | `DATETIME`/`TIMESTAMP` | `chrono::NaiveDateTime` |

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod codec;
pub mod codecs;
pub mod error;
pub mod from_value;
pub mod temporal;
pub mod value;

pub use codec::{Codec, CodecRegistry, TargetKind};
pub use error::TypeError;
pub use from_value::FromValue;
pub use value::Value;
