//! Codec contract and registry.

use bytes::{Bytes, BytesMut};
use maria_protocol::{ColumnDefinition, ConnectionContext, DataType};

use crate::codecs;
use crate::error::TypeError;
use crate::value::Value;

/// Requested Rust-side value kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetKind {
    /// `bool`.
    Bool,
    /// `i8`.
    Int8,
    /// `i16`.
    Int16,
    /// `i32`.
    Int32,
    /// `i64`.
    Int64,
    /// `u64`.
    UInt64,
    /// `f32`.
    Float,
    /// `f64`.
    Double,
    /// `rust_decimal::Decimal`.
    Decimal,
    /// `String`.
    Text,
    /// `bytes::Bytes`.
    Blob,
    /// `chrono::NaiveDate`.
    Date,
    /// `chrono::NaiveTime`.
    Time,
    /// `chrono::Duration`.
    Duration,
    /// `chrono::NaiveDateTime`.
    DateTime,
}

impl TargetKind {
    /// Human-readable name, used in error messages.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int8 => "i8",
            Self::Int16 => "i16",
            Self::Int32 => "i32",
            Self::Int64 => "i64",
            Self::UInt64 => "u64",
            Self::Float => "f32",
            Self::Double => "f64",
            Self::Decimal => "Decimal",
            Self::Text => "String",
            Self::Blob => "Bytes",
            Self::Date => "NaiveDate",
            Self::Time => "NaiveTime",
            Self::Duration => "Duration",
            Self::DateTime => "NaiveDateTime",
        }
    }

    /// Natural target for a column when the caller does not name one.
    #[must_use]
    pub fn default_for(column: &ColumnDefinition) -> Self {
        match column.data_type {
            DataType::TinyInt => {
                if column.length == 1 {
                    Self::Bool
                } else {
                    Self::Int8
                }
            }
            DataType::SmallInt | DataType::Year => Self::Int16,
            DataType::MediumInt | DataType::Integer => {
                if column.is_signed() {
                    Self::Int32
                } else {
                    Self::Int64
                }
            }
            DataType::BigInt | DataType::Bit => {
                if column.is_signed() {
                    Self::Int64
                } else {
                    Self::UInt64
                }
            }
            DataType::Float => Self::Float,
            DataType::Double => Self::Double,
            DataType::Decimal | DataType::OldDecimal => Self::Decimal,
            DataType::Date | DataType::NewDate => Self::Date,
            DataType::Time => Self::Time,
            DataType::DateTime | DataType::Timestamp => Self::DateTime,
            DataType::Blob | DataType::Geometry => Self::Blob,
            _ => Self::Text,
        }
    }
}

/// A bidirectional translator between one value kind and the server's
/// text and binary column formats.
pub trait Codec: Send + Sync {
    /// Whether this codec decodes `column` into `target`.
    fn can_decode(&self, column: &ColumnDefinition, target: TargetKind) -> bool;

    /// Whether this codec encodes `value`.
    fn can_encode(&self, value: &Value) -> bool;

    /// Decode a text-protocol field.
    fn decode_text(
        &self,
        buf: Bytes,
        column: &ColumnDefinition,
        context: &ConnectionContext,
    ) -> Result<Value, TypeError>;

    /// Decode a binary-protocol field.
    fn decode_binary(
        &self,
        buf: Bytes,
        column: &ColumnDefinition,
        context: &ConnectionContext,
    ) -> Result<Value, TypeError>;

    /// Encode as a quoted/escaped SQL text literal.
    fn encode_text(
        &self,
        dst: &mut BytesMut,
        value: &Value,
        context: &ConnectionContext,
    ) -> Result<(), TypeError>;

    /// Encode in the binary parameter format.
    fn encode_binary(&self, dst: &mut BytesMut, value: &Value) -> Result<(), TypeError>;

    /// Wire type declared when binding a parameter through this codec.
    fn binary_type(&self) -> DataType;
}

/// Ordered codec list.
///
/// Resolution is a linear scan; the first codec accepting a pair wins.
/// The order below is fixed and part of the crate contract:
/// decimal, boolean, integrals (i8, i16, i32, i64, u64), float, double,
/// text, blob, date, time, duration, datetime.
static CODECS: [&'static dyn Codec; 15] = [
    &codecs::decimal::DecimalCodec,
    &codecs::boolean::BooleanCodec,
    &codecs::integral::Int8Codec,
    &codecs::integral::Int16Codec,
    &codecs::integral::Int32Codec,
    &codecs::integral::Int64Codec,
    &codecs::integral::UInt64Codec,
    &codecs::float::FloatCodec,
    &codecs::float::DoubleCodec,
    &codecs::text::TextCodec,
    &codecs::blob::BlobCodec,
    &codecs::temporal::DateCodec,
    &codecs::temporal::TimeCodec,
    &codecs::temporal::DurationCodec,
    &codecs::temporal::DateTimeCodec,
];

/// Registry resolving codecs for decode and encode.
#[derive(Debug, Clone, Copy)]
pub struct CodecRegistry {
    _private: (),
}

impl CodecRegistry {
    /// The process-wide registry.
    #[must_use]
    pub const fn global() -> Self {
        Self { _private: () }
    }

    /// Find the codec decoding `column` into `target`.
    pub fn decoder_for(
        &self,
        column: &ColumnDefinition,
        target: TargetKind,
    ) -> Result<&'static dyn Codec, TypeError> {
        CODECS
            .iter()
            .copied()
            .find(|codec| codec.can_decode(column, target))
            .ok_or(TypeError::NoDecoder {
                data_type: column.data_type,
                target: target.name(),
            })
    }

    /// Find the codec encoding `value`.
    pub fn encoder_for(&self, value: &Value) -> Result<&'static dyn Codec, TypeError> {
        CODECS
            .iter()
            .copied()
            .find(|codec| codec.can_encode(value))
            .ok_or(TypeError::NoEncoder {
                type_name: value.type_name(),
            })
    }

    /// Decode a text-protocol field, `None` meaning SQL NULL.
    pub fn decode_text(
        &self,
        buf: Option<Bytes>,
        column: &ColumnDefinition,
        target: TargetKind,
        context: &ConnectionContext,
    ) -> Result<Value, TypeError> {
        match buf {
            None => Ok(Value::Null),
            Some(buf) => self
                .decoder_for(column, target)?
                .decode_text(buf, column, context),
        }
    }

    /// Decode a binary-protocol field, `None` meaning SQL NULL.
    pub fn decode_binary(
        &self,
        buf: Option<Bytes>,
        column: &ColumnDefinition,
        target: TargetKind,
        context: &ConnectionContext,
    ) -> Result<Value, TypeError> {
        match buf {
            None => Ok(Value::Null),
            Some(buf) => self
                .decoder_for(column, target)?
                .decode_binary(buf, column, context),
        }
    }

    /// Encode a value as a SQL text literal (`NULL` for [`Value::Null`]).
    pub fn encode_text(
        &self,
        dst: &mut BytesMut,
        value: &Value,
        context: &ConnectionContext,
    ) -> Result<(), TypeError> {
        use bytes::BufMut;
        if value.is_null() {
            dst.put_slice(b"NULL");
            return Ok(());
        }
        self.encoder_for(value)?.encode_text(dst, value, context)
    }

    /// Encode a value in the binary parameter format.
    ///
    /// NULL writes no bytes; it travels in the execute null bitmap.
    pub fn encode_binary(&self, dst: &mut BytesMut, value: &Value) -> Result<(), TypeError> {
        if value.is_null() {
            return Ok(());
        }
        self.encoder_for(value)?.encode_binary(dst, value)
    }

    /// Wire type byte and sign flag declared for a bound parameter.
    pub fn parameter_type(&self, value: &Value) -> Result<(u8, bool), TypeError> {
        if value.is_null() {
            return Ok((DataType::Null.binary_type_byte(), false));
        }
        let codec = self.encoder_for(value)?;
        Ok((
            codec.binary_type().binary_type_byte(),
            matches!(value, Value::UInt64(_)),
        ))
    }
}

impl Default for CodecRegistry {
    fn default() -> Self {
        Self::global()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use maria_protocol::ColumnFlags;

    fn column(data_type: DataType) -> ColumnDefinition {
        ColumnDefinition::synthetic("c", data_type, ColumnFlags::empty())
    }

    #[test]
    fn test_default_targets() {
        assert_eq!(
            TargetKind::default_for(&column(DataType::BigInt)),
            TargetKind::Int64
        );
        assert_eq!(
            TargetKind::default_for(&column(DataType::VarString)),
            TargetKind::Text
        );
        let unsigned =
            ColumnDefinition::synthetic("c", DataType::BigInt, ColumnFlags::UNSIGNED);
        assert_eq!(TargetKind::default_for(&unsigned), TargetKind::UInt64);
    }

    #[test]
    fn test_registry_resolution() {
        let registry = CodecRegistry::global();
        assert!(registry
            .decoder_for(&column(DataType::Integer), TargetKind::Int32)
            .is_ok());
        assert!(registry
            .decoder_for(&column(DataType::Blob), TargetKind::Date)
            .is_err());
    }

    #[test]
    fn test_null_decoding() {
        let registry = CodecRegistry::global();
        let context = ConnectionContext::for_tests(maria_protocol::ServerStatus::AUTOCOMMIT);
        let value = registry
            .decode_text(None, &column(DataType::Integer), TargetKind::Int32, &context)
            .unwrap();
        assert!(value.is_null());
    }

    #[test]
    fn test_null_parameter_type() {
        let registry = CodecRegistry::global();
        let (type_byte, unsigned) = registry.parameter_type(&Value::Null).unwrap();
        assert_eq!(type_byte, 6);
        assert!(!unsigned);
    }
}
