//! Integer codecs.
//!
//! All integral codecs share one decode table and differ only in the
//! destination range check. Decoded values pass through `i128` so the
//! unsigned BIGINT extreme fits before the range check runs.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use maria_protocol::{ColumnDefinition, ConnectionContext, DataType};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::codec::{Codec, TargetKind};
use crate::error::TypeError;
use crate::value::Value;

fn is_compatible(data_type: DataType) -> bool {
    matches!(
        data_type,
        DataType::TinyInt
            | DataType::SmallInt
            | DataType::MediumInt
            | DataType::Integer
            | DataType::BigInt
            | DataType::Year
            | DataType::Bit
            | DataType::Float
            | DataType::Double
            | DataType::Decimal
            | DataType::OldDecimal
            | DataType::Enum
            | DataType::Text
            | DataType::VarString
            | DataType::String
    )
}

/// Accumulate a BIT value big-endian, left-padded with zeros.
pub(crate) fn parse_bit(buf: &[u8]) -> i128 {
    let mut result: i128 = 0;
    for &b in buf {
        result = (result << 8) + i128::from(b);
    }
    result
}

fn parse_text(buf: &Bytes, column: &ColumnDefinition, target: &'static str) -> Result<i128, TypeError> {
    let parse_error = || TypeError::Parsing {
        value: String::from_utf8_lossy(buf).into_owned(),
        data_type: column.data_type,
        target,
    };
    match column.data_type {
        DataType::Bit => Ok(parse_bit(buf)),
        DataType::TinyInt
        | DataType::SmallInt
        | DataType::MediumInt
        | DataType::Integer
        | DataType::BigInt
        | DataType::Year => {
            let s = std::str::from_utf8(buf).map_err(|_| parse_error())?;
            s.parse::<i128>().map_err(|_| parse_error())
        }
        _ => {
            // FLOAT, DOUBLE, DECIMAL, ENUM and string types: decimal parse,
            // fraction truncated toward zero.
            let s = std::str::from_utf8(buf).map_err(|_| parse_error())?;
            let decimal: Decimal = s.trim().parse().map_err(|_| parse_error())?;
            decimal.trunc().to_i128().ok_or_else(parse_error)
        }
    }
}

fn parse_binary(
    mut buf: Bytes,
    column: &ColumnDefinition,
    target: &'static str,
) -> Result<i128, TypeError> {
    let truncated = || TypeError::Truncated {
        data_type: column.data_type,
    };
    let signed = column.is_signed();
    let value = match column.data_type {
        DataType::TinyInt => {
            if buf.remaining() < 1 {
                return Err(truncated());
            }
            if signed {
                i128::from(buf.get_i8())
            } else {
                i128::from(buf.get_u8())
            }
        }
        DataType::SmallInt | DataType::Year => {
            if buf.remaining() < 2 {
                return Err(truncated());
            }
            if signed {
                i128::from(buf.get_i16_le())
            } else {
                i128::from(buf.get_u16_le())
            }
        }
        DataType::MediumInt => {
            // Wire-encoded on 3 bytes plus one padding byte.
            if buf.remaining() < 4 {
                return Err(truncated());
            }
            let raw = u32::from(buf.get_u8())
                | (u32::from(buf.get_u8()) << 8)
                | (u32::from(buf.get_u8()) << 16);
            buf.advance(1);
            if signed && raw & 0x0080_0000 != 0 {
                i128::from(raw as i32 | !0x00ff_ffff)
            } else {
                i128::from(raw)
            }
        }
        DataType::Integer => {
            if buf.remaining() < 4 {
                return Err(truncated());
            }
            if signed {
                i128::from(buf.get_i32_le())
            } else {
                i128::from(buf.get_u32_le())
            }
        }
        DataType::BigInt => {
            if buf.remaining() < 8 {
                return Err(truncated());
            }
            if signed {
                i128::from(buf.get_i64_le())
            } else {
                i128::from(buf.get_u64_le())
            }
        }
        DataType::Bit => parse_bit(&buf),
        DataType::Float => {
            if buf.remaining() < 4 {
                return Err(truncated());
            }
            buf.get_f32_le() as i128
        }
        DataType::Double => {
            if buf.remaining() < 8 {
                return Err(truncated());
            }
            buf.get_f64_le() as i128
        }
        _ => return parse_text(&buf, column, target),
    };
    Ok(value)
}

fn check_range(
    value: i128,
    min: i128,
    max: i128,
    column: &ColumnDefinition,
    target: &'static str,
) -> Result<i128, TypeError> {
    if value < min || value > max || (value < 0 && !column.is_signed()) {
        return Err(TypeError::Overflow { target });
    }
    Ok(value)
}

macro_rules! integral_codec {
    ($name:ident, $target:ident, $rust:ty, $variant:ident, $binary:ident, $put:ident) => {
        #[doc = concat!("Codec for `", stringify!($rust), "` values.")]
        #[derive(Debug)]
        pub struct $name;

        impl Codec for $name {
            fn can_decode(&self, column: &ColumnDefinition, target: TargetKind) -> bool {
                target == TargetKind::$target && is_compatible(column.data_type)
            }

            fn can_encode(&self, value: &Value) -> bool {
                matches!(value, Value::$variant(_))
            }

            fn decode_text(
                &self,
                buf: Bytes,
                column: &ColumnDefinition,
                _context: &ConnectionContext,
            ) -> Result<Value, TypeError> {
                let name = TargetKind::$target.name();
                let value = parse_text(&buf, column, name)?;
                let value = check_range(
                    value,
                    <$rust>::MIN as i128,
                    <$rust>::MAX as i128,
                    column,
                    name,
                )?;
                Ok(Value::$variant(value as $rust))
            }

            fn decode_binary(
                &self,
                buf: Bytes,
                column: &ColumnDefinition,
                _context: &ConnectionContext,
            ) -> Result<Value, TypeError> {
                let name = TargetKind::$target.name();
                let value = parse_binary(buf, column, name)?;
                let value = check_range(
                    value,
                    <$rust>::MIN as i128,
                    <$rust>::MAX as i128,
                    column,
                    name,
                )?;
                Ok(Value::$variant(value as $rust))
            }

            fn encode_text(
                &self,
                dst: &mut BytesMut,
                value: &Value,
                _context: &ConnectionContext,
            ) -> Result<(), TypeError> {
                if let Value::$variant(v) = value {
                    dst.put_slice(v.to_string().as_bytes());
                }
                Ok(())
            }

            fn encode_binary(&self, dst: &mut BytesMut, value: &Value) -> Result<(), TypeError> {
                if let Value::$variant(v) = value {
                    dst.$put(*v);
                }
                Ok(())
            }

            fn binary_type(&self) -> DataType {
                DataType::$binary
            }
        }
    };
}

integral_codec!(Int8Codec, Int8, i8, Int8, TinyInt, put_i8);
integral_codec!(Int16Codec, Int16, i16, Int16, SmallInt, put_i16_le);
integral_codec!(Int32Codec, Int32, i32, Int32, Integer, put_i32_le);
integral_codec!(Int64Codec, Int64, i64, Int64, BigInt, put_i64_le);
integral_codec!(UInt64Codec, UInt64, u64, UInt64, BigInt, put_u64_le);
