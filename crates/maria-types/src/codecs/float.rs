//! Floating-point codecs.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use maria_protocol::{ColumnDefinition, ConnectionContext, DataType};

use crate::codec::{Codec, TargetKind};
use crate::codecs::integral::parse_bit;
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
            | DataType::Text
            | DataType::VarString
            | DataType::String
    )
}

fn decode_f64_text(buf: &Bytes, column: &ColumnDefinition) -> Result<f64, TypeError> {
    if column.data_type == DataType::Bit {
        return Ok(parse_bit(buf) as f64);
    }
    let s = std::str::from_utf8(buf).map_err(|_| parse_error(buf, column))?;
    s.trim().parse().map_err(|_| parse_error(buf, column))
}

fn decode_f64_binary(mut buf: Bytes, column: &ColumnDefinition) -> Result<f64, TypeError> {
    let truncated = || TypeError::Truncated {
        data_type: column.data_type,
    };
    let signed = column.is_signed();
    let value = match column.data_type {
        DataType::Float => {
            if buf.remaining() < 4 {
                return Err(truncated());
            }
            f64::from(buf.get_f32_le())
        }
        DataType::Double => {
            if buf.remaining() < 8 {
                return Err(truncated());
            }
            buf.get_f64_le()
        }
        DataType::TinyInt => {
            if buf.remaining() < 1 {
                return Err(truncated());
            }
            if signed {
                f64::from(buf.get_i8())
            } else {
                f64::from(buf.get_u8())
            }
        }
        DataType::SmallInt | DataType::Year => {
            if buf.remaining() < 2 {
                return Err(truncated());
            }
            if signed {
                f64::from(buf.get_i16_le())
            } else {
                f64::from(buf.get_u16_le())
            }
        }
        DataType::MediumInt | DataType::Integer => {
            if buf.remaining() < 4 {
                return Err(truncated());
            }
            if signed {
                f64::from(buf.get_i32_le())
            } else {
                f64::from(buf.get_u32_le())
            }
        }
        DataType::BigInt => {
            if buf.remaining() < 8 {
                return Err(truncated());
            }
            if signed {
                buf.get_i64_le() as f64
            } else {
                buf.get_u64_le() as f64
            }
        }
        DataType::Bit => parse_bit(&buf) as f64,
        _ => return decode_f64_text(&buf, column),
    };
    Ok(value)
}

fn parse_error(buf: &Bytes, column: &ColumnDefinition) -> TypeError {
    TypeError::Parsing {
        value: String::from_utf8_lossy(buf).into_owned(),
        data_type: column.data_type,
        target: "float",
    }
}

/// Codec for `f32` values.
#[derive(Debug)]
pub struct FloatCodec;

impl Codec for FloatCodec {
    fn can_decode(&self, column: &ColumnDefinition, target: TargetKind) -> bool {
        target == TargetKind::Float && is_compatible(column.data_type)
    }

    fn can_encode(&self, value: &Value) -> bool {
        matches!(value, Value::Float(_))
    }

    fn decode_text(
        &self,
        buf: Bytes,
        column: &ColumnDefinition,
        _context: &ConnectionContext,
    ) -> Result<Value, TypeError> {
        Ok(Value::Float(decode_f64_text(&buf, column)? as f32))
    }

    fn decode_binary(
        &self,
        buf: Bytes,
        column: &ColumnDefinition,
        _context: &ConnectionContext,
    ) -> Result<Value, TypeError> {
        Ok(Value::Float(decode_f64_binary(buf, column)? as f32))
    }

    fn encode_text(
        &self,
        dst: &mut BytesMut,
        value: &Value,
        _context: &ConnectionContext,
    ) -> Result<(), TypeError> {
        if let Value::Float(v) = value {
            dst.put_slice(v.to_string().as_bytes());
        }
        Ok(())
    }

    fn encode_binary(&self, dst: &mut BytesMut, value: &Value) -> Result<(), TypeError> {
        if let Value::Float(v) = value {
            dst.put_f32_le(*v);
        }
        Ok(())
    }

    fn binary_type(&self) -> DataType {
        DataType::Float
    }
}

/// Codec for `f64` values.
#[derive(Debug)]
pub struct DoubleCodec;

impl Codec for DoubleCodec {
    fn can_decode(&self, column: &ColumnDefinition, target: TargetKind) -> bool {
        target == TargetKind::Double && is_compatible(column.data_type)
    }

    fn can_encode(&self, value: &Value) -> bool {
        matches!(value, Value::Double(_))
    }

    fn decode_text(
        &self,
        buf: Bytes,
        column: &ColumnDefinition,
        _context: &ConnectionContext,
    ) -> Result<Value, TypeError> {
        Ok(Value::Double(decode_f64_text(&buf, column)?))
    }

    fn decode_binary(
        &self,
        buf: Bytes,
        column: &ColumnDefinition,
        _context: &ConnectionContext,
    ) -> Result<Value, TypeError> {
        Ok(Value::Double(decode_f64_binary(buf, column)?))
    }

    fn encode_text(
        &self,
        dst: &mut BytesMut,
        value: &Value,
        _context: &ConnectionContext,
    ) -> Result<(), TypeError> {
        if let Value::Double(v) = value {
            dst.put_slice(v.to_string().as_bytes());
        }
        Ok(())
    }

    fn encode_binary(&self, dst: &mut BytesMut, value: &Value) -> Result<(), TypeError> {
        if let Value::Double(v) = value {
            dst.put_f64_le(*v);
        }
        Ok(())
    }

    fn binary_type(&self) -> DataType {
        DataType::Double
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use maria_protocol::{ColumnFlags, ServerStatus};

    fn column(data_type: DataType) -> ColumnDefinition {
        ColumnDefinition::synthetic("c", data_type, ColumnFlags::empty())
    }

    fn context() -> ConnectionContext {
        ConnectionContext::for_tests(ServerStatus::AUTOCOMMIT)
    }

    #[test]
    fn test_double_binary_ieee754() {
        let mut dst = BytesMut::new();
        DoubleCodec
            .encode_binary(&mut dst, &Value::Double(-2.5))
            .unwrap();
        assert_eq!(dst.len(), 8);
        let value = DoubleCodec
            .decode_binary(dst.freeze(), &column(DataType::Double), &context())
            .unwrap();
        assert_eq!(value, Value::Double(-2.5));
    }

    #[test]
    fn test_float_text_parse() {
        let value = FloatCodec
            .decode_text(Bytes::from_static(b"3.25"), &column(DataType::Float), &context())
            .unwrap();
        assert_eq!(value, Value::Float(3.25));
    }

    #[test]
    fn test_double_from_integer_column() {
        let value = DoubleCodec
            .decode_binary(
                Bytes::from_static(&[0x05, 0x00, 0x00, 0x00]),
                &column(DataType::Integer),
                &context(),
            )
            .unwrap();
        assert_eq!(value, Value::Double(5.0));
    }
}
