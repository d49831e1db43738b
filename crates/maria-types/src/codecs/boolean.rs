//! Boolean codec.
//!
//! A value is true iff it is numerically non-zero, or, for textual
//! columns, not equal to the string `"0"`.

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

/// Codec for `bool` values.
#[derive(Debug)]
pub struct BooleanCodec;

impl Codec for BooleanCodec {
    fn can_decode(&self, column: &ColumnDefinition, target: TargetKind) -> bool {
        target == TargetKind::Bool && is_compatible(column.data_type)
    }

    fn can_encode(&self, value: &Value) -> bool {
        matches!(value, Value::Bool(_))
    }

    fn decode_text(
        &self,
        buf: Bytes,
        column: &ColumnDefinition,
        _context: &ConnectionContext,
    ) -> Result<Value, TypeError> {
        let result = match column.data_type {
            DataType::Bit => parse_bit(&buf) != 0,
            DataType::Decimal | DataType::OldDecimal | DataType::Float | DataType::Double => {
                let s = std::str::from_utf8(&buf).map_err(|_| TypeError::Parsing {
                    value: String::from_utf8_lossy(&buf).into_owned(),
                    data_type: column.data_type,
                    target: "bool",
                })?;
                let decimal: rust_decimal::Decimal =
                    s.trim().parse().map_err(|_| TypeError::Parsing {
                        value: s.to_string(),
                        data_type: column.data_type,
                        target: "bool",
                    })?;
                !decimal.trunc().is_zero()
            }
            _ => buf.as_ref() != b"0",
        };
        Ok(Value::Bool(result))
    }

    fn decode_binary(
        &self,
        mut buf: Bytes,
        column: &ColumnDefinition,
        context: &ConnectionContext,
    ) -> Result<Value, TypeError> {
        let truncated = || TypeError::Truncated {
            data_type: column.data_type,
        };
        let result = match column.data_type {
            DataType::Bit => parse_bit(&buf) != 0,
            DataType::TinyInt => {
                if buf.remaining() < 1 {
                    return Err(truncated());
                }
                buf.get_i8() != 0
            }
            DataType::SmallInt | DataType::Year => {
                if buf.remaining() < 2 {
                    return Err(truncated());
                }
                buf.get_i16_le() != 0
            }
            DataType::MediumInt | DataType::Integer => {
                if buf.remaining() < 4 {
                    return Err(truncated());
                }
                buf.get_i32_le() != 0
            }
            DataType::BigInt => {
                if buf.remaining() < 8 {
                    return Err(truncated());
                }
                buf.get_i64_le() != 0
            }
            DataType::Float => {
                if buf.remaining() < 4 {
                    return Err(truncated());
                }
                buf.get_f32_le() as i32 != 0
            }
            DataType::Double => {
                if buf.remaining() < 8 {
                    return Err(truncated());
                }
                buf.get_f64_le() as i64 != 0
            }
            DataType::Decimal | DataType::OldDecimal => {
                return self.decode_text(buf, column, context);
            }
            _ => buf.as_ref() != b"0",
        };
        Ok(Value::Bool(result))
    }

    fn encode_text(
        &self,
        dst: &mut BytesMut,
        value: &Value,
        _context: &ConnectionContext,
    ) -> Result<(), TypeError> {
        if let Value::Bool(v) = value {
            dst.put_u8(if *v { b'1' } else { b'0' });
        }
        Ok(())
    }

    fn encode_binary(&self, dst: &mut BytesMut, value: &Value) -> Result<(), TypeError> {
        if let Value::Bool(v) = value {
            dst.put_u8(u8::from(*v));
        }
        Ok(())
    }

    fn binary_type(&self) -> DataType {
        DataType::TinyInt
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
    fn test_text_zero_string_rule() {
        let decode = |bytes: &'static [u8], data_type| {
            BooleanCodec
                .decode_text(Bytes::from_static(bytes), &column(data_type), &context())
                .unwrap()
        };
        assert_eq!(decode(b"0", DataType::TinyInt), Value::Bool(false));
        assert_eq!(decode(b"1", DataType::TinyInt), Value::Bool(true));
        assert_eq!(decode(b"true", DataType::VarString), Value::Bool(true));
        assert_eq!(decode(b"0", DataType::VarString), Value::Bool(false));
    }

    #[test]
    fn test_binary_nonzero_rule() {
        let value = BooleanCodec
            .decode_binary(
                Bytes::from_static(&[0, 0, 0, 0]),
                &column(DataType::Integer),
                &context(),
            )
            .unwrap();
        assert_eq!(value, Value::Bool(false));
        let value = BooleanCodec
            .decode_binary(
                Bytes::from_static(&[2, 0]),
                &column(DataType::SmallInt),
                &context(),
            )
            .unwrap();
        assert_eq!(value, Value::Bool(true));
    }

    #[test]
    fn test_decimal_fraction_truncates() {
        let value = BooleanCodec
            .decode_text(
                Bytes::from_static(b"0.9"),
                &column(DataType::Decimal),
                &context(),
            )
            .unwrap();
        assert_eq!(value, Value::Bool(false));
    }
}
