//! DECIMAL codec.
//!
//! DECIMAL and OLDDECIMAL columns are wire-encoded as text digits in both
//! protocols (the binary row still carries a length-prefixed digit string),
//! so text and binary decoding share one parser.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use maria_protocol::buffer::write_length_encoded_bytes;
use maria_protocol::{ColumnDefinition, ConnectionContext, DataType};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;

use crate::codec::{Codec, TargetKind};
use crate::codecs::integral::parse_bit;
use crate::error::TypeError;
use crate::value::Value;

fn is_compatible(data_type: DataType) -> bool {
    matches!(
        data_type,
        DataType::Decimal
            | DataType::OldDecimal
            | DataType::TinyInt
            | DataType::SmallInt
            | DataType::MediumInt
            | DataType::Integer
            | DataType::BigInt
            | DataType::Year
            | DataType::Bit
            | DataType::Float
            | DataType::Double
            | DataType::Text
            | DataType::VarString
            | DataType::String
    )
}

fn parse_decimal_str(buf: &Bytes, column: &ColumnDefinition) -> Result<Decimal, TypeError> {
    let error = || TypeError::Parsing {
        value: String::from_utf8_lossy(buf).into_owned(),
        data_type: column.data_type,
        target: "Decimal",
    };
    let s = std::str::from_utf8(buf).map_err(|_| error())?;
    s.trim().parse().map_err(|_| error())
}

/// Codec for `rust_decimal::Decimal` values.
#[derive(Debug)]
pub struct DecimalCodec;

impl Codec for DecimalCodec {
    fn can_decode(&self, column: &ColumnDefinition, target: TargetKind) -> bool {
        target == TargetKind::Decimal && is_compatible(column.data_type)
    }

    fn can_encode(&self, value: &Value) -> bool {
        matches!(value, Value::Decimal(_))
    }

    fn decode_text(
        &self,
        buf: Bytes,
        column: &ColumnDefinition,
        _context: &ConnectionContext,
    ) -> Result<Value, TypeError> {
        if column.data_type == DataType::Bit {
            return Ok(Value::Decimal(Decimal::from_i128_with_scale(
                parse_bit(&buf),
                0,
            )));
        }
        Ok(Value::Decimal(parse_decimal_str(&buf, column)?))
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
        let overflow = || TypeError::Overflow { target: "Decimal" };
        let signed = column.is_signed();
        let decimal = match column.data_type {
            DataType::Decimal | DataType::OldDecimal => {
                return self.decode_text(buf, column, context);
            }
            DataType::TinyInt => {
                if buf.remaining() < 1 {
                    return Err(truncated());
                }
                if signed {
                    Decimal::from(buf.get_i8())
                } else {
                    Decimal::from(buf.get_u8())
                }
            }
            DataType::SmallInt | DataType::Year => {
                if buf.remaining() < 2 {
                    return Err(truncated());
                }
                if signed {
                    Decimal::from(buf.get_i16_le())
                } else {
                    Decimal::from(buf.get_u16_le())
                }
            }
            DataType::MediumInt | DataType::Integer => {
                if buf.remaining() < 4 {
                    return Err(truncated());
                }
                if signed {
                    Decimal::from(buf.get_i32_le())
                } else {
                    Decimal::from(buf.get_u32_le())
                }
            }
            DataType::BigInt => {
                if buf.remaining() < 8 {
                    return Err(truncated());
                }
                if signed {
                    Decimal::from(buf.get_i64_le())
                } else {
                    Decimal::from(buf.get_u64_le())
                }
            }
            DataType::Bit => Decimal::from_i128_with_scale(parse_bit(&buf), 0),
            DataType::Float => {
                if buf.remaining() < 4 {
                    return Err(truncated());
                }
                Decimal::from_f32(buf.get_f32_le()).ok_or_else(overflow)?
            }
            DataType::Double => {
                if buf.remaining() < 8 {
                    return Err(truncated());
                }
                Decimal::from_f64(buf.get_f64_le()).ok_or_else(overflow)?
            }
            _ => parse_decimal_str(&buf, column)?,
        };
        Ok(Value::Decimal(decimal))
    }

    fn encode_text(
        &self,
        dst: &mut BytesMut,
        value: &Value,
        _context: &ConnectionContext,
    ) -> Result<(), TypeError> {
        if let Value::Decimal(v) = value {
            dst.put_slice(v.to_string().as_bytes());
        }
        Ok(())
    }

    fn encode_binary(&self, dst: &mut BytesMut, value: &Value) -> Result<(), TypeError> {
        if let Value::Decimal(v) = value {
            write_length_encoded_bytes(dst, v.to_string().as_bytes());
        }
        Ok(())
    }

    fn binary_type(&self) -> DataType {
        DataType::Decimal
    }
}
