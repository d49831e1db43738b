//! String codec.
//!
//! Strings decode from almost every column type. Numeric columns honor
//! zero-fill display padding, BIT renders as a `b'…'` literal, and binary
//! temporal values render in their canonical text form.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use maria_protocol::buffer::{write_escaped_literal, write_length_encoded_bytes, zero_filling};
use maria_protocol::{ColumnDefinition, ConnectionContext, DataType};

use crate::codec::{Codec, TargetKind};
use crate::error::TypeError;
use crate::temporal::{BinaryDateTime, BinaryTime};
use crate::value::Value;

fn is_compatible(data_type: DataType) -> bool {
    !matches!(
        data_type,
        DataType::Blob | DataType::Geometry | DataType::Null
    )
}

/// Render a BIT value as a `b'…'` literal.
///
/// Bits before the first set bit are dropped; zeros after it are kept.
/// An all-zero value renders as `b''`.
pub(crate) fn bit_to_string(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 8 + 3);
    out.push_str("b'");
    let mut seen_one = false;
    for &byte in bytes {
        for shift in (0..8).rev() {
            if byte & (1 << shift) != 0 {
                out.push('1');
                seen_one = true;
            } else if seen_one {
                out.push('0');
            }
        }
    }
    out.push('\'');
    out
}

fn utf8(buf: &Bytes, column: &ColumnDefinition) -> Result<String, TypeError> {
    String::from_utf8(buf.to_vec()).map_err(|_| TypeError::Parsing {
        value: String::from_utf8_lossy(buf).into_owned(),
        data_type: column.data_type,
        target: "String",
    })
}

fn zero_fill_if_needed(value: String, column: &ColumnDefinition) -> String {
    if column.is_zero_fill() {
        zero_filling(&value, column.length as usize)
    } else {
        value
    }
}

/// Codec for `String` values.
#[derive(Debug)]
pub struct TextCodec;

impl Codec for TextCodec {
    fn can_decode(&self, column: &ColumnDefinition, target: TargetKind) -> bool {
        target == TargetKind::Text && is_compatible(column.data_type)
    }

    fn can_encode(&self, value: &Value) -> bool {
        matches!(value, Value::Text(_))
    }

    fn decode_text(
        &self,
        buf: Bytes,
        column: &ColumnDefinition,
        _context: &ConnectionContext,
    ) -> Result<Value, TypeError> {
        if column.data_type == DataType::Bit {
            return Ok(Value::Text(bit_to_string(&buf)));
        }
        Ok(Value::Text(utf8(&buf, column)?))
    }

    fn decode_binary(
        &self,
        mut buf: Bytes,
        column: &ColumnDefinition,
        _context: &ConnectionContext,
    ) -> Result<Value, TypeError> {
        let truncated = || TypeError::Truncated {
            data_type: column.data_type,
        };
        let signed = column.is_signed();
        let rendered = match column.data_type {
            DataType::Bit => bit_to_string(&buf),
            DataType::TinyInt => {
                if buf.remaining() < 1 {
                    return Err(truncated());
                }
                let raw = if signed {
                    buf.get_i8().to_string()
                } else {
                    buf.get_u8().to_string()
                };
                zero_fill_if_needed(raw, column)
            }
            DataType::Year => {
                if buf.remaining() < 2 {
                    return Err(truncated());
                }
                let mut s = buf.get_u16_le().to_string();
                while (s.len() as u32) < column.length {
                    s.insert(0, '0');
                }
                s
            }
            DataType::SmallInt => {
                if buf.remaining() < 2 {
                    return Err(truncated());
                }
                let raw = if signed {
                    buf.get_i16_le().to_string()
                } else {
                    buf.get_u16_le().to_string()
                };
                zero_fill_if_needed(raw, column)
            }
            DataType::MediumInt => {
                if buf.remaining() < 4 {
                    return Err(truncated());
                }
                let low = u32::from(buf.get_u8())
                    | (u32::from(buf.get_u8()) << 8)
                    | (u32::from(buf.get_u8()) << 16);
                // The wire pads medium integers to 4 bytes.
                buf.advance(1);
                let raw = if signed && low & 0x0080_0000 != 0 {
                    (low as i32 | !0x00ff_ffff).to_string()
                } else {
                    low.to_string()
                };
                zero_fill_if_needed(raw, column)
            }
            DataType::Integer => {
                if buf.remaining() < 4 {
                    return Err(truncated());
                }
                let raw = if signed {
                    buf.get_i32_le().to_string()
                } else {
                    buf.get_u32_le().to_string()
                };
                zero_fill_if_needed(raw, column)
            }
            DataType::BigInt => {
                if buf.remaining() < 8 {
                    return Err(truncated());
                }
                let raw = if signed {
                    buf.get_i64_le().to_string()
                } else {
                    buf.get_u64_le().to_string()
                };
                zero_fill_if_needed(raw, column)
            }
            DataType::Float => {
                if buf.remaining() < 4 {
                    return Err(truncated());
                }
                buf.get_f32_le().to_string()
            }
            DataType::Double => {
                if buf.remaining() < 8 {
                    return Err(truncated());
                }
                buf.get_f64_le().to_string()
            }
            DataType::Time => {
                let time = BinaryTime::read(&mut buf, column.data_type)?;
                let mut s = format!(
                    "{}{:02}:{:02}:{:02}",
                    if time.negative { "-" } else { "" },
                    time.total_hours(),
                    time.minutes,
                    time.seconds
                );
                if column.decimals > 0 {
                    let mut micro = time.micros.to_string();
                    while micro.len() < usize::from(column.decimals) {
                        micro.insert(0, '0');
                    }
                    s.push('.');
                    s.push_str(&micro);
                }
                s
            }
            DataType::Date => match BinaryDateTime::read(&mut buf, column.data_type)? {
                None => "1970-01-01".to_string(),
                Some(d) => format!("{:04}-{:02}-{:02}", d.year, d.month, d.day),
            },
            DataType::DateTime | DataType::Timestamp => {
                match BinaryDateTime::read(&mut buf, column.data_type)? {
                    None => return Ok(Value::Null),
                    Some(d) => {
                        let mut s = format!(
                            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
                            d.year, d.month, d.day, d.hour, d.minute, d.second
                        );
                        if d.micros > 0 {
                            s.push_str(&format!(".{:06}", d.micros));
                        }
                        s
                    }
                }
            }
            _ => utf8(&buf, column)?,
        };
        Ok(Value::Text(rendered))
    }

    fn encode_text(
        &self,
        dst: &mut BytesMut,
        value: &Value,
        context: &ConnectionContext,
    ) -> Result<(), TypeError> {
        if let Value::Text(v) = value {
            write_escaped_literal(dst, v.as_bytes(), context);
        }
        Ok(())
    }

    fn encode_binary(&self, dst: &mut BytesMut, value: &Value) -> Result<(), TypeError> {
        if let Value::Text(v) = value {
            write_length_encoded_bytes(dst, v.as_bytes());
        }
        Ok(())
    }

    fn binary_type(&self) -> DataType {
        DataType::Text
    }
}
