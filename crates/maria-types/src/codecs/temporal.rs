//! Temporal codecs: DATE, TIME and DATETIME.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use chrono::{Datelike, NaiveDate, NaiveTime, Timelike};
use maria_protocol::{ColumnDefinition, ConnectionContext, DataType};

use crate::codec::{Codec, TargetKind};
use crate::error::TypeError;
use crate::temporal::{parse_date, parse_time, parse_timestamp, BinaryDateTime, BinaryTime};
use crate::value::Value;

fn make_date(year: i64, month: i64, day: i64) -> Result<NaiveDate, TypeError> {
    NaiveDate::from_ymd_opt(year as i32, month as u32, day as u32).ok_or(
        TypeError::InvalidTemporal {
            field: "date",
            value: year * 10000 + month * 100 + day,
        },
    )
}

fn make_time(hour: i64, minute: i64, second: i64, nanos: i64) -> Result<NaiveTime, TypeError> {
    NaiveTime::from_hms_nano_opt(hour as u32, minute as u32, second as u32, nanos as u32).ok_or(
        TypeError::InvalidTemporal {
            field: "time",
            value: hour * 10000 + minute * 100 + second,
        },
    )
}

// YEAR(2) pivot: values up to 69 land in 2000–2069, the rest in 1900–1999.
fn pivot_year2(year: i64) -> i64 {
    if year <= 69 {
        year + 2000
    } else {
        year + 1900
    }
}

/// Codec for `chrono::NaiveDate` values.
#[derive(Debug)]
pub struct DateCodec;

impl Codec for DateCodec {
    fn can_decode(&self, column: &ColumnDefinition, target: TargetKind) -> bool {
        target == TargetKind::Date
            && matches!(
                column.data_type,
                DataType::Date
                    | DataType::NewDate
                    | DataType::DateTime
                    | DataType::Timestamp
                    | DataType::Year
                    | DataType::Text
                    | DataType::VarString
                    | DataType::String
            )
    }

    fn can_encode(&self, value: &Value) -> bool {
        matches!(value, Value::Date(_))
    }

    fn decode_text(
        &self,
        buf: Bytes,
        column: &ColumnDefinition,
        _context: &ConnectionContext,
    ) -> Result<Value, TypeError> {
        match column.data_type {
            DataType::Year => {
                let s = std::str::from_utf8(&buf).map_err(|_| TypeError::Parsing {
                    value: String::from_utf8_lossy(&buf).into_owned(),
                    data_type: column.data_type,
                    target: "NaiveDate",
                })?;
                let mut year: i64 = s.parse().map_err(|_| TypeError::Parsing {
                    value: s.to_string(),
                    data_type: column.data_type,
                    target: "NaiveDate",
                })?;
                if buf.len() == 2 && column.length == 2 {
                    year = pivot_year2(year);
                }
                Ok(Value::Date(make_date(year, 1, 1)?))
            }
            DataType::Date | DataType::NewDate => match parse_date(
                std::str::from_utf8(&buf).map_err(|_| TypeError::Parsing {
                    value: String::from_utf8_lossy(&buf).into_owned(),
                    data_type: column.data_type,
                    target: "NaiveDate",
                })?,
                column.data_type,
            )? {
                None => Ok(Value::Null),
                Some([y, m, d]) => Ok(Value::Date(make_date(y, m, d)?)),
            },
            _ => {
                let s = String::from_utf8_lossy(&buf).into_owned();
                match parse_timestamp(&s, column.data_type)? {
                    None => Ok(Value::Null),
                    Some(parts) => Ok(Value::Date(make_date(parts[0], parts[1], parts[2])?)),
                }
            }
        }
    }

    fn decode_binary(
        &self,
        mut buf: Bytes,
        column: &ColumnDefinition,
        context: &ConnectionContext,
    ) -> Result<Value, TypeError> {
        match column.data_type {
            DataType::Year => {
                if buf.remaining() < 2 {
                    return Err(TypeError::Truncated {
                        data_type: column.data_type,
                    });
                }
                let mut year = i64::from(buf.get_u16_le());
                if column.length == 2 {
                    year = pivot_year2(year);
                }
                Ok(Value::Date(make_date(year, 1, 1)?))
            }
            DataType::Date | DataType::NewDate | DataType::DateTime | DataType::Timestamp => {
                match BinaryDateTime::read(&mut buf, column.data_type)? {
                    None => Ok(Value::Null),
                    Some(d) if d.year == 0 && d.month == 0 && d.day == 0 => Ok(Value::Null),
                    Some(d) => Ok(Value::Date(make_date(
                        i64::from(d.year),
                        i64::from(d.month),
                        i64::from(d.day),
                    )?)),
                }
            }
            _ => self.decode_text(buf, column, context),
        }
    }

    fn encode_text(
        &self,
        dst: &mut BytesMut,
        value: &Value,
        _context: &ConnectionContext,
    ) -> Result<(), TypeError> {
        if let Value::Date(v) = value {
            dst.put_slice(format!("'{}'", v.format("%Y-%m-%d")).as_bytes());
        }
        Ok(())
    }

    fn encode_binary(&self, dst: &mut BytesMut, value: &Value) -> Result<(), TypeError> {
        if let Value::Date(v) = value {
            dst.put_u8(4);
            dst.put_u16_le(v.year() as u16);
            dst.put_u8(v.month() as u8);
            dst.put_u8(v.day() as u8);
        }
        Ok(())
    }

    fn binary_type(&self) -> DataType {
        DataType::Date
    }
}

/// Codec for `chrono::NaiveTime` values.
///
/// TIME columns exceeding one day fold into the day (`hour % 24`); decode
/// as [`chrono::Duration`] to keep the full range.
#[derive(Debug)]
pub struct TimeCodec;

impl Codec for TimeCodec {
    fn can_decode(&self, column: &ColumnDefinition, target: TargetKind) -> bool {
        target == TargetKind::Time
            && matches!(
                column.data_type,
                DataType::Time
                    | DataType::DateTime
                    | DataType::Timestamp
                    | DataType::Text
                    | DataType::VarString
                    | DataType::String
            )
    }

    fn can_encode(&self, value: &Value) -> bool {
        matches!(value, Value::Time(_))
    }

    fn decode_text(
        &self,
        buf: Bytes,
        column: &ColumnDefinition,
        _context: &ConnectionContext,
    ) -> Result<Value, TypeError> {
        let s = String::from_utf8_lossy(&buf).into_owned();
        match column.data_type {
            DataType::DateTime | DataType::Timestamp => {
                match parse_timestamp(&s, column.data_type)? {
                    None => Ok(Value::Null),
                    Some(parts) => Ok(Value::Time(make_time(
                        parts[3], parts[4], parts[5], parts[6],
                    )?)),
                }
            }
            _ => {
                let parts = parse_time(&s, column.data_type)?;
                Ok(Value::Time(make_time(
                    parts.hours % 24,
                    parts.minutes,
                    parts.seconds,
                    parts.nanos,
                )?))
            }
        }
    }

    fn decode_binary(
        &self,
        mut buf: Bytes,
        column: &ColumnDefinition,
        context: &ConnectionContext,
    ) -> Result<Value, TypeError> {
        match column.data_type {
            DataType::Time => {
                let time = BinaryTime::read(&mut buf, column.data_type)?;
                Ok(Value::Time(make_time(
                    i64::from(time.hours),
                    i64::from(time.minutes),
                    i64::from(time.seconds),
                    i64::from(time.micros) * 1000,
                )?))
            }
            DataType::DateTime | DataType::Timestamp => {
                match BinaryDateTime::read(&mut buf, column.data_type)? {
                    None => Ok(Value::Null),
                    Some(d) => Ok(Value::Time(make_time(
                        i64::from(d.hour),
                        i64::from(d.minute),
                        i64::from(d.second),
                        i64::from(d.micros) * 1000,
                    )?)),
                }
            }
            _ => self.decode_text(buf, column, context),
        }
    }

    fn encode_text(
        &self,
        dst: &mut BytesMut,
        value: &Value,
        _context: &ConnectionContext,
    ) -> Result<(), TypeError> {
        if let Value::Time(v) = value {
            if v.nanosecond() > 0 {
                dst.put_slice(format!("'{}'", v.format("%H:%M:%S%.6f")).as_bytes());
            } else {
                dst.put_slice(format!("'{}'", v.format("%H:%M:%S")).as_bytes());
            }
        }
        Ok(())
    }

    fn encode_binary(&self, dst: &mut BytesMut, value: &Value) -> Result<(), TypeError> {
        if let Value::Time(v) = value {
            let micros = v.nanosecond() / 1000;
            dst.put_u8(if micros > 0 { 12 } else { 8 });
            dst.put_u8(0); // positive
            dst.put_u32_le(0); // days
            dst.put_u8(v.hour() as u8);
            dst.put_u8(v.minute() as u8);
            dst.put_u8(v.second() as u8);
            if micros > 0 {
                dst.put_u32_le(micros);
            }
        }
        Ok(())
    }

    fn binary_type(&self) -> DataType {
        DataType::Time
    }
}

/// Codec for `chrono::Duration` values (full-range TIME).
#[derive(Debug)]
pub struct DurationCodec;

impl Codec for DurationCodec {
    fn can_decode(&self, column: &ColumnDefinition, target: TargetKind) -> bool {
        target == TargetKind::Duration
            && matches!(
                column.data_type,
                DataType::Time | DataType::DateTime | DataType::Timestamp
            )
    }

    fn can_encode(&self, value: &Value) -> bool {
        matches!(value, Value::Duration(_))
    }

    fn decode_text(
        &self,
        buf: Bytes,
        column: &ColumnDefinition,
        _context: &ConnectionContext,
    ) -> Result<Value, TypeError> {
        let s = String::from_utf8_lossy(&buf).into_owned();
        match column.data_type {
            DataType::DateTime | DataType::Timestamp => {
                match parse_timestamp(&s, column.data_type)? {
                    None => Ok(Value::Null),
                    Some(parts) => Ok(Value::Duration(
                        chrono::Duration::hours(parts[3])
                            + chrono::Duration::minutes(parts[4])
                            + chrono::Duration::seconds(parts[5])
                            + chrono::Duration::nanoseconds(parts[6]),
                    )),
                }
            }
            _ => {
                let parts = parse_time(&s, column.data_type)?;
                let magnitude = chrono::Duration::hours(parts.hours)
                    + chrono::Duration::minutes(parts.minutes)
                    + chrono::Duration::seconds(parts.seconds)
                    + chrono::Duration::nanoseconds(parts.nanos);
                Ok(Value::Duration(if parts.negative {
                    -magnitude
                } else {
                    magnitude
                }))
            }
        }
    }

    fn decode_binary(
        &self,
        mut buf: Bytes,
        column: &ColumnDefinition,
        context: &ConnectionContext,
    ) -> Result<Value, TypeError> {
        match column.data_type {
            DataType::Time => {
                let time = BinaryTime::read(&mut buf, column.data_type)?;
                let magnitude = chrono::Duration::hours(time.total_hours())
                    + chrono::Duration::minutes(i64::from(time.minutes))
                    + chrono::Duration::seconds(i64::from(time.seconds))
                    + chrono::Duration::microseconds(i64::from(time.micros));
                Ok(Value::Duration(if time.negative {
                    -magnitude
                } else {
                    magnitude
                }))
            }
            _ => self.decode_text(buf, column, context),
        }
    }

    fn encode_text(
        &self,
        dst: &mut BytesMut,
        value: &Value,
        _context: &ConnectionContext,
    ) -> Result<(), TypeError> {
        if let Value::Duration(v) = value {
            let total = v.num_microseconds().unwrap_or(0);
            let (sign, total) = if total < 0 { ("-", -total) } else { ("", total) };
            let micros = total % 1_000_000;
            let seconds = total / 1_000_000;
            let rendered = if micros > 0 {
                format!(
                    "'{sign}{:02}:{:02}:{:02}.{micros:06}'",
                    seconds / 3600,
                    (seconds / 60) % 60,
                    seconds % 60
                )
            } else {
                format!(
                    "'{sign}{:02}:{:02}:{:02}'",
                    seconds / 3600,
                    (seconds / 60) % 60,
                    seconds % 60
                )
            };
            dst.put_slice(rendered.as_bytes());
        }
        Ok(())
    }

    fn encode_binary(&self, dst: &mut BytesMut, value: &Value) -> Result<(), TypeError> {
        if let Value::Duration(v) = value {
            let total = v.num_microseconds().unwrap_or(0);
            let (negative, total) = if total < 0 { (1u8, -total) } else { (0u8, total) };
            let micros = (total % 1_000_000) as u32;
            let seconds = total / 1_000_000;
            let hours = seconds / 3600;
            dst.put_u8(if micros > 0 { 12 } else { 8 });
            dst.put_u8(negative);
            dst.put_u32_le((hours / 24) as u32);
            dst.put_u8((hours % 24) as u8);
            dst.put_u8(((seconds / 60) % 60) as u8);
            dst.put_u8((seconds % 60) as u8);
            if micros > 0 {
                dst.put_u32_le(micros);
            }
        }
        Ok(())
    }

    fn binary_type(&self) -> DataType {
        DataType::Time
    }
}

/// Codec for `chrono::NaiveDateTime` values.
#[derive(Debug)]
pub struct DateTimeCodec;

impl Codec for DateTimeCodec {
    fn can_decode(&self, column: &ColumnDefinition, target: TargetKind) -> bool {
        target == TargetKind::DateTime
            && matches!(
                column.data_type,
                DataType::DateTime
                    | DataType::Timestamp
                    | DataType::Date
                    | DataType::Time
                    | DataType::Text
                    | DataType::VarString
                    | DataType::String
            )
    }

    fn can_encode(&self, value: &Value) -> bool {
        matches!(value, Value::DateTime(_))
    }

    fn decode_text(
        &self,
        buf: Bytes,
        column: &ColumnDefinition,
        _context: &ConnectionContext,
    ) -> Result<Value, TypeError> {
        let s = String::from_utf8_lossy(&buf).into_owned();
        match column.data_type {
            DataType::Date => match parse_date(&s, column.data_type)? {
                None => Ok(Value::Null),
                Some([y, m, d]) => Ok(Value::DateTime(
                    make_date(y, m, d)?.and_hms_opt(0, 0, 0).ok_or(
                        TypeError::InvalidTemporal {
                            field: "time",
                            value: 0,
                        },
                    )?,
                )),
            },
            DataType::Time => {
                // Days are discarded; the time folds into the epoch day.
                let parts = parse_time(&s, column.data_type)?;
                let time = make_time(parts.hours % 24, parts.minutes, parts.seconds, parts.nanos)?;
                Ok(Value::DateTime(epoch_date().and_time(time)))
            }
            _ => match parse_timestamp(&s, column.data_type)? {
                None => Ok(Value::Null),
                Some(parts) => {
                    let date = make_date(parts[0], parts[1], parts[2])?;
                    let time = make_time(parts[3], parts[4], parts[5], parts[6])?;
                    Ok(Value::DateTime(date.and_time(time)))
                }
            },
        }
    }

    fn decode_binary(
        &self,
        mut buf: Bytes,
        column: &ColumnDefinition,
        context: &ConnectionContext,
    ) -> Result<Value, TypeError> {
        match column.data_type {
            DataType::Time => {
                if buf.is_empty() {
                    return Ok(Value::DateTime(epoch_date().and_hms_opt(0, 0, 0).ok_or(
                        TypeError::InvalidTemporal {
                            field: "time",
                            value: 0,
                        },
                    )?));
                }
                let time = BinaryTime::read(&mut buf, column.data_type)?;
                let naive = make_time(
                    i64::from(time.hours),
                    i64::from(time.minutes),
                    i64::from(time.seconds),
                    i64::from(time.micros) * 1000,
                )?;
                Ok(Value::DateTime(epoch_date().and_time(naive)))
            }
            DataType::Date | DataType::DateTime | DataType::Timestamp => {
                match BinaryDateTime::read(&mut buf, column.data_type)? {
                    None => Ok(Value::Null),
                    Some(d)
                        if d.year == 0
                            && d.month == 0
                            && d.day == 0
                            && d.hour == 0
                            && d.minute == 0
                            && d.second == 0 =>
                    {
                        Ok(Value::Null)
                    }
                    Some(d) => {
                        let date =
                            make_date(i64::from(d.year), i64::from(d.month), i64::from(d.day))?;
                        let time = make_time(
                            i64::from(d.hour),
                            i64::from(d.minute),
                            i64::from(d.second),
                            i64::from(d.micros) * 1000,
                        )?;
                        Ok(Value::DateTime(date.and_time(time)))
                    }
                }
            }
            _ => self.decode_text(buf, column, context),
        }
    }

    fn encode_text(
        &self,
        dst: &mut BytesMut,
        value: &Value,
        _context: &ConnectionContext,
    ) -> Result<(), TypeError> {
        if let Value::DateTime(v) = value {
            if v.nanosecond() > 0 {
                dst.put_slice(format!("'{}'", v.format("%Y-%m-%d %H:%M:%S%.6f")).as_bytes());
            } else {
                dst.put_slice(format!("'{}'", v.format("%Y-%m-%d %H:%M:%S")).as_bytes());
            }
        }
        Ok(())
    }

    fn encode_binary(&self, dst: &mut BytesMut, value: &Value) -> Result<(), TypeError> {
        if let Value::DateTime(v) = value {
            let micros = v.nanosecond() / 1000;
            dst.put_u8(if micros > 0 { 11 } else { 7 });
            dst.put_u16_le(v.year() as u16);
            dst.put_u8(v.month() as u8);
            dst.put_u8(v.day() as u8);
            dst.put_u8(v.hour() as u8);
            dst.put_u8(v.minute() as u8);
            dst.put_u8(v.second() as u8);
            if micros > 0 {
                dst.put_u32_le(micros);
            }
        }
        Ok(())
    }

    fn binary_type(&self) -> DataType {
        DataType::DateTime
    }
}

fn epoch_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default()
}
