//! Shared temporal parsing routines.
//!
//! Text-protocol temporal values share one tokenizer: separators `-`,
//! space, `:` and `.` split the string into year, month, day, hour,
//! minute, second and a fractional bucket. A zero date with a non-zero
//! time component decodes as the epoch date with that time; an all-zero
//! value decodes as NULL.

use bytes::{Buf, Bytes};
use maria_protocol::DataType;

use crate::error::TypeError;

/// Tokenized timestamp: year, month, day, hour, minute, second, nanos.
pub type TimestampParts = [i64; 7];

/// Tokenize a `yyyy-MM-dd[ HH:mm:ss[.ffffff]]` string.
///
/// Returns `None` for all-zero values. A zero date with a non-zero time
/// yields month and day 1 (epoch with time).
pub fn parse_timestamp(raw: &str, data_type: DataType) -> Result<Option<TimestampParts>, TypeError> {
    let mut parts: TimestampParts = [0; 7];
    let mut part = 0usize;
    let mut frac_len: i32 = -1;
    for c in raw.chars() {
        match c {
            '-' | ' ' | ':' => part += 1,
            '.' => {
                part += 1;
                frac_len = 0;
            }
            _ => {
                let digit = c.to_digit(10).ok_or_else(|| TypeError::Parsing {
                    value: raw.to_string(),
                    data_type,
                    target: "timestamp",
                })?;
                if part >= parts.len() {
                    return Err(TypeError::Parsing {
                        value: raw.to_string(),
                        data_type,
                        target: "timestamp",
                    });
                }
                if frac_len >= 0 {
                    frac_len += 1;
                }
                parts[part] = parts[part] * 10 + i64::from(digit);
            }
        }
    }
    if parts[0] == 0 && parts[1] == 0 && parts[2] == 0 {
        if parts[3] == 0 && parts[4] == 0 && parts[5] == 0 && parts[6] == 0 {
            return Ok(None);
        }
        parts[1] = 1;
        parts[2] = 1;
    }
    // Right-pad the fraction to microseconds, then scale to nanos.
    if frac_len >= 0 {
        for _ in 0..(6 - frac_len).max(0) {
            parts[6] *= 10;
        }
        parts[6] *= 1000;
    }
    Ok(Some(parts))
}

/// Parse a `yyyy-MM-dd` date. Returns `None` for the zero date.
pub fn parse_date(raw: &str, data_type: DataType) -> Result<Option<[i64; 3]>, TypeError> {
    let mut parts = [0i64; 3];
    let mut part = 0usize;
    for c in raw.chars() {
        if c == '-' {
            part += 1;
            continue;
        }
        let digit = c.to_digit(10).ok_or_else(|| TypeError::Parsing {
            value: raw.to_string(),
            data_type,
            target: "date",
        })?;
        if part >= 3 {
            return Err(TypeError::Parsing {
                value: raw.to_string(),
                data_type,
                target: "date",
            });
        }
        parts[part] = parts[part] * 10 + i64::from(digit);
    }
    if parts == [0, 0, 0] {
        return Ok(None);
    }
    Ok(Some(parts))
}

/// Parsed `[-]HH:MM:SS[.ffffff]` time value.
///
/// Hours are not bounded to a day: TIME columns range over ±838 hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeParts {
    /// Sign flag.
    pub negative: bool,
    /// Total hours.
    pub hours: i64,
    /// Minutes.
    pub minutes: i64,
    /// Seconds.
    pub seconds: i64,
    /// Nanoseconds.
    pub nanos: i64,
}

/// Parse a text-protocol TIME value.
pub fn parse_time(raw: &str, data_type: DataType) -> Result<TimeParts, TypeError> {
    let err = || TypeError::Parsing {
        value: raw.to_string(),
        data_type,
        target: "time",
    };
    let (negative, rest) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw),
    };
    let (clock, frac) = match rest.split_once('.') {
        Some((clock, frac)) => (clock, Some(frac)),
        None => (rest, None),
    };
    let mut fields = clock.split(':');
    let hours: i64 = fields.next().ok_or_else(err)?.parse().map_err(|_| err())?;
    let minutes: i64 = fields.next().ok_or_else(err)?.parse().map_err(|_| err())?;
    let seconds: i64 = fields.next().unwrap_or("0").parse().map_err(|_| err())?;
    if fields.next().is_some() {
        return Err(err());
    }
    let mut nanos: i64 = 0;
    if let Some(frac) = frac {
        let mut digits = 0;
        for c in frac.chars() {
            nanos = nanos * 10 + i64::from(c.to_digit(10).ok_or_else(err)?);
            digits += 1;
        }
        for _ in digits..6 {
            nanos *= 10;
        }
        nanos *= 1000;
    }
    Ok(TimeParts {
        negative,
        hours,
        minutes,
        seconds,
        nanos,
    })
}

/// Fields of a binary-protocol DATETIME/TIMESTAMP/DATE value.
///
/// The wire tolerates lengths 0, 4, 7 and 11; absent trailing fields
/// default to zero (month and day to one once any field is present).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BinaryDateTime {
    /// Year.
    pub year: u16,
    /// Month.
    pub month: u8,
    /// Day of month.
    pub day: u8,
    /// Hour.
    pub hour: u8,
    /// Minute.
    pub minute: u8,
    /// Second.
    pub second: u8,
    /// Microseconds.
    pub micros: u32,
}

impl BinaryDateTime {
    /// Read a binary datetime of the given wire length.
    pub fn read(buf: &mut Bytes, data_type: DataType) -> Result<Option<Self>, TypeError> {
        let length = buf.len();
        if length == 0 {
            return Ok(None);
        }
        if length < 4 {
            return Err(TypeError::Truncated { data_type });
        }
        let mut value = Self {
            year: buf.get_u16_le(),
            month: buf.get_u8(),
            day: buf.get_u8(),
            ..Self::default()
        };
        if length > 4 {
            if length < 7 {
                return Err(TypeError::Truncated { data_type });
            }
            value.hour = buf.get_u8();
            value.minute = buf.get_u8();
            value.second = buf.get_u8();
            if length > 7 {
                if length < 11 {
                    return Err(TypeError::Truncated { data_type });
                }
                value.micros = buf.get_u32_le();
            }
        }
        Ok(Some(value))
    }

    /// Whether every field is zero (the zero date).
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.year == 0
            && self.month == 0
            && self.day == 0
            && self.hour == 0
            && self.minute == 0
            && self.second == 0
            && self.micros == 0
    }
}

/// Fields of a binary-protocol TIME value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BinaryTime {
    /// Sign flag.
    pub negative: bool,
    /// Whole days.
    pub days: u32,
    /// Hours within the day.
    pub hours: u8,
    /// Minutes.
    pub minutes: u8,
    /// Seconds.
    pub seconds: u8,
    /// Microseconds.
    pub micros: u32,
}

impl BinaryTime {
    /// Read a binary TIME of the given wire length. Length 0 is 00:00:00.
    pub fn read(buf: &mut Bytes, data_type: DataType) -> Result<Self, TypeError> {
        let length = buf.len();
        if length == 0 {
            return Ok(Self::default());
        }
        if length < 8 {
            return Err(TypeError::Truncated { data_type });
        }
        let mut value = Self {
            negative: buf.get_u8() == 0x01,
            days: buf.get_u32_le(),
            hours: buf.get_u8(),
            minutes: buf.get_u8(),
            seconds: buf.get_u8(),
            micros: 0,
        };
        if length > 8 {
            if length < 12 {
                return Err(TypeError::Truncated { data_type });
            }
            value.micros = buf.get_u32_le();
        }
        Ok(value)
    }

    /// Total hours, days folded in.
    #[must_use]
    pub fn total_hours(&self) -> i64 {
        i64::from(self.days) * 24 + i64::from(self.hours)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use bytes::{BufMut, BytesMut};

    #[test]
    fn test_parse_timestamp_full() {
        let parts = parse_timestamp("2023-07-14 08:09:10.5", DataType::DateTime)
            .unwrap()
            .unwrap();
        assert_eq!(&parts[..6], &[2023, 7, 14, 8, 9, 10]);
        assert_eq!(parts[6], 500_000_000);
    }

    #[test]
    fn test_parse_timestamp_zero_is_null() {
        assert!(parse_timestamp("0000-00-00 00:00:00", DataType::DateTime)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_parse_timestamp_zero_date_with_time() {
        let parts = parse_timestamp("0000-00-00 10:45:00", DataType::DateTime)
            .unwrap()
            .unwrap();
        assert_eq!(&parts[..6], &[0, 1, 1, 10, 45, 0]);
    }

    #[test]
    fn test_parse_date_zero() {
        assert!(parse_date("0000-00-00", DataType::Date).unwrap().is_none());
        assert_eq!(
            parse_date("2021-12-31", DataType::Date).unwrap().unwrap(),
            [2021, 12, 31]
        );
    }

    #[test]
    fn test_parse_time_negative_fraction() {
        let parts = parse_time("-828:05:59.123", DataType::Time).unwrap();
        assert!(parts.negative);
        assert_eq!(parts.hours, 828);
        assert_eq!(parts.minutes, 5);
        assert_eq!(parts.seconds, 59);
        assert_eq!(parts.nanos, 123_000_000);
    }

    #[test]
    fn test_binary_datetime_lengths() {
        let mut buf = BytesMut::new();
        buf.put_u16_le(2023);
        buf.put_u8(7);
        buf.put_u8(14);
        let value = BinaryDateTime::read(&mut buf.freeze(), DataType::DateTime)
            .unwrap()
            .unwrap();
        assert_eq!((value.year, value.month, value.day), (2023, 7, 14));
        assert_eq!(value.hour, 0);

        assert!(BinaryDateTime::read(&mut Bytes::new(), DataType::DateTime)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_binary_time_days_folding() {
        let mut buf = BytesMut::new();
        buf.put_u8(1); // negative
        buf.put_u32_le(2); // days
        buf.put_u8(5);
        buf.put_u8(30);
        buf.put_u8(12);
        let value = BinaryTime::read(&mut buf.freeze(), DataType::Time).unwrap();
        assert!(value.negative);
        assert_eq!(value.total_hours(), 53);
        assert_eq!(value.micros, 0);
    }
}
