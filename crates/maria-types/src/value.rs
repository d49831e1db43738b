//! Native value representation.

use bytes::Bytes;
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;

/// A decoded column value or a parameter to bind.
///
/// The variant set mirrors the codec registry: every variant has exactly
/// one codec responsible for its text and binary representations.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// SQL NULL.
    Null,
    /// Boolean (TINYINT(1) by convention).
    Bool(bool),
    /// 1-byte integer.
    Int8(i8),
    /// 2-byte integer.
    Int16(i16),
    /// 4-byte integer.
    Int32(i32),
    /// 8-byte integer.
    Int64(i64),
    /// Unsigned 8-byte integer.
    UInt64(u64),
    /// 4-byte IEEE-754 float.
    Float(f32),
    /// 8-byte IEEE-754 double.
    Double(f64),
    /// Fixed-point decimal.
    Decimal(Decimal),
    /// Character data.
    Text(String),
    /// Binary data.
    Blob(Bytes),
    /// Calendar date.
    Date(NaiveDate),
    /// Time of day.
    Time(NaiveTime),
    /// Signed duration (TIME columns exceeding one day).
    Duration(Duration),
    /// Date and time.
    DateTime(NaiveDateTime),
}

impl Value {
    /// Whether this value is SQL NULL.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Human-readable name of the value kind.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "NULL",
            Self::Bool(_) => "bool",
            Self::Int8(_) => "i8",
            Self::Int16(_) => "i16",
            Self::Int32(_) => "i32",
            Self::Int64(_) => "i64",
            Self::UInt64(_) => "u64",
            Self::Float(_) => "f32",
            Self::Double(_) => "f64",
            Self::Decimal(_) => "Decimal",
            Self::Text(_) => "String",
            Self::Blob(_) => "Bytes",
            Self::Date(_) => "NaiveDate",
            Self::Time(_) => "NaiveTime",
            Self::Duration(_) => "Duration",
            Self::DateTime(_) => "NaiveDateTime",
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i8> for Value {
    fn from(v: i8) -> Self {
        Self::Int8(v)
    }
}

impl From<i16> for Value {
    fn from(v: i16) -> Self {
        Self::Int16(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int64(v)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Self::UInt64(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Self::Float(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Double(v)
    }
}

impl From<Decimal> for Value {
    fn from(v: Decimal) -> Self {
        Self::Decimal(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<Bytes> for Value {
    fn from(v: Bytes) -> Self {
        Self::Blob(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Self::Blob(Bytes::from(v))
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Self::Date(v)
    }
}

impl From<NaiveTime> for Value {
    fn from(v: NaiveTime) -> Self {
        Self::Time(v)
    }
}

impl From<Duration> for Value {
    fn from(v: Duration) -> Self {
        Self::Duration(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Self::DateTime(v)
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}
