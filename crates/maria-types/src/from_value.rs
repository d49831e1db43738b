//! Conversions from decoded [`Value`]s to Rust types.

use bytes::Bytes;
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;

use crate::codec::TargetKind;
use crate::error::TypeError;
use crate::value::Value;

/// A Rust type extractable from a decoded column value.
///
/// `TARGET` names the value kind the codec registry must produce; the
/// conversion itself is then a straight variant match.
pub trait FromValue: Sized {
    /// Value kind requested from the registry.
    const TARGET: TargetKind;

    /// Convert a decoded value. NULL fails unless `Self` is an `Option`.
    fn from_value(value: Value) -> Result<Self, TypeError>;
}

macro_rules! from_value {
    ($rust:ty, $target:ident, $variant:ident) => {
        impl FromValue for $rust {
            const TARGET: TargetKind = TargetKind::$target;

            fn from_value(value: Value) -> Result<Self, TypeError> {
                match value {
                    Value::$variant(v) => Ok(v),
                    Value::Null => Err(TypeError::UnexpectedNull),
                    other => Err(TypeError::Parsing {
                        value: format!("{other:?}"),
                        data_type: maria_protocol::DataType::Null,
                        target: TargetKind::$target.name(),
                    }),
                }
            }
        }
    };
}

from_value!(bool, Bool, Bool);
from_value!(i8, Int8, Int8);
from_value!(i16, Int16, Int16);
from_value!(i32, Int32, Int32);
from_value!(i64, Int64, Int64);
from_value!(u64, UInt64, UInt64);
from_value!(f32, Float, Float);
from_value!(f64, Double, Double);
from_value!(Decimal, Decimal, Decimal);
from_value!(String, Text, Text);
from_value!(Bytes, Blob, Blob);
from_value!(NaiveDate, Date, Date);
from_value!(NaiveTime, Time, Time);
from_value!(Duration, Duration, Duration);
from_value!(NaiveDateTime, DateTime, DateTime);

impl<T: FromValue> FromValue for Option<T> {
    const TARGET: TargetKind = T::TARGET;

    fn from_value(value: Value) -> Result<Self, TypeError> {
        if value.is_null() {
            return Ok(None);
        }
        T::from_value(value).map(Some)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_conversion() {
        assert_eq!(i32::from_value(Value::Int32(5)).unwrap(), 5);
        assert_eq!(
            String::from_value(Value::Text("x".into())).unwrap(),
            "x".to_string()
        );
    }

    #[test]
    fn test_null_handling() {
        assert_eq!(
            i32::from_value(Value::Null).unwrap_err(),
            TypeError::UnexpectedNull
        );
        assert_eq!(Option::<i32>::from_value(Value::Null).unwrap(), None);
        assert_eq!(Option::<i32>::from_value(Value::Int32(3)).unwrap(), Some(3));
    }
}
