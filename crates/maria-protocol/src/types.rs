//! Server column data types.

use crate::constants::collations;
use crate::error::ProtocolError;

/// Server-side column data type.
///
/// The wire carries a single type byte; blob and string codes are further
/// split by collation, since the server reports TEXT columns with a blob
/// type byte and a non-binary collation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    /// Pre-5.0 DECIMAL (wire code 0).
    OldDecimal,
    /// 1-byte integer.
    TinyInt,
    /// 2-byte integer.
    SmallInt,
    /// 4-byte integer.
    Integer,
    /// 4-byte IEEE-754 float.
    Float,
    /// 8-byte IEEE-754 double.
    Double,
    /// NULL-typed column.
    Null,
    /// Timestamp.
    Timestamp,
    /// 8-byte integer.
    BigInt,
    /// 3-byte integer (wire-encoded on 4 bytes in the binary protocol).
    MediumInt,
    /// Date.
    Date,
    /// Time (signed duration).
    Time,
    /// Date and time.
    DateTime,
    /// Year.
    Year,
    /// Internal new date.
    NewDate,
    /// Bit field.
    Bit,
    /// JSON document.
    Json,
    /// DECIMAL/NUMERIC.
    Decimal,
    /// ENUM.
    Enum,
    /// SET.
    Set,
    /// Character data (TEXT, VARCHAR sent with a blob code and text collation).
    Text,
    /// Binary data.
    Blob,
    /// VARCHAR/VARBINARY.
    VarString,
    /// CHAR/BINARY.
    String,
    /// Geometry data.
    Geometry,
}

impl DataType {
    /// Map a wire type byte and collation id to a data type.
    ///
    /// Blob-coded columns (0xf9–0xfc) are TEXT unless the collation is
    /// `binary` (63).
    pub fn from_server(value: u8, collation: u8) -> Result<Self, ProtocolError> {
        let data_type = match value {
            0 => Self::OldDecimal,
            1 => Self::TinyInt,
            2 => Self::SmallInt,
            3 => Self::Integer,
            4 => Self::Float,
            5 => Self::Double,
            6 => Self::Null,
            7 => Self::Timestamp,
            8 => Self::BigInt,
            9 => Self::MediumInt,
            10 => Self::Date,
            11 => Self::Time,
            12 => Self::DateTime,
            13 => Self::Year,
            14 => Self::NewDate,
            15 => Self::VarString,
            16 => Self::Bit,
            245 => Self::Json,
            246 => Self::Decimal,
            247 => Self::Enum,
            248 => Self::Set,
            249..=252 => {
                if collation == collations::BINARY {
                    Self::Blob
                } else {
                    Self::Text
                }
            }
            253 => Self::VarString,
            254 => Self::String,
            255 => Self::Geometry,
            other => return Err(ProtocolError::UnknownColumnType(other)),
        };
        Ok(data_type)
    }

    /// Wire type byte used when binding a parameter of this type.
    #[must_use]
    pub fn binary_type_byte(self) -> u8 {
        match self {
            Self::OldDecimal => 0,
            Self::TinyInt => 1,
            Self::SmallInt => 2,
            Self::Integer => 3,
            Self::Float => 4,
            Self::Double => 5,
            Self::Null => 6,
            Self::Timestamp => 7,
            Self::BigInt => 8,
            Self::MediumInt => 9,
            Self::Date => 10,
            Self::Time => 11,
            Self::DateTime => 12,
            Self::Year => 13,
            Self::NewDate => 14,
            Self::Bit => 16,
            Self::Json => 245,
            Self::Decimal => 246,
            Self::Enum => 247,
            Self::Set => 248,
            Self::Text | Self::Blob => 252,
            Self::VarString => 253,
            Self::String => 254,
            Self::Geometry => 255,
        }
    }

    /// Check whether this type carries numeric data.
    #[must_use]
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            Self::TinyInt
                | Self::SmallInt
                | Self::MediumInt
                | Self::Integer
                | Self::BigInt
                | Self::Float
                | Self::Double
                | Self::Decimal
                | Self::OldDecimal
                | Self::Year
                | Self::Bit
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_from_server_basic() {
        assert_eq!(DataType::from_server(1, 224).unwrap(), DataType::TinyInt);
        assert_eq!(DataType::from_server(16, 63).unwrap(), DataType::Bit);
        assert_eq!(DataType::from_server(246, 224).unwrap(), DataType::Decimal);
    }

    #[test]
    fn test_blob_split_by_collation() {
        assert_eq!(DataType::from_server(252, 63).unwrap(), DataType::Blob);
        assert_eq!(DataType::from_server(252, 224).unwrap(), DataType::Text);
        assert_eq!(DataType::from_server(249, 33).unwrap(), DataType::Text);
    }

    #[test]
    fn test_unknown_type() {
        assert!(DataType::from_server(200, 224).is_err());
    }

    #[test]
    fn test_binary_type_byte_roundtrip() {
        for ty in [DataType::TinyInt, DataType::BigInt, DataType::DateTime, DataType::VarString] {
            let byte = ty.binary_type_byte();
            assert_eq!(DataType::from_server(byte, 224).unwrap(), ty);
        }
    }
}
