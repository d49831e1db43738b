//! Type conversion error types.

use maria_protocol::DataType;
use thiserror::Error;

/// Errors produced while converting between wire values and Rust values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypeError {
    /// A wire value could not be parsed as the requested type.
    #[error("value '{value}' ({data_type:?}) cannot be decoded as {target}")]
    Parsing {
        /// Offending value, rendered as text.
        value: String,
        /// Server column type.
        data_type: DataType,
        /// Requested Rust type.
        target: &'static str,
    },

    /// A decoded value does not fit the requested type's range or sign.
    #[error("{target} overflow")]
    Overflow {
        /// Requested Rust type.
        target: &'static str,
    },

    /// The wire value ended before the expected number of bytes.
    #[error("truncated {data_type:?} value")]
    Truncated {
        /// Server column type.
        data_type: DataType,
    },

    /// No registered codec decodes this column as the requested type.
    #[error("no codec decodes {data_type:?} as {target}")]
    NoDecoder {
        /// Server column type.
        data_type: DataType,
        /// Requested Rust type.
        target: &'static str,
    },

    /// No registered codec encodes this value.
    #[error("no codec encodes {type_name}")]
    NoEncoder {
        /// Name of the unencodable value kind.
        type_name: &'static str,
    },

    /// The column value was NULL but a non-optional type was requested.
    #[error("column value is NULL")]
    UnexpectedNull,

    /// A temporal value has fields outside their valid range.
    #[error("invalid {field} value {value}")]
    InvalidTemporal {
        /// Field name (year, month, ...).
        field: &'static str,
        /// Offending value.
        value: i64,
    },
}
