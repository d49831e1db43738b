//! BLOB codec.

use bytes::{BufMut, Bytes, BytesMut};
use maria_protocol::buffer::write_length_encoded_bytes;
use maria_protocol::{ColumnDefinition, ConnectionContext, DataType};

use crate::codec::{Codec, TargetKind};
use crate::error::TypeError;
use crate::value::Value;

fn is_compatible(data_type: DataType) -> bool {
    matches!(
        data_type,
        DataType::Bit
            | DataType::Blob
            | DataType::Text
            | DataType::VarString
            | DataType::String
            | DataType::Geometry
    )
}

/// Codec for raw byte values.
#[derive(Debug)]
pub struct BlobCodec;

impl Codec for BlobCodec {
    fn can_decode(&self, column: &ColumnDefinition, target: TargetKind) -> bool {
        target == TargetKind::Blob && is_compatible(column.data_type)
    }

    fn can_encode(&self, value: &Value) -> bool {
        matches!(value, Value::Blob(_))
    }

    fn decode_text(
        &self,
        buf: Bytes,
        _column: &ColumnDefinition,
        _context: &ConnectionContext,
    ) -> Result<Value, TypeError> {
        Ok(Value::Blob(buf))
    }

    fn decode_binary(
        &self,
        buf: Bytes,
        _column: &ColumnDefinition,
        _context: &ConnectionContext,
    ) -> Result<Value, TypeError> {
        Ok(Value::Blob(buf))
    }

    fn encode_text(
        &self,
        dst: &mut BytesMut,
        value: &Value,
        context: &ConnectionContext,
    ) -> Result<(), TypeError> {
        if let Value::Blob(v) = value {
            dst.put_slice(b"_binary ");
            maria_protocol::buffer::write_escaped_literal(dst, v, context);
        }
        Ok(())
    }

    fn encode_binary(&self, dst: &mut BytesMut, value: &Value) -> Result<(), TypeError> {
        if let Value::Blob(v) = value {
            write_length_encoded_bytes(dst, v);
        }
        Ok(())
    }

    fn binary_type(&self) -> DataType {
        DataType::Blob
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use maria_protocol::{ColumnFlags, ServerStatus};

    #[test]
    fn test_blob_passthrough() {
        let column = ColumnDefinition::synthetic("c", DataType::Blob, ColumnFlags::BINARY);
        let context = ConnectionContext::for_tests(ServerStatus::AUTOCOMMIT);
        let raw = Bytes::from_static(&[0xde, 0xad, 0xbe, 0xef]);
        let value = BlobCodec
            .decode_binary(raw.clone(), &column, &context)
            .unwrap();
        assert_eq!(value, Value::Blob(raw));
    }

    #[test]
    fn test_text_encoding_uses_binary_prefix() {
        let context = ConnectionContext::for_tests(ServerStatus::AUTOCOMMIT);
        let mut dst = BytesMut::new();
        BlobCodec
            .encode_text(&mut dst, &Value::Blob(Bytes::from_static(b"ab")), &context)
            .unwrap();
        assert_eq!(&dst[..], b"_binary 'ab'");
    }
}
