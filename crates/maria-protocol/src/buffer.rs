//! Length-encoded buffer utilities.
//!
//! The text protocol and most metadata fields use length-encoded integers
//! and strings: values below 0xfb are encoded inline in one byte, larger
//! values carry a marker byte (0xfc/0xfd/0xfe) followed by a 2/3/8-byte
//! little-endian integer. 0xfb denotes NULL in row data.

use bytes::{Buf, BufMut, Bytes};

use crate::context::ConnectionContext;
use crate::error::ProtocolError;

/// NULL marker in length-encoded row data.
pub const NULL_LENGTH: u8 = 0xfb;

/// Read a length-encoded integer.
///
/// Returns `None` for the NULL marker (0xfb).
pub fn read_length_encoded(src: &mut impl Buf) -> Result<Option<u64>, ProtocolError> {
    if src.remaining() < 1 {
        return Err(ProtocolError::IncompletePacket {
            expected: 1,
            actual: 0,
        });
    }
    let first = src.get_u8();
    let needed = match first {
        NULL_LENGTH => return Ok(None),
        0xfc => 2,
        0xfd => 3,
        0xfe => 8,
        v => return Ok(Some(u64::from(v))),
    };
    if src.remaining() < needed {
        return Err(ProtocolError::IncompletePacket {
            expected: needed,
            actual: src.remaining(),
        });
    }
    let value = match needed {
        2 => u64::from(src.get_u16_le()),
        3 => {
            let lo = u64::from(src.get_u16_le());
            lo | (u64::from(src.get_u8()) << 16)
        }
        _ => src.get_u64_le(),
    };
    Ok(Some(value))
}

/// Read a length-encoded integer, failing on the NULL marker.
pub fn read_length_encoded_required(src: &mut impl Buf) -> Result<u64, ProtocolError> {
    read_length_encoded(src)?.ok_or(ProtocolError::UnexpectedNull)
}

/// Write a length-encoded integer.
pub fn write_length_encoded(dst: &mut impl BufMut, value: u64) {
    match value {
        0..=0xfa => dst.put_u8(value as u8),
        0xfb..=0xffff => {
            dst.put_u8(0xfc);
            dst.put_u16_le(value as u16);
        }
        0x1_0000..=0xff_ffff => {
            dst.put_u8(0xfd);
            dst.put_u16_le((value & 0xffff) as u16);
            dst.put_u8(((value >> 16) & 0xff) as u8);
        }
        _ => {
            dst.put_u8(0xfe);
            dst.put_u64_le(value);
        }
    }
}

/// Read a length-encoded byte string.
///
/// Returns `None` for the NULL marker.
pub fn read_length_encoded_bytes(src: &mut Bytes) -> Result<Option<Bytes>, ProtocolError> {
    let Some(len) = read_length_encoded(src)? else {
        return Ok(None);
    };
    let len = usize::try_from(len).map_err(|_| ProtocolError::InvalidLength(len))?;
    if src.remaining() < len {
        return Err(ProtocolError::IncompletePacket {
            expected: len,
            actual: src.remaining(),
        });
    }
    Ok(Some(src.split_to(len)))
}

/// Read a length-encoded UTF-8 string, failing on NULL.
pub fn read_length_encoded_string(
    src: &mut Bytes,
    field: &'static str,
) -> Result<String, ProtocolError> {
    let bytes = read_length_encoded_bytes(src)?.ok_or(ProtocolError::UnexpectedNull)?;
    String::from_utf8(bytes.to_vec()).map_err(|_| ProtocolError::InvalidUtf8(field))
}

/// Write a length-encoded byte string.
pub fn write_length_encoded_bytes(dst: &mut impl BufMut, value: &[u8]) {
    write_length_encoded(dst, value.len() as u64);
    dst.put_slice(value);
}

/// Read a null-terminated ASCII string.
pub fn read_null_terminated(src: &mut impl Buf, field: &'static str) -> Result<String, ProtocolError> {
    let mut bytes = Vec::new();
    while src.has_remaining() {
        let b = src.get_u8();
        if b == 0 {
            return String::from_utf8(bytes).map_err(|_| ProtocolError::InvalidUtf8(field));
        }
        bytes.push(b);
    }
    Err(ProtocolError::IncompletePacket {
        expected: 1,
        actual: 0,
    })
}

/// Write a null-terminated string.
pub fn write_null_terminated(dst: &mut impl BufMut, value: &str) {
    dst.put_slice(value.as_bytes());
    dst.put_u8(0);
}

/// Write `count` zero bytes.
pub fn write_zero_fill(dst: &mut impl BufMut, count: usize) {
    for _ in 0..count {
        dst.put_u8(0);
    }
}

/// Write a string value as a quoted, escaped SQL literal.
///
/// When the server runs without `NO_BACKSLASH_ESCAPES`, the characters
/// `'`, `"`, `\`, NUL, CR, LF and SUB are backslash-escaped. Otherwise
/// only the quote character is doubled.
pub fn write_escaped_literal(dst: &mut impl BufMut, value: &[u8], context: &ConnectionContext) {
    dst.put_u8(b'\'');
    if context.no_backslash_escapes() {
        for &b in value {
            if b == b'\'' {
                dst.put_u8(b'\'');
            }
            dst.put_u8(b);
        }
    } else {
        for &b in value {
            match b {
                b'\'' | b'"' | b'\\' => {
                    dst.put_u8(b'\\');
                    dst.put_u8(b);
                }
                0 => dst.put_slice(b"\\0"),
                b'\r' => dst.put_slice(b"\\r"),
                b'\n' => dst.put_slice(b"\\n"),
                0x1a => dst.put_slice(b"\\Z"),
                _ => dst.put_u8(b),
            }
        }
    }
    dst.put_u8(b'\'');
}

/// Left-pad a numeric string with zeros up to `display_size`.
#[must_use]
pub fn zero_filling(value: &str, display_size: usize) -> String {
    if value.len() >= display_size {
        return value.to_string();
    }
    let mut out = String::with_capacity(display_size);
    for _ in 0..display_size - value.len() {
        out.push('0');
    }
    out.push_str(value);
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::constants::ServerStatus;
    use bytes::BytesMut;

    fn roundtrip(value: u64) -> u64 {
        let mut buf = BytesMut::new();
        write_length_encoded(&mut buf, value);
        let mut cursor = buf.freeze();
        read_length_encoded(&mut cursor).unwrap().unwrap()
    }

    #[test]
    fn test_length_encoded_thresholds() {
        for value in [0, 1, 0xfa, 0xfb, 0xffff, 0x1_0000, 0xff_ffff, 0x100_0000, u64::MAX] {
            assert_eq!(roundtrip(value), value);
        }
    }

    #[test]
    fn test_length_encoded_widths() {
        let mut buf = BytesMut::new();
        write_length_encoded(&mut buf, 0xfa);
        assert_eq!(buf.len(), 1);
        buf.clear();
        write_length_encoded(&mut buf, 0xfb);
        assert_eq!(buf.len(), 3);
        buf.clear();
        write_length_encoded(&mut buf, 0x1_0000);
        assert_eq!(buf.len(), 4);
        buf.clear();
        write_length_encoded(&mut buf, 0x100_0000);
        assert_eq!(buf.len(), 9);
    }

    #[test]
    fn test_null_marker() {
        let mut cursor = &[NULL_LENGTH][..];
        assert_eq!(read_length_encoded(&mut cursor).unwrap(), None);
    }

    #[test]
    fn test_length_encoded_string_roundtrip() {
        let mut buf = BytesMut::new();
        write_length_encoded_bytes(&mut buf, b"hello");
        let mut cursor = buf.freeze();
        let s = read_length_encoded_string(&mut cursor, "test").unwrap();
        assert_eq!(s, "hello");
    }

    #[test]
    fn test_null_terminated_roundtrip() {
        let mut buf = BytesMut::new();
        write_null_terminated(&mut buf, "mysql_native_password");
        let mut cursor = buf.freeze();
        let s = read_null_terminated(&mut cursor, "plugin").unwrap();
        assert_eq!(s, "mysql_native_password");
    }

    #[test]
    fn test_escaped_literal_backslash_mode() {
        let context = ConnectionContext::for_tests(ServerStatus::AUTOCOMMIT);
        let mut buf = BytesMut::new();
        write_escaped_literal(&mut buf, b"it's a \\ test\n", &context);
        assert_eq!(&buf[..], b"'it\\'s a \\\\ test\\n'");
    }

    #[test]
    fn test_escaped_literal_no_backslash_escapes() {
        let context =
            ConnectionContext::for_tests(ServerStatus::AUTOCOMMIT | ServerStatus::NO_BACKSLASH_ESCAPES);
        let mut buf = BytesMut::new();
        write_escaped_literal(&mut buf, b"it's", &context);
        assert_eq!(&buf[..], b"'it''s'");
    }

    #[test]
    fn test_zero_filling() {
        assert_eq!(zero_filling("42", 5), "00042");
        assert_eq!(zero_filling("123456", 5), "123456");
    }
}
