//! Packet header and sequencing primitives.

use bytes::{Buf, BufMut};

use crate::error::ProtocolError;

/// Packet header size in bytes.
pub const PACKET_HEADER_SIZE: usize = 4;

/// Maximum payload carried by a single packet (16 MiB − 1).
///
/// A payload of exactly this size marks a continuation: the logical message
/// extends into the next packet.
pub const MAX_PAYLOAD_SIZE: usize = 0x00FF_FFFF;

/// A MariaDB packet header.
///
/// Every packet begins with a 3-byte little-endian payload length followed
/// by a 1-byte sequence id that wraps at 255.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketHeader {
    /// Payload length (24-bit).
    pub length: u32,
    /// Packet sequence id.
    pub sequence: u8,
}

impl PacketHeader {
    /// Create a new packet header.
    #[must_use]
    pub const fn new(length: u32, sequence: u8) -> Self {
        Self { length, sequence }
    }

    /// Parse a packet header from bytes.
    pub fn decode(src: &mut impl Buf) -> Result<Self, ProtocolError> {
        if src.remaining() < PACKET_HEADER_SIZE {
            return Err(ProtocolError::IncompletePacket {
                expected: PACKET_HEADER_SIZE,
                actual: src.remaining(),
            });
        }
        let b0 = u32::from(src.get_u8());
        let b1 = u32::from(src.get_u8());
        let b2 = u32::from(src.get_u8());
        let sequence = src.get_u8();
        Ok(Self {
            length: b0 | (b1 << 8) | (b2 << 16),
            sequence,
        })
    }

    /// Encode the packet header to bytes.
    pub fn encode(&self, dst: &mut impl BufMut) {
        dst.put_u8((self.length & 0xff) as u8);
        dst.put_u8(((self.length >> 8) & 0xff) as u8);
        dst.put_u8(((self.length >> 16) & 0xff) as u8);
        dst.put_u8(self.sequence);
    }

    /// Check whether this packet continues into the next one.
    #[must_use]
    pub const fn is_continuation(&self) -> bool {
        self.length as usize == MAX_PAYLOAD_SIZE
    }
}

/// Per-connection packet sequencer.
///
/// The sequence id is a monotonic counter mod 256, shared by both
/// directions of a logical exchange. It resets to 0 at every command
/// boundary: a new `COM_*` request, or the start of a server-initiated
/// phase such as authentication.
#[derive(Debug, Default)]
pub struct Sequencer {
    value: u8,
}

impl Sequencer {
    /// Create a sequencer starting at 0.
    #[must_use]
    pub const fn new() -> Self {
        Self { value: 0 }
    }

    /// Return the current sequence id and advance the counter.
    pub fn next(&mut self) -> u8 {
        let v = self.value;
        self.value = self.value.wrapping_add(1);
        v
    }

    /// Peek at the sequence id the next packet must carry.
    #[must_use]
    pub const fn peek(&self) -> u8 {
        self.value
    }

    /// Reset the counter for a new command boundary.
    pub fn reset(&mut self) {
        self.value = 0;
    }

    /// Validate an incoming sequence id and advance past it.
    pub fn check(&mut self, sequence: u8) -> Result<(), ProtocolError> {
        if sequence != self.value {
            return Err(ProtocolError::SequenceMismatch {
                expected: self.value,
                actual: sequence,
            });
        }
        self.value = self.value.wrapping_add(1);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use bytes::BytesMut;

    #[test]
    fn test_header_roundtrip() {
        let header = PacketHeader::new(0x0102_03, 5);
        let mut buf = BytesMut::new();
        header.encode(&mut buf);
        assert_eq!(buf.len(), PACKET_HEADER_SIZE);
        assert_eq!(&buf[..], &[0x03, 0x02, 0x01, 0x05]);

        let mut cursor = buf.freeze();
        let decoded = PacketHeader::decode(&mut cursor).unwrap();
        assert_eq!(decoded, header);
    }

    #[test]
    fn test_header_incomplete() {
        let mut cursor = &[0x01u8, 0x00][..];
        assert!(matches!(
            PacketHeader::decode(&mut cursor),
            Err(ProtocolError::IncompletePacket { .. })
        ));
    }

    #[test]
    fn test_continuation_detection() {
        assert!(PacketHeader::new(MAX_PAYLOAD_SIZE as u32, 0).is_continuation());
        assert!(!PacketHeader::new(MAX_PAYLOAD_SIZE as u32 - 1, 0).is_continuation());
    }

    #[test]
    fn test_sequencer_wraps() {
        let mut seq = Sequencer::new();
        for expected in 0..=255u8 {
            assert_eq!(seq.next(), expected);
        }
        assert_eq!(seq.next(), 0);
    }

    #[test]
    fn test_sequencer_check() {
        let mut seq = Sequencer::new();
        seq.check(0).unwrap();
        seq.check(1).unwrap();
        assert!(matches!(
            seq.check(5),
            Err(ProtocolError::SequenceMismatch {
                expected: 2,
                actual: 5
            })
        ));
    }

    #[test]
    fn test_sequencer_reset() {
        let mut seq = Sequencer::new();
        seq.next();
        seq.next();
        seq.reset();
        assert_eq!(seq.peek(), 0);
    }
}
