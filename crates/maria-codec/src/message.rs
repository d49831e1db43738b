//! Compound message assembly.

use bytes::{Bytes, BytesMut};

use crate::packet_codec::Packet;

/// Joins continuation frames into one logical payload.
///
/// A frame of exactly 16 MiB − 1 bytes continues into the next; the
/// message ends at the first shorter frame (possibly zero-length).
#[derive(Debug, Default)]
pub struct MessageAssembler {
    partial: Option<BytesMut>,
}

impl MessageAssembler {
    /// Create an empty assembler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one frame; returns the complete payload at a message boundary.
    pub fn push(&mut self, packet: Packet) -> Option<Bytes> {
        let continuation = packet.is_continuation();
        match (&mut self.partial, continuation) {
            (None, false) => Some(packet.payload.freeze()),
            (None, true) => {
                self.partial = Some(packet.payload);
                None
            }
            (Some(partial), _) => {
                partial.extend_from_slice(&packet.payload);
                if continuation {
                    None
                } else {
                    self.partial.take().map(BytesMut::freeze)
                }
            }
        }
    }

    /// Whether a partially assembled message is pending.
    #[must_use]
    pub fn has_partial(&self) -> bool {
        self.partial.is_some()
    }

    /// Drop any partially assembled message.
    pub fn clear(&mut self) {
        self.partial = None;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use maria_protocol::packet::MAX_PAYLOAD_SIZE;

    fn packet(sequence: u8, payload: Vec<u8>) -> Packet {
        Packet {
            sequence,
            payload: BytesMut::from(&payload[..]),
        }
    }

    #[test]
    fn test_single_frame_message() {
        let mut assembler = MessageAssembler::new();
        let out = assembler.push(packet(0, b"abc".to_vec())).unwrap();
        assert_eq!(&out[..], b"abc");
        assert!(!assembler.has_partial());
    }

    #[test]
    fn test_two_frame_message() {
        let mut assembler = MessageAssembler::new();
        assert!(assembler.push(packet(0, vec![1u8; MAX_PAYLOAD_SIZE])).is_none());
        assert!(assembler.has_partial());
        let out = assembler.push(packet(1, vec![2u8; 3])).unwrap();
        assert_eq!(out.len(), MAX_PAYLOAD_SIZE + 3);
        assert_eq!(out[MAX_PAYLOAD_SIZE], 2);
    }

    #[test]
    fn test_exact_multiple_with_empty_terminator() {
        let mut assembler = MessageAssembler::new();
        assert!(assembler.push(packet(0, vec![1u8; MAX_PAYLOAD_SIZE])).is_none());
        let out = assembler.push(packet(1, Vec::new())).unwrap();
        assert_eq!(out.len(), MAX_PAYLOAD_SIZE);
    }

    #[test]
    fn test_clear_drops_partial() {
        let mut assembler = MessageAssembler::new();
        assembler.push(packet(0, vec![1u8; MAX_PAYLOAD_SIZE]));
        assembler.clear();
        assert!(!assembler.has_partial());
    }
}
