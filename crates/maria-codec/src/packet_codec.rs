//! Packet codec for tokio-util framing.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use maria_protocol::packet::{PacketHeader, MAX_PAYLOAD_SIZE, PACKET_HEADER_SIZE};
use tokio_util::codec::{Decoder, Encoder};

use crate::error::CodecError;

/// A single wire packet: one frame's payload and its sequence id.
#[derive(Debug, Clone)]
pub struct Packet {
    /// Sequence id carried by the frame.
    pub sequence: u8,
    /// Frame payload (length prefix stripped).
    pub payload: BytesMut,
}

impl Packet {
    /// Whether this frame continues into the next one.
    #[must_use]
    pub fn is_continuation(&self) -> bool {
        self.payload.len() == MAX_PAYLOAD_SIZE
    }
}

/// MariaDB packet codec.
///
/// Frames carry a 3-byte little-endian payload length and a sequence id.
/// The codec tracks the sequence counter: on encode it stamps and
/// advances, on decode it validates continuity. The connection layer
/// resets the counter at command boundaries and hands the expected value
/// across the read/write split.
///
/// Payloads of 16 MiB − 1 or more are chunked on encode into maximal
/// frames; a payload that is an exact multiple of the chunk size is
/// terminated by a zero-length frame so the receiver can find the
/// message boundary.
#[derive(Debug)]
pub struct PacketCodec {
    sequence: u8,
}

impl PacketCodec {
    /// Create a codec with the sequence counter at 0.
    #[must_use]
    pub fn new() -> Self {
        Self { sequence: 0 }
    }

    /// Reset the sequence counter for a new command boundary.
    pub fn reset_sequence(&mut self) {
        self.sequence = 0;
    }

    /// Set the sequence counter (hand-off between read and write halves).
    pub fn set_sequence(&mut self, value: u8) {
        self.sequence = value;
    }

    /// Current counter value: the id the next frame will carry (encode)
    /// or must carry (decode).
    #[must_use]
    pub fn sequence(&self) -> u8 {
        self.sequence
    }
}

impl Default for PacketCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for PacketCodec {
    type Item = Packet;
    type Error = CodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.len() < PACKET_HEADER_SIZE {
            return Ok(None);
        }

        let length = u32::from(src[0]) | (u32::from(src[1]) << 8) | (u32::from(src[2]) << 16);
        let total = PACKET_HEADER_SIZE + length as usize;
        if src.len() < total {
            src.reserve(total - src.len());
            return Ok(None);
        }

        let mut header_bytes = src.split_to(PACKET_HEADER_SIZE);
        let header = PacketHeader::decode(&mut header_bytes)?;
        if header.sequence != self.sequence {
            return Err(maria_protocol::ProtocolError::SequenceMismatch {
                expected: self.sequence,
                actual: header.sequence,
            }
            .into());
        }
        self.sequence = self.sequence.wrapping_add(1);

        let payload = src.split_to(length as usize);

        tracing::trace!(
            length,
            sequence = header.sequence,
            continuation = length as usize == MAX_PAYLOAD_SIZE,
            "decoded packet"
        );

        Ok(Some(Packet {
            sequence: header.sequence,
            payload,
        }))
    }
}

impl Encoder<Bytes> for PacketCodec {
    type Error = CodecError;

    fn encode(&mut self, item: Bytes, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let mut remaining = item;
        loop {
            let chunk_len = remaining.len().min(MAX_PAYLOAD_SIZE);
            let chunk = remaining.split_to(chunk_len);

            dst.reserve(PACKET_HEADER_SIZE + chunk.len());
            PacketHeader::new(chunk.len() as u32, self.sequence).encode(dst);
            dst.put_slice(&chunk);

            tracing::trace!(
                length = chunk.len(),
                sequence = self.sequence,
                "encoded packet"
            );
            self.sequence = self.sequence.wrapping_add(1);

            // A maximal frame needs a follow-up; an exact multiple ends
            // with a zero-length frame.
            if chunk_len < MAX_PAYLOAD_SIZE {
                break;
            }
            if remaining.is_empty() {
                PacketHeader::new(0, self.sequence).encode(dst);
                self.sequence = self.sequence.wrapping_add(1);
                break;
            }
        }
        Ok(())
    }
}
