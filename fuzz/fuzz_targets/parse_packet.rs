#![no_main]

use bytes::BytesMut;
use libfuzzer_sys::fuzz_target;
use maria_codec::PacketCodec;
use maria_protocol::PacketHeader;
use tokio_util::codec::Decoder;

fuzz_target!(|data: &[u8]| {
    // Fuzz header parsing
    let mut cursor = data;
    let _ = PacketHeader::decode(&mut cursor);

    // Fuzz full frame decoding, draining as many frames as arrive
    let mut codec = PacketCodec::new();
    let mut buf = BytesMut::from(data);
    while let Ok(Some(_)) = codec.decode(&mut buf) {}
});
