#![no_main]

use bytes::Bytes;
use libfuzzer_sys::fuzz_target;
use maria_protocol::{
    AuthSwitchRequest, Capabilities, ColumnDefinition, EofPacket, ErrPacket, OkPacket,
    PrepareResult,
};

fuzz_target!(|data: &[u8]| {
    let bytes = Bytes::copy_from_slice(data);
    let _ = OkPacket::decode(bytes.clone(), Capabilities::PROTOCOL_41);
    let _ = ErrPacket::decode(bytes.clone());
    let _ = EofPacket::decode(bytes.clone(), true);
    let _ = AuthSwitchRequest::decode(bytes.clone());
    let _ = ColumnDefinition::decode(bytes.clone());
    let _ = PrepareResult::decode(bytes, false);
});
