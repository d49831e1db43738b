#![no_main]

use bytes::Bytes;
use libfuzzer_sys::fuzz_target;
use maria_protocol::InitialHandshake;

fuzz_target!(|data: &[u8]| {
    let _ = InitialHandshake::decode(Bytes::copy_from_slice(data));
});
