#![no_main]

use arbitrary::Arbitrary;
use bytes::Bytes;
use libfuzzer_sys::fuzz_target;
use maria_protocol::{ColumnDefinition, ColumnFlags, ConnectionContext, DataType, ServerStatus};
use maria_types::{CodecRegistry, TargetKind};

/// Arbitrary column shape for fuzzing.
#[derive(Debug, Arbitrary)]
struct FuzzInput {
    type_byte: u8,
    collation: u8,
    flags: u16,
    decimals: u8,
    length: u32,
    binary: bool,
    target: u8,
    data: Vec<u8>,
}

const TARGETS: [TargetKind; 15] = [
    TargetKind::Bool,
    TargetKind::Int8,
    TargetKind::Int16,
    TargetKind::Int32,
    TargetKind::Int64,
    TargetKind::UInt64,
    TargetKind::Float,
    TargetKind::Double,
    TargetKind::Decimal,
    TargetKind::Text,
    TargetKind::Blob,
    TargetKind::Date,
    TargetKind::Time,
    TargetKind::Duration,
    TargetKind::DateTime,
];

fuzz_target!(|input: FuzzInput| {
    let Ok(data_type) = DataType::from_server(input.type_byte, input.collation) else {
        return;
    };
    let mut column = ColumnDefinition::synthetic(
        "f",
        data_type,
        ColumnFlags::from_bits_truncate(input.flags),
    );
    column.decimals = input.decimals;
    column.length = input.length;

    let context = ConnectionContext::for_tests(ServerStatus::AUTOCOMMIT);
    let registry = CodecRegistry::global();
    let target = TARGETS[usize::from(input.target) % TARGETS.len()];
    let raw = Some(Bytes::from(input.data));

    // Decoding must never panic, only return errors.
    if input.binary {
        let _ = registry.decode_binary(raw, &column, target, &context);
    } else {
        let _ = registry.decode_text(raw, &column, target, &context);
    }
});
