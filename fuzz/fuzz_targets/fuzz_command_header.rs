//! Fuzzes the command header, varint and receiver header decoders.
//!
//! Run with:
//!   cargo +nightly fuzz run fuzz_command_header
#![no_main]
use libfuzzer_sys::fuzz_target;
use riffbridge_gip_protocol::{
    command_name, decode_varint, is_ignored_system_command, parse_header, parse_receiver_frame,
    split_message,
};

fuzz_target!(|data: &[u8]| {
    // Must never panic on arbitrary bytes.
    let _ = decode_varint(data, 0);
    let _ = decode_varint(data, 3);

    if let Ok((header, len)) = parse_header(data) {
        assert!(len <= data.len());
        let _ = command_name(header.command_id);
        let _ = is_ignored_system_command(header.command_id);
    }
    if let Ok((header, payload)) = split_message(data) {
        assert_eq!(payload.len(), header.data_length as usize);
    }
    if let Ok(Some((_, message))) = parse_receiver_frame(data) {
        let _ = split_message(message);
    }
});
