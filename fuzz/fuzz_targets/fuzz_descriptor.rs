//! Fuzzes the descriptor parser.
//!
//! Run with:
//!   cargo +nightly fuzz run fuzz_descriptor
#![no_main]
use libfuzzer_sys::fuzz_target;
use riffbridge_gip_protocol::{interface_kind, parse_descriptor};

fuzz_target!(|data: &[u8]| {
    // Garbage yields a partial descriptor, never a panic.
    let descriptor = parse_descriptor(data);
    for guid in &descriptor.interface_guids {
        let _ = interface_kind(guid);
    }
    if descriptor.is_complete() {
        assert!(descriptor.issues.is_empty());
    }
});
