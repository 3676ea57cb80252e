//! Fuzzes the instrument report parsers and the keystroke iterator.
//!
//! Run with:
//!   cargo +nightly fuzz run fuzz_instrument_reports
#![no_main]
use libfuzzer_sys::fuzz_target;
use riffbridge_gip_protocol::{
    ArrivalReport, DrumReport, GamepadReport, GuitarReport, LegacyConnection, LegacyInput,
    SixFretReport, keystrokes,
};

fuzz_target!(|data: &[u8]| {
    let _ = GuitarReport::parse(data);
    let _ = DrumReport::parse(data);
    let _ = SixFretReport::parse(data);
    let _ = GamepadReport::parse(data);
    let _ = ArrivalReport::parse(data);
    let _ = LegacyConnection::parse(data);
    let _ = LegacyInput::parse(data);
    for _ in keystrokes(data) {}
});
