//! Game input protocol (GIP) wire format for instrument controllers.
//!
//! This crate is intentionally I/O-free. It provides the header codec,
//! chunk reassembly, sequence deduplication, descriptor parsing and the
//! fixed-layout instrument reports, all as pure functions and small state
//! machines that can be tested and fuzzed without hardware.

#![deny(static_mut_refs)]

pub mod chunk;
pub mod command;
pub mod dedup;
pub mod descriptor;
pub mod header;
pub mod ids;
pub mod outgoing;
pub mod receiver;
pub mod reports;
pub mod varint;

// Flat re-exports so callers can use `riffbridge_gip_protocol::Foo`.
pub use chunk::{ChunkAssembler, ChunkOutcome, MAX_CHUNKED_LEN};
pub use command::{command_ids, command_name, is_ignored_system_command};
pub use dedup::SequenceFilter;
pub use descriptor::{
    Descriptor, DescriptorBuilder, DescriptorIssue, DescriptorSection, parse_descriptor,
};
pub use header::{CommandHeader, FIXED_HEADER_LEN, HeaderFlags, flags, parse_header, split_message};
pub use ids::{InterfaceKind, interface_guids, interface_kind};
pub use outgoing::{OutgoingMessage, Outbox, SequenceCounter, led_mode, power_mode};
pub use receiver::{DeviceId, RECEIVER_HEADER_LEN, encode_receiver_header, parse_receiver_frame};
pub use reports::{
    ArrivalReport, DrumReport, GUIDE_KEY_CODE, GamepadReport, GuitarReport, Keystroke,
    LegacyConnection, LegacyInput, SixFretReport, buttons, drum_report, gamepad_report,
    guitar_report, keystrokes, legacy, six_fret_report,
};
pub use varint::{decode_varint, encode_varint, varint_len};
pub use riffbridge_errors::PacketError;
