//! Property tests: arbitrary input never panics the engine, and chunked input
//! reaches the mapper exactly like the unsplit report.

use std::sync::Arc;
use std::time::Instant;

use proptest::prelude::*;
use riffbridge_engine::{EngineConfig, EngineContext, PacketDisposition, ReceiverCapture};
use riffbridge_gip_protocol::{
    CommandHeader, DescriptorBuilder, DeviceId, HeaderFlags, command_ids, flags, interface_guids,
};
use riffbridge_mappers::BackendKind;
use riffbridge_mappers::mock::MockBackend;

const DEVICE: DeviceId = DeviceId::new(0x0011_2233_4455);

fn encode(command_id: u8, bits: u8, sequence: u8, index: Option<u32>, payload: &[u8]) -> Vec<u8> {
    let len = u32::try_from(payload.len()).unwrap_or(u32::MAX);
    let mut header = CommandHeader::new(command_id, HeaderFlags::from_bits(bits), sequence, len);
    header.chunk_index = index;
    let mut out = Vec::new();
    header.encode(&mut out);
    out.extend_from_slice(payload);
    out
}

fn capture(backend: &MockBackend) -> Result<ReceiverCapture, TestCaseError> {
    let context = EngineContext::new(EngineConfig::default(), Arc::new(backend.clone()))
        .map_err(|e| TestCaseError::fail(e.to_string()))?;
    let mut capture = ReceiverCapture::new(context);
    let descriptor = DescriptorBuilder::new()
        .interface(interface_guids::DRUMS)
        .build();
    capture
        .handle_message(
            DEVICE,
            &encode(command_ids::DESCRIPTOR, flags::SYSTEM, 1, None, &descriptor),
            Instant::now(),
        )
        .map_err(|e| TestCaseError::fail(e.to_string()))?;
    Ok(capture)
}

proptest! {
    #![proptest_config(proptest::test_runner::Config::with_cases(500))]

    #[test]
    fn prop_garbage_frames_never_panic(frames in proptest::collection::vec(
        proptest::collection::vec(any::<u8>(), 0..64), 1..20,
    )) {
        let backend = MockBackend::new(BackendKind::Gamepad, 4);
        let mut capture = capture(&backend)?;
        let now = Instant::now();
        for frame in &frames {
            if let Err(e) = capture.handle_frame(frame, now) {
                prop_assert!(!e.to_string().is_empty());
            }
            if let Err(e) = capture.handle_message(DEVICE, frame, now) {
                prop_assert!(!e.to_string().is_empty());
            }
        }
        prop_assert!(backend.live() <= 4);
    }

    #[test]
    fn prop_chunked_drum_report_matches_unsplit(
        report in proptest::collection::vec(any::<u8>(), 6),
        cut in 1usize..6,
    ) {
        let unsplit_backend = MockBackend::new(BackendKind::Gamepad, 1);
        let mut unsplit = capture(&unsplit_backend)?;
        let now = Instant::now();
        let whole = encode(command_ids::INPUT, 0, 5, None, &report);
        prop_assert_eq!(
            unsplit.handle_message(DEVICE, &whole, now),
            Ok(PacketDisposition::Dispatched)
        );

        let chunked_backend = MockBackend::new(BackendKind::Gamepad, 1);
        let mut chunked = capture(&chunked_backend)?;
        let (head, tail) = report.split_at(cut);
        let cut_index = u32::try_from(cut).unwrap_or(0);
        let packets = [
            encode(command_ids::INPUT, flags::CHUNK | flags::CHUNK_START, 5, Some(6), head),
            encode(command_ids::INPUT, flags::CHUNK, 5, Some(cut_index), tail),
            encode(command_ids::INPUT, flags::CHUNK, 5, Some(6), &[]),
        ];
        let mut last = None;
        for packet in &packets {
            last = Some(chunked.handle_message(DEVICE, packet, now));
        }
        prop_assert_eq!(last, Some(Ok(PacketDisposition::Dispatched)));
        prop_assert_eq!(unsplit_backend.last_submission(), chunked_backend.last_submission());
    }
}
