//! Fuzzes the full receiver path: frame split, dedup, reassembly, descriptor
//! selection and every mapper, against an in-memory controller backend.
//!
//! Run with:
//!   cargo +nightly fuzz run fuzz_receiver_session
#![no_main]
use std::sync::Arc;
use std::time::{Duration, Instant};

use libfuzzer_sys::fuzz_target;
use riffbridge_engine::{EngineConfig, EngineContext, ReceiverCapture};
use riffbridge_gip_protocol::DeviceId;
use riffbridge_mappers::BackendKind;
use riffbridge_mappers::mock::MockBackend;

fuzz_target!(|data: &[u8]| {
    let backend = MockBackend::new(BackendKind::Gamepad, 4);
    let mut config = EngineConfig::default();
    config.mapper.enable_debug_gamepad = true;
    config.chunk_timeout_ms = Some(50);
    let Ok(context) = EngineContext::new(config, Arc::new(backend.clone())) else {
        return;
    };
    let mut capture = ReceiverCapture::new(context);
    let start = Instant::now();

    // Each record: device selector byte, length byte, message bytes.
    let mut rest = data;
    let mut tick = 0u64;
    while let [selector, len, tail @ ..] = rest {
        let take = usize::from(*len).min(tail.len());
        let (message, next) = tail.split_at(take);
        rest = next;
        tick += 7;
        let now = start + Duration::from_millis(tick);
        let device = DeviceId::new(u64::from(*selector & 0x03));
        let _ = capture.handle_message(device, message, now);
        capture.poll(now);
        let _ = capture.drain_outgoing();
    }

    let _ = capture.shutdown();
    assert_eq!(backend.live(), 0);
});
