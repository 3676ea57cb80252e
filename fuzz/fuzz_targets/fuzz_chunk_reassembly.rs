//! Fuzzes chunk reassembly with arbitrary packet sequences.
//!
//! Run with:
//!   cargo +nightly fuzz run fuzz_chunk_reassembly
#![no_main]
use std::time::{Duration, Instant};

use libfuzzer_sys::fuzz_target;
use riffbridge_gip_protocol::{ChunkAssembler, ChunkOutcome, MAX_CHUNKED_LEN, split_message};

fuzz_target!(|data: &[u8]| {
    // First byte picks the timeout; the rest is a stream of
    // length-prefixed packets.
    let Some((&mode, mut rest)) = data.split_first() else {
        return;
    };
    let timeout = (mode & 1 == 1).then(|| Duration::from_millis(u64::from(mode >> 1)));
    let mut assembler = ChunkAssembler::with_timeout(timeout);
    let start = Instant::now();
    let mut tick = 0u64;

    while let Some((&len, tail)) = rest.split_first() {
        let take = usize::from(len).min(tail.len());
        let (packet, next) = tail.split_at(take);
        rest = next;
        tick += 1;
        let now = start + Duration::from_millis(tick);

        if let Ok((header, payload)) = split_message(packet)
            && header.flags.chunked()
            && let Ok(ChunkOutcome::Complete(message)) = assembler.push(&header, payload, now)
        {
            assert!(message.len() <= MAX_CHUNKED_LEN);
        }
    }
    assembler.reset();
});
