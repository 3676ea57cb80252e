//! Feed a capture file through the engine.

use std::time::Instant;

use anyhow::{Context, Result};
use riffbridge_engine::{DirectStream, EngineContext, PacketDisposition, ReceiverCapture};
use riffbridge_errors::PacketError;
use riffbridge_gip_protocol::{DeviceId, command_name, split_message};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::capture::{CaptureFile, format_hex};

/// Per-disposition frame counts for one replay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReplayStats {
    pub frames: usize,
    pub dispatched: usize,
    pub pending: usize,
    pub duplicates: usize,
    pub ignored: usize,
    pub errors: usize,
    pub outgoing: usize,
}

impl ReplayStats {
    fn record(&mut self, index: usize, result: Result<PacketDisposition, PacketError>) {
        self.frames = self.frames.saturating_add(1);
        let counter = match result {
            Ok(PacketDisposition::Dispatched) => &mut self.dispatched,
            Ok(PacketDisposition::Pending) => &mut self.pending,
            Ok(PacketDisposition::Duplicate) => &mut self.duplicates,
            Ok(PacketDisposition::Ignored) => &mut self.ignored,
            Err(e) => {
                warn!(frame = index, error = %e, "frame rejected");
                &mut self.errors
            }
        };
        *counter = counter.saturating_add(1);
    }
}

enum Target {
    Receiver(ReceiverCapture),
    Direct(DirectStream),
}

/// Replay every frame of `capture` in order, then shut the devices down.
///
/// In receiver mode a frame's `device` field names the device; frames without
/// one must carry the receiver header. In direct mode all frames belong to a
/// single device and `device` is ignored.
///
/// # Errors
///
/// A frame whose `data` or `device` field does not parse.
pub fn replay(capture: &CaptureFile, context: EngineContext, direct: bool) -> Result<ReplayStats> {
    let mut target = if direct {
        Target::Direct(DirectStream::open(&context))
    } else {
        Target::Receiver(ReceiverCapture::new(context))
    };
    let mut stats = ReplayStats::default();
    let start = Instant::now();

    for (index, (frame, offset)) in capture.frames.iter().zip(capture.offsets()).enumerate() {
        let bytes = frame
            .bytes()
            .map_err(anyhow::Error::msg)
            .with_context(|| format!("frame {index}: bad data"))?;
        let now = start.checked_add(offset).unwrap_or(start);
        debug!(frame = index, data = %frame.data, "replaying frame");

        let result = match &mut target {
            Target::Receiver(receiver) => {
                let device = frame
                    .device_id()
                    .map_err(anyhow::Error::msg)
                    .with_context(|| format!("frame {index}: bad device"))?;
                let result = match device {
                    Some(device) => receiver.handle_message(device, &bytes, now),
                    None => receiver.handle_frame(&bytes, now),
                };
                receiver.poll(now);
                result
            }
            Target::Direct(stream) => {
                let result = stream.handle_packet(&bytes, now);
                stream.poll(now);
                result
            }
        };
        stats.record(index, result);
        stats.outgoing = stats.outgoing.saturating_add(flush(&mut target));
    }

    let last = match target {
        Target::Receiver(mut receiver) => log_receiver_packets(receiver.shutdown()),
        Target::Direct(stream) => log_direct_packets(stream.close()),
    };
    stats.outgoing = stats.outgoing.saturating_add(last);
    info!(
        frames = stats.frames,
        dispatched = stats.dispatched,
        errors = stats.errors,
        "replay finished"
    );
    Ok(stats)
}

fn flush(target: &mut Target) -> usize {
    match target {
        Target::Receiver(receiver) => log_receiver_packets(receiver.drain_outgoing()),
        Target::Direct(stream) => log_direct_packets(stream.drain_outgoing()),
    }
}

fn log_receiver_packets(packets: Vec<(DeviceId, Vec<u8>)>) -> usize {
    for (device, packet) in &packets {
        info!(
            device = %device,
            command = describe_command(packet),
            data = %format_hex(packet),
            "outgoing packet"
        );
    }
    packets.len()
}

fn log_direct_packets(packets: Vec<Vec<u8>>) -> usize {
    for packet in &packets {
        info!(
            command = describe_command(packet),
            data = %format_hex(packet),
            "outgoing packet"
        );
    }
    packets.len()
}

fn describe_command(packet: &[u8]) -> &'static str {
    split_message(packet).map_or("malformed", |(header, _)| command_name(header.command_id))
}
