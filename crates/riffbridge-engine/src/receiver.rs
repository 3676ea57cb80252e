//! Capture path for a wireless receiver relaying many devices.

use std::collections::HashMap;
use std::time::Instant;

use riffbridge_errors::PacketError;
use riffbridge_gip_protocol::{DeviceId, parse_receiver_frame};
use tracing::{info, trace};

use crate::context::EngineContext;
use crate::registry::DeviceKey;
use crate::session::{ClientSession, PacketDisposition};
use crate::sink::FrameSink;

/// Owns one session per transmitter seen on the receiver.
#[derive(Debug)]
pub struct ReceiverCapture {
    context: EngineContext,
    sessions: HashMap<DeviceId, ClientSession>,
}

impl ReceiverCapture {
    pub fn new(context: EngineContext) -> Self {
        Self {
            context,
            sessions: HashMap::new(),
        }
    }

    pub fn context(&self) -> &EngineContext {
        &self.context
    }

    pub fn device_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn session(&self, device: DeviceId) -> Option<&ClientSession> {
        self.sessions.get(&device)
    }

    /// Handle a raw captured frame, receiver header included.
    ///
    /// # Errors
    ///
    /// Short receiver header or a malformed message.
    pub fn handle_frame(
        &mut self,
        frame: &[u8],
        now: Instant,
    ) -> Result<PacketDisposition, PacketError> {
        match parse_receiver_frame(frame)? {
            Some((device, message)) => self.handle_message(device, message, now),
            None => {
                trace!(len = frame.len(), "non-data receiver frame skipped");
                Ok(PacketDisposition::Ignored)
            }
        }
    }

    /// Handle a protocol message already attributed to `device`.
    ///
    /// # Errors
    ///
    /// Malformed message; the device's session is kept.
    pub fn handle_message(
        &mut self,
        device: DeviceId,
        message: &[u8],
        now: Instant,
    ) -> Result<PacketDisposition, PacketError> {
        let key = DeviceKey::Receiver(device);
        let registry = self.context.registry();
        let context = &self.context;
        let session = self.sessions.entry(device).or_insert_with(|| {
            info!(device = %device, "new device on receiver");
            registry.register(key);
            ClientSession::new(device.to_string(), context)
        });

        let disposition = session.handle_message(message, now)?;
        if disposition == PacketDisposition::Dispatched {
            registry.update(key, |info| session.fill_info(info));
        }
        Ok(disposition)
    }

    /// Drop a device's session, releasing its controller.
    pub fn disconnect(&mut self, device: DeviceId) -> bool {
        let removed = self.sessions.remove(&device).is_some();
        if removed {
            self.context.registry().unregister(DeviceKey::Receiver(device));
            info!(device = %device, "device disconnected");
        }
        removed
    }

    pub fn poll(&mut self, now: Instant) {
        for session in self.sessions.values_mut() {
            session.poll(now);
        }
    }

    /// Encoded host-bound packets for every device, ordered by device.
    pub fn drain_outgoing(&mut self) -> Vec<(DeviceId, Vec<u8>)> {
        let mut devices: Vec<DeviceId> = self.sessions.keys().copied().collect();
        devices.sort_unstable();
        let mut packets = Vec::new();
        for device in devices {
            if let Some(session) = self.sessions.get_mut(&device) {
                packets.extend(
                    session
                        .drain_outgoing()
                        .into_iter()
                        .map(|packet| (device, packet)),
                );
            }
        }
        packets
    }

    /// Stop capturing: release every controller and return the final packets,
    /// which include a reset for each device.
    pub fn shutdown(&mut self) -> Vec<(DeviceId, Vec<u8>)> {
        for session in self.sessions.values_mut() {
            session.shutdown();
        }
        let packets = self.drain_outgoing();
        for (device, _) in self.sessions.drain() {
            self.context.registry().unregister(DeviceKey::Receiver(device));
        }
        info!(packets = packets.len(), "receiver capture stopped");
        packets
    }
}

impl FrameSink for ReceiverCapture {
    fn deliver(
        &mut self,
        device: Option<DeviceId>,
        bytes: &[u8],
    ) -> Result<PacketDisposition, PacketError> {
        let now = Instant::now();
        match device {
            Some(device) => self.handle_message(device, bytes, now),
            None => self.handle_frame(bytes, now),
        }
    }
}

impl Drop for ReceiverCapture {
    fn drop(&mut self) {
        for device in self.sessions.keys() {
            self.context.registry().unregister(DeviceKey::Receiver(*device));
        }
    }
}
