//! Capture path for a device on its own pipe.

use std::sync::Arc;
use std::time::Instant;

use riffbridge_errors::PacketError;
use riffbridge_gip_protocol::DeviceId;
use tracing::info;

use crate::context::EngineContext;
use crate::registry::{DeviceKey, DeviceRegistry};
use crate::session::{ClientSession, PacketDisposition};
use crate::sink::FrameSink;

/// One session fed by one stream; meant to live on that stream's read thread.
#[derive(Debug)]
pub struct DirectStream {
    key: DeviceKey,
    registry: Arc<DeviceRegistry>,
    session: ClientSession,
}

impl DirectStream {
    pub fn open(context: &EngineContext) -> Self {
        let registry = Arc::clone(context.registry());
        let stream = registry.allocate_stream_id();
        let key = DeviceKey::Direct(stream);
        registry.register(key);
        info!(device = %key, "direct stream opened");
        Self {
            key,
            registry,
            session: ClientSession::new(key.to_string(), context),
        }
    }

    pub fn key(&self) -> DeviceKey {
        self.key
    }

    pub fn session(&self) -> &ClientSession {
        &self.session
    }

    /// # Errors
    ///
    /// Malformed message; the stream stays usable.
    pub fn handle_packet(
        &mut self,
        packet: &[u8],
        now: Instant,
    ) -> Result<PacketDisposition, PacketError> {
        let disposition = self.session.handle_message(packet, now)?;
        if disposition == PacketDisposition::Dispatched {
            let session = &self.session;
            self.registry.update(self.key, |info| session.fill_info(info));
        }
        Ok(disposition)
    }

    pub fn poll(&mut self, now: Instant) {
        self.session.poll(now);
    }

    pub fn drain_outgoing(&mut self) -> Vec<Vec<u8>> {
        self.session.drain_outgoing()
    }

    /// Release the controller and return the final packets, ending with a
    /// device reset.
    pub fn close(mut self) -> Vec<Vec<u8>> {
        self.session.shutdown();
        let packets = self.session.drain_outgoing();
        info!(device = %self.key, "direct stream closed");
        packets
    }
}

impl FrameSink for DirectStream {
    fn deliver(
        &mut self,
        _device: Option<DeviceId>,
        bytes: &[u8],
    ) -> Result<PacketDisposition, PacketError> {
        self.handle_packet(bytes, Instant::now())
    }
}

impl Drop for DirectStream {
    fn drop(&mut self) {
        self.registry.unregister(self.key);
    }
}
