//! Where a frame source hands over bytes.

use riffbridge_errors::PacketError;
use riffbridge_gip_protocol::DeviceId;

use crate::session::PacketDisposition;

/// Consumer of captured frames.
///
/// `device` is the logical device when the source already knows it; `None`
/// means the sink works it out (from a receiver header) or serves a single
/// device.
pub trait FrameSink {
    /// # Errors
    ///
    /// The frame was malformed and dropped.
    fn deliver(
        &mut self,
        device: Option<DeviceId>,
        bytes: &[u8],
    ) -> Result<PacketDisposition, PacketError>;
}
