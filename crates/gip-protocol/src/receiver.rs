//! Wireless receiver frame header.
//!
//! Frames captured from the wireless receiver carry an 802.11 QoS-data header
//! ahead of the protocol message. The transmitter address identifies the
//! logical device.
//!
//! # Layout
//! | Offset | Size | Field                          |
//! |--------|------|--------------------------------|
//! | 0      | u16  | frame control                  |
//! | 2      | u16  | duration                       |
//! | 4      | 6    | receiver address               |
//! | 10     | 6    | transmitter address (device id) |
//! | 16     | 6    | BSSID                          |
//! | 22     | u16  | sequence control               |
//! | 24     | u16  | QoS control                    |

use std::fmt;

use riffbridge_errors::PacketError;

/// Length of the receiver header.
pub const RECEIVER_HEADER_LEN: usize = 26;

/// Receiver header layout constants.
pub mod receiver_layout {
    pub const FRAME_CONTROL: usize = 0;
    pub const TRANSMITTER: usize = 10;
    pub const ADDRESS_LEN: usize = 6;
    /// Type bits of the first frame-control byte.
    pub const TYPE_MASK: u8 = 0x0C;
    pub const TYPE_DATA: u8 = 0x08;
    /// Subtype bit that marks a QoS data frame.
    pub const SUBTYPE_QOS: u8 = 0x80;
}

/// 48-bit logical device id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct DeviceId(u64);

impl DeviceId {
    const MASK: u64 = 0xFFFF_FFFF_FFFF;

    /// Build an id from a raw value; bits above 48 are discarded.
    pub const fn new(raw: u64) -> Self {
        Self(raw & Self::MASK)
    }

    pub fn from_mac(mac: [u8; 6]) -> Self {
        let mut raw = [0u8; 8];
        if let Some(tail) = raw.get_mut(2..) {
            tail.copy_from_slice(&mac);
        }
        Self(u64::from_be_bytes(raw))
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bytes = self.0.to_be_bytes();
        let [_, _, a, b, c, d, e, g] = bytes;
        write!(f, "{a:02x}:{b:02x}:{c:02x}:{d:02x}:{e:02x}:{g:02x}")
    }
}

/// Split a captured frame into its device id and protocol message.
///
/// Returns `Ok(None)` for frames that are not QoS data (beacons, control
/// frames), which carry no protocol message.
///
/// # Errors
///
/// [`PacketError::Truncated`] if the frame is shorter than the header.
pub fn parse_receiver_frame(frame: &[u8]) -> Result<Option<(DeviceId, &[u8])>, PacketError> {
    let (header, message) = match (
        frame.get(..RECEIVER_HEADER_LEN),
        frame.get(RECEIVER_HEADER_LEN..),
    ) {
        (Some(header), Some(message)) => (header, message),
        _ => {
            return Err(PacketError::truncated(
                "receiver header",
                RECEIVER_HEADER_LEN,
                frame.len(),
            ));
        }
    };

    let frame_control = header
        .get(receiver_layout::FRAME_CONTROL)
        .copied()
        .unwrap_or(0);
    if frame_control & receiver_layout::TYPE_MASK != receiver_layout::TYPE_DATA
        || frame_control & receiver_layout::SUBTYPE_QOS == 0
    {
        return Ok(None);
    }

    let transmitter =
        receiver_layout::TRANSMITTER..receiver_layout::TRANSMITTER + receiver_layout::ADDRESS_LEN;
    let mac = header
        .get(transmitter)
        .and_then(|bytes| <[u8; 6]>::try_from(bytes).ok())
        .ok_or_else(|| {
            PacketError::truncated("transmitter address", receiver_layout::ADDRESS_LEN, 0)
        })?;

    Ok(Some((DeviceId::from_mac(mac), message)))
}

/// Build a QoS-data receiver header for `device`, used by fixtures and the
/// replay tool.
pub fn encode_receiver_header(device: DeviceId, out: &mut Vec<u8>) {
    let start = out.len();
    out.resize(start + RECEIVER_HEADER_LEN, 0);
    if let Some(header) = out.get_mut(start..) {
        if let Some(fc) = header.get_mut(receiver_layout::FRAME_CONTROL) {
            *fc = receiver_layout::TYPE_DATA | receiver_layout::SUBTYPE_QOS;
        }
        let mac = device.raw().to_be_bytes();
        if let (Some(dst), Some(src)) = (
            header.get_mut(receiver_layout::TRANSMITTER..receiver_layout::TRANSMITTER + 6),
            mac.get(2..),
        ) {
            dst.copy_from_slice(src);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_id_displays_as_mac() {
        let id = DeviceId::from_mac([0x7E, 0xED, 0x80, 0x12, 0x34, 0x56]);
        assert_eq!(id.to_string(), "7e:ed:80:12:34:56");
        assert_eq!(id.raw(), 0x7EED_8012_3456);
        assert_eq!(DeviceId::new(u64::MAX).raw(), 0xFFFF_FFFF_FFFF);
    }

    #[test]
    fn qos_data_frame_yields_message() -> Result<(), PacketError> {
        let device = DeviceId::new(0x0017_F1AA_BBCC);
        let mut frame = Vec::new();
        encode_receiver_header(device, &mut frame);
        frame.extend_from_slice(&[0x20, 0x00, 0x01, 0x00]);

        let parsed = parse_receiver_frame(&frame)?;
        assert_eq!(parsed, Some((device, &[0x20, 0x00, 0x01, 0x00][..])));
        Ok(())
    }

    #[test]
    fn non_data_frames_are_skipped() -> Result<(), PacketError> {
        let mut frame = vec![0u8; RECEIVER_HEADER_LEN + 4];
        // Beacon: management type, subtype 8.
        if let Some(fc) = frame.first_mut() {
            *fc = 0x80;
        }
        assert_eq!(parse_receiver_frame(&frame)?, None);

        // Plain (non-QoS) data frame.
        if let Some(fc) = frame.first_mut() {
            *fc = 0x08;
        }
        assert_eq!(parse_receiver_frame(&frame)?, None);
        Ok(())
    }

    #[test]
    fn short_frame_is_truncated() {
        assert_eq!(
            parse_receiver_frame(&[0x88; 10]),
            Err(PacketError::truncated("receiver header", RECEIVER_HEADER_LEN, 10))
        );
    }
}
