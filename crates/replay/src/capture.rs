//! Capture file format.
//!
//! ```json
//! { "frames": [ { "timestamp_us": 0, "device": "7e:ed:81:23:45:67", "data": "0x20 0x00 0x01" } ] }
//! ```
//!
//! `device` is optional. Without it, receiver-mode replay reads the device id
//! from the receiver header at the front of `data`.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use riffbridge_gip_protocol::DeviceId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureFrame {
    pub timestamp_us: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
    pub data: String,
}

impl CaptureFrame {
    pub fn bytes(&self) -> Result<Vec<u8>, String> {
        parse_hex_bytes(&self.data)
    }

    pub fn device_id(&self) -> Result<Option<DeviceId>, String> {
        self.device.as_deref().map(parse_device_id).transpose()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureFile {
    pub frames: Vec<CaptureFrame>,
}

impl CaptureFile {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read capture file '{}'", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse capture file '{}'", path.display()))
    }

    /// Offset of every frame from the first one. Timestamps that step
    /// backwards are clamped so the replay clock never runs in reverse.
    pub fn offsets(&self) -> Vec<Duration> {
        let first = self.frames.first().map_or(0, |f| f.timestamp_us);
        let mut latest = 0u64;
        self.frames
            .iter()
            .map(|frame| {
                latest = latest.max(frame.timestamp_us.saturating_sub(first));
                Duration::from_micros(latest)
            })
            .collect()
    }
}

/// Parse whitespace-separated byte tokens such as `0x20 0x00 ff`.
pub fn parse_hex_bytes(s: &str) -> Result<Vec<u8>, String> {
    s.split_whitespace().map(parse_hex_byte).collect()
}

pub fn parse_hex_byte(token: &str) -> Result<u8, String> {
    let digits = token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
        .unwrap_or(token);
    if digits.is_empty() || digits.len() > 2 {
        return Err(format!("invalid hex byte '{token}'"));
    }
    u8::from_str_radix(digits, 16).map_err(|e| format!("invalid hex byte '{token}': {e}"))
}

/// Parse a device address written as six colon-separated hex bytes.
pub fn parse_device_id(s: &str) -> Result<DeviceId, String> {
    let mut mac = [0u8; 6];
    let mut parts = s.trim().split(':');
    for slot in &mut mac {
        let part = parts
            .next()
            .ok_or_else(|| format!("device address '{s}' has fewer than 6 bytes"))?;
        *slot = parse_hex_byte(part)?;
    }
    if parts.next().is_some() {
        return Err(format!("device address '{s}' has more than 6 bytes"));
    }
    Ok(DeviceId::from_mac(mac))
}

pub fn format_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("0x{b:02X}"))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_prefixed_and_bare_tokens_when_parsed_then_bytes_returned() {
        assert_eq!(parse_hex_bytes("0x20 0X0a ff 7"), Ok(vec![0x20, 0x0A, 0xFF, 0x07]));
        assert_eq!(parse_hex_bytes(""), Ok(vec![]));
    }

    #[test]
    fn given_invalid_token_when_parsed_then_error_names_token() {
        let err = parse_hex_bytes("0x20 0xZZ").err().unwrap_or_default();
        assert!(err.contains("0xZZ"), "{err}");
        assert!(parse_hex_bytes("0x100").is_err());
        assert!(parse_hex_bytes("0x").is_err());
    }

    #[test]
    fn given_formatted_bytes_when_parsed_back_then_identical() {
        let bytes = [0x00, 0x7F, 0x80, 0xFF];
        assert_eq!(parse_hex_bytes(&format_hex(&bytes)), Ok(bytes.to_vec()));
    }

    #[test]
    fn given_mac_address_when_parsed_then_device_id_matches_display() {
        let id = parse_device_id("7e:ed:81:23:45:67");
        assert_eq!(id.map(|d| d.to_string()), Ok("7e:ed:81:23:45:67".to_string()));
    }

    #[test]
    fn given_short_or_long_address_when_parsed_then_error() {
        assert!(parse_device_id("7e:ed:81").is_err());
        assert!(parse_device_id("7e:ed:81:23:45:67:89").is_err());
    }

    #[test]
    fn given_frames_without_device_when_deserialized_then_device_is_none()
    -> Result<(), Box<dyn std::error::Error>> {
        let json = r#"{"frames":[{"timestamp_us":5,"data":"0x20 0x00"}]}"#;
        let file: CaptureFile = serde_json::from_str(json)?;
        let frame = file.frames.first().ok_or("missing frame")?;
        assert_eq!(frame.device_id(), Ok(None));
        assert_eq!(frame.bytes(), Ok(vec![0x20, 0x00]));
        Ok(())
    }

    #[test]
    fn given_backwards_timestamp_when_offsets_computed_then_clock_never_rewinds() {
        let frame = |timestamp_us| CaptureFrame {
            timestamp_us,
            device: None,
            data: String::new(),
        };
        let file = CaptureFile {
            frames: vec![frame(1_000), frame(3_000), frame(2_000), frame(6_000)],
        };
        assert_eq!(
            file.offsets(),
            vec![
                Duration::ZERO,
                Duration::from_millis(2),
                Duration::from_millis(2),
                Duration::from_millis(5),
            ]
        );
    }

    #[test]
    fn given_capture_on_disk_when_loaded_then_frames_preserved()
    -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("capture.json");
        let file = CaptureFile {
            frames: vec![CaptureFrame {
                timestamp_us: 42,
                device: Some("00:11:22:33:44:55".to_string()),
                data: "0x20".to_string(),
            }],
        };
        std::fs::write(&path, serde_json::to_string_pretty(&file)?)?;
        assert_eq!(CaptureFile::load(&path)?, file);
        Ok(())
    }

    #[test]
    fn given_missing_file_when_loaded_then_error_mentions_path() {
        let err = CaptureFile::load(Path::new("/nonexistent/capture.json"))
            .err()
            .map(|e| e.to_string())
            .unwrap_or_default();
        assert!(err.contains("/nonexistent/capture.json"), "{err}");
    }
}
