//! Per-mapper options.

use std::time::Duration;

use riffbridge_errors::RiffbridgeError;
use serde::{Deserialize, Serialize};

/// Options shared by every mapper a factory builds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MapperOptions {
    /// Map the guide key event onto the controller's guide button
    pub map_guide_button: bool,
    /// Recognize the gamepad interface and map it straight through
    pub enable_debug_gamepad: bool,
    /// Interval between keep-alives for devices that need them
    pub keep_alive_interval_ms: u64,
    /// LED brightness sent to devices with a status light
    pub led_brightness: u8,
}

impl Default for MapperOptions {
    fn default() -> Self {
        Self {
            map_guide_button: true,
            enable_debug_gamepad: false,
            keep_alive_interval_ms: 5000,
            led_brightness: 0x14,
        }
    }
}

impl MapperOptions {
    pub fn keep_alive_interval(&self) -> Duration {
        Duration::from_millis(self.keep_alive_interval_ms)
    }

    /// # Errors
    ///
    /// [`RiffbridgeError::Config`] for a zero keep-alive interval.
    pub fn validate(&self) -> Result<(), RiffbridgeError> {
        if self.keep_alive_interval_ms == 0 {
            return Err(RiffbridgeError::config(
                "mapper.keep_alive_interval_ms must be non-zero",
            ));
        }
        Ok(())
    }
}
