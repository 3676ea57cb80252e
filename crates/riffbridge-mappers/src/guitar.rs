//! Five-fret guitar mapper.
//!
//! ## Mapping
//! - Frets: green A, red B, yellow Y, blue X, orange left shoulder. Upper and
//!   lower fret rows are merged; any lower-row fret also presses left thumb.
//! - Tilt to right Y, whammy to right X, pickup selector to left X.
//! - Menu, view and d-pad through the shared button bits.
//!
//! The alternate profile (second guitar interface) centres the whammy at rest,
//! snaps the pickup selector to five detents, and needs an LED command at
//! start-up plus a periodic keep-alive or it powers down.

use std::time::{Duration, Instant};

use riffbridge_errors::DeviceError;
use riffbridge_gip_protocol::{
    GuitarReport, Outbox, OutgoingMessage, command_ids, guitar_report, led_mode,
};
use tracing::debug;

use crate::controller::{
    ControllerAxis, ControllerBackend, ControllerButton, ControllerHandle, VirtualController,
    apply_guide_key, apply_shared_buttons,
};
use crate::options::MapperOptions;
use crate::scaling::{byte_to_axis, byte_to_axis_centered, pickup_plateau};

/// Analog scaling variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuitarProfile {
    Standard,
    Alternate,
}

pub struct GuitarMapper {
    controller: ControllerHandle,
    profile: GuitarProfile,
    map_guide_button: bool,
    keep_alive_interval: Duration,
    last_keep_alive: Option<Instant>,
}

impl std::fmt::Debug for GuitarMapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuitarMapper")
            .field("profile", &self.profile)
            .field("controller", &self.controller)
            .finish()
    }
}

impl GuitarMapper {
    /// # Errors
    ///
    /// Backend allocation failure.
    pub fn new(
        backend: &dyn ControllerBackend,
        profile: GuitarProfile,
        options: &MapperOptions,
        outbox: &mut Outbox,
    ) -> Result<Self, DeviceError> {
        let controller = ControllerHandle::new(backend.create_controller()?, "guitar");
        if profile == GuitarProfile::Alternate {
            outbox.push(OutgoingMessage::led(led_mode::ON, options.led_brightness));
        }
        debug!(?profile, backend = %backend.kind(), "guitar mapper created");
        Ok(Self {
            controller,
            profile,
            map_guide_button: options.map_guide_button,
            keep_alive_interval: options.keep_alive_interval(),
            last_keep_alive: None,
        })
    }

    pub fn profile(&self) -> GuitarProfile {
        self.profile
    }

    /// # Errors
    ///
    /// Propagates the controller's submit error.
    pub fn decode(&mut self, command_id: u8, payload: &[u8]) -> Result<(), DeviceError> {
        match command_id {
            command_ids::INPUT => match GuitarReport::parse(payload) {
                Some(report) => self.apply_report(&report),
                None => Ok(()),
            },
            command_ids::KEYSTROKE => {
                apply_guide_key(&mut self.controller, payload, self.map_guide_button)
            }
            _ => Ok(()),
        }
    }

    /// # Errors
    ///
    /// Propagates the controller's submit error.
    pub fn apply_report(&mut self, report: &GuitarReport) -> Result<(), DeviceError> {
        let profile = self.profile;
        self.controller.update(|c| write_guitar_state(c, report, profile))
    }

    /// Queue a keep-alive when the alternate profile's interval has elapsed.
    pub fn poll(&mut self, now: Instant, outbox: &mut Outbox) {
        if self.profile != GuitarProfile::Alternate {
            return;
        }
        let due = self
            .last_keep_alive
            .is_none_or(|last| now.saturating_duration_since(last) >= self.keep_alive_interval);
        if due {
            outbox.push(OutgoingMessage::keep_alive());
            self.last_keep_alive = Some(now);
        }
    }
}

pub(crate) fn write_guitar_state(
    c: &mut dyn VirtualController,
    report: &GuitarReport,
    profile: GuitarProfile,
) {
    apply_shared_buttons(report.buttons, c);

    let frets = report.frets();
    c.set_button(ControllerButton::A, frets & guitar_report::GREEN != 0);
    c.set_button(ControllerButton::B, frets & guitar_report::RED != 0);
    c.set_button(ControllerButton::Y, frets & guitar_report::YELLOW != 0);
    c.set_button(ControllerButton::X, frets & guitar_report::BLUE != 0);
    c.set_button(ControllerButton::LeftShoulder, frets & guitar_report::ORANGE != 0);
    c.set_button(ControllerButton::LeftThumb, report.lower_fret_active());

    c.set_axis(ControllerAxis::RightY, byte_to_axis(report.tilt));
    match profile {
        GuitarProfile::Standard => {
            c.set_axis(ControllerAxis::RightX, byte_to_axis(report.whammy));
            c.set_axis(ControllerAxis::LeftX, byte_to_axis(report.pickup));
        }
        GuitarProfile::Alternate => {
            c.set_axis(ControllerAxis::RightX, byte_to_axis_centered(report.whammy));
            c.set_axis(ControllerAxis::LeftX, pickup_plateau(report.pickup));
        }
    }
}
