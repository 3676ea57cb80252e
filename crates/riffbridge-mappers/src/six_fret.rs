//! Six-fret guitar mapper.
//!
//! Black frets 1-3 map to A, B, Y; white frets 1-3 to X and the shoulders.
//! Strum is an axis of its own (left Y) and also presses d-pad up or down
//! once it leaves the centre band.

use riffbridge_errors::DeviceError;
use riffbridge_gip_protocol::{SixFretReport, command_ids, six_fret_report};
use tracing::debug;

use crate::controller::{
    ControllerAxis, ControllerBackend, ControllerButton, ControllerHandle, VirtualController,
    apply_guide_key,
};
use crate::options::MapperOptions;
use crate::scaling::{byte_to_axis, six_fret_whammy};

/// Strum at or below this reads as d-pad up.
pub const STRUM_UP_THRESHOLD: u8 = 0x40;
/// Strum at or above this reads as d-pad down.
pub const STRUM_DOWN_THRESHOLD: u8 = 0xC0;

pub struct SixFretMapper {
    controller: ControllerHandle,
    map_guide_button: bool,
}

impl std::fmt::Debug for SixFretMapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SixFretMapper")
            .field("controller", &self.controller)
            .finish()
    }
}

impl SixFretMapper {
    /// # Errors
    ///
    /// Backend allocation failure.
    pub fn new(
        backend: &dyn ControllerBackend,
        options: &MapperOptions,
    ) -> Result<Self, DeviceError> {
        let controller = ControllerHandle::new(backend.create_controller()?, "six-fret guitar");
        debug!(backend = %backend.kind(), "six-fret mapper created");
        Ok(Self {
            controller,
            map_guide_button: options.map_guide_button,
        })
    }

    /// # Errors
    ///
    /// Propagates the controller's submit error.
    pub fn decode(&mut self, command_id: u8, payload: &[u8]) -> Result<(), DeviceError> {
        match command_id {
            command_ids::INPUT => match SixFretReport::parse(payload) {
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
    pub fn apply_report(&mut self, report: &SixFretReport) -> Result<(), DeviceError> {
        self.controller.update(|c| write_six_fret_state(c, report))
    }
}

pub(crate) fn write_six_fret_state(c: &mut dyn VirtualController, report: &SixFretReport) {
    use six_fret_report as layout;

    let frets = report.frets;
    c.set_button(ControllerButton::A, frets & layout::BLACK_1 != 0);
    c.set_button(ControllerButton::B, frets & layout::BLACK_2 != 0);
    c.set_button(ControllerButton::Y, frets & layout::BLACK_3 != 0);
    c.set_button(ControllerButton::X, frets & layout::WHITE_1 != 0);
    c.set_button(ControllerButton::LeftShoulder, frets & layout::WHITE_2 != 0);
    c.set_button(ControllerButton::RightShoulder, frets & layout::WHITE_3 != 0);

    let buttons = report.buttons;
    c.set_button(ControllerButton::Back, buttons & layout::HERO_POWER != 0);
    c.set_button(ControllerButton::Start, buttons & layout::PAUSE != 0);
    c.set_button(ControllerButton::LeftThumb, buttons & layout::GHTV != 0);
    c.set_button(
        ControllerButton::DpadUp,
        buttons & layout::DPAD_UP != 0 || report.strum <= STRUM_UP_THRESHOLD,
    );
    c.set_button(
        ControllerButton::DpadDown,
        buttons & layout::DPAD_DOWN != 0 || report.strum >= STRUM_DOWN_THRESHOLD,
    );
    c.set_button(ControllerButton::DpadLeft, buttons & layout::DPAD_LEFT != 0);
    c.set_button(ControllerButton::DpadRight, buttons & layout::DPAD_RIGHT != 0);

    c.set_axis(ControllerAxis::LeftY, byte_to_axis(report.strum));
    c.set_axis(ControllerAxis::RightX, six_fret_whammy(report.whammy));
    c.set_axis(ControllerAxis::RightY, byte_to_axis(report.tilt));
}
