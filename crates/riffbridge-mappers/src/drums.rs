//! Drum kit mapper.
//!
//! ## Mapping
//! - Red B, yellow Y, blue X, green A; a colour is lit by its pad or its
//!   cymbal.
//! - Any pad presses right thumb, any cymbal right shoulder.
//! - Kick 1 left shoulder, kick 2 left thumb.
//! - Velocities: red left X (positive half), yellow left Y (negative half),
//!   blue right X (positive half), green right Y (negative half).
//! - Yellow and blue cymbals drive d-pad up and down through [`DpadLatch`].

use riffbridge_errors::DeviceError;
use riffbridge_gip_protocol::{DrumReport, command_ids};
use tracing::debug;

use crate::controller::{
    ControllerAxis, ControllerBackend, ControllerButton, ControllerHandle, VirtualController,
    apply_guide_key, apply_shared_buttons,
};
use crate::options::MapperOptions;
use crate::scaling::{velocity_negative, velocity_positive};

/// Emulates the kit's cymbal-as-d-pad wiring, which can show only one
/// direction at a time.
///
/// When both cymbals are first struck together yellow wins. A latched
/// direction stays until its cymbal is released, even if the other cymbal is
/// hit meanwhile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DpadLatch {
    previous: u8,
    latched: u8,
}

impl DpadLatch {
    pub const YELLOW_BIT: u8 = 0x01;
    pub const BLUE_BIT: u8 = 0x02;

    pub const fn new() -> Self {
        Self {
            previous: 0,
            latched: 0,
        }
    }

    /// Feed the cymbal state of one report.
    pub fn update(&mut self, yellow_cymbal: bool, blue_cymbal: bool) {
        let mut mask = 0;
        if yellow_cymbal {
            mask |= Self::YELLOW_BIT;
        }
        if blue_cymbal {
            mask |= Self::BLUE_BIT;
        }
        if mask == self.previous {
            return;
        }
        self.previous = mask;

        if mask == 0 {
            self.latched = 0;
            return;
        }
        if self.latched != 0 {
            self.latched &= mask;
        }
        if self.latched == 0 {
            self.latched = if mask & Self::YELLOW_BIT != 0 {
                Self::YELLOW_BIT
            } else {
                Self::BLUE_BIT
            };
        }
    }

    pub fn up(&self) -> bool {
        self.latched & Self::YELLOW_BIT != 0
    }

    pub fn down(&self) -> bool {
        self.latched & Self::BLUE_BIT != 0
    }
}

pub struct DrumMapper {
    controller: ControllerHandle,
    latch: DpadLatch,
    map_guide_button: bool,
}

impl std::fmt::Debug for DrumMapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DrumMapper")
            .field("latch", &self.latch)
            .field("controller", &self.controller)
            .finish()
    }
}

impl DrumMapper {
    /// # Errors
    ///
    /// Backend allocation failure.
    pub fn new(
        backend: &dyn ControllerBackend,
        options: &MapperOptions,
    ) -> Result<Self, DeviceError> {
        let controller = ControllerHandle::new(backend.create_controller()?, "drums");
        debug!(backend = %backend.kind(), "drum mapper created");
        Ok(Self {
            controller,
            latch: DpadLatch::new(),
            map_guide_button: options.map_guide_button,
        })
    }

    pub fn latch(&self) -> DpadLatch {
        self.latch
    }

    /// # Errors
    ///
    /// Propagates the controller's submit error.
    pub fn decode(&mut self, command_id: u8, payload: &[u8]) -> Result<(), DeviceError> {
        match command_id {
            command_ids::INPUT => match DrumReport::parse(payload) {
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
    pub fn apply_report(&mut self, report: &DrumReport) -> Result<(), DeviceError> {
        self.latch
            .update(report.yellow_cymbal() != 0, report.blue_cymbal() != 0);
        let latch = self.latch;
        self.controller.update(|c| write_drum_state(c, report, latch))
    }
}

pub(crate) fn write_drum_state(
    c: &mut dyn VirtualController,
    report: &DrumReport,
    latch: DpadLatch,
) {
    use riffbridge_gip_protocol::buttons;

    apply_shared_buttons(report.buttons, c);
    c.set_button(
        ControllerButton::DpadUp,
        latch.up() || report.buttons & buttons::DPAD_UP != 0,
    );
    c.set_button(
        ControllerButton::DpadDown,
        latch.down() || report.buttons & buttons::DPAD_DOWN != 0,
    );

    let red = report.red_pad();
    let yellow = report.yellow_pad().max(report.yellow_cymbal());
    let blue = report.blue_pad().max(report.blue_cymbal());
    let green = report.green_pad().max(report.green_cymbal());

    c.set_button(ControllerButton::B, red != 0);
    c.set_button(ControllerButton::Y, yellow != 0);
    c.set_button(ControllerButton::X, blue != 0);
    c.set_button(ControllerButton::A, green != 0);

    c.set_button(ControllerButton::RightThumb, report.pads != 0);
    c.set_button(ControllerButton::RightShoulder, report.cymbals != 0);
    c.set_button(ControllerButton::LeftShoulder, report.kick_1());
    c.set_button(ControllerButton::LeftThumb, report.kick_2());

    c.set_axis(ControllerAxis::LeftX, velocity_positive(red));
    c.set_axis(ControllerAxis::LeftY, velocity_negative(yellow));
    c.set_axis(ControllerAxis::RightX, velocity_positive(blue));
    c.set_axis(ControllerAxis::RightY, velocity_negative(green));
}
