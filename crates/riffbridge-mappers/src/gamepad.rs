//! Straight-through gamepad mapper, enabled for debugging.

use riffbridge_errors::DeviceError;
use riffbridge_gip_protocol::{GamepadReport, buttons, command_ids};
use tracing::debug;

use crate::controller::{
    ControllerAxis, ControllerBackend, ControllerButton, ControllerHandle, ControllerSlider,
    VirtualController, apply_guide_key, apply_shared_buttons,
};
use crate::options::MapperOptions;
use crate::scaling::trigger_to_slider;

pub struct GamepadMapper {
    controller: ControllerHandle,
    map_guide_button: bool,
}

impl std::fmt::Debug for GamepadMapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GamepadMapper")
            .field("controller", &self.controller)
            .finish()
    }
}

impl GamepadMapper {
    /// # Errors
    ///
    /// Backend allocation failure.
    pub fn new(
        backend: &dyn ControllerBackend,
        options: &MapperOptions,
    ) -> Result<Self, DeviceError> {
        let controller = ControllerHandle::new(backend.create_controller()?, "gamepad");
        debug!(backend = %backend.kind(), "gamepad mapper created");
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
            command_ids::INPUT => match GamepadReport::parse(payload) {
                Some(report) => self.controller.update(|c| write_gamepad_state(c, &report)),
                None => Ok(()),
            },
            command_ids::KEYSTROKE => {
                apply_guide_key(&mut self.controller, payload, self.map_guide_button)
            }
            _ => Ok(()),
        }
    }
}

fn write_gamepad_state(c: &mut dyn VirtualController, report: &GamepadReport) {
    let b = report.buttons;
    apply_shared_buttons(b, c);
    c.set_button(ControllerButton::A, b & buttons::A != 0);
    c.set_button(ControllerButton::B, b & buttons::B != 0);
    c.set_button(ControllerButton::X, b & buttons::X != 0);
    c.set_button(ControllerButton::Y, b & buttons::Y != 0);
    c.set_button(ControllerButton::LeftShoulder, b & buttons::LEFT_BUMPER != 0);
    c.set_button(ControllerButton::RightShoulder, b & buttons::RIGHT_BUMPER != 0);
    c.set_button(ControllerButton::LeftThumb, b & buttons::LEFT_STICK != 0);
    c.set_button(ControllerButton::RightThumb, b & buttons::RIGHT_STICK != 0);

    c.set_slider(ControllerSlider::LeftTrigger, trigger_to_slider(report.left_trigger));
    c.set_slider(ControllerSlider::RightTrigger, trigger_to_slider(report.right_trigger));

    c.set_axis(ControllerAxis::LeftX, report.left_stick_x);
    c.set_axis(ControllerAxis::LeftY, report.left_stick_y);
    c.set_axis(ControllerAxis::RightX, report.right_stick_x);
    c.set_axis(ControllerAxis::RightY, report.right_stick_y);
}
