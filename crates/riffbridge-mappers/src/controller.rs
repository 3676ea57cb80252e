//! Virtual controller sink.
//!
//! The concrete emulators (a joystick-style device and an XInput-style
//! gamepad) live outside this crate; mappers only see [`VirtualController`].

use std::fmt;

use riffbridge_errors::DeviceError;
use serde::{Deserialize, Serialize};

/// Digital controls understood by every backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ControllerButton {
    A,
    B,
    X,
    Y,
    LeftShoulder,
    RightShoulder,
    Back,
    Start,
    Guide,
    LeftThumb,
    RightThumb,
    DpadUp,
    DpadDown,
    DpadLeft,
    DpadRight,
}

/// Signed 16-bit axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ControllerAxis {
    LeftX,
    LeftY,
    RightX,
    RightY,
}

/// Unsigned 8-bit sliders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ControllerSlider {
    LeftTrigger,
    RightTrigger,
}

/// Flavour of emulated device a backend produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Legacy joystick emulator with a fixed button/axis/hat set
    Joystick,
    /// XInput-compatible gamepad emulator
    #[default]
    Gamepad,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Joystick => write!(f, "joystick"),
            BackendKind::Gamepad => write!(f, "gamepad"),
        }
    }
}

/// One emulated controller. Dropping it releases the backend slot.
pub trait VirtualController: Send {
    fn set_button(&mut self, button: ControllerButton, pressed: bool);
    fn set_axis(&mut self, axis: ControllerAxis, value: i16);
    fn set_slider(&mut self, slider: ControllerSlider, value: u8);

    /// Publish every field set since the last submit as one update.
    ///
    /// # Errors
    ///
    /// [`DeviceError::Disconnected`] if the emulated device vanished.
    fn submit(&mut self) -> Result<(), DeviceError>;

    /// False while the backend is still connecting the device.
    fn is_ready(&self) -> bool {
        true
    }
}

/// Factory for emulated controllers.
pub trait ControllerBackend: Send + Sync {
    fn kind(&self) -> BackendKind;

    /// Allocate a controller; may block on the backend's connect handshake.
    ///
    /// # Errors
    ///
    /// [`DeviceError::NoFreeSlot`] when the backend is exhausted.
    fn create_controller(&self) -> Result<Box<dyn VirtualController>, DeviceError>;
}

/// Owned controller with submit-once-per-report semantics.
pub struct ControllerHandle {
    inner: Box<dyn VirtualController>,
    label: &'static str,
}

impl fmt::Debug for ControllerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControllerHandle")
            .field("label", &self.label)
            .field("ready", &self.inner.is_ready())
            .finish()
    }
}

impl ControllerHandle {
    pub fn new(inner: Box<dyn VirtualController>, label: &'static str) -> Self {
        Self { inner, label }
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn is_ready(&self) -> bool {
        self.inner.is_ready()
    }

    /// Fill the controller state for one report and submit it once.
    ///
    /// Reports arriving before the backend is ready are dropped, not queued.
    ///
    /// # Errors
    ///
    /// [`DeviceError::NotReady`] while the backend is still connecting,
    /// otherwise the backend's submit error.
    pub fn update(
        &mut self,
        apply: impl FnOnce(&mut dyn VirtualController),
    ) -> Result<(), DeviceError> {
        if !self.inner.is_ready() {
            return Err(DeviceError::not_ready(self.label));
        }
        apply(self.inner.as_mut());
        self.inner.submit()
    }
}

/// Menu, view and d-pad bits shared by every instrument's button field.
pub(crate) fn apply_shared_buttons(buttons: u16, controller: &mut dyn VirtualController) {
    use riffbridge_gip_protocol::buttons as bits;

    controller.set_button(ControllerButton::Start, buttons & bits::MENU != 0);
    controller.set_button(ControllerButton::Back, buttons & bits::VIEW != 0);
    controller.set_button(ControllerButton::DpadUp, buttons & bits::DPAD_UP != 0);
    controller.set_button(ControllerButton::DpadDown, buttons & bits::DPAD_DOWN != 0);
    controller.set_button(ControllerButton::DpadLeft, buttons & bits::DPAD_LEFT != 0);
    controller.set_button(ControllerButton::DpadRight, buttons & bits::DPAD_RIGHT != 0);
}

/// Map a guide key event onto the guide button, if enabled.
///
/// # Errors
///
/// Propagates the backend's submit error.
pub(crate) fn apply_guide_key(
    controller: &mut ControllerHandle,
    payload: &[u8],
    map_guide_button: bool,
) -> Result<(), DeviceError> {
    if !map_guide_button {
        return Ok(());
    }
    let Some(guide) = riffbridge_gip_protocol::keystrokes(payload)
        .filter(|key| key.is_guide())
        .last()
    else {
        return Ok(());
    };
    controller.update(|c| c.set_button(ControllerButton::Guide, guide.pressed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockBackend;

    #[test]
    fn update_submits_once() -> Result<(), DeviceError> {
        let backend = MockBackend::new(BackendKind::Gamepad, 1);
        let mut handle = ControllerHandle::new(backend.create_controller()?, "test");
        handle.update(|c| {
            c.set_button(ControllerButton::A, true);
            c.set_axis(ControllerAxis::LeftX, 100);
        })?;
        assert_eq!(backend.submissions().len(), 1);
        Ok(())
    }

    #[test]
    fn not_ready_drops_report() -> Result<(), DeviceError> {
        let backend = MockBackend::new(BackendKind::Gamepad, 1);
        backend.set_ready(false);
        let mut handle = ControllerHandle::new(backend.create_controller()?, "test");
        let mut applied = false;
        let result = handle.update(|_| applied = true);
        assert_eq!(result, Err(DeviceError::not_ready("test")));
        assert!(!applied);
        assert!(backend.submissions().is_empty());

        backend.set_ready(true);
        handle.update(|c| c.set_button(ControllerButton::A, true))?;
        assert_eq!(backend.submissions().len(), 1);
        Ok(())
    }

    #[test]
    fn guide_key_respects_option() -> Result<(), DeviceError> {
        let backend = MockBackend::new(BackendKind::Gamepad, 1);
        let mut handle = ControllerHandle::new(backend.create_controller()?, "test");
        apply_guide_key(&mut handle, &[0x01, 0x5B], false)?;
        assert!(backend.submissions().is_empty());

        apply_guide_key(&mut handle, &[0x01, 0x5B], true)?;
        assert!(
            backend
                .last_submission()
                .is_some_and(|s| s.pressed(ControllerButton::Guide))
        );

        // Other key codes are ignored.
        apply_guide_key(&mut handle, &[0x01, 0x10], true)?;
        assert_eq!(backend.submissions().len(), 1);
        Ok(())
    }
}
