//! In-memory controller backend for tests and dry runs.
//!
//! Records every submitted state and counts handle allocations and releases,
//! so tests can check the submit-once-per-report and release-exactly-once
//! contracts.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, MutexGuard};

use riffbridge_errors::DeviceError;

use crate::controller::{
    BackendKind, ControllerAxis, ControllerBackend, ControllerButton, ControllerSlider,
    VirtualController,
};

/// Controller state at the moment of a submit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ControllerSnapshot {
    /// Id of the controller that submitted, in allocation order.
    pub controller: usize,
    pub buttons: BTreeSet<ControllerButton>,
    pub axes: BTreeMap<ControllerAxis, i16>,
    pub sliders: BTreeMap<ControllerSlider, u8>,
}

impl ControllerSnapshot {
    pub fn pressed(&self, button: ControllerButton) -> bool {
        self.buttons.contains(&button)
    }

    /// Axis value; unset axes read as 0.
    pub fn axis(&self, axis: ControllerAxis) -> i16 {
        self.axes.get(&axis).copied().unwrap_or(0)
    }

    /// Slider value; unset sliders read as 0.
    pub fn slider(&self, slider: ControllerSlider) -> u8 {
        self.sliders.get(&slider).copied().unwrap_or(0)
    }
}

#[derive(Debug)]
struct MockState {
    capacity: usize,
    live: usize,
    created: usize,
    released: usize,
    ready: bool,
    disconnected: bool,
    submissions: Vec<ControllerSnapshot>,
}

/// Backend with a fixed number of slots.
#[derive(Debug, Clone)]
pub struct MockBackend {
    kind: BackendKind,
    state: Arc<Mutex<MockState>>,
}

impl MockBackend {
    pub fn new(kind: BackendKind, capacity: usize) -> Self {
        Self {
            kind,
            state: Arc::new(Mutex::new(MockState {
                capacity,
                live: 0,
                created: 0,
                released: 0,
                ready: true,
                disconnected: false,
                submissions: Vec::new(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Controllers handed out so far.
    pub fn created(&self) -> usize {
        self.lock().created
    }

    /// Controllers dropped so far.
    pub fn released(&self) -> usize {
        self.lock().released
    }

    /// Controllers currently alive.
    pub fn live(&self) -> usize {
        self.lock().live
    }

    pub fn submissions(&self) -> Vec<ControllerSnapshot> {
        self.lock().submissions.clone()
    }

    pub fn last_submission(&self) -> Option<ControllerSnapshot> {
        self.lock().submissions.last().cloned()
    }

    pub fn clear_submissions(&self) {
        self.lock().submissions.clear();
    }

    /// Simulate the backend's connect handshake being incomplete.
    pub fn set_ready(&self, ready: bool) {
        self.lock().ready = ready;
    }

    /// Make every subsequent submit and allocation report a vanished device.
    pub fn set_disconnected(&self, disconnected: bool) {
        self.lock().disconnected = disconnected;
    }
}

impl ControllerBackend for MockBackend {
    fn kind(&self) -> BackendKind {
        self.kind
    }

    fn create_controller(&self) -> Result<Box<dyn VirtualController>, DeviceError> {
        let mut state = self.lock();
        if state.disconnected {
            return Err(DeviceError::disconnected(format!("mock {} backend", self.kind)));
        }
        if state.live >= state.capacity {
            return Err(DeviceError::no_free_slot(self.kind.to_string()));
        }
        state.live += 1;
        state.created += 1;
        let id = state.created;
        drop(state);

        Ok(Box::new(MockController {
            current: ControllerSnapshot {
                controller: id,
                ..ControllerSnapshot::default()
            },
            state: Arc::clone(&self.state),
        }))
    }
}

struct MockController {
    current: ControllerSnapshot,
    state: Arc<Mutex<MockState>>,
}

impl MockController {
    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl VirtualController for MockController {
    fn set_button(&mut self, button: ControllerButton, pressed: bool) {
        if pressed {
            self.current.buttons.insert(button);
        } else {
            self.current.buttons.remove(&button);
        }
    }

    fn set_axis(&mut self, axis: ControllerAxis, value: i16) {
        self.current.axes.insert(axis, value);
    }

    fn set_slider(&mut self, slider: ControllerSlider, value: u8) {
        self.current.sliders.insert(slider, value);
    }

    fn submit(&mut self) -> Result<(), DeviceError> {
        let snapshot = self.current.clone();
        let mut state = self.lock();
        if state.disconnected {
            return Err(DeviceError::disconnected(format!(
                "mock controller {}",
                snapshot.controller
            )));
        }
        state.submissions.push(snapshot);
        Ok(())
    }

    fn is_ready(&self) -> bool {
        self.lock().ready
    }
}

impl Drop for MockController {
    fn drop(&mut self) {
        let mut state = self.lock();
        state.live = state.live.saturating_sub(1);
        state.released += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_limits_live_controllers() {
        let backend = MockBackend::new(BackendKind::Joystick, 1);
        let first = backend.create_controller();
        assert!(first.is_ok());
        assert!(matches!(
            backend.create_controller(),
            Err(DeviceError::NoFreeSlot { .. })
        ));
        drop(first);
        assert_eq!(backend.released(), 1);
        assert!(backend.create_controller().is_ok());
        assert_eq!(backend.created(), 2);
    }

    #[test]
    fn state_persists_between_submits() -> Result<(), DeviceError> {
        let backend = MockBackend::new(BackendKind::Gamepad, 1);
        let mut controller = backend.create_controller()?;
        controller.set_button(ControllerButton::A, true);
        controller.submit()?;
        controller.set_axis(ControllerAxis::RightX, -5);
        controller.submit()?;
        let last = backend.last_submission().unwrap_or_default();
        assert!(last.pressed(ControllerButton::A));
        assert_eq!(last.axis(ControllerAxis::RightX), -5);
        assert_eq!(last.slider(ControllerSlider::LeftTrigger), 0);
        Ok(())
    }

    #[test]
    fn disconnected_submit_fails() -> Result<(), DeviceError> {
        let backend = MockBackend::new(BackendKind::Gamepad, 1);
        let mut controller = backend.create_controller()?;
        backend.set_disconnected(true);
        assert!(matches!(controller.submit(), Err(DeviceError::Disconnected(_))));
        assert!(matches!(
            backend.create_controller(),
            Err(DeviceError::Disconnected(_))
        ));
        assert_eq!(backend.created(), 1);
        Ok(())
    }
}
