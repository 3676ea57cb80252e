//! Controller backend that logs submitted state instead of driving an
//! emulator.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use riffbridge_errors::DeviceError;
use riffbridge_mappers::{
    BackendKind, ControllerAxis, ControllerBackend, ControllerButton, ControllerSlider,
    VirtualController,
};
use tracing::info;

#[derive(Debug, Default)]
struct Counters {
    live: AtomicUsize,
    created: AtomicUsize,
    submitted: AtomicUsize,
}

#[derive(Debug, Clone)]
pub struct LoggingBackend {
    kind: BackendKind,
    capacity: usize,
    counters: Arc<Counters>,
}

impl LoggingBackend {
    pub fn new(kind: BackendKind, capacity: usize) -> Self {
        Self {
            kind,
            capacity,
            counters: Arc::new(Counters::default()),
        }
    }

    pub fn live(&self) -> usize {
        self.counters.live.load(Ordering::Acquire)
    }

    pub fn created(&self) -> usize {
        self.counters.created.load(Ordering::Acquire)
    }

    pub fn submitted(&self) -> usize {
        self.counters.submitted.load(Ordering::Acquire)
    }
}

impl ControllerBackend for LoggingBackend {
    fn kind(&self) -> BackendKind {
        self.kind
    }

    fn create_controller(&self) -> Result<Box<dyn VirtualController>, DeviceError> {
        self.counters
            .live
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |live| {
                (live < self.capacity).then(|| live.saturating_add(1))
            })
            .map_err(|live| {
                let kind = self.kind;
                let capacity = self.capacity;
                DeviceError::no_free_slot(format!("{kind} ({live} of {capacity} in use)"))
            })?;
        let id = self.counters.created.fetch_add(1, Ordering::AcqRel);
        info!(controller = id, backend = %self.kind, "controller created");
        Ok(Box::new(LoggingController {
            id,
            counters: Arc::clone(&self.counters),
            buttons: BTreeSet::new(),
            axes: BTreeMap::new(),
            sliders: BTreeMap::new(),
        }))
    }
}

struct LoggingController {
    id: usize,
    counters: Arc<Counters>,
    buttons: BTreeSet<ControllerButton>,
    axes: BTreeMap<ControllerAxis, i16>,
    sliders: BTreeMap<ControllerSlider, u8>,
}

impl VirtualController for LoggingController {
    fn set_button(&mut self, button: ControllerButton, pressed: bool) {
        if pressed {
            self.buttons.insert(button);
        } else {
            self.buttons.remove(&button);
        }
    }

    fn set_axis(&mut self, axis: ControllerAxis, value: i16) {
        self.axes.insert(axis, value);
    }

    fn set_slider(&mut self, slider: ControllerSlider, value: u8) {
        self.sliders.insert(slider, value);
    }

    fn submit(&mut self) -> Result<(), DeviceError> {
        self.counters.submitted.fetch_add(1, Ordering::AcqRel);
        info!(
            controller = self.id,
            buttons = ?self.buttons,
            axes = ?self.axes,
            sliders = ?self.sliders,
            "controller state"
        );
        Ok(())
    }
}

impl Drop for LoggingController {
    fn drop(&mut self) {
        self.counters.live.fetch_sub(1, Ordering::AcqRel);
        info!(controller = self.id, "controller released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_full_backend_when_creating_then_no_free_slot() -> Result<(), DeviceError> {
        let backend = LoggingBackend::new(BackendKind::Gamepad, 1);
        let first = backend.create_controller()?;
        let second = backend.create_controller();
        assert!(matches!(second, Err(DeviceError::NoFreeSlot { .. })));
        drop(first);
        assert_eq!(backend.live(), 0);
        let third = backend.create_controller()?;
        assert_eq!(backend.live(), 1);
        assert_eq!(backend.created(), 2);
        drop(third);
        Ok(())
    }

    #[test]
    fn given_controller_when_submitting_then_submissions_counted() -> Result<(), DeviceError> {
        let backend = LoggingBackend::new(BackendKind::Joystick, 4);
        let mut controller = backend.create_controller()?;
        controller.set_button(ControllerButton::A, true);
        controller.set_axis(ControllerAxis::RightX, -1);
        controller.set_slider(ControllerSlider::LeftTrigger, 9);
        controller.submit()?;
        controller.set_button(ControllerButton::A, false);
        controller.submit()?;
        assert_eq!(backend.submitted(), 2);
        Ok(())
    }
}
