//! Mapper for devices whose descriptor named no single known interface.
//!
//! Input reports are told apart by length alone: 10 bytes is a five-fret
//! guitar, 6 bytes a drum kit, 14 bytes a six-fret guitar. The gamepad report
//! is also 14 bytes and is never guessed.

use riffbridge_errors::DeviceError;
use riffbridge_gip_protocol::{
    DrumReport, GuitarReport, SixFretReport, command_ids, drum_report, guitar_report,
    six_fret_report,
};
use tracing::{debug, trace};

use crate::controller::{ControllerBackend, ControllerHandle, apply_guide_key};
use crate::drums::{DpadLatch, write_drum_state};
use crate::guitar::{GuitarProfile, write_guitar_state};
use crate::options::MapperOptions;
use crate::six_fret::write_six_fret_state;

pub struct FallbackMapper {
    controller: ControllerHandle,
    latch: DpadLatch,
    map_guide_button: bool,
}

impl std::fmt::Debug for FallbackMapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FallbackMapper")
            .field("controller", &self.controller)
            .finish()
    }
}

impl FallbackMapper {
    /// # Errors
    ///
    /// Backend allocation failure.
    pub fn new(
        backend: &dyn ControllerBackend,
        options: &MapperOptions,
    ) -> Result<Self, DeviceError> {
        let controller = ControllerHandle::new(backend.create_controller()?, "fallback");
        debug!(backend = %backend.kind(), "fallback mapper created");
        Ok(Self {
            controller,
            latch: DpadLatch::new(),
            map_guide_button: options.map_guide_button,
        })
    }

    /// # Errors
    ///
    /// Propagates the controller's submit error.
    pub fn decode(&mut self, command_id: u8, payload: &[u8]) -> Result<(), DeviceError> {
        match command_id {
            command_ids::INPUT => self.decode_input(payload),
            command_ids::KEYSTROKE => {
                apply_guide_key(&mut self.controller, payload, self.map_guide_button)
            }
            _ => Ok(()),
        }
    }

    fn decode_input(&mut self, payload: &[u8]) -> Result<(), DeviceError> {
        match payload.len() {
            guitar_report::LEN => match GuitarReport::parse(payload) {
                Some(report) => self
                    .controller
                    .update(|c| write_guitar_state(c, &report, GuitarProfile::Standard)),
                None => Ok(()),
            },
            drum_report::LEN => match DrumReport::parse(payload) {
                Some(report) => {
                    self.latch
                        .update(report.yellow_cymbal() != 0, report.blue_cymbal() != 0);
                    let latch = self.latch;
                    self.controller
                        .update(|c| write_drum_state(c, &report, latch))
                }
                None => Ok(()),
            },
            six_fret_report::LEN => match SixFretReport::parse(payload) {
                Some(report) => self.controller.update(|c| write_six_fret_state(c, &report)),
                None => Ok(()),
            },
            len => {
                trace!(len, "input report of unknown length ignored");
                Ok(())
            }
        }
    }
}
