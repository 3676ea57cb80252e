//! The closed mapper family.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use riffbridge_errors::DeviceError;
use riffbridge_gip_protocol::{InterfaceKind, Outbox};

use crate::controller::ControllerBackend;
use crate::drums::DrumMapper;
use crate::fallback::FallbackMapper;
use crate::gamepad::GamepadMapper;
use crate::guitar::{GuitarMapper, GuitarProfile};
use crate::legacy::WirelessLegacyMapper;
use crate::options::MapperOptions;
use crate::six_fret::SixFretMapper;

/// Which mapper a [`DeviceMapper`] is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapperKind {
    Guitar,
    GuitarAlternate,
    Drums,
    SixFretGuitar,
    Gamepad,
    Fallback,
    WirelessLegacy,
}

impl fmt::Display for MapperKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MapperKind::Guitar => "guitar",
            MapperKind::GuitarAlternate => "guitar (alternate)",
            MapperKind::Drums => "drums",
            MapperKind::SixFretGuitar => "six-fret guitar",
            MapperKind::Gamepad => "gamepad",
            MapperKind::Fallback => "fallback",
            MapperKind::WirelessLegacy => "wireless legacy adapter",
        };
        f.write_str(name)
    }
}

#[derive(Debug)]
pub enum DeviceMapper {
    Guitar(GuitarMapper),
    Drums(DrumMapper),
    SixFretGuitar(SixFretMapper),
    Gamepad(GamepadMapper),
    Fallback(FallbackMapper),
    WirelessLegacy(WirelessLegacyMapper),
}

impl DeviceMapper {
    /// Build the mapper for a recognized interface.
    ///
    /// # Errors
    ///
    /// Backend allocation failure.
    pub fn for_interface(
        interface: InterfaceKind,
        backend: &Arc<dyn ControllerBackend>,
        options: &MapperOptions,
        outbox: &mut Outbox,
    ) -> Result<Self, DeviceError> {
        let mapper = match interface {
            InterfaceKind::Guitar => DeviceMapper::Guitar(GuitarMapper::new(
                backend.as_ref(),
                GuitarProfile::Standard,
                options,
                outbox,
            )?),
            InterfaceKind::GuitarAlt => DeviceMapper::Guitar(GuitarMapper::new(
                backend.as_ref(),
                GuitarProfile::Alternate,
                options,
                outbox,
            )?),
            InterfaceKind::Drums => {
                DeviceMapper::Drums(DrumMapper::new(backend.as_ref(), options)?)
            }
            InterfaceKind::SixFretGuitar => {
                DeviceMapper::SixFretGuitar(SixFretMapper::new(backend.as_ref(), options)?)
            }
            InterfaceKind::Gamepad => {
                DeviceMapper::Gamepad(GamepadMapper::new(backend.as_ref(), options)?)
            }
            InterfaceKind::WirelessLegacy => DeviceMapper::WirelessLegacy(
                WirelessLegacyMapper::new(Arc::clone(backend), options.clone(), outbox),
            ),
        };
        Ok(mapper)
    }

    /// # Errors
    ///
    /// Backend allocation failure.
    pub fn fallback(
        backend: &Arc<dyn ControllerBackend>,
        options: &MapperOptions,
    ) -> Result<Self, DeviceError> {
        Ok(DeviceMapper::Fallback(FallbackMapper::new(
            backend.as_ref(),
            options,
        )?))
    }

    pub fn kind(&self) -> MapperKind {
        match self {
            DeviceMapper::Guitar(m) => match m.profile() {
                GuitarProfile::Standard => MapperKind::Guitar,
                GuitarProfile::Alternate => MapperKind::GuitarAlternate,
            },
            DeviceMapper::Drums(_) => MapperKind::Drums,
            DeviceMapper::SixFretGuitar(_) => MapperKind::SixFretGuitar,
            DeviceMapper::Gamepad(_) => MapperKind::Gamepad,
            DeviceMapper::Fallback(_) => MapperKind::Fallback,
            DeviceMapper::WirelessLegacy(_) => MapperKind::WirelessLegacy,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, DeviceMapper::Fallback(_))
    }

    /// Decode one message. Commands the mapper does not know are a no-op.
    ///
    /// # Errors
    ///
    /// [`DeviceError::Disconnected`] if the controller vanished; other backend
    /// failures as reported by the controller.
    pub fn decode(
        &mut self,
        command_id: u8,
        payload: &[u8],
        outbox: &mut Outbox,
    ) -> Result<(), DeviceError> {
        match self {
            DeviceMapper::Guitar(m) => m.decode(command_id, payload),
            DeviceMapper::Drums(m) => m.decode(command_id, payload),
            DeviceMapper::SixFretGuitar(m) => m.decode(command_id, payload),
            DeviceMapper::Gamepad(m) => m.decode(command_id, payload),
            DeviceMapper::Fallback(m) => m.decode(command_id, payload),
            DeviceMapper::WirelessLegacy(m) => m.decode(command_id, payload, outbox),
        }
    }

    /// Periodic work such as keep-alives.
    pub fn poll(&mut self, now: Instant, outbox: &mut Outbox) {
        match self {
            DeviceMapper::Guitar(m) => m.poll(now, outbox),
            DeviceMapper::WirelessLegacy(m) => m.poll(now, outbox),
            DeviceMapper::Drums(_)
            | DeviceMapper::SixFretGuitar(_)
            | DeviceMapper::Gamepad(_)
            | DeviceMapper::Fallback(_) => {}
        }
    }
}
