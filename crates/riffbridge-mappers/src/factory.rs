//! Mapper selection from a parsed descriptor.

use std::sync::Arc;

use riffbridge_errors::DeviceError;
use riffbridge_gip_protocol::{Descriptor, InterfaceKind, Outbox, interface_kind};
use tracing::{info, warn};
use uuid::Uuid;

use crate::controller::{BackendKind, ControllerBackend};
use crate::mapper::DeviceMapper;
use crate::options::MapperOptions;

/// Outcome of matching a descriptor's interfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapperSelection {
    Interface(InterfaceKind),
    /// Zero or several recognized interfaces
    Fallback,
}

/// Builds mappers against one controller backend.
#[derive(Clone)]
pub struct MapperFactory {
    backend: Arc<dyn ControllerBackend>,
    options: MapperOptions,
}

impl std::fmt::Debug for MapperFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapperFactory")
            .field("backend", &self.backend.kind())
            .field("options", &self.options)
            .finish()
    }
}

impl MapperFactory {
    pub fn new(backend: Arc<dyn ControllerBackend>, options: MapperOptions) -> Self {
        Self { backend, options }
    }

    pub fn options(&self) -> &MapperOptions {
        &self.options
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.backend.kind()
    }

    /// Exactly one recognized interface GUID selects its mapper.
    pub fn select(&self, descriptor: &Descriptor) -> MapperSelection {
        let recognized: Vec<(Uuid, InterfaceKind)> = descriptor
            .interface_guids
            .iter()
            .filter_map(|guid| interface_kind(guid).map(|kind| (*guid, kind)))
            .filter(|(_, kind)| {
                *kind != InterfaceKind::Gamepad || self.options.enable_debug_gamepad
            })
            .collect();

        match recognized.as_slice() {
            [(_, kind)] => MapperSelection::Interface(*kind),
            _ => {
                let guids: Vec<String> = descriptor
                    .interface_guids
                    .iter()
                    .map(Uuid::to_string)
                    .collect();
                warn!(
                    recognized = recognized.len(),
                    interfaces = ?guids,
                    "no single known interface, using fallback mapper"
                );
                MapperSelection::Fallback
            }
        }
    }

    /// # Errors
    ///
    /// Backend allocation failure.
    pub fn try_create(
        &self,
        descriptor: &Descriptor,
        outbox: &mut Outbox,
    ) -> Result<DeviceMapper, DeviceError> {
        let mapper = match self.select(descriptor) {
            MapperSelection::Interface(kind) => {
                DeviceMapper::for_interface(kind, &self.backend, &self.options, outbox)?
            }
            MapperSelection::Fallback => self.try_create_fallback()?,
        };
        info!(kind = %mapper.kind(), "mapper selected");
        Ok(mapper)
    }

    /// Like [`try_create`](Self::try_create), logging the failure instead.
    pub fn create(&self, descriptor: &Descriptor, outbox: &mut Outbox) -> Option<DeviceMapper> {
        self.try_create(descriptor, outbox)
            .map_err(|e| warn!(error = %e, "mapper creation failed"))
            .ok()
    }

    /// # Errors
    ///
    /// Backend allocation failure.
    pub fn try_create_fallback(&self) -> Result<DeviceMapper, DeviceError> {
        DeviceMapper::fallback(&self.backend, &self.options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockBackend;
    use riffbridge_gip_protocol::interface_guids;
    use std::collections::BTreeSet;

    fn descriptor(guids: &[Uuid]) -> Descriptor {
        Descriptor {
            interface_guids: guids.iter().copied().collect::<BTreeSet<_>>(),
            ..Descriptor::default()
        }
    }

    fn factory(options: MapperOptions) -> (MockBackend, MapperFactory) {
        let backend = MockBackend::new(BackendKind::Gamepad, 4);
        let factory = MapperFactory::new(Arc::new(backend.clone()), options);
        (backend, factory)
    }

    #[test]
    fn single_known_interface_selects() {
        let (_, factory) = factory(MapperOptions::default());
        let d = descriptor(&[interface_guids::DRUMS, interface_guids::NAVIGATION]);
        assert_eq!(factory.select(&d), MapperSelection::Interface(InterfaceKind::Drums));
    }

    #[test]
    fn zero_or_many_fall_back() {
        let (_, factory) = factory(MapperOptions::default());
        assert_eq!(factory.select(&descriptor(&[])), MapperSelection::Fallback);
        let d = descriptor(&[interface_guids::GUITAR, interface_guids::DRUMS]);
        assert_eq!(factory.select(&d), MapperSelection::Fallback);
    }

    #[test]
    fn gamepad_needs_debug_option() {
        let (_, plain) = factory(MapperOptions::default());
        let d = descriptor(&[interface_guids::GAMEPAD]);
        assert_eq!(plain.select(&d), MapperSelection::Fallback);

        let (_, debug) = factory(MapperOptions {
            enable_debug_gamepad: true,
            ..MapperOptions::default()
        });
        assert_eq!(debug.select(&d), MapperSelection::Interface(InterfaceKind::Gamepad));
    }

    #[test]
    fn exhausted_backend_yields_no_mapper() {
        let backend = MockBackend::new(BackendKind::Joystick, 0);
        let factory = MapperFactory::new(Arc::new(backend), MapperOptions::default());
        let mut outbox = Outbox::new();
        let d = descriptor(&[interface_guids::GUITAR]);
        assert!(factory.create(&d, &mut outbox).is_none());
        assert!(matches!(
            factory.try_create(&d, &mut outbox),
            Err(DeviceError::NoFreeSlot { .. })
        ));
    }
}
