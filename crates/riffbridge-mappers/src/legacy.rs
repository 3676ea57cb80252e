//! Wireless legacy adapter: one device relaying several older instruments.
//!
//! Each connected instrument gets a child mapper keyed by its user index.
//! Relayed input is forwarded to the child as an ordinary input report.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use riffbridge_errors::DeviceError;
use riffbridge_gip_protocol::{
    LegacyConnection, LegacyInput, Outbox, OutgoingMessage, command_ids, legacy,
};
use tracing::{debug, info, warn};

use crate::controller::ControllerBackend;
use crate::drums::DrumMapper;
use crate::guitar::{GuitarMapper, GuitarProfile};
use crate::mapper::DeviceMapper;
use crate::options::MapperOptions;

pub struct WirelessLegacyMapper {
    backend: Arc<dyn ControllerBackend>,
    options: MapperOptions,
    children: BTreeMap<u8, DeviceMapper>,
}

impl std::fmt::Debug for WirelessLegacyMapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WirelessLegacyMapper")
            .field("children", &self.children)
            .finish()
    }
}

impl WirelessLegacyMapper {
    /// Queues a request for the adapter to report its connected instruments.
    pub fn new(
        backend: Arc<dyn ControllerBackend>,
        options: MapperOptions,
        outbox: &mut Outbox,
    ) -> Self {
        outbox.push(OutgoingMessage::request_legacy_devices());
        debug!(backend = %backend.kind(), "wireless legacy mapper created");
        Self {
            backend,
            options,
            children: BTreeMap::new(),
        }
    }

    pub fn child(&self, user_index: u8) -> Option<&DeviceMapper> {
        self.children.get(&user_index)
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// # Errors
    ///
    /// Backend failures from a child other than a disconnect, which only
    /// removes that child.
    pub fn decode(
        &mut self,
        command_id: u8,
        payload: &[u8],
        outbox: &mut Outbox,
    ) -> Result<(), DeviceError> {
        match command_id {
            command_ids::LEGACY_CONNECTION => {
                if let Some(connection) = LegacyConnection::parse(payload) {
                    self.handle_connection(&connection, outbox);
                }
                Ok(())
            }
            command_ids::LEGACY_INPUT => match LegacyInput::parse(payload) {
                Some(input) => self.forward_input(&input, outbox),
                None => Ok(()),
            },
            _ => Ok(()),
        }
    }

    pub fn poll(&mut self, now: Instant, outbox: &mut Outbox) {
        for child in self.children.values_mut() {
            child.poll(now, outbox);
        }
    }

    fn handle_connection(&mut self, connection: &LegacyConnection, outbox: &mut Outbox) {
        let user_index = connection.user_index;
        // Release the old controller before asking the backend for a new one.
        if self.children.remove(&user_index).is_some() {
            debug!(user_index, "legacy instrument slot released");
        }
        if !connection.connected {
            info!(user_index, "legacy instrument disconnected");
            return;
        }

        let child = match connection.subtype {
            legacy::SUBTYPE_GUITAR | legacy::SUBTYPE_GUITAR_ALT | legacy::SUBTYPE_BASS => {
                GuitarMapper::new(
                    self.backend.as_ref(),
                    GuitarProfile::Standard,
                    &self.options,
                    outbox,
                )
                .map(DeviceMapper::Guitar)
            }
            legacy::SUBTYPE_DRUMS => {
                DrumMapper::new(self.backend.as_ref(), &self.options).map(DeviceMapper::Drums)
            }
            subtype => {
                warn!(
                    user_index,
                    subtype = format_args!("{subtype:#04x}"),
                    vendor_id = format_args!("{:#06x}", connection.vendor_id),
                    product_id = format_args!("{:#06x}", connection.product_id),
                    "unsupported legacy instrument"
                );
                return;
            }
        };

        match child {
            Ok(child) => {
                info!(user_index, kind = %child.kind(), "legacy instrument connected");
                self.children.insert(user_index, child);
            }
            Err(e) => warn!(user_index, error = %e, "could not create legacy instrument mapper"),
        }
    }

    fn forward_input(
        &mut self,
        input: &LegacyInput<'_>,
        outbox: &mut Outbox,
    ) -> Result<(), DeviceError> {
        let Some(child) = self.children.get_mut(&input.user_index) else {
            return Ok(());
        };
        match child.decode(command_ids::INPUT, input.report, outbox) {
            Err(e) if !e.is_recoverable() => {
                warn!(
                    user_index = input.user_index,
                    error = %e,
                    "legacy instrument controller lost"
                );
                self.children.remove(&input.user_index);
                Ok(())
            }
            other => other,
        }
    }
}
