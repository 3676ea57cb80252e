//! Per-device protocol session.
//!
//! A session reassembles chunked messages, drops retransmissions, records the
//! device's arrival and descriptor, and owns the mapper that drives its
//! virtual controller. It is owned by exactly one capture path and needs no
//! locking.

use std::time::Instant;

use riffbridge_errors::{DeviceError, ErrorSeverity, PacketError};
use riffbridge_gip_protocol::{
    ArrivalReport, ChunkAssembler, ChunkOutcome, CommandHeader, Descriptor, Outbox,
    OutgoingMessage, SequenceCounter, SequenceFilter, command_ids, command_name,
    is_ignored_system_command, parse_descriptor, split_message,
};
use riffbridge_mappers::{DeviceMapper, MapperFactory, MapperKind};
use tracing::{debug, error, info, trace, warn};

use crate::context::EngineContext;
use crate::registry::DeviceInfo;

/// What happened to one packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketDisposition {
    /// A complete message was handled
    Dispatched,
    /// Part of a chunked message; more packets needed
    Pending,
    /// Same command and sequence as the previous message; dropped
    Duplicate,
    /// Valid but nothing to do
    Ignored,
}

pub struct ClientSession {
    name: String,
    factory: MapperFactory,
    chunks: ChunkAssembler,
    sequences: SequenceFilter,
    arrival: Option<ArrivalReport>,
    descriptor: Option<Descriptor>,
    mapper: Option<DeviceMapper>,
    backend_exhausted: bool,
    fallback_attempted: bool,
    outbox: Outbox,
    outgoing_sequence: SequenceCounter,
}

impl std::fmt::Debug for ClientSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientSession")
            .field("name", &self.name)
            .field("arrival", &self.arrival)
            .field("mapper", &self.mapper_kind())
            .field("backend_exhausted", &self.backend_exhausted)
            .field("pending_outgoing", &self.outbox.len())
            .finish()
    }
}

impl ClientSession {
    pub fn new(name: impl Into<String>, context: &EngineContext) -> Self {
        Self {
            name: name.into(),
            factory: context.factory().clone(),
            chunks: ChunkAssembler::with_timeout(context.config().chunk_timeout()),
            sequences: SequenceFilter::new(),
            arrival: None,
            descriptor: None,
            mapper: None,
            backend_exhausted: false,
            fallback_attempted: false,
            outbox: Outbox::new(),
            outgoing_sequence: SequenceCounter::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arrival(&self) -> Option<ArrivalReport> {
        self.arrival
    }

    pub fn descriptor(&self) -> Option<&Descriptor> {
        self.descriptor.as_ref()
    }

    pub fn mapper(&self) -> Option<&DeviceMapper> {
        self.mapper.as_ref()
    }

    pub fn mapper_kind(&self) -> Option<MapperKind> {
        self.mapper.as_ref().map(DeviceMapper::kind)
    }

    /// The backend ran out of controller slots; no mapper will be created.
    pub fn is_backend_exhausted(&self) -> bool {
        self.backend_exhausted
    }

    pub fn pending_outgoing(&self) -> usize {
        self.outbox.len()
    }

    /// Handle one protocol message (receiver header already stripped).
    ///
    /// # Errors
    ///
    /// Malformed header, truncated payload or chunk violation. The message is
    /// dropped and the session stays usable.
    pub fn handle_message(
        &mut self,
        message: &[u8],
        now: Instant,
    ) -> Result<PacketDisposition, PacketError> {
        let (header, payload) = split_message(message)?;
        if !header.flags.chunked() {
            return Ok(self.dispatch(&header, payload));
        }

        match self.chunks.push(&header, payload, now) {
            Ok(ChunkOutcome::Empty) => Ok(PacketDisposition::Ignored),
            Ok(ChunkOutcome::Pending) => Ok(PacketDisposition::Pending),
            Ok(ChunkOutcome::Complete(buffer)) => Ok(self.dispatch(&header, &buffer)),
            Err(e) => {
                debug!(
                    session = %self.name,
                    command = format_args!("{:#04x}", header.command_id),
                    error = %e,
                    "chunk sequence dropped"
                );
                Err(e)
            }
        }
    }

    fn dispatch(&mut self, header: &CommandHeader, payload: &[u8]) -> PacketDisposition {
        let command_id = header.command_id;
        if !self.sequences.accept(command_id, header.sequence) {
            trace!(
                session = %self.name,
                command = command_name(command_id),
                sequence = header.sequence,
                "duplicate message dropped"
            );
            return PacketDisposition::Duplicate;
        }

        match command_id {
            command_ids::ARRIVAL => self.handle_arrival(payload),
            command_ids::DESCRIPTOR => self.handle_descriptor(payload),
            id if is_ignored_system_command(id) => PacketDisposition::Ignored,
            id => self.forward(id, payload),
        }
    }

    fn handle_arrival(&mut self, payload: &[u8]) -> PacketDisposition {
        if self.arrival.is_some() {
            return PacketDisposition::Ignored;
        }
        match ArrivalReport::parse(payload) {
            Some(arrival) => {
                info!(
                    session = %self.name,
                    vendor_id = format_args!("{:#06x}", arrival.vendor_id),
                    product_id = format_args!("{:#06x}", arrival.product_id),
                    "device arrived"
                );
                self.arrival = Some(arrival);
                PacketDisposition::Dispatched
            }
            None => {
                debug!(session = %self.name, len = payload.len(), "short arrival message");
                PacketDisposition::Ignored
            }
        }
    }

    fn handle_descriptor(&mut self, payload: &[u8]) -> PacketDisposition {
        if self.descriptor.is_some() {
            return PacketDisposition::Ignored;
        }
        let descriptor = parse_descriptor(payload);
        if !descriptor.is_complete() {
            warn!(
                session = %self.name,
                issues = ?descriptor.issues,
                "descriptor parsed with issues"
            );
        }

        if !self.backend_exhausted {
            if self.mapper.as_ref().is_some_and(DeviceMapper::is_fallback) {
                debug!(session = %self.name, "replacing fallback mapper");
            }
            // Release the fallback's controller before allocating another.
            self.mapper = None;
            match self.factory.try_create(&descriptor, &mut self.outbox) {
                Ok(mapper) => self.mapper = Some(mapper),
                Err(e) => self.note_mapper_failure(&e),
            }
        }
        self.descriptor = Some(descriptor);
        PacketDisposition::Dispatched
    }

    fn forward(&mut self, command_id: u8, payload: &[u8]) -> PacketDisposition {
        if self.mapper.is_none() {
            if command_id != command_ids::INPUT || self.backend_exhausted {
                return PacketDisposition::Ignored;
            }
            if !self.create_fallback() {
                return PacketDisposition::Ignored;
            }
        }

        let Some(mapper) = self.mapper.as_mut() else {
            return PacketDisposition::Ignored;
        };
        if let Err(e) = mapper.decode(command_id, payload, &mut self.outbox) {
            self.note_decode_failure(command_id, &e);
        }
        PacketDisposition::Dispatched
    }

    /// Guess a mapper from the input report length. Only the first attempt
    /// per session is logged above debug level.
    fn create_fallback(&mut self) -> bool {
        let first_attempt = !self.fallback_attempted;
        self.fallback_attempted = true;
        if first_attempt {
            warn!(
                session = %self.name,
                "input before descriptor, guessing instrument from report length"
            );
        }
        match self.factory.try_create_fallback() {
            Ok(mapper) => {
                self.mapper = Some(mapper);
                true
            }
            Err(e) if first_attempt => {
                self.note_mapper_failure(&e);
                false
            }
            Err(e) => {
                self.backend_exhausted |= e.is_exhausted();
                debug!(session = %self.name, error = %e, "fallback mapper still unavailable");
                false
            }
        }
    }

    fn note_decode_failure(&mut self, command_id: u8, error: &DeviceError) {
        match error.severity() {
            ErrorSeverity::Warning => trace!(
                session = %self.name,
                command = command_name(command_id),
                error = %error,
                "report dropped"
            ),
            ErrorSeverity::Error => warn!(
                session = %self.name,
                command = command_name(command_id),
                error = %error,
                "mapper failed to decode"
            ),
            ErrorSeverity::Critical => self.restart_handshake(error),
        }
    }

    fn note_mapper_failure(&mut self, error: &DeviceError) {
        if error.is_exhausted() {
            self.backend_exhausted = true;
        }
        if error.is_recoverable() {
            warn!(session = %self.name, error = %error, "no mapper for device");
        } else {
            error!(session = %self.name, error = %error, "controller backend unavailable");
        }
    }

    /// Forget everything learned from the device and ask it to reset, so it
    /// announces itself again.
    fn restart_handshake(&mut self, error: &DeviceError) {
        warn!(session = %self.name, error = %error, "controller lost, resetting device");
        self.mapper = None;
        self.arrival = None;
        self.descriptor = None;
        self.sequences.reset();
        self.chunks.reset();
        self.outbox.push(OutgoingMessage::device_reset());
    }

    /// Periodic work for the mapper, such as keep-alives.
    pub fn poll(&mut self, now: Instant) {
        if let Some(mapper) = self.mapper.as_mut() {
            mapper.poll(now, &mut self.outbox);
        }
    }

    /// Encode every queued host-bound message, assigning sequence numbers.
    ///
    /// Call after every [`handle_message`](Self::handle_message); past
    /// [`Outbox::CAPACITY`] undrained messages the oldest are dropped.
    pub fn drain_outgoing(&mut self) -> Vec<Vec<u8>> {
        self.outbox
            .drain()
            .into_iter()
            .map(|message| message.encode(self.outgoing_sequence.advance()))
            .collect()
    }

    /// Release the mapper and queue a device reset.
    pub fn shutdown(&mut self) {
        self.mapper = None;
        self.chunks.reset();
        self.outbox.push(OutgoingMessage::device_reset());
        debug!(session = %self.name, "session shut down");
    }

    /// Copy what the session knows into a registry entry.
    pub fn fill_info(&self, info: &mut DeviceInfo) {
        info.vendor_id = self.arrival.map(|a| a.vendor_id);
        info.product_id = self.arrival.map(|a| a.product_id);
        info.mapper = self.mapper_kind();
    }
}
