//! Host-to-device control messages.
//!
//! Mappers and sessions never write to a transport. They queue messages in an
//! [`Outbox`] and whoever owns the transport drains it and assigns sequence
//! numbers at send time. Nothing here waits for an acknowledgement.

use std::collections::VecDeque;

use tracing::debug;

use crate::command::command_ids;
use crate::header::{CommandHeader, HeaderFlags, flags};

/// Power mode payloads.
pub mod power_mode {
    pub const RESET: u8 = 0x07;
}

/// LED modes.
pub mod led_mode {
    pub const ON: u8 = 0x01;
}

/// A message waiting to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub command_id: u8,
    pub flags: HeaderFlags,
    pub payload: Vec<u8>,
}

impl OutgoingMessage {
    pub fn new(command_id: u8, flags: HeaderFlags, payload: Vec<u8>) -> Self {
        Self {
            command_id,
            flags,
            payload,
        }
    }

    fn system(command_id: u8, payload: Vec<u8>) -> Self {
        Self::new(command_id, HeaderFlags::from_bits(flags::SYSTEM), payload)
    }

    /// Ask the device to reset; sent on capture stop and after a disconnect so
    /// the device announces itself again.
    pub fn device_reset() -> Self {
        Self::system(command_ids::POWER_MODE, vec![power_mode::RESET])
    }

    /// Periodic keep-alive for devices that power down without host traffic.
    pub fn keep_alive() -> Self {
        Self::system(command_ids::STATUS, vec![0x00])
    }

    pub fn led(mode: u8, brightness: u8) -> Self {
        Self::system(command_ids::LED, vec![0x00, mode, brightness])
    }

    /// Ask a wireless legacy adapter to report its connected sub-devices.
    pub fn request_legacy_devices() -> Self {
        Self::system(command_ids::LEGACY_REQUEST_DEVICES, Vec::new())
    }

    /// Encode with the given sequence number.
    pub fn encode(&self, sequence: u8) -> Vec<u8> {
        let data_length = u32::try_from(self.payload.len()).unwrap_or(u32::MAX);
        let header = CommandHeader::new(self.command_id, self.flags, sequence, data_length);
        let mut out = Vec::with_capacity(header.encoded_len() + self.payload.len());
        header.encode(&mut out);
        out.extend_from_slice(&self.payload);
        out
    }
}

/// Queue of messages produced while handling input.
///
/// The owner drains it after every handled message. If it does not, the
/// queue holds at most [`Outbox::CAPACITY`] messages and evicts the oldest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outbox {
    messages: VecDeque<OutgoingMessage>,
}

impl Outbox {
    pub const CAPACITY: usize = 64;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: OutgoingMessage) {
        if self.messages.len() >= Self::CAPACITY
            && let Some(evicted) = self.messages.pop_front()
        {
            debug!(
                command = format_args!("{:#04x}", evicted.command_id),
                "outbox full, oldest message dropped"
            );
        }
        self.messages.push_back(message);
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Take every queued message, oldest first.
    pub fn drain(&mut self) -> Vec<OutgoingMessage> {
        self.messages.drain(..).collect()
    }
}

/// Outgoing sequence counter. Zero is skipped on wraparound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceCounter(u8);

impl Default for SequenceCounter {
    fn default() -> Self {
        Self(1)
    }
}

impl SequenceCounter {
    pub fn advance(&mut self) -> u8 {
        let current = self.0;
        self.0 = match self.0.wrapping_add(1) {
            0 => 1,
            n => n,
        };
        current
    }
}
