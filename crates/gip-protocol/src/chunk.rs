//! Reassembly of chunked messages.
//!
//! A chunked message starts with a packet carrying the chunk-start flag whose
//! chunk index is the total message length. Continuations carry their write
//! offset in the chunk index and must arrive in order. The sequence completes
//! with an empty packet whose offset equals the total length. Some controllers
//! also send an empty packet at offset 0, which is accepted as a no-op.

use std::time::{Duration, Instant};

use riffbridge_errors::PacketError;
use tracing::trace;

use crate::header::CommandHeader;

/// Largest message a session will buffer.
pub const MAX_CHUNKED_LEN: u32 = 0x1_0000;

/// Result of feeding one chunk packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkOutcome {
    /// Zero-length packet at offset 0; nothing to do.
    Empty,
    /// More chunks are needed.
    Pending,
    /// The reassembled message.
    Complete(Vec<u8>),
}

#[derive(Debug)]
enum State {
    Idle,
    Accumulating {
        buffer: Vec<u8>,
        cursor: u32,
        started: Instant,
    },
}

/// Per-session chunk reassembly state machine.
#[derive(Debug)]
pub struct ChunkAssembler {
    state: State,
    timeout: Option<Duration>,
}

impl Default for ChunkAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl ChunkAssembler {
    /// Assembler without a timeout; a stalled sequence stays open until it is
    /// replaced or the session is dropped.
    pub fn new() -> Self {
        Self {
            state: State::Idle,
            timeout: None,
        }
    }

    /// Assembler that discards sequences left open longer than `timeout`.
    pub fn with_timeout(timeout: Option<Duration>) -> Self {
        Self {
            state: State::Idle,
            timeout,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, State::Idle)
    }

    /// Declared length of the open sequence, if any.
    pub fn declared_len(&self) -> Option<u32> {
        match &self.state {
            State::Idle => None,
            State::Accumulating { buffer, .. } => u32::try_from(buffer.len()).ok(),
        }
    }

    /// Drop any open sequence.
    pub fn reset(&mut self) {
        self.state = State::Idle;
    }

    /// Feed one chunk packet.
    ///
    /// # Errors
    ///
    /// Any ordering or bounds violation returns an error and discards the open
    /// sequence; the next chunk-start begins a fresh one.
    pub fn push(
        &mut self,
        header: &CommandHeader,
        payload: &[u8],
        now: Instant,
    ) -> Result<ChunkOutcome, PacketError> {
        let index = header.chunk_index.unwrap_or(0);
        if index == 0 && payload.is_empty() {
            return Ok(ChunkOutcome::Empty);
        }

        self.expire(now);

        let result = if header.flags.chunk_start() {
            self.start(index, payload, now)
        } else {
            self.continue_at(header.command_id, index, payload)
        };
        if result.is_err() {
            self.state = State::Idle;
        }
        result
    }

    fn expire(&mut self, now: Instant) {
        let Some(timeout) = self.timeout else {
            return;
        };
        if let State::Accumulating { started, cursor, .. } = &self.state
            && now.saturating_duration_since(*started) > timeout
        {
            trace!(cursor = *cursor, "discarding stale chunk sequence");
            self.state = State::Idle;
        }
    }

    fn start(
        &mut self,
        total: u32,
        payload: &[u8],
        now: Instant,
    ) -> Result<ChunkOutcome, PacketError> {
        if total > MAX_CHUNKED_LEN {
            return Err(PacketError::ChunkTooLarge {
                declared: total,
                max: MAX_CHUNKED_LEN,
            });
        }
        if let Some(open) = self.declared_len()
            && open != total
        {
            return Err(PacketError::ConflictingChunkStart {
                open,
                requested: total,
            });
        }

        let mut buffer = vec![0u8; total as usize];
        buffer
            .get_mut(..payload.len())
            .ok_or(PacketError::ChunkOutOfBounds {
                offset: 0,
                len: payload.len(),
                total,
            })?
            .copy_from_slice(payload);

        trace!(total, first = payload.len(), "chunk sequence started");
        self.state = State::Accumulating {
            buffer,
            cursor: payload.len() as u32,
            started: now,
        };
        Ok(ChunkOutcome::Pending)
    }

    fn continue_at(
        &mut self,
        command_id: u8,
        offset: u32,
        payload: &[u8],
    ) -> Result<ChunkOutcome, PacketError> {
        let State::Accumulating { buffer, cursor, .. } = &mut self.state else {
            return Err(PacketError::UnexpectedContinuation { command_id, offset });
        };
        if offset != *cursor {
            return Err(PacketError::ChunkOutOfOrder {
                expected: *cursor,
                actual: offset,
            });
        }

        let total = buffer.len() as u32;
        if payload.is_empty() {
            if offset == total {
                let message = std::mem::take(buffer);
                self.state = State::Idle;
                return Ok(ChunkOutcome::Complete(message));
            }
            return Ok(ChunkOutcome::Pending);
        }

        let start = offset as usize;
        let end = start.saturating_add(payload.len());
        buffer
            .get_mut(start..end)
            .ok_or(PacketError::ChunkOutOfBounds {
                offset,
                len: payload.len(),
                total,
            })?
            .copy_from_slice(payload);
        *cursor = end as u32;
        Ok(ChunkOutcome::Pending)
    }
}
