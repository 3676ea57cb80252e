//! Wire-format errors.
//!
//! All of these are non-fatal: the offending message (or the open chunk
//! sequence) is dropped and the session keeps processing later frames. The
//! variants carry raw offsets and lengths so a log line is enough to extend
//! the protocol tables later.

/// Malformed or inconsistent wire data.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PacketError {
    /// The buffer ended before a required field
    #[error("Truncated {what}: need {needed} bytes, got {actual}")]
    Truncated {
        /// Which field was being read
        what: &'static str,
        /// Bytes required
        needed: usize,
        /// Bytes available
        actual: usize,
    },

    /// A LEB128 value did not terminate within 32 bits
    #[error("Variable-length integer at offset {offset} overflows 32 bits")]
    VarintOverflow {
        /// Offset of the first byte of the varint
        offset: usize,
    },

    /// A chunk continuation arrived with no open chunk sequence
    #[error("Chunk continuation for command {command_id:#04x} at offset {offset} without a chunk start")]
    UnexpectedContinuation {
        /// Command id of the stray chunk
        command_id: u8,
        /// Offset carried by the chunk
        offset: u32,
    },

    /// A continuation's offset did not match the running cursor
    #[error("Chunk out of order: expected offset {expected}, got {actual}")]
    ChunkOutOfOrder {
        /// Running write cursor
        expected: u32,
        /// Offset carried by the chunk
        actual: u32,
    },

    /// A chunk would write outside the declared buffer
    #[error("Chunk at offset {offset} with {len} bytes exceeds declared length {total}")]
    ChunkOutOfBounds {
        /// Offset carried by the chunk
        offset: u32,
        /// Payload length of the chunk
        len: usize,
        /// Declared total length
        total: u32,
    },

    /// A chunk start with a different length arrived while a sequence was open
    #[error("Chunk start declares {requested} bytes while a {open}-byte sequence is open")]
    ConflictingChunkStart {
        /// Declared length of the open sequence
        open: u32,
        /// Declared length of the new start packet
        requested: u32,
    },

    /// A chunk start declared more bytes than a session will buffer
    #[error("Chunk start declares {declared} bytes, limit is {max}")]
    ChunkTooLarge {
        /// Declared total length
        declared: u32,
        /// Reassembly limit
        max: u32,
    },
}

impl PacketError {
    /// Create a truncation error.
    pub fn truncated(what: &'static str, needed: usize, actual: usize) -> Self {
        PacketError::Truncated {
            what,
            needed,
            actual,
        }
    }
}
