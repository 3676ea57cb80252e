//! Command header codec.
//!
//! # Layout
//! | Offset | Size   | Field                                   |
//! |--------|--------|-----------------------------------------|
//! | 0      | u8     | command id                              |
//! | 1      | u8     | flags (see [`flags`])                   |
//! | 2      | u8     | sequence counter (wraps)                |
//! | 3      | varint | payload length                          |
//! | 3+n    | varint | chunk index, only when the message is chunked |

use riffbridge_errors::PacketError;

use crate::varint::{decode_varint, encode_varint, varint_len};

/// Bytes before the variable-length part of the header.
pub const FIXED_HEADER_LEN: usize = 3;

/// Flag bits in header byte 1.
pub mod flags {
    /// Sender expects an acknowledgement
    pub const NEEDS_ACK: u8 = 0x10;
    /// System message (as opposed to a device-class message)
    pub const SYSTEM: u8 = 0x20;
    /// First packet of a chunked message; its chunk index is the total length
    pub const CHUNK_START: u8 = 0x40;
    /// Packet belongs to a chunked message
    pub const CHUNK: u8 = 0x80;
    /// Client index of the sender
    pub const CLIENT_INDEX_MASK: u8 = 0x0F;
}

/// Header flag byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct HeaderFlags(u8);

impl HeaderFlags {
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    #[must_use]
    pub const fn with(self, flag: u8) -> Self {
        Self(self.0 | flag)
    }

    pub const fn needs_ack(self) -> bool {
        self.0 & flags::NEEDS_ACK != 0
    }

    pub const fn system(self) -> bool {
        self.0 & flags::SYSTEM != 0
    }

    pub const fn chunk_start(self) -> bool {
        self.0 & flags::CHUNK_START != 0
    }

    /// Whether a chunk index follows the payload length.
    pub const fn chunked(self) -> bool {
        self.0 & (flags::CHUNK | flags::CHUNK_START) != 0
    }

    pub const fn client_index(self) -> u8 {
        self.0 & flags::CLIENT_INDEX_MASK
    }
}

/// Decoded command header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandHeader {
    pub command_id: u8,
    pub flags: HeaderFlags,
    pub sequence: u8,
    /// Payload bytes carried by this packet.
    pub data_length: u32,
    /// Write offset of a chunk, or the total length on the chunk-start packet.
    pub chunk_index: Option<u32>,
}

impl CommandHeader {
    /// Header for a single-packet message.
    pub fn new(command_id: u8, flags: HeaderFlags, sequence: u8, data_length: u32) -> Self {
        Self {
            command_id,
            flags,
            sequence,
            data_length,
            chunk_index: None,
        }
    }

    /// Bytes [`CommandHeader::encode`] writes.
    pub fn encoded_len(&self) -> usize {
        FIXED_HEADER_LEN
            + varint_len(self.data_length)
            + self.chunk_index.map_or(0, varint_len)
    }

    /// Append the wire encoding to `out`.
    ///
    /// The chunk index is written only when the flags mark the message as
    /// chunked, mirroring [`parse_header`].
    pub fn encode(&self, out: &mut Vec<u8>) {
        out.reserve(self.encoded_len());
        out.push(self.command_id);
        out.push(self.flags.bits());
        out.push(self.sequence);
        encode_varint(self.data_length, out);
        if self.flags.chunked() {
            encode_varint(self.chunk_index.unwrap_or(0), out);
        }
    }
}

/// Parse a command header from the front of `buf`.
///
/// Returns the header and the number of bytes it occupies.
///
/// # Errors
///
/// [`PacketError::Truncated`] if the fixed prefix or a varint is cut short,
/// [`PacketError::VarintOverflow`] if a varint exceeds 32 bits.
pub fn parse_header(buf: &[u8]) -> Result<(CommandHeader, usize), PacketError> {
    let [command_id, flag_bits, sequence] = match buf.get(..FIXED_HEADER_LEN) {
        Some(&[a, b, c]) => [a, b, c],
        _ => {
            return Err(PacketError::truncated(
                "command header",
                FIXED_HEADER_LEN,
                buf.len(),
            ));
        }
    };
    let flags = HeaderFlags::from_bits(flag_bits);

    let (data_length, length_len) = decode_varint(buf, FIXED_HEADER_LEN)?;
    let mut consumed = FIXED_HEADER_LEN + length_len;

    let chunk_index = if flags.chunked() {
        let (index, index_len) = decode_varint(buf, consumed)?;
        consumed += index_len;
        Some(index)
    } else {
        None
    };

    Ok((
        CommandHeader {
            command_id,
            flags,
            sequence,
            data_length,
            chunk_index,
        },
        consumed,
    ))
}

/// Parse a header and return it together with its payload.
///
/// Bytes past `data_length` are ignored.
///
/// # Errors
///
/// Everything [`parse_header`] reports, plus [`PacketError::Truncated`] when
/// fewer than `data_length` payload bytes follow the header.
pub fn split_message(buf: &[u8]) -> Result<(CommandHeader, &[u8]), PacketError> {
    let (header, header_len) = parse_header(buf)?;
    let payload_len = header.data_length as usize;
    let available = buf.len().saturating_sub(header_len);
    let payload = buf
        .get(header_len..)
        .and_then(|rest| rest.get(..payload_len))
        .ok_or_else(|| PacketError::truncated("payload", payload_len, available))?;
    Ok((header, payload))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_input_header() -> Result<(), PacketError> {
        let buf = [0x20, 0x00, 0x07, 0x0A, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10];
        let (header, len) = parse_header(&buf)?;
        assert_eq!(len, 4);
        assert_eq!(header.command_id, 0x20);
        assert_eq!(header.sequence, 7);
        assert_eq!(header.data_length, 10);
        assert_eq!(header.chunk_index, None);
        assert!(!header.flags.chunked());
        Ok(())
    }

    #[test]
    fn parses_chunk_start_with_two_byte_index() -> Result<(), PacketError> {
        // total length 200 = C8 01
        let buf = [0x04, 0xF0, 0x01, 0x3A, 0xC8, 0x01];
        let (header, len) = parse_header(&buf)?;
        assert_eq!(len, 6);
        assert!(header.flags.chunk_start());
        assert!(header.flags.system());
        assert!(header.flags.needs_ack());
        assert_eq!(header.data_length, 0x3A);
        assert_eq!(header.chunk_index, Some(200));
        Ok(())
    }

    #[test]
    fn client_index_is_low_nibble() {
        let flags = HeaderFlags::from_bits(flags::SYSTEM | 0x03);
        assert_eq!(flags.client_index(), 3);
        assert!(flags.system());
        assert!(!flags.chunk_start());
    }

    #[test]
    fn short_prefix_is_truncated() {
        assert_eq!(
            parse_header(&[0x20, 0x00]),
            Err(PacketError::truncated("command header", 3, 2))
        );
        assert!(parse_header(&[]).is_err());
    }

    #[test]
    fn missing_length_is_truncated() {
        assert!(matches!(
            parse_header(&[0x20, 0x00, 0x01]),
            Err(PacketError::Truncated { .. })
        ));
        assert!(matches!(
            parse_header(&[0x20, 0x00, 0x01, 0x85]),
            Err(PacketError::Truncated { .. })
        ));
    }

    #[test]
    fn missing_chunk_index_is_truncated() {
        assert!(matches!(
            parse_header(&[0x20, flags::CHUNK, 0x01, 0x04]),
            Err(PacketError::Truncated { .. })
        ));
    }

    #[test]
    fn split_message_bounds_payload() -> Result<(), PacketError> {
        let buf = [0x07, 0x20, 0x02, 0x02, 0x01, 0x5B, 0xEE, 0xEE];
        let (header, payload) = split_message(&buf)?;
        assert_eq!(header.command_id, 0x07);
        assert_eq!(payload, &[0x01, 0x5B]);

        assert_eq!(
            split_message(&[0x20, 0x00, 0x01, 0x0A, 0x00, 0x00]),
            Err(PacketError::truncated("payload", 10, 2))
        );
        Ok(())
    }

    #[test]
    fn encode_matches_parse() -> Result<(), PacketError> {
        let header = CommandHeader {
            command_id: 0x04,
            flags: HeaderFlags::from_bits(flags::CHUNK | flags::SYSTEM),
            sequence: 0x42,
            data_length: 300,
            chunk_index: Some(0x4000),
        };
        let mut out = Vec::new();
        header.encode(&mut out);
        assert_eq!(out.len(), header.encoded_len());
        assert_eq!(parse_header(&out)?, (header, out.len()));
        Ok(())
    }
}
