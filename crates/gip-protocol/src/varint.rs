//! LEB128 variable-length integers used for payload lengths and chunk indices.
//!
//! Seven bits per byte, least-significant group first, high bit set on every
//! byte except the last. Values are bounded to 32 bits (five bytes).

use riffbridge_errors::PacketError;

/// Longest encoding of a `u32`.
pub const MAX_VARINT_LEN: usize = 5;

const CONTINUATION: u8 = 0x80;
const VALUE_MASK: u8 = 0x7F;
/// Bits of the fifth byte that still fit in a `u32`.
const LAST_BYTE_MASK: u8 = 0x0F;

/// Decode a varint starting at `start`.
///
/// Returns the value and the number of bytes consumed.
///
/// # Errors
///
/// [`PacketError::Truncated`] if `buf` ends before a terminating byte,
/// [`PacketError::VarintOverflow`] if the value does not fit in 32 bits.
pub fn decode_varint(buf: &[u8], start: usize) -> Result<(u32, usize), PacketError> {
    let available = buf.get(start..).unwrap_or(&[]);
    let mut value: u32 = 0;

    for (i, &byte) in available.iter().take(MAX_VARINT_LEN).enumerate() {
        let group = byte & VALUE_MASK;
        if i == MAX_VARINT_LEN - 1 && (byte & CONTINUATION != 0 || group > LAST_BYTE_MASK) {
            return Err(PacketError::VarintOverflow { offset: start });
        }
        value |= u32::from(group) << (7 * i);
        if byte & CONTINUATION == 0 {
            return Ok((value, i + 1));
        }
    }

    Err(PacketError::truncated(
        "variable-length integer",
        available.len() + 1,
        available.len(),
    ))
}

/// Append the varint encoding of `value` to `out`.
pub fn encode_varint(mut value: u32, out: &mut Vec<u8>) {
    loop {
        let group = (value & u32::from(VALUE_MASK)) as u8;
        value >>= 7;
        if value == 0 {
            out.push(group);
            return;
        }
        out.push(group | CONTINUATION);
    }
}

/// Number of bytes [`encode_varint`] writes for `value`.
pub fn varint_len(value: u32) -> usize {
    match value {
        0..=0x7F => 1,
        0x80..=0x3FFF => 2,
        0x4000..=0x1F_FFFF => 3,
        0x20_0000..=0x0FFF_FFFF => 4,
        _ => 5,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_byte_values() -> Result<(), PacketError> {
        assert_eq!(decode_varint(&[0x00], 0)?, (0, 1));
        assert_eq!(decode_varint(&[0x7F], 0)?, (127, 1));
        Ok(())
    }

    #[test]
    fn multi_byte_value_at_offset() -> Result<(), PacketError> {
        // 300 = 0b1_0010_1100 -> AC 02
        assert_eq!(decode_varint(&[0x20, 0x00, 0x01, 0xAC, 0x02, 0xFF], 3)?, (300, 2));
        Ok(())
    }

    #[test]
    fn max_u32_uses_five_bytes() -> Result<(), PacketError> {
        let mut out = Vec::new();
        encode_varint(u32::MAX, &mut out);
        assert_eq!(out, vec![0xFF, 0xFF, 0xFF, 0xFF, 0x0F]);
        assert_eq!(decode_varint(&out, 0)?, (u32::MAX, 5));
        assert_eq!(varint_len(u32::MAX), 5);
        Ok(())
    }

    #[test]
    fn unterminated_varint_is_truncated() {
        assert_eq!(
            decode_varint(&[0x80, 0x80], 0),
            Err(PacketError::truncated("variable-length integer", 3, 2))
        );
        assert!(matches!(
            decode_varint(&[], 0),
            Err(PacketError::Truncated { actual: 0, .. })
        ));
    }

    #[test]
    fn start_past_end_is_truncated() {
        assert!(matches!(
            decode_varint(&[0x01], 4),
            Err(PacketError::Truncated { .. })
        ));
    }

    #[test]
    fn oversized_varint_overflows() {
        assert_eq!(
            decode_varint(&[0xFF, 0xFF, 0xFF, 0xFF, 0x10], 0),
            Err(PacketError::VarintOverflow { offset: 0 })
        );
        assert_eq!(
            decode_varint(&[0x00, 0x80, 0x80, 0x80, 0x80, 0x80, 0x01], 1),
            Err(PacketError::VarintOverflow { offset: 1 })
        );
    }

    #[test]
    fn encoded_len_matches_varint_len() {
        for value in [
            0,
            1,
            0x7F,
            0x80,
            0x3FFF,
            0x4000,
            0x1F_FFFF,
            0x20_0000,
            0x0FFF_FFFF,
            0x1000_0000,
        ] {
            let mut out = Vec::new();
            encode_varint(value, &mut out);
            assert_eq!(out.len(), varint_len(value), "value {value:#x}");
        }
    }
}
