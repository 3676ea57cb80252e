//! Raw report values to controller ranges.

/// Full-range axis: 0 rests at -32768, 0xFF reaches 32767.
pub fn byte_to_axis(value: u8) -> i16 {
    let wide = u16::from_le_bytes([value, value]);
    (i32::from(wide) - 32768) as i16
}

/// Half-range axis: 0 rests at 0, 0xFF reaches 32767.
pub fn byte_to_axis_centered(value: u8) -> i16 {
    let v = u16::from(value);
    ((v << 7) | (v >> 1)) as i16
}

const PICKUP_PLATEAUS: [i16; 5] = [-32768, -16384, 0, 16384, 32767];

/// Pickup selector with five detents in the high nibble.
pub fn pickup_plateau(value: u8) -> i16 {
    let index = usize::from((value >> 4).min(4));
    PICKUP_PLATEAUS.get(index).copied().unwrap_or(i16::MAX)
}

/// Replicate a 4-bit value across a byte (0xA -> 0xAA).
pub fn nibble_to_byte(nibble: u8) -> u8 {
    (nibble & 0x0F) * 0x11
}

/// Drum velocity on the positive half of an axis.
///
/// A pad reads 0 while it is not struck. A hit reports 1..=15 inverted, with 1
/// the hardest and 15 the softest. The axis carries the bitwise complement of
/// the replicated nibble, so 1 lands at 0x7777 and 15 at 0. The idle value 0
/// lands at 32767.
pub fn velocity_positive(nibble: u8) -> i16 {
    let wide = u16::from(nibble_to_byte(nibble)) * 0x0101;
    (!wide >> 1) as i16
}

/// Drum velocity on the negative half of an axis.
///
/// Same inverted 1..=15 hit range as [`velocity_positive`] with the sign bit
/// set: 1 lands at -2185 and 15 at -32768, idle 0 at -1.
pub fn velocity_negative(nibble: u8) -> i16 {
    let wide = u16::from(nibble_to_byte(nibble)) * 0x0101;
    ((!wide >> 1) | 0x8000) as i16
}

/// Six-fret whammy rests at 0x80; values below rest clamp to 0.
pub fn six_fret_whammy(value: u8) -> i16 {
    let v = u16::from(value.saturating_sub(0x80));
    ((v << 8) | (v << 1) | (v >> 6)) as i16
}

/// 10-bit trigger to an 8-bit slider.
pub fn trigger_to_slider(value: u16) -> u8 {
    (value.min(riffbridge_gip_protocol::gamepad_report::TRIGGER_MAX) >> 2) as u8
}
