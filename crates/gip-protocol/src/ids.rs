//! Interface identifiers announced in device descriptors.
//!
//! Each instrument dialect is identified by one interface GUID. A descriptor
//! usually lists a few generic interfaces as well (navigation, for one), which
//! are known but select no decoder.

use uuid::Uuid;

/// Known interface GUIDs.
pub mod interface_guids {
    use uuid::Uuid;

    /// Five-fret guitar, original dialect
    pub const GUITAR: Uuid = Uuid::from_u128(0x0d2a_e438_7f7d_4933_9693_30fc_5501_8e77);
    /// Five-fret guitar, second dialect (centered whammy, stepped pickup, keep-alive)
    pub const GUITAR_ALT: Uuid = Uuid::from_u128(0x1a26_6af6_3a46_45e3_b9b6_0f2c_0b2c_1ebe);
    /// Drum kit, first vendor
    pub const DRUMS: Uuid = Uuid::from_u128(0x0618_2893_cce0_440b_9866_2c3a_7a5c_7e4a);
    /// Drum kit, second vendor
    pub const DRUMS_ALT: Uuid = Uuid::from_u128(0xa503_f9b6_ef6b_4db4_8d79_3af4_f6ac_7bb8);
    /// Six-fret guitar
    pub const SIX_FRET_GUITAR: Uuid = Uuid::from_u128(0xadd5_a4c2_c7bc_4f00_bb38_f0f8_e4a8_3e93);
    /// Standard gamepad
    pub const GAMEPAD: Uuid = Uuid::from_u128(0x082e_402c_07df_45e1_a5ab_a312_7af1_97b5);
    /// Wireless legacy adapter
    pub const WIRELESS_LEGACY: Uuid = Uuid::from_u128(0xaf25_9d3c_a5d2_4c94_9d1c_8f5e_bd2a_9c2a);
    /// Navigation controls; listed by most devices, selects nothing
    pub const NAVIGATION: Uuid = Uuid::from_u128(0xb8f3_1fe7_7386_40e9_a9f8_2f21_263a_cfb7);
}

/// Instrument dialect selected by an interface GUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InterfaceKind {
    Guitar,
    GuitarAlt,
    Drums,
    SixFretGuitar,
    Gamepad,
    WirelessLegacy,
}

/// Map a GUID to the dialect it selects, if any.
pub fn interface_kind(guid: &Uuid) -> Option<InterfaceKind> {
    match *guid {
        interface_guids::GUITAR => Some(InterfaceKind::Guitar),
        interface_guids::GUITAR_ALT => Some(InterfaceKind::GuitarAlt),
        interface_guids::DRUMS | interface_guids::DRUMS_ALT => Some(InterfaceKind::Drums),
        interface_guids::SIX_FRET_GUITAR => Some(InterfaceKind::SixFretGuitar),
        interface_guids::GAMEPAD => Some(InterfaceKind::Gamepad),
        interface_guids::WIRELESS_LEGACY => Some(InterfaceKind::WirelessLegacy),
        _ => None,
    }
}
