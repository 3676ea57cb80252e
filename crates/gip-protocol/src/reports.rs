//! Fixed-layout input reports.
//!
//! Instrument reports are matched by exact length: a payload of the wrong size
//! is "not this report" rather than an error, which lets the length-sniffing
//! decoder try each layout in turn under the shared input command id.

/// Button bits shared by every device class (16-bit little-endian at offset 0).
pub mod buttons {
    pub const SYNC: u16 = 0x0001;
    pub const MENU: u16 = 0x0004;
    pub const VIEW: u16 = 0x0008;
    pub const A: u16 = 0x0010;
    pub const B: u16 = 0x0020;
    pub const X: u16 = 0x0040;
    pub const Y: u16 = 0x0080;
    pub const DPAD_UP: u16 = 0x0100;
    pub const DPAD_DOWN: u16 = 0x0200;
    pub const DPAD_LEFT: u16 = 0x0400;
    pub const DPAD_RIGHT: u16 = 0x0800;
    pub const LEFT_BUMPER: u16 = 0x1000;
    pub const RIGHT_BUMPER: u16 = 0x2000;
    pub const LEFT_STICK: u16 = 0x4000;
    pub const RIGHT_STICK: u16 = 0x8000;
}

/// Five-fret guitar report layout.
pub mod guitar_report {
    pub const LEN: usize = 10;
    pub const BUTTONS: usize = 0;
    pub const TILT: usize = 2;
    pub const WHAMMY: usize = 3;
    pub const PICKUP: usize = 4;
    pub const UPPER_FRETS: usize = 5;
    pub const LOWER_FRETS: usize = 6;

    pub const GREEN: u8 = 0x01;
    pub const RED: u8 = 0x02;
    pub const YELLOW: u8 = 0x04;
    pub const BLUE: u8 = 0x08;
    pub const ORANGE: u8 = 0x10;
}

/// Drum kit report layout.
///
/// `pads` and `cymbals` each pack four 4-bit strike intensities.
pub mod drum_report {
    pub const LEN: usize = 6;
    pub const BUTTONS: usize = 0;
    pub const PADS: usize = 2;
    pub const CYMBALS: usize = 4;

    pub const PAD_RED_SHIFT: u32 = 4;
    pub const PAD_YELLOW_SHIFT: u32 = 0;
    pub const PAD_BLUE_SHIFT: u32 = 12;
    pub const PAD_GREEN_SHIFT: u32 = 8;
    pub const CYMBAL_YELLOW_SHIFT: u32 = 4;
    pub const CYMBAL_BLUE_SHIFT: u32 = 0;
    pub const CYMBAL_GREEN_SHIFT: u32 = 12;

    /// First kick pedal shares the left bumper bit.
    pub const KICK_1: u16 = super::buttons::LEFT_BUMPER;
    /// Second kick pedal shares the right bumper bit.
    pub const KICK_2: u16 = super::buttons::RIGHT_BUMPER;
}

/// Six-fret guitar report layout. Offsets are not sequential.
pub mod six_fret_report {
    pub const LEN: usize = 14;
    pub const FRETS: usize = 1;
    pub const STRUM: usize = 3;
    pub const WHAMMY: usize = 6;
    pub const TILT: usize = 7;
    pub const BUTTONS: usize = 8;

    pub const BLACK_1: u8 = 0x01;
    pub const BLACK_2: u8 = 0x02;
    pub const BLACK_3: u8 = 0x04;
    pub const WHITE_1: u8 = 0x08;
    pub const WHITE_2: u8 = 0x10;
    pub const WHITE_3: u8 = 0x20;

    /// Strum bar at rest.
    pub const STRUM_CENTER: u8 = 0x80;
    /// Whammy bar at rest.
    pub const WHAMMY_REST: u8 = 0x80;

    pub const HERO_POWER: u16 = 0x0001;
    pub const PAUSE: u16 = 0x0002;
    pub const GHTV: u16 = 0x0020;
    pub const DPAD_UP: u16 = 0x1000;
    pub const DPAD_DOWN: u16 = 0x2000;
    pub const DPAD_LEFT: u16 = 0x4000;
    pub const DPAD_RIGHT: u16 = 0x8000;
}

/// Gamepad report layout.
pub mod gamepad_report {
    pub const LEN: usize = 14;
    pub const BUTTONS: usize = 0;
    pub const LEFT_TRIGGER: usize = 2;
    pub const RIGHT_TRIGGER: usize = 4;
    pub const LEFT_STICK_X: usize = 6;
    pub const LEFT_STICK_Y: usize = 8;
    pub const RIGHT_STICK_X: usize = 10;
    pub const RIGHT_STICK_Y: usize = 12;
    /// Triggers report 10 bits.
    pub const TRIGGER_MAX: u16 = 0x03FF;
}

/// Key code of the guide button in keystroke messages.
pub const GUIDE_KEY_CODE: u8 = 0x5B;

/// Arrival message layout.
pub mod arrival_report {
    pub const MIN_LEN: usize = 12;
    pub const VENDOR_ID: usize = 8;
    pub const PRODUCT_ID: usize = 10;
}

/// Wireless legacy adapter sub-messages.
pub mod legacy {
    pub const CONNECTION_MIN_LEN: usize = 7;
    pub const USER_INDEX: usize = 0;
    pub const CONNECTED: usize = 1;
    pub const VENDOR_ID: usize = 2;
    pub const PRODUCT_ID: usize = 4;
    pub const SUBTYPE: usize = 6;
    /// Inner report offset in a legacy input message.
    pub const INPUT_DATA: usize = 1;

    pub const SUBTYPE_GUITAR: u8 = 0x06;
    pub const SUBTYPE_GUITAR_ALT: u8 = 0x07;
    pub const SUBTYPE_BASS: u8 = 0x0B;
    pub const SUBTYPE_DRUMS: u8 = 0x08;
}

fn u16_at(data: &[u8], offset: usize) -> Option<u16> {
    let bytes = data.get(offset..offset.checked_add(2)?)?;
    Some(u16::from_le_bytes([*bytes.first()?, *bytes.get(1)?]))
}

/// Five-fret guitar input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GuitarReport {
    pub buttons: u16,
    pub tilt: u8,
    pub whammy: u8,
    pub pickup: u8,
    pub upper_frets: u8,
    pub lower_frets: u8,
}

impl GuitarReport {
    pub fn parse(data: &[u8]) -> Option<Self> {
        let raw: &[u8; guitar_report::LEN] = data.try_into().ok()?;
        Some(Self {
            buttons: u16::from_le_bytes([raw[0], raw[1]]),
            tilt: raw[guitar_report::TILT],
            whammy: raw[guitar_report::WHAMMY],
            pickup: raw[guitar_report::PICKUP],
            upper_frets: raw[guitar_report::UPPER_FRETS],
            lower_frets: raw[guitar_report::LOWER_FRETS],
        })
    }

    /// Frets held on either the upper or the lower fret row.
    pub fn frets(&self) -> u8 {
        self.upper_frets | self.lower_frets
    }

    pub fn lower_fret_active(&self) -> bool {
        self.lower_frets != 0
    }
}

/// Drum kit input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DrumReport {
    pub buttons: u16,
    pub pads: u16,
    pub cymbals: u16,
}

const fn nibble(field: u16, shift: u32) -> u8 {
    ((field >> shift) & 0x0F) as u8
}

impl DrumReport {
    pub fn parse(data: &[u8]) -> Option<Self> {
        let raw: &[u8; drum_report::LEN] = data.try_into().ok()?;
        Some(Self {
            buttons: u16::from_le_bytes([raw[0], raw[1]]),
            pads: u16::from_le_bytes([raw[2], raw[3]]),
            cymbals: u16::from_le_bytes([raw[4], raw[5]]),
        })
    }

    pub const fn red_pad(&self) -> u8 {
        nibble(self.pads, drum_report::PAD_RED_SHIFT)
    }

    pub const fn yellow_pad(&self) -> u8 {
        nibble(self.pads, drum_report::PAD_YELLOW_SHIFT)
    }

    pub const fn blue_pad(&self) -> u8 {
        nibble(self.pads, drum_report::PAD_BLUE_SHIFT)
    }

    pub const fn green_pad(&self) -> u8 {
        nibble(self.pads, drum_report::PAD_GREEN_SHIFT)
    }

    pub const fn yellow_cymbal(&self) -> u8 {
        nibble(self.cymbals, drum_report::CYMBAL_YELLOW_SHIFT)
    }

    pub const fn blue_cymbal(&self) -> u8 {
        nibble(self.cymbals, drum_report::CYMBAL_BLUE_SHIFT)
    }

    pub const fn green_cymbal(&self) -> u8 {
        nibble(self.cymbals, drum_report::CYMBAL_GREEN_SHIFT)
    }

    pub const fn kick_1(&self) -> bool {
        self.buttons & drum_report::KICK_1 != 0
    }

    pub const fn kick_2(&self) -> bool {
        self.buttons & drum_report::KICK_2 != 0
    }
}

/// Six-fret guitar input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SixFretReport {
    pub frets: u8,
    pub strum: u8,
    pub whammy: u8,
    pub tilt: u8,
    pub buttons: u16,
}

impl SixFretReport {
    pub fn parse(data: &[u8]) -> Option<Self> {
        let raw: &[u8; six_fret_report::LEN] = data.try_into().ok()?;
        Some(Self {
            frets: raw[six_fret_report::FRETS],
            strum: raw[six_fret_report::STRUM],
            whammy: raw[six_fret_report::WHAMMY],
            tilt: raw[six_fret_report::TILT],
            buttons: u16::from_le_bytes([raw[8], raw[9]]),
        })
    }
}

/// Gamepad input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GamepadReport {
    pub buttons: u16,
    pub left_trigger: u16,
    pub right_trigger: u16,
    pub left_stick_x: i16,
    pub left_stick_y: i16,
    pub right_stick_x: i16,
    pub right_stick_y: i16,
}

impl GamepadReport {
    pub fn parse(data: &[u8]) -> Option<Self> {
        let raw: &[u8; gamepad_report::LEN] = data.try_into().ok()?;
        Some(Self {
            buttons: u16::from_le_bytes([raw[0], raw[1]]),
            left_trigger: u16::from_le_bytes([raw[2], raw[3]]),
            right_trigger: u16::from_le_bytes([raw[4], raw[5]]),
            left_stick_x: i16::from_le_bytes([raw[6], raw[7]]),
            left_stick_y: i16::from_le_bytes([raw[8], raw[9]]),
            right_stick_x: i16::from_le_bytes([raw[10], raw[11]]),
            right_stick_y: i16::from_le_bytes([raw[12], raw[13]]),
        })
    }
}

/// One key event from a keystroke message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Keystroke {
    pub pressed: bool,
    pub key_code: u8,
}

impl Keystroke {
    pub fn is_guide(&self) -> bool {
        self.key_code == GUIDE_KEY_CODE
    }
}

/// Key events packed as `(pressed, key code)` pairs. A trailing odd byte is ignored.
pub fn keystrokes(payload: &[u8]) -> impl Iterator<Item = Keystroke> + '_ {
    payload.chunks_exact(2).filter_map(|pair| match *pair {
        [pressed, key_code] => Some(Keystroke {
            pressed: pressed != 0,
            key_code,
        }),
        _ => None,
    })
}

/// Vendor/product ids from an arrival message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArrivalReport {
    pub vendor_id: u16,
    pub product_id: u16,
}

impl ArrivalReport {
    pub fn parse(data: &[u8]) -> Option<Self> {
        if data.len() < arrival_report::MIN_LEN {
            return None;
        }
        Some(Self {
            vendor_id: u16_at(data, arrival_report::VENDOR_ID)?,
            product_id: u16_at(data, arrival_report::PRODUCT_ID)?,
        })
    }
}

/// Sub-device connect/disconnect on the wireless legacy adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegacyConnection {
    pub user_index: u8,
    pub connected: bool,
    pub vendor_id: u16,
    pub product_id: u16,
    pub subtype: u8,
}

impl LegacyConnection {
    pub fn parse(data: &[u8]) -> Option<Self> {
        if data.len() < legacy::CONNECTION_MIN_LEN {
            return None;
        }
        Some(Self {
            user_index: *data.get(legacy::USER_INDEX)?,
            connected: *data.get(legacy::CONNECTED)? != 0,
            vendor_id: u16_at(data, legacy::VENDOR_ID)?,
            product_id: u16_at(data, legacy::PRODUCT_ID)?,
            subtype: *data.get(legacy::SUBTYPE)?,
        })
    }
}

/// Input relayed from a sub-device on the wireless legacy adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegacyInput<'a> {
    pub user_index: u8,
    pub report: &'a [u8],
}

impl<'a> LegacyInput<'a> {
    pub fn parse(data: &'a [u8]) -> Option<Self> {
        Some(Self {
            user_index: *data.get(legacy::USER_INDEX)?,
            report: data.get(legacy::INPUT_DATA..)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guitar_parse_requires_exact_length() {
        assert!(GuitarReport::parse(&[0; 9]).is_none());
        assert!(GuitarReport::parse(&[0; 11]).is_none());
        assert!(GuitarReport::parse(&[0; guitar_report::LEN]).is_some());
    }

    #[test]
    fn guitar_fields_and_fret_merge() -> Result<(), Box<dyn std::error::Error>> {
        let data = [0x04, 0x01, 0x10, 0x80, 0x30, 0x01, 0x12, 0, 0, 0];
        let report = GuitarReport::parse(&data).ok_or("guitar report")?;
        assert_eq!(report.buttons, buttons::MENU | buttons::DPAD_UP);
        assert_eq!(report.tilt, 0x10);
        assert_eq!(report.whammy, 0x80);
        assert_eq!(report.pickup, 0x30);
        assert_eq!(
            report.frets(),
            guitar_report::GREEN | guitar_report::RED | guitar_report::ORANGE
        );
        assert!(report.lower_fret_active());
        Ok(())
    }

    #[test]
    fn drum_nibbles() {
        // pads: green=0x3 blue=0xA red=0x5 yellow=0xF -> 0xA35F
        // cymbals: green=0x7 yellow=0x2 blue=0x9 -> 0x7029
        let data = [0x00, 0x10, 0x5F, 0xA3, 0x29, 0x70];
        assert_eq!(
            DrumReport::parse(&data).map(|r| (
                r.red_pad(),
                r.yellow_pad(),
                r.blue_pad(),
                r.green_pad(),
                r.yellow_cymbal(),
                r.blue_cymbal(),
                r.green_cymbal(),
                r.kick_1(),
                r.kick_2(),
            )),
            Some((0x5, 0xF, 0xA, 0x3, 0x2, 0x9, 0x7, true, false))
        );
    }

    #[test]
    fn six_fret_offsets() {
        let mut data = [0u8; six_fret_report::LEN];
        data[six_fret_report::FRETS] = six_fret_report::BLACK_1 | six_fret_report::WHITE_3;
        data[six_fret_report::STRUM] = 0xFF;
        data[six_fret_report::WHAMMY] = 0xC0;
        data[six_fret_report::TILT] = 0x44;
        data[six_fret_report::BUTTONS + 1] = 0x10;
        assert_eq!(
            SixFretReport::parse(&data),
            Some(SixFretReport {
                frets: 0x21,
                strum: 0xFF,
                whammy: 0xC0,
                tilt: 0x44,
                buttons: six_fret_report::DPAD_UP,
            })
        );
    }

    #[test]
    fn gamepad_signed_sticks() {
        let data = [
            0x10, 0x00, 0xFF, 0x03, 0x00, 0x02, 0x00, 0x80, 0xFF, 0x7F, 0x01, 0x00, 0xFF, 0xFF,
        ];
        assert_eq!(
            GamepadReport::parse(&data),
            Some(GamepadReport {
                buttons: buttons::A,
                left_trigger: 0x3FF,
                right_trigger: 0x200,
                left_stick_x: i16::MIN,
                left_stick_y: i16::MAX,
                right_stick_x: 1,
                right_stick_y: -1,
            })
        );
    }

    #[test]
    fn keystroke_pairs() {
        let events: Vec<_> = keystrokes(&[0x01, GUIDE_KEY_CODE, 0x00, 0x10, 0x01]).collect();
        assert_eq!(events.len(), 2);
        assert!(events.first().is_some_and(|k| k.pressed && k.is_guide()));
        assert!(events.get(1).is_some_and(|k| !k.pressed && !k.is_guide()));
    }

    #[test]
    fn arrival_ids() {
        let mut data = [0u8; 28];
        data[8..12].copy_from_slice(&[0x38, 0x07, 0x70, 0x42]);
        assert_eq!(
            ArrivalReport::parse(&data),
            Some(ArrivalReport {
                vendor_id: 0x0738,
                product_id: 0x4270
            })
        );
        assert!(ArrivalReport::parse(&data[..11]).is_none());
    }

    #[test]
    fn legacy_messages() {
        let conn = LegacyConnection::parse(&[2, 1, 0x38, 0x07, 0x61, 0x40, legacy::SUBTYPE_DRUMS]);
        assert_eq!(
            conn,
            Some(LegacyConnection {
                user_index: 2,
                connected: true,
                vendor_id: 0x0738,
                product_id: 0x4061,
                subtype: legacy::SUBTYPE_DRUMS,
            })
        );
        assert!(LegacyConnection::parse(&[2, 1, 0, 0, 0, 0]).is_none());

        let input = LegacyInput::parse(&[3, 0xAA, 0xBB]);
        assert_eq!(
            input,
            Some(LegacyInput {
                user_index: 3,
                report: &[0xAA, 0xBB]
            })
        );
        assert!(LegacyInput::parse(&[]).is_none());
    }
}
