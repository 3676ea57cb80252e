//! Command identifiers.

/// Command ids carried in byte 0 of every message.
pub mod command_ids {
    /// Acknowledgement of a message sent with the needs-ack flag
    pub const ACKNOWLEDGE: u8 = 0x01;
    /// Device announcement carrying vendor/product ids
    pub const ARRIVAL: u8 = 0x02;
    /// Periodic status; the host sends the same id as a keep-alive
    pub const STATUS: u8 = 0x03;
    /// Capability descriptor
    pub const DESCRIPTOR: u8 = 0x04;
    /// Power mode change (host to device)
    pub const POWER_MODE: u8 = 0x05;
    /// Authentication exchange
    pub const AUTHENTICATE: u8 = 0x06;
    /// Key events; carries the guide button
    pub const KEYSTROKE: u8 = 0x07;
    /// LED control (host to device)
    pub const LED: u8 = 0x0A;
    /// Serial number report
    pub const SERIAL_NUMBER: u8 = 0x1E;
    /// Instrument input report
    pub const INPUT: u8 = 0x20;
    /// Wireless legacy adapter: input from a sub-device
    pub const LEGACY_INPUT: u8 = 0x21;
    /// Wireless legacy adapter: sub-device connect/disconnect
    pub const LEGACY_CONNECTION: u8 = 0x22;
    /// Wireless legacy adapter: request the connected sub-device list
    pub const LEGACY_REQUEST_DEVICES: u8 = 0x23;
}

/// Short human-readable name for a command id, used in log lines.
pub fn command_name(command_id: u8) -> &'static str {
    match command_id {
        command_ids::ACKNOWLEDGE => "acknowledge",
        command_ids::ARRIVAL => "arrival",
        command_ids::STATUS => "status",
        command_ids::DESCRIPTOR => "descriptor",
        command_ids::POWER_MODE => "power-mode",
        command_ids::AUTHENTICATE => "authenticate",
        command_ids::KEYSTROKE => "keystroke",
        command_ids::LED => "led",
        command_ids::SERIAL_NUMBER => "serial-number",
        command_ids::INPUT => "input",
        command_ids::LEGACY_INPUT => "legacy-input",
        command_ids::LEGACY_CONNECTION => "legacy-connection",
        command_ids::LEGACY_REQUEST_DEVICES => "legacy-request-devices",
        _ => "unknown",
    }
}

/// Commands a session reads and discards without acting on them.
pub fn is_ignored_system_command(command_id: u8) -> bool {
    matches!(
        command_id,
        command_ids::ACKNOWLEDGE | command_ids::AUTHENTICATE | command_ids::SERIAL_NUMBER
    )
}
