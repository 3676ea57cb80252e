//! Human-readable dump of a single protocol message.

use riffbridge_errors::PacketError;
use riffbridge_gip_protocol::{
    command_ids, command_name, interface_kind, parse_descriptor, parse_header, split_message,
};

use crate::capture::format_hex;

/// Describe `message` as one line per field.
///
/// Unchunked descriptors are parsed further and list their interfaces.
///
/// # Errors
///
/// A header or payload that is cut short.
pub fn describe(message: &[u8]) -> Result<Vec<String>, PacketError> {
    let (header, header_len) = parse_header(message)?;
    let (_, payload) = split_message(message)?;
    let flags = header.flags;
    let mut lines = vec![
        format!(
            "command:  0x{:02X} ({})",
            header.command_id,
            command_name(header.command_id)
        ),
        format!(
            "flags:    0x{:02X} system={} ack={} client={}",
            flags.bits(),
            flags.system(),
            flags.needs_ack(),
            flags.client_index()
        ),
        format!("sequence: {}", header.sequence),
        format!("length:   {}", header.data_length),
    ];
    if let Some(index) = header.chunk_index {
        let role = if flags.chunk_start() {
            "total length"
        } else {
            "offset"
        };
        lines.push(format!("chunk:    {index} ({role})"));
    }
    lines.push(format!("payload:  {}", format_hex(payload)));

    let trailing = message
        .len()
        .saturating_sub(header_len)
        .saturating_sub(payload.len());
    if trailing > 0 {
        lines.push(format!("trailing: {trailing} byte(s) after the payload"));
    }

    if header.command_id == command_ids::DESCRIPTOR && header.chunk_index.is_none() {
        let descriptor = parse_descriptor(payload);
        for name in &descriptor.class_names {
            lines.push(format!("class:    {name}"));
        }
        for guid in &descriptor.interface_guids {
            match interface_kind(guid) {
                Some(kind) => lines.push(format!("interface: {guid} ({kind:?})")),
                None => lines.push(format!("interface: {guid}")),
            }
        }
        for issue in &descriptor.issues {
            lines.push(format!("issue:    {issue:?}"));
        }
    }
    Ok(lines)
}
