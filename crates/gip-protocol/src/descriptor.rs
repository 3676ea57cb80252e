//! Capability descriptor parsing.
//!
//! # Layout
//! | Offset        | Size | Field                                     |
//! |---------------|------|-------------------------------------------|
//! | 0             | u16  | header length (offset of the offset table) |
//! | 2             | u16  | total data length                          |
//! | header length | 8×u16 | offset table, relative to its own start; 0 = absent |
//!
//! Every list the table points at starts with a count byte. Interface GUIDs
//! are 16 bytes each in mixed-endian layout; class names are a u16 length
//! followed by that many bytes. Only those two lists are interpreted.
//!
//! Firmware revisions extend this layout unpredictably, so parsing never
//! fails: every read is bounds-checked against the declared length and any
//! problem is recorded as a [`DescriptorIssue`] next to whatever was parsed.

use std::collections::BTreeSet;
use std::fmt;

use tracing::debug;
use uuid::Uuid;

/// Descriptor layout constants.
pub mod descriptor_layout {
    pub const HEADER_LEN: usize = 0;
    pub const DATA_LEN: usize = 2;
    pub const OFFSET_TABLE_ENTRIES: usize = 8;
    pub const GUID_LEN: usize = 16;
}

/// Lists referenced by the offset table, in table order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DescriptorSection {
    ExternalCommands,
    FirmwareVersions,
    AudioFormats,
    InputCommands,
    OutputCommands,
    ClassNames,
    InterfaceGuids,
    HidDescriptor,
}

impl DescriptorSection {
    /// Index of this section's entry in the offset table.
    pub const fn table_slot(self) -> usize {
        self as usize
    }
}

/// A problem found while parsing; the descriptor is still usable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DescriptorIssue {
    /// Fewer than four bytes; nothing could be read.
    HeaderTruncated { available: usize },
    /// Declared length exceeds the buffer; parsing is bounded by the buffer.
    DataLengthMismatch { declared: usize, available: usize },
    /// The offset table ends before all eight entries.
    TableTruncated { table_start: usize, entries: usize },
    /// A list offset points past the end of the data.
    OffsetOutOfBounds {
        section: DescriptorSection,
        offset: usize,
        limit: usize,
    },
    /// A list ends before its declared element count.
    ListTruncated {
        section: DescriptorSection,
        offset: usize,
        parsed: usize,
        declared: usize,
    },
}

impl fmt::Display for DescriptorIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DescriptorIssue::HeaderTruncated { available } => {
                write!(f, "header truncated ({available} bytes)")
            }
            DescriptorIssue::DataLengthMismatch {
                declared,
                available,
            } => write!(f, "declared length {declared} exceeds buffer of {available}"),
            DescriptorIssue::TableTruncated {
                table_start,
                entries,
            } => write!(f, "offset table at {table_start} holds only {entries} entries"),
            DescriptorIssue::OffsetOutOfBounds {
                section,
                offset,
                limit,
            } => write!(f, "{section:?} offset {offset} is past the end ({limit})"),
            DescriptorIssue::ListTruncated {
                section,
                offset,
                parsed,
                declared,
            } => write!(
                f,
                "{section:?} list at {offset} truncated after {parsed} of {declared} elements"
            ),
        }
    }
}

/// Parsed capability descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Descriptor {
    pub interface_guids: BTreeSet<Uuid>,
    pub class_names: BTreeSet<String>,
    pub issues: Vec<DescriptorIssue>,
}

impl Descriptor {
    /// True when every referenced list was read in full.
    pub fn is_complete(&self) -> bool {
        self.issues.is_empty()
    }
}

fn u16_at(data: &[u8], offset: usize) -> Option<u16> {
    let bytes = data.get(offset..offset.checked_add(2)?)?;
    Some(u16::from_le_bytes([*bytes.first()?, *bytes.get(1)?]))
}

/// Parse a descriptor block. Never fails; see [`Descriptor::issues`].
pub fn parse_descriptor(buf: &[u8]) -> Descriptor {
    let mut desc = Descriptor::default();

    let (Some(header_len), Some(data_len)) = (
        u16_at(buf, descriptor_layout::HEADER_LEN),
        u16_at(buf, descriptor_layout::DATA_LEN),
    ) else {
        desc.issues.push(DescriptorIssue::HeaderTruncated {
            available: buf.len(),
        });
        log_issues(&desc);
        return desc;
    };

    let declared = usize::from(data_len);
    let limit = if declared > buf.len() {
        desc.issues.push(DescriptorIssue::DataLengthMismatch {
            declared,
            available: buf.len(),
        });
        buf.len()
    } else {
        declared
    };
    let data = buf.get(..limit).unwrap_or(buf);

    let table_start = usize::from(header_len);
    let mut offsets = [0u16; descriptor_layout::OFFSET_TABLE_ENTRIES];
    for (slot, entry) in offsets.iter_mut().enumerate() {
        match u16_at(data, table_start.saturating_add(slot * 2)) {
            Some(offset) => *entry = offset,
            None => {
                desc.issues.push(DescriptorIssue::TableTruncated {
                    table_start,
                    entries: slot,
                });
                break;
            }
        }
    }

    let list_start = |section: DescriptorSection| -> Option<usize> {
        let relative = offsets.get(section.table_slot()).copied().unwrap_or(0);
        (relative != 0).then(|| table_start.saturating_add(usize::from(relative)))
    };

    if let Some(start) = list_start(DescriptorSection::ClassNames) {
        parse_class_names(data, start, &mut desc);
    }
    if let Some(start) = list_start(DescriptorSection::InterfaceGuids) {
        parse_interface_guids(data, start, &mut desc);
    }

    log_issues(&desc);
    desc
}

fn log_issues(desc: &Descriptor) {
    for issue in &desc.issues {
        debug!(%issue, "descriptor parse issue");
    }
}

fn list_count(
    data: &[u8],
    section: DescriptorSection,
    start: usize,
    desc: &mut Descriptor,
) -> Option<usize> {
    match data.get(start) {
        Some(&count) => Some(usize::from(count)),
        None => {
            desc.issues.push(DescriptorIssue::OffsetOutOfBounds {
                section,
                offset: start,
                limit: data.len(),
            });
            None
        }
    }
}

fn parse_interface_guids(data: &[u8], start: usize, desc: &mut Descriptor) {
    let section = DescriptorSection::InterfaceGuids;
    let Some(count) = list_count(data, section, start, desc) else {
        return;
    };

    let mut cursor = start + 1;
    for parsed in 0..count {
        let raw = cursor
            .checked_add(descriptor_layout::GUID_LEN)
            .and_then(|end| data.get(cursor..end))
            .and_then(|bytes| <[u8; descriptor_layout::GUID_LEN]>::try_from(bytes).ok());
        let Some(raw) = raw else {
            desc.issues.push(DescriptorIssue::ListTruncated {
                section,
                offset: start,
                parsed,
                declared: count,
            });
            return;
        };
        desc.interface_guids.insert(Uuid::from_bytes_le(raw));
        cursor += descriptor_layout::GUID_LEN;
    }
}

fn parse_class_names(data: &[u8], start: usize, desc: &mut Descriptor) {
    let section = DescriptorSection::ClassNames;
    let Some(count) = list_count(data, section, start, desc) else {
        return;
    };

    let mut cursor = start + 1;
    for parsed in 0..count {
        let name = u16_at(data, cursor).and_then(|len| {
            let begin = cursor + 2;
            let end = begin.checked_add(usize::from(len))?;
            data.get(begin..end).map(|bytes| (bytes, end))
        });
        let Some((bytes, end)) = name else {
            desc.issues.push(DescriptorIssue::ListTruncated {
                section,
                offset: start,
                parsed,
                declared: count,
            });
            return;
        };
        desc.class_names
            .insert(String::from_utf8_lossy(bytes).into_owned());
        cursor = end;
    }
}

/// Encoder for well-formed descriptors, used to build fixtures and synthetic
/// captures.
#[derive(Debug, Clone, Default)]
pub struct DescriptorBuilder {
    class_names: Vec<String>,
    interface_guids: Vec<Uuid>,
}

impl DescriptorBuilder {
    /// Header length written by [`DescriptorBuilder::build`].
    pub const HEADER_LEN: usize = 16;

    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn class_name(mut self, name: impl Into<String>) -> Self {
        self.class_names.push(name.into());
        self
    }

    #[must_use]
    pub fn interface(mut self, guid: Uuid) -> Self {
        self.interface_guids.push(guid);
        self
    }

    /// Encode the descriptor. Lists longer than 255 elements are cut to 255.
    pub fn build(&self) -> Vec<u8> {
        let table_len = descriptor_layout::OFFSET_TABLE_ENTRIES * 2;

        let mut body = Vec::new();
        let names: Vec<&String> = self.class_names.iter().take(usize::from(u8::MAX)).collect();
        let classes_at = table_len + body.len();
        body.push(names.len() as u8);
        for name in names {
            let bytes = name.as_bytes();
            let len = u16::try_from(bytes.len()).unwrap_or(u16::MAX);
            body.extend_from_slice(&len.to_le_bytes());
            body.extend(bytes.iter().take(usize::from(len)));
        }

        let guids: Vec<&Uuid> = self.interface_guids.iter().take(usize::from(u8::MAX)).collect();
        let guids_at = table_len + body.len();
        body.push(guids.len() as u8);
        for guid in guids {
            body.extend_from_slice(&guid.to_bytes_le());
        }

        let mut table = [0u16; descriptor_layout::OFFSET_TABLE_ENTRIES];
        for (slot, entry) in table.iter_mut().enumerate() {
            if slot == DescriptorSection::ClassNames.table_slot() {
                *entry = classes_at as u16;
            } else if slot == DescriptorSection::InterfaceGuids.table_slot() {
                *entry = guids_at as u16;
            }
        }

        let total = Self::HEADER_LEN + table_len + body.len();
        let mut out = Vec::with_capacity(total);
        out.extend_from_slice(&(Self::HEADER_LEN as u16).to_le_bytes());
        out.extend_from_slice(&(total as u16).to_le_bytes());
        out.resize(Self::HEADER_LEN, 0);
        for entry in table {
            out.extend_from_slice(&entry.to_le_bytes());
        }
        out.extend_from_slice(&body);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::interface_guids;

    #[test]
    fn builder_output_parses_back() {
        let raw = DescriptorBuilder::new()
            .class_name("Windows.Xbox.Input.NavigationController")
            .class_name("MadCatz.Xbox.Guitar.Stratocaster")
            .interface(interface_guids::NAVIGATION)
            .interface(interface_guids::GUITAR)
            .build();
        let desc = parse_descriptor(&raw);
        assert!(desc.is_complete(), "{:?}", desc.issues);
        assert!(desc.interface_guids.contains(&interface_guids::GUITAR));
        assert!(desc.interface_guids.contains(&interface_guids::NAVIGATION));
        assert!(desc.class_names.contains("MadCatz.Xbox.Guitar.Stratocaster"));
        assert_eq!(desc.class_names.len(), 2);
    }

    #[test]
    fn guid_bytes_are_mixed_endian() {
        let raw = DescriptorBuilder::new().interface(interface_guids::GUITAR).build();
        // First GUID byte follows the count byte; Data1 is stored little-endian.
        let guid_at = raw.len() - descriptor_layout::GUID_LEN;
        assert_eq!(raw.get(guid_at..guid_at + 4), Some(&[0x38, 0xE4, 0x2A, 0x0D][..]));
    }

    #[test]
    fn empty_and_tiny_buffers() {
        assert_eq!(
            parse_descriptor(&[]).issues,
            vec![DescriptorIssue::HeaderTruncated { available: 0 }]
        );
        let desc = parse_descriptor(&[0x04, 0x00, 0x04]);
        assert!(desc.interface_guids.is_empty());
        assert!(!desc.is_complete());
    }

    #[test]
    fn truncated_guid_list_keeps_parsed_entries() {
        let raw = DescriptorBuilder::new()
            .interface(interface_guids::DRUMS)
            .interface(interface_guids::GUITAR)
            .build();
        let cut = raw.get(..raw.len() - 4).unwrap_or(&raw);
        let desc = parse_descriptor(cut);
        assert!(desc.interface_guids.contains(&interface_guids::DRUMS));
        assert!(!desc.interface_guids.contains(&interface_guids::GUITAR));
        assert!(desc.issues.iter().any(|issue| matches!(
            issue,
            DescriptorIssue::ListTruncated {
                section: DescriptorSection::InterfaceGuids,
                parsed: 1,
                declared: 2,
                ..
            }
        )));
    }

    #[test]
    fn declared_length_bounds_reads() {
        let mut raw = DescriptorBuilder::new().interface(interface_guids::GAMEPAD).build();
        // Shrink the declared length so the GUID sits outside the bound.
        let shorter = (raw.len() - 1) as u16;
        if let Some(field) = raw.get_mut(2..4) {
            field.copy_from_slice(&shorter.to_le_bytes());
        }
        let desc = parse_descriptor(&raw);
        assert!(desc.interface_guids.is_empty());
        assert!(!desc.is_complete());
    }

    #[test]
    fn offset_past_end_is_recorded() {
        let mut raw = DescriptorBuilder::new().build();
        let slot =
            DescriptorBuilder::HEADER_LEN + DescriptorSection::InterfaceGuids.table_slot() * 2;
        if let Some(entry) = raw.get_mut(slot..slot + 2) {
            entry.copy_from_slice(&0x7FFFu16.to_le_bytes());
        }
        let desc = parse_descriptor(&raw);
        assert!(desc.issues.iter().any(|issue| matches!(
            issue,
            DescriptorIssue::OffsetOutOfBounds {
                section: DescriptorSection::InterfaceGuids,
                ..
            }
        )));
    }

    #[test]
    fn invalid_utf8_class_name_is_lossy() {
        let mut raw = DescriptorBuilder::new().class_name("Guitar").build();
        // "Guitar" starts two bytes after the class count byte.
        let name_at =
            DescriptorBuilder::HEADER_LEN + descriptor_layout::OFFSET_TABLE_ENTRIES * 2 + 3;
        if let Some(byte) = raw.get_mut(name_at) {
            *byte = 0xFF;
        }
        let desc = parse_descriptor(&raw);
        assert!(desc.class_names.contains("\u{FFFD}uitar"));
    }
}
