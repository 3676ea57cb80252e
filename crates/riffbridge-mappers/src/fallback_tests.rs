//! Tests for the length-sniffing fallback mapper.

use riffbridge_gip_protocol::{command_ids, guitar_report, six_fret_report};

use super::controller::{BackendKind, ControllerAxis, ControllerButton};
use super::fallback::FallbackMapper;
use super::mock::MockBackend;
use super::options::MapperOptions;

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn mapper() -> Result<(MockBackend, FallbackMapper), riffbridge_errors::DeviceError> {
    let backend = MockBackend::new(BackendKind::Joystick, 1);
    let mapper = FallbackMapper::new(&backend, &MapperOptions::default())?;
    Ok((backend, mapper))
}

#[test]
fn test_guitar_length() -> TestResult {
    let (backend, mut mapper) = mapper()?;
    let mut data = vec![0u8; guitar_report::LEN];
    if let Some(upper) = data.get_mut(guitar_report::UPPER_FRETS) {
        *upper = guitar_report::YELLOW;
    }
    mapper.decode(command_ids::INPUT, &data)?;
    let s = backend.last_submission().ok_or("no submission")?;
    assert!(s.pressed(ControllerButton::Y));
    assert_eq!(s.axis(ControllerAxis::RightX), i16::MIN);
    Ok(())
}

#[test]
fn test_drum_length_uses_latch() -> TestResult {
    let (backend, mut mapper) = mapper()?;
    // blue cymbal only
    mapper.decode(command_ids::INPUT, &[0, 0, 0, 0, 0x04, 0x00])?;
    let s = backend.last_submission().ok_or("no submission")?;
    assert!(s.pressed(ControllerButton::DpadDown));
    assert!(s.pressed(ControllerButton::X));
    Ok(())
}

#[test]
fn test_six_fret_length() -> TestResult {
    let (backend, mut mapper) = mapper()?;
    let mut data = vec![0x80u8; six_fret_report::LEN];
    if let Some(frets) = data.get_mut(six_fret_report::FRETS) {
        *frets = six_fret_report::WHITE_1;
    }
    for offset in [six_fret_report::BUTTONS, six_fret_report::BUTTONS + 1] {
        if let Some(b) = data.get_mut(offset) {
            *b = 0;
        }
    }
    mapper.decode(command_ids::INPUT, &data)?;
    let s = backend.last_submission().ok_or("no submission")?;
    assert!(s.pressed(ControllerButton::X));
    assert!(!s.pressed(ControllerButton::A));
    Ok(())
}

#[test]
fn test_unknown_length_ignored() -> TestResult {
    let (backend, mut mapper) = mapper()?;
    mapper.decode(command_ids::INPUT, &[0u8; 3])?;
    mapper.decode(command_ids::INPUT, &[])?;
    assert!(backend.submissions().is_empty());
    Ok(())
}
