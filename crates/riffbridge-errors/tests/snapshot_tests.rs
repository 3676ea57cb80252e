//! Snapshot tests for error message formatting.
//!
//! Log lines are the only diagnostic channel for unknown devices, so the
//! rendered messages are pinned here.

use insta::assert_snapshot;
use riffbridge_errors::{DeviceError, PacketError, ResultExt, RiffbridgeError};

// ── Packet errors ────────────────────────────────────────────────────────────

#[test]
fn test_truncated_header() {
    assert_snapshot!(
        PacketError::truncated("command header", 3, 1).to_string(),
        @"Truncated command header: need 3 bytes, got 1"
    );
}

#[test]
fn test_stray_continuation() {
    assert_snapshot!(
        PacketError::UnexpectedContinuation {
            command_id: 0x20,
            offset: 58,
        }
        .to_string(),
        @"Chunk continuation for command 0x20 at offset 58 without a chunk start"
    );
}

#[test]
fn test_conflicting_chunk_start() {
    assert_snapshot!(
        PacketError::ConflictingChunkStart {
            open: 120,
            requested: 64,
        }
        .to_string(),
        @"Chunk start declares 64 bytes while a 120-byte sequence is open"
    );
}

// ── Device errors ────────────────────────────────────────────────────────────

#[test]
fn test_no_free_slot() {
    assert_snapshot!(
        DeviceError::no_free_slot("gamepad").to_string(),
        @"No free gamepad controller slot"
    );
}

#[test]
fn test_not_ready() {
    assert_snapshot!(
        DeviceError::not_ready("guitar 2").to_string(),
        @"Controller guitar 2 is not ready"
    );
}

// ── Engine setup errors ──────────────────────────────────────────────────────

#[test]
fn test_config_error_with_context() {
    let result: Result<(), RiffbridgeError> =
        Err(RiffbridgeError::config("unsupported config extension Some(\"toml\")"));
    let text = result
        .with_context("loading riffbridge.toml")
        .err()
        .map(|e| e.to_string())
        .unwrap_or_default();
    assert_snapshot!(
        text,
        @r#"loading riffbridge.toml: Configuration error: unsupported config extension Some("toml")"#
    );
}
