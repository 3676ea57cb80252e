//! Centralized error types for riffbridge
//!
//! Every failure the protocol engine can observe is absorbed at the session
//! boundary; nothing here is meant to terminate the process. The taxonomy:
//!
//! - [`packet`]: malformed wire data (headers, varints, chunk sequences). The
//!   offending message or chunk sequence is dropped and processing continues.
//! - [`device`]: virtual-controller backend failures. Each carries an
//!   [`ErrorSeverity`] telling the session whether to drop the report, run
//!   without a mapper, or restart the handshake.
//! - [`common`]: configuration and I/O failures raised while building an
//!   engine, with operation context.
//!
//! # Example
//!
//! ```
//! use riffbridge_errors::{DeviceError, ErrorSeverity};
//!
//! let err = DeviceError::disconnected("drums");
//! assert!(!err.is_recoverable());
//! assert_eq!(err.severity(), ErrorSeverity::Critical);
//! ```

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod common;
pub mod device;
pub mod packet;

pub use common::{ErrorSeverity, ResultExt, RiffbridgeError};
pub use device::DeviceError;
pub use packet::PacketError;

/// A specialized `Result` type for riffbridge operations.
pub type Result<T> = std::result::Result<T, RiffbridgeError>;
