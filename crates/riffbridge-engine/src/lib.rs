//! Protocol engine: turns captured frames into virtual-controller updates.
//!
//! Two entry points share one [`EngineContext`]:
//! - [`ReceiverCapture`] for frames relayed by a wireless receiver, where a
//!   header in front of every message names the device, and
//! - [`DirectStream`] for a device attached on its own pipe.
//!
//! Both own their [`ClientSession`]s outright and take `&mut self`; the only
//! state shared between threads is the [`DeviceRegistry`].
//!
//! Nothing here performs I/O. Host-bound packets are collected with
//! `drain_outgoing` and written by whoever owns the transport.

#![deny(static_mut_refs)]

pub mod config;
pub mod context;
pub mod direct;
pub mod receiver;
pub mod registry;
pub mod session;
pub mod sink;

pub use config::EngineConfig;
pub use context::EngineContext;
pub use direct::DirectStream;
pub use receiver::ReceiverCapture;
pub use registry::{DeviceInfo, DeviceKey, DeviceRegistry};
pub use session::{ClientSession, PacketDisposition};
pub use sink::FrameSink;
