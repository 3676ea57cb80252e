//! Device mappers: turn decoded instrument reports into virtual-controller
//! state.
//!
//! The mapper family is a closed enum ([`DeviceMapper`]); each instrument
//! variant owns exactly one virtual-controller handle, released when the
//! mapper is dropped. The wireless legacy variant owns a map of child mappers
//! keyed by user index. Host-bound messages (LED, keep-alive, device requests)
//! are queued into an [`Outbox`](riffbridge_gip_protocol::Outbox) rather than
//! written anywhere.

#![deny(static_mut_refs)]

pub mod controller;
pub mod drums;
pub mod factory;
pub mod fallback;
pub mod gamepad;
pub mod guitar;
pub mod legacy;
pub mod mapper;
#[cfg(any(test, feature = "mock"))]
#[cfg_attr(docsrs, doc(cfg(feature = "mock")))]
pub mod mock;
pub mod options;
pub mod scaling;
pub mod six_fret;

#[cfg(test)]
mod fallback_tests;

pub use controller::{
    BackendKind, ControllerAxis, ControllerBackend, ControllerButton, ControllerHandle,
    ControllerSlider, VirtualController,
};
pub use drums::{DpadLatch, DrumMapper};
pub use factory::{MapperFactory, MapperSelection};
pub use fallback::FallbackMapper;
pub use gamepad::GamepadMapper;
pub use guitar::{GuitarMapper, GuitarProfile};
pub use legacy::WirelessLegacyMapper;
pub use mapper::{DeviceMapper, MapperKind};
pub use options::MapperOptions;
pub use six_fret::SixFretMapper;
