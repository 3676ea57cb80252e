//! Virtual-controller backend errors.

use crate::common::ErrorSeverity;

/// Errors raised while creating or driving a virtual controller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeviceError {
    /// The backend has no free device slot
    #[error("No free {backend} controller slot")]
    NoFreeSlot {
        /// Backend name
        backend: String,
    },

    /// The backend reports the underlying device vanished
    #[error("Controller disconnected: {0}")]
    Disconnected(String),

    /// The backend has not finished connecting the controller
    #[error("Controller {0} is not ready")]
    NotReady(String),
}

impl DeviceError {
    /// How the owning session reacts to this error.
    ///
    /// A not-ready controller drops the report, an exhausted backend leaves
    /// the session without a mapper, and a vanished device forces a fresh
    /// handshake.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            DeviceError::NotReady(_) => ErrorSeverity::Warning,
            DeviceError::NoFreeSlot { .. } => ErrorSeverity::Error,
            DeviceError::Disconnected(_) => ErrorSeverity::Critical,
        }
    }

    /// Check if the session can keep its controller after this error.
    pub fn is_recoverable(&self) -> bool {
        self.severity() < ErrorSeverity::Critical
    }

    /// Check if the backend can never provide a controller for this session.
    pub fn is_exhausted(&self) -> bool {
        matches!(self, DeviceError::NoFreeSlot { .. })
    }

    /// Create a no-free-slot error.
    pub fn no_free_slot(backend: impl Into<String>) -> Self {
        DeviceError::NoFreeSlot {
            backend: backend.into(),
        }
    }

    /// Create a disconnected error.
    pub fn disconnected(device: impl Into<String>) -> Self {
        DeviceError::Disconnected(device.into())
    }

    /// Create a not-ready error.
    pub fn not_ready(device: impl Into<String>) -> Self {
        DeviceError::NotReady(device.into())
    }
}
