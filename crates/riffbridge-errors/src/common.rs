//! Top-level error type and severity levels.

use core::fmt;

/// Errors surfaced while building an engine: configuration and I/O.
///
/// Wire and device failures never leave a session; they stay as
/// [`PacketError`](crate::PacketError) and [`DeviceError`](crate::DeviceError).
#[derive(Debug, thiserror::Error)]
pub enum RiffbridgeError {
    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[source] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// An error annotated with the operation that raised it
    #[error("{operation}: {source}")]
    Context {
        /// The operation that was being performed
        operation: String,
        /// The underlying error
        #[source]
        source: Box<RiffbridgeError>,
    },
}

impl RiffbridgeError {
    /// Create a configuration error with a message.
    pub fn config(msg: impl Into<String>) -> Self {
        RiffbridgeError::Config(msg.into())
    }
}

impl From<std::io::Error> for RiffbridgeError {
    fn from(e: std::io::Error) -> Self {
        RiffbridgeError::Io(e)
    }
}

/// How a session reacts to a device failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum ErrorSeverity {
    /// The report was dropped, the session carries on unchanged
    Warning = 1,
    /// The operation failed, the session carries on without it
    Error = 2,
    /// The session must be rebuilt with a fresh handshake
    Critical = 3,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorSeverity::Warning => write!(f, "drop"),
            ErrorSeverity::Error => write!(f, "degrade"),
            ErrorSeverity::Critical => write!(f, "restart"),
        }
    }
}

/// Extension trait for naming the operation behind an error.
pub trait ResultExt<T> {
    /// Wrap the error in [`RiffbridgeError::Context`].
    ///
    /// # Errors
    ///
    /// Returns the original error wrapped with `operation` when `self` is `Err`.
    fn with_context(self, operation: impl Into<String>) -> Result<T, RiffbridgeError>;
}

impl<T, E: Into<RiffbridgeError>> ResultExt<T> for std::result::Result<T, E> {
    fn with_context(self, operation: impl Into<String>) -> Result<T, RiffbridgeError> {
        self.map_err(|e| RiffbridgeError::Context {
            operation: operation.into(),
            source: Box::new(e.into()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_severity_ordering() {
        assert!(ErrorSeverity::Critical > ErrorSeverity::Error);
        assert!(ErrorSeverity::Error > ErrorSeverity::Warning);
        assert_eq!(ErrorSeverity::Critical.to_string(), "restart");
    }

    #[test]
    fn test_context_wraps_source() {
        let result: std::result::Result<(), RiffbridgeError> =
            Err(RiffbridgeError::config("bad timeout"));
        let err = result.with_context("loading riffbridge.yaml").err();
        assert!(matches!(
            &err,
            Some(RiffbridgeError::Context { source, .. })
                if matches!(source.as_ref(), RiffbridgeError::Config(msg) if msg == "bad timeout")
        ));
        let text = err.map(|e| e.to_string()).unwrap_or_default();
        assert_eq!(text, "loading riffbridge.yaml: Configuration error: bad timeout");
    }

    #[test]
    fn test_context_keeps_io_source() {
        let inner: std::result::Result<(), std::io::Error> =
            Err(std::io::Error::other("boom"));
        let err = inner.with_context("read").err();
        assert!(matches!(
            &err,
            Some(RiffbridgeError::Context { source, .. })
                if matches!(source.as_ref(), RiffbridgeError::Io(_))
        ));
        assert!(err.as_ref().and_then(std::error::Error::source).is_some());
    }

    #[test]
    fn test_io_error_converts() {
        let err: RiffbridgeError = std::io::Error::other("boom").into();
        assert!(matches!(err, RiffbridgeError::Io(_)));
        let _: &dyn std::error::Error = &err;
    }
}
