//! Error types with actionable diagnostics.
//!
//! Errors raised by a precision backend travel as [`ContextError`] and are
//! passed through untouched, with one exception: an unsupported
//! device/dtype pair at entry is rewritten into
//! [`AutocastError::UnsupportedConfiguration`], which carries the remedy in
//! its message.

use crate::device::DeviceType;
use crate::precision::Precision;
use thiserror::Error;

/// Result type alias for autocast operations.
pub type Result<T> = std::result::Result<T, AutocastError>;

/// Errors reported by a [`PrecisionContext`](crate::PrecisionContext) or
/// [`PrecisionBackend`](crate::PrecisionBackend).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContextError {
    /// The backend cannot run this dtype on this device.
    #[error("Unsupported autocast combination: dtype={dtype} device={device}")]
    Unsupported { device: DeviceType, dtype: Precision },

    /// Exit was requested without a matching enter.
    #[error("Autocast context for {device} exited while not active")]
    NotActive { device: DeviceType },

    /// Exit was requested while a scope entered later is still active.
    #[error("Autocast context for {device} exited out of order; inner scopes must exit first")]
    OutOfOrder { device: DeviceType },

    /// Any other framework failure, carried verbatim.
    #[error("{0}")]
    Framework(String),
}

/// Errors reported by the autocast guard and its configuration layer.
#[derive(Error, Debug)]
pub enum AutocastError {
    /// The requested device/dtype pair was refused when entering the guard.
    #[error(
        "There was an error autocasting with dtype={dtype} device={device}\n  \
         → Some GPU clusters lack {dtype} support; try an explicit dtype: float16 override"
    )]
    UnsupportedConfiguration { dtype: Precision, device: DeviceType },

    /// Framework error passed through unchanged.
    #[error(transparent)]
    Context(#[from] ContextError),

    /// Configuration value is invalid.
    #[error("Invalid autocast configuration for '{field}': {message}")]
    Config { field: String, message: String },

    /// IO error with context.
    #[error("IO error: {context}\n  Cause: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl AutocastError {
    /// Create a configuration error for `field`.
    pub fn config(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Config { field: field.into(), message: message.into() }
    }

    /// Create an IO error with context.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io { context: context.into(), source }
    }

    /// Whether a different configuration from the caller can fix this error.
    pub fn is_user_error(&self) -> bool {
        matches!(self, Self::UnsupportedConfiguration { .. } | Self::Config { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_message_names_dtype_and_device() {
        let err = AutocastError::UnsupportedConfiguration {
            dtype: Precision::Bf16,
            device: DeviceType::Cuda,
        };
        let msg = err.to_string();
        assert!(msg.contains("dtype=bf16"));
        assert!(msg.contains("device=cuda"));
        assert!(msg.contains("float16"));
        assert!(err.is_user_error());
    }

    #[test]
    fn test_context_error_is_transparent() {
        let err: AutocastError = ContextError::Framework("driver exploded".into()).into();
        assert_eq!(err.to_string(), "driver exploded");
        assert!(!err.is_user_error());
    }

    #[test]
    fn test_out_of_order_message() {
        let err: AutocastError = ContextError::OutOfOrder { device: DeviceType::Cuda }.into();
        assert!(err.to_string().contains("cuda"));
        assert!(err.to_string().contains("inner scopes must exit first"));
        assert!(!err.is_user_error());
    }

    #[test]
    fn test_io_error_keeps_source() {
        use std::error::Error as _;
        let err = AutocastError::io("reading autocast.yaml", std::io::Error::other("denied"));
        assert!(err.source().is_some());
        assert!(err.to_string().contains("autocast.yaml"));
    }
}
