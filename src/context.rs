//! Capability seam between the guard and a numeric framework.
//!
//! A tensor library plugs into [`Autocast`](crate::Autocast) by implementing
//! [`PrecisionBackend`] (construction) and [`PrecisionContext`] (activation).
//! The guard never inspects framework state itself.

use std::fmt;

use crate::device::DeviceType;
use crate::error::ContextError;
use crate::precision::Precision;

/// Options forwarded verbatim to [`PrecisionBackend::create_context`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AutocastOptions {
    /// Target device category
    pub device_type: DeviceType,
    /// Requested reduced precision; `None` lets the backend pick
    pub dtype: Option<Precision>,
    /// Whether weight casts may be cached; `None` lets the backend pick
    pub cache_enabled: Option<bool>,
}

impl AutocastOptions {
    /// Options for `device_type` with backend defaults for everything else
    pub fn new(device_type: DeviceType) -> Self {
        Self { device_type, dtype: None, cache_enabled: None }
    }

    /// Request a specific dtype
    #[must_use]
    pub fn with_dtype(mut self, dtype: Precision) -> Self {
        self.dtype = Some(dtype);
        self
    }

    /// Enable/disable the weight-cast cache
    #[must_use]
    pub fn with_cache_enabled(mut self, enabled: bool) -> Self {
        self.cache_enabled = Some(enabled);
        self
    }
}

/// How the guarded scope was left.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitCause {
    /// Normal completion
    Normal,
    /// The guarded computation returned an error (rendered message)
    Error(String),
    /// The thread is unwinding from a panic
    Panic,
}

impl ExitCause {
    /// Whether the scope ended abnormally
    pub fn is_abnormal(&self) -> bool {
        !matches!(self, Self::Normal)
    }
}

impl fmt::Display for ExitCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Normal => write!(f, "normal"),
            Self::Error(msg) => write!(f, "error: {msg}"),
            Self::Panic => write!(f, "panic"),
        }
    }
}

/// A framework-native mixed-precision context.
///
/// `enter`/`exit` calls are strictly nested by the guard; implementations
/// may rely on that.
pub trait PrecisionContext {
    /// Device the context targets
    fn device(&self) -> &DeviceType;

    /// Resolved reduced precision (after applying backend defaults)
    fn dtype(&self) -> Precision;

    /// Whether weight casts are cached while active
    fn cache_enabled(&self) -> bool;

    /// Activate the context.
    ///
    /// Must return [`ContextError::Unsupported`] when the device/dtype pair
    /// cannot run; the guard rewrites that case for the caller.
    fn enter(&mut self) -> Result<(), ContextError>;

    /// Deactivate the context.
    fn exit(&mut self, cause: &ExitCause) -> Result<(), ContextError>;
}

/// Factory for [`PrecisionContext`]s.
pub trait PrecisionBackend {
    /// Build a context from `options`. Called once per enabled guard.
    fn create_context(
        &self,
        options: &AutocastOptions,
    ) -> Result<Box<dyn PrecisionContext>, ContextError>;
}

impl<B: PrecisionBackend + ?Sized> PrecisionBackend for &B {
    fn create_context(
        &self,
        options: &AutocastOptions,
    ) -> Result<Box<dyn PrecisionContext>, ContextError> {
        (**self).create_context(options)
    }
}
