//! Conditional mixed-precision guard.
//!
//! [`Autocast`] wraps a framework [`PrecisionContext`] that is only built
//! when the guard is enabled. A disabled guard never touches the backend
//! and every operation on it is a no-op, which lets callers keep one code
//! path for hardware with and without reduced-precision support.
//!
//! ## Example
//!
//! ```ignore
//! use autocast::{Autocast, AutocastOptions, DeviceType, Precision};
//!
//! let options = AutocastOptions::new(DeviceType::Cuda).with_dtype(Precision::Bf16);
//! let mut autocast = Autocast::ambient(config.use_amp, &options)?;
//!
//! // Block scope
//! let scope = autocast.enter()?;
//! let loss = model.forward(&batch);
//! scope.exit()?;
//!
//! // Closure scope
//! let loss = autocast.run(|| model.forward(&batch))?;
//! ```

mod decorate;
mod scope;


use std::fmt;

use crate::ambient::AmbientBackend;
use crate::config::AutocastConfig;
use crate::context::{AutocastOptions, ExitCause, PrecisionBackend, PrecisionContext};
use crate::device::DeviceType;
use crate::error::{AutocastError, ContextError, Result};
use crate::precision::Precision;

pub use decorate::Decorated;
pub use scope::AutocastScope;

/// Lifecycle state of an [`Autocast`] guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    /// Permanently a no-op
    Disabled,
    /// Enabled, no scope open
    Inactive,
    /// Enabled, inside a scope
    Active,
}

/// Scoped guard that enables mixed precision only when configured to.
pub struct Autocast {
    context: Option<Box<dyn PrecisionContext>>,
    active: bool,
}

impl Autocast {
    /// Create a guard.
    ///
    /// When `enabled` is false the backend is not consulted and `options`
    /// are ignored, whatever they contain.
    pub fn new<B>(enabled: bool, options: &AutocastOptions, backend: &B) -> Result<Self>
    where
        B: PrecisionBackend + ?Sized,
    {
        if !enabled {
            return Ok(Self::disabled());
        }
        let context = backend.create_context(options)?;
        tracing::debug!(
            device = %context.device(),
            dtype = %context.dtype(),
            cache_enabled = context.cache_enabled(),
            "autocast guard created"
        );
        Ok(Self { context: Some(context), active: false })
    }

    /// A guard that never does anything
    pub fn disabled() -> Self {
        Self { context: None, active: false }
    }

    /// Create a guard backed by thread-local ambient precision state
    pub fn ambient(enabled: bool, options: &AutocastOptions) -> Result<Self> {
        Self::new(enabled, options, &AmbientBackend::new())
    }

    /// Create a guard from a loaded configuration.
    ///
    /// A disabled config yields a disabled guard without validating the
    /// remaining fields.
    pub fn from_config<B>(config: &AutocastConfig, backend: &B) -> Result<Self>
    where
        B: PrecisionBackend + ?Sized,
    {
        if !config.enabled {
            return Ok(Self::disabled());
        }
        Self::new(true, &config.options()?, backend)
    }

    /// Whether the guard delegates to a context
    pub fn is_enabled(&self) -> bool {
        self.context.is_some()
    }

    /// Current lifecycle state
    pub fn state(&self) -> GuardState {
        match (&self.context, self.active) {
            (None, _) => GuardState::Disabled,
            (Some(_), false) => GuardState::Inactive,
            (Some(_), true) => GuardState::Active,
        }
    }

    /// Device of the underlying context, if enabled
    pub fn device(&self) -> Option<&DeviceType> {
        self.context.as_deref().map(|c| c.device())
    }

    /// Resolved precision of the underlying context, if enabled
    pub fn dtype(&self) -> Option<Precision> {
        self.context.as_deref().map(|c| c.dtype())
    }

    /// Enter the guarded scope.
    ///
    /// The returned scope exits when dropped or when
    /// [`AutocastScope::exit`] is called. The guard stays mutably borrowed
    /// until then, so scopes on one guard cannot overlap.
    ///
    /// # Errors
    ///
    /// [`AutocastError::UnsupportedConfiguration`] if the backend cannot run
    /// the requested dtype on the device; other backend errors unchanged.
    pub fn enter(&mut self) -> Result<AutocastScope<'_>> {
        let Some(context) = self.context.as_mut() else {
            return Ok(AutocastScope::inert());
        };

        match context.enter() {
            Ok(()) => {
                tracing::debug!(device = %context.device(), dtype = %context.dtype(), "autocast enter");
                self.active = true;
                Ok(AutocastScope::new(self))
            }
            Err(ContextError::Unsupported { .. }) => {
                let device = context.device().clone();
                let dtype = context.dtype();
                tracing::warn!(%device, %dtype, "autocast rejected device/dtype combination");
                Err(AutocastError::UnsupportedConfiguration { dtype, device })
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Run `f` inside the guarded scope.
    ///
    /// A panic in `f` still exits the scope while unwinding.
    pub fn run<R>(&mut self, f: impl FnOnce() -> R) -> Result<R> {
        let scope = self.enter()?;
        let output = f();
        scope.exit()?;
        Ok(output)
    }

    /// Run a fallible `f` inside the guarded scope.
    ///
    /// An error from `f` is forwarded to the context as
    /// [`ExitCause::Error`] and then returned unchanged. If exiting also
    /// fails, the exit error is logged and `f`'s error wins.
    pub fn try_run<R, E>(
        &mut self,
        f: impl FnOnce() -> std::result::Result<R, E>,
    ) -> std::result::Result<R, E>
    where
        E: From<AutocastError> + fmt::Display,
    {
        let scope = self.enter()?;
        match f() {
            Ok(output) => {
                scope.exit()?;
                Ok(output)
            }
            Err(e) => {
                if let Err(exit_err) = scope.exit_with(ExitCause::Error(e.to_string())) {
                    tracing::error!(error = %exit_err, "autocast exit failed after guarded error");
                }
                Err(e)
            }
        }
    }

    /// Wrap `f` so every call runs inside this guard's scope
    pub fn decorate<F>(self, f: F) -> Decorated<F> {
        Decorated::new(self, f)
    }

    fn exit_scope(&mut self, cause: &ExitCause) -> Result<()> {
        let Some(context) = self.context.as_mut() else {
            return Ok(());
        };
        self.active = false;
        context.exit(cause)?;
        tracing::debug!(device = %context.device(), %cause, "autocast exit");
        Ok(())
    }
}

impl Default for Autocast {
    fn default() -> Self {
        Self::disabled()
    }
}

impl fmt::Debug for Autocast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Autocast")
            .field("state", &self.state())
            .field("device", &self.device())
            .field("dtype", &self.dtype())
            .finish()
    }
}
