//! RAII scope returned by [`Autocast::enter`].

use crate::context::ExitCause;
use crate::error::Result;

use super::Autocast;

/// An open autocast scope.
///
/// Exits on every path: explicitly through [`exit`](Self::exit) /
/// [`exit_with`](Self::exit_with), or implicitly on drop. A drop during a
/// panic reports [`ExitCause::Panic`]; errors from an implicit exit cannot
/// be returned and are logged.
#[must_use = "the autocast scope exits as soon as it is dropped"]
#[derive(Debug)]
pub struct AutocastScope<'a> {
    guard: Option<&'a mut Autocast>,
}

impl<'a> AutocastScope<'a> {
    pub(super) fn new(guard: &'a mut Autocast) -> Self {
        Self { guard: Some(guard) }
    }

    /// Scope of a disabled guard
    pub(super) fn inert() -> Self {
        Self { guard: None }
    }

    /// Whether exiting will reach a precision context
    pub fn is_active(&self) -> bool {
        self.guard.is_some()
    }

    /// Exit after normal completion
    pub fn exit(self) -> Result<()> {
        self.exit_with(ExitCause::Normal)
    }

    /// Exit, forwarding how the scope ended to the context
    pub fn exit_with(mut self, cause: ExitCause) -> Result<()> {
        match self.guard.take() {
            Some(guard) => guard.exit_scope(&cause),
            None => Ok(()),
        }
    }
}

impl Drop for AutocastScope<'_> {
    fn drop(&mut self) {
        let Some(guard) = self.guard.take() else {
            return;
        };
        let cause = if std::thread::panicking() { ExitCause::Panic } else { ExitCause::Normal };
        if let Err(e) = guard.exit_scope(&cause) {
            tracing::error!(error = %e, %cause, "autocast exit failed on drop");
        }
    }
}
