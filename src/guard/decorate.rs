//! Function wrapper that runs every call inside an autocast scope.

use std::borrow::Cow;
use std::fmt;

use crate::error::{AutocastError, Result};

use super::Autocast;

/// A callable bound to an [`Autocast`] guard.
///
/// Multi-argument functions take their arguments as a tuple.
pub struct Decorated<F> {
    guard: Autocast,
    func: F,
    name: Cow<'static, str>,
}

impl<F> Decorated<F> {
    pub(super) fn new(guard: Autocast, func: F) -> Self {
        Self { guard, func, name: Cow::Borrowed(std::any::type_name::<F>()) }
    }

    /// Override the reported name
    #[must_use]
    pub fn with_name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.name = name.into();
        self
    }

    /// Name of the wrapped callable (its type path unless overridden)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The wrapped callable
    pub fn inner(&self) -> &F {
        &self.func
    }

    /// Unwrap into the original callable
    pub fn into_inner(self) -> F {
        self.func
    }

    /// Call inside the guard's scope
    pub fn call<A, R>(&mut self, args: A) -> Result<R>
    where
        F: FnMut(A) -> R,
    {
        let func = &mut self.func;
        self.guard.run(|| func(args))
    }

    /// Call a fallible function inside the guard's scope
    pub fn try_call<A, R, E>(&mut self, args: A) -> std::result::Result<R, E>
    where
        F: FnMut(A) -> std::result::Result<R, E>,
        E: From<AutocastError> + fmt::Display,
    {
        let func = &mut self.func;
        self.guard.try_run(|| func(args))
    }
}

impl<F> fmt::Debug for Decorated<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Decorated").field("name", &self.name).field("guard", &self.guard).finish()
    }
}
