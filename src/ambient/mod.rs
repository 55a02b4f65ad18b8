//! In-process precision backend built on thread-local ambient state.
//!
//! Entering an [`AmbientContext`] pushes an [`AutocastFrame`] onto the
//! current thread's stack; numeric code asks [`current_frame`] or
//! [`maybe_autocast`] what precision to compute in. Each thread owns its own
//! stack, so guards on different threads do not interact.
//!
//! ## Example
//!
//! ```
//! use autocast::ambient::{autocast_dtype, maybe_autocast};
//! use autocast::{Autocast, AutocastOptions, DeviceType, Precision};
//!
//! let mut guard = Autocast::ambient(true, &AutocastOptions::new(DeviceType::Cpu))?;
//! let activations = guard.run(|| {
//!     assert_eq!(autocast_dtype(&DeviceType::Cpu), Some(Precision::Bf16));
//!     maybe_autocast(&[1.0, 2.0, 3.0])
//! })?;
//! assert_eq!(activations.precision(), Precision::Bf16);
//! # Ok::<(), autocast::AutocastError>(())
//! ```

mod cache;
mod state;

#[cfg(test)]
mod tests;

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::context::{AutocastOptions, ExitCause, PrecisionBackend, PrecisionContext};
use crate::device::DeviceType;
use crate::error::ContextError;
use crate::precision::Precision;

pub use cache::{cache_len, cast_weight, maybe_autocast, CastTensor};
pub use state::{autocast_dtype, current_frame, is_autocast_enabled, nesting_depth, AutocastFrame};

static NEXT_CONTEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Reduced precisions a device accepts, and the one used when none is requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceSupport {
    pub dtypes: Vec<Precision>,
    pub default_dtype: Precision,
}

impl DeviceSupport {
    fn new(dtypes: impl IntoIterator<Item = Precision>, default_dtype: Precision) -> Self {
        Self { dtypes: dtypes.into_iter().collect(), default_dtype }
    }
}

/// Backend whose contexts toggle thread-local ambient precision.
#[derive(Debug, Clone)]
pub struct AmbientBackend {
    support: HashMap<DeviceType, DeviceSupport>,
}

impl AmbientBackend {
    /// Backend with the built-in support table
    pub fn new() -> Self {
        let support = HashMap::from([
            (DeviceType::Cpu, DeviceSupport::new([Precision::Bf16, Precision::Fp16], Precision::Bf16)),
            (DeviceType::Cuda, DeviceSupport::new([Precision::Fp16, Precision::Bf16], Precision::Fp16)),
            (DeviceType::Mps, DeviceSupport::new([Precision::Fp16], Precision::Fp16)),
            (DeviceType::Xpu, DeviceSupport::new([Precision::Bf16, Precision::Fp16], Precision::Bf16)),
        ]);
        Self { support }
    }

    /// Replace the support entry for `device`
    ///
    /// Useful for hardware without bf16 (e.g. pre-Ampere CUDA cards).
    #[must_use]
    pub fn with_support(
        mut self,
        device: DeviceType,
        dtypes: impl IntoIterator<Item = Precision>,
        default_dtype: Precision,
    ) -> Self {
        self.support.insert(device, DeviceSupport::new(dtypes, default_dtype));
        self
    }

    /// Whether `dtype` can run on `device`
    pub fn supports(&self, device: &DeviceType, dtype: Precision) -> bool {
        self.support.get(device).is_some_and(|s| s.dtypes.contains(&dtype))
    }

    /// Precision used on `device` when none is requested
    ///
    /// Unknown devices fall back to fp16.
    pub fn default_dtype(&self, device: &DeviceType) -> Precision {
        self.support.get(device).map_or(Precision::Fp16, |s| s.default_dtype)
    }
}

impl Default for AmbientBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl PrecisionBackend for AmbientBackend {
    fn create_context(
        &self,
        options: &AutocastOptions,
    ) -> Result<Box<dyn PrecisionContext>, ContextError> {
        let device = options.device_type.clone();
        let dtype = options.dtype.unwrap_or_else(|| self.default_dtype(&device));
        // Support is checked on enter, not here
        let supported = self.supports(&device, dtype);
        Ok(Box::new(AmbientContext {
            id: NEXT_CONTEXT_ID.fetch_add(1, Ordering::Relaxed),
            frame: AutocastFrame { device, dtype, cache_enabled: options.cache_enabled.unwrap_or(true) },
            supported,
            depth: 0,
        }))
    }
}

/// Context produced by [`AmbientBackend`].
#[derive(Debug)]
pub struct AmbientContext {
    id: u64,
    frame: AutocastFrame,
    supported: bool,
    depth: usize,
}

impl PrecisionContext for AmbientContext {
    fn device(&self) -> &DeviceType {
        &self.frame.device
    }

    fn dtype(&self) -> Precision {
        self.frame.dtype
    }

    fn cache_enabled(&self) -> bool {
        self.frame.cache_enabled
    }

    fn enter(&mut self) -> Result<(), ContextError> {
        if !self.supported {
            return Err(ContextError::Unsupported {
                device: self.frame.device.clone(),
                dtype: self.frame.dtype,
            });
        }
        state::push_frame(self.id, self.frame.clone());
        self.depth += 1;
        Ok(())
    }

    fn exit(&mut self, cause: &ExitCause) -> Result<(), ContextError> {
        if self.depth == 0 {
            return Err(ContextError::NotActive { device: self.frame.device.clone() });
        }
        // Inner scopes must exit first; a mismatched exit leaves the stack as is
        if state::pop_frame(self.id).is_none() {
            return Err(ContextError::OutOfOrder { device: self.frame.device.clone() });
        }
        if cause.is_abnormal() {
            tracing::trace!(device = %self.frame.device, %cause, "ambient context unwinding");
        }
        self.depth -= 1;
        Ok(())
    }
}
