//! Conditional mixed-precision scopes.
//!
//! [`Autocast`] enables a reduced-precision execution context around a block
//! or closure when configured to, and does nothing otherwise. The actual
//! precision switching is delegated to a [`PrecisionBackend`]; the crate
//! ships [`AmbientBackend`], which keeps per-thread precision state that
//! numeric code can query.
//!
//! # Example
//!
//! ```
//! use autocast::{Autocast, AutocastOptions, DeviceType, Precision};
//! use autocast::ambient::autocast_dtype;
//!
//! let options = AutocastOptions::new(DeviceType::Cpu);
//! let mut autocast = Autocast::ambient(true, &options)?;
//!
//! let dtype = autocast.run(|| autocast_dtype(&DeviceType::Cpu))?;
//! assert_eq!(dtype, Some(Precision::Bf16));
//! # Ok::<(), autocast::AutocastError>(())
//! ```

pub mod ambient;
pub mod config;
pub mod context;
pub mod device;
pub mod error;
pub mod guard;
pub mod precision;

pub use ambient::AmbientBackend;
pub use config::AutocastConfig;
pub use context::{AutocastOptions, ExitCause, PrecisionBackend, PrecisionContext};
pub use device::DeviceType;
pub use error::{AutocastError, ContextError, Result};
pub use guard::{Autocast, AutocastScope, Decorated, GuardState};
pub use precision::Precision;
