//! YAML configuration for autocast guards.
//!
//! ```yaml
//! enabled: true
//! device_type: cuda
//! dtype: float16
//! cache_enabled: true
//! ```

mod loader;
mod schema;

pub use loader::{from_yaml_file, from_yaml_str};
pub use schema::AutocastConfig;
