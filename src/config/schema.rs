//! Serde schema for autocast configuration.

use serde::{Deserialize, Deserializer, Serialize};

use crate::context::AutocastOptions;
use crate::device::DeviceType;
use crate::error::{AutocastError, Result};
use crate::precision::Precision;

/// Deserialize a bool from either a YAML boolean (`true`) or a quoted string (`"true"`).
fn deserialize_bool_lenient<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum BoolOrString {
        Bool(bool),
        Str(String),
    }

    match BoolOrString::deserialize(deserializer)? {
        BoolOrString::Bool(b) => Ok(b),
        BoolOrString::Str(s) => match s.to_lowercase().as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            other => Err(serde::de::Error::custom(format!(
                "expected 'true' or 'false', got '{other}'"
            ))),
        },
    }
}

fn default_device_type() -> String {
    "cuda".to_string()
}

/// Autocast guard configuration
///
/// Strings are kept as written and only parsed by [`options`](Self::options),
/// so a disabled section may carry values this build does not understand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutocastConfig {
    /// Whether the guard does anything
    #[serde(default, deserialize_with = "deserialize_bool_lenient")]
    pub enabled: bool,

    /// Target device (cpu, cuda, mps, xpu, ...)
    #[serde(default = "default_device_type")]
    pub device_type: String,

    /// Reduced precision (fp16/float16/half, bf16/bfloat16); backend default when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dtype: Option<String>,

    /// Cache weight casts while active; backend default when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_enabled: Option<bool>,
}

impl AutocastConfig {
    /// Disabled configuration
    pub fn disabled() -> Self {
        Self { enabled: false, device_type: default_device_type(), dtype: None, cache_enabled: None }
    }

    /// Enabled configuration for `device_type` with backend defaults
    pub fn enabled_on(device_type: impl Into<String>) -> Self {
        Self { enabled: true, device_type: device_type.into(), dtype: None, cache_enabled: None }
    }

    /// Set the requested dtype
    #[must_use]
    pub fn with_dtype(mut self, dtype: impl Into<String>) -> Self {
        self.dtype = Some(dtype.into());
        self
    }

    /// Set the cast-cache flag
    #[must_use]
    pub fn with_cache_enabled(mut self, enabled: bool) -> Self {
        self.cache_enabled = Some(enabled);
        self
    }

    /// Validate and convert into backend options
    pub fn options(&self) -> Result<AutocastOptions> {
        let device_type: DeviceType = self
            .device_type
            .parse()
            .map_err(|e| AutocastError::config("device_type", format!("{e}")))?;

        let dtype = self
            .dtype
            .as_deref()
            .map(str::parse::<Precision>)
            .transpose()
            .map_err(|e| AutocastError::config("dtype", e.to_string()))?;

        Ok(AutocastOptions { device_type, dtype, cache_enabled: self.cache_enabled })
    }
}

impl Default for AutocastConfig {
    fn default() -> Self {
        Self::disabled()
    }
}
