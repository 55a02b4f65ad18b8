//! Loading autocast configuration from YAML.

use std::fs;
use std::path::Path;

use super::AutocastConfig;
use crate::error::{AutocastError, Result};

/// Parse an [`AutocastConfig`] from YAML text
pub fn from_yaml_str(yaml: &str) -> Result<AutocastConfig> {
    serde_yaml::from_str(yaml)
        .map_err(|e| AutocastError::config("autocast", format!("Failed to parse YAML config: {e}")))
}

/// Read and parse an [`AutocastConfig`] from a YAML file
pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<AutocastConfig> {
    let path = path.as_ref();
    let yaml = fs::read_to_string(path)
        .map_err(|e| AutocastError::io(format!("Failed to read config file {}", path.display()), e))?;
    let config = from_yaml_str(&yaml)?;
    tracing::debug!(path = %path.display(), enabled = config.enabled, "autocast config loaded");
    Ok(config)
}
