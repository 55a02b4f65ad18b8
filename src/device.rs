//! Compute device categories an autocast scope can target.

use std::fmt;
use std::str::FromStr;

/// Class of compute hardware a precision context applies to.
///
/// Only the category matters for autocast; an ordinal such as the `1` in
/// `cuda:1` is accepted when parsing and dropped.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum DeviceType {
    /// General-purpose processor
    Cpu,
    /// NVIDIA GPU
    #[default]
    Cuda,
    /// Apple Metal Performance Shaders
    Mps,
    /// Intel GPU
    Xpu,
    /// Any other device string, kept verbatim (lowercased)
    Other(String),
}

impl DeviceType {
    /// Identifier as written in configs
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Cpu => "cpu",
            Self::Cuda => "cuda",
            Self::Mps => "mps",
            Self::Xpu => "xpu",
            Self::Other(name) => name,
        }
    }

    /// Check if this device is an accelerator
    #[must_use]
    pub fn is_accelerator(&self) -> bool {
        !matches!(self, Self::Cpu)
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An empty device string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("device type must not be empty")]
pub struct ParseDeviceError;

impl FromStr for DeviceType {
    type Err = ParseDeviceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        let category = lowered.split(':').next().unwrap_or_default();
        match category {
            "" => Err(ParseDeviceError),
            "cpu" => Ok(Self::Cpu),
            "cuda" | "gpu" => Ok(Self::Cuda),
            "mps" => Ok(Self::Mps),
            "xpu" => Ok(Self::Xpu),
            other => Ok(Self::Other(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_devices() {
        assert_eq!("cpu".parse(), Ok(DeviceType::Cpu));
        assert_eq!("CUDA".parse(), Ok(DeviceType::Cuda));
        assert_eq!("mps".parse(), Ok(DeviceType::Mps));
        assert_eq!("xpu".parse(), Ok(DeviceType::Xpu));
    }

    #[test]
    fn test_parse_strips_ordinal() {
        assert_eq!("cuda:1".parse(), Ok(DeviceType::Cuda));
        assert_eq!("npu:3".parse(), Ok(DeviceType::Other("npu".into())));
    }

    #[test]
    fn test_parse_empty_fails() {
        assert_eq!("".parse::<DeviceType>(), Err(ParseDeviceError));
        assert_eq!(":0".parse::<DeviceType>(), Err(ParseDeviceError));
    }

    #[test]
    fn test_display_roundtrips() {
        for device in [DeviceType::Cpu, DeviceType::Cuda, DeviceType::Other("tpu".into())] {
            assert_eq!(device.to_string().parse(), Ok(device));
        }
    }

    #[test]
    fn test_is_accelerator() {
        assert!(!DeviceType::Cpu.is_accelerator());
        assert!(DeviceType::Mps.is_accelerator());
    }
}
