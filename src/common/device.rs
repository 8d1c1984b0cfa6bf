//! # Device and precision selection
//!
//! The set of devices and precisions a model can be loaded with is closed: a `DeviceKind` is
//! either the CPU or the (first) CUDA device, and a `Precision` is either full (32 bits) or half
//! (16 bits) floating point. Users configure a `DevicePreference`, resolved against the
//! availability of an accelerator when a model is requested.

use crate::common::error::TranslatorError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// # Device a model is placed on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    Cpu,
    Cuda,
}

impl DeviceKind {
    pub fn is_accelerator(&self) -> bool {
        matches!(self, DeviceKind::Cuda)
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceKind::Cpu => write!(f, "cpu"),
            DeviceKind::Cuda => write!(f, "cuda"),
        }
    }
}

#[cfg(feature = "torch")]
impl From<DeviceKind> for tch::Device {
    fn from(device: DeviceKind) -> Self {
        match device {
            DeviceKind::Cpu => tch::Device::Cpu,
            DeviceKind::Cuda => tch::Device::Cuda(0),
        }
    }
}

/// # Requested device, resolved to a `DeviceKind` when a model is loaded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DevicePreference {
    /// CUDA when available, CPU otherwise
    Auto,
    Cpu,
    Cuda,
}

impl Default for DevicePreference {
    fn default() -> Self {
        DevicePreference::Auto
    }
}

impl DevicePreference {
    /// Resolves the preference against the accelerator availability.
    ///
    /// An explicit CUDA request on a machine without CUDA falls back to the CPU, mirroring the
    /// behaviour of `Device::cuda_if_available`.
    pub fn resolve(&self, cuda_available: bool) -> DeviceKind {
        match self {
            DevicePreference::Cpu => DeviceKind::Cpu,
            DevicePreference::Auto | DevicePreference::Cuda => {
                if cuda_available {
                    DeviceKind::Cuda
                } else {
                    DeviceKind::Cpu
                }
            }
        }
    }
}

impl FromStr for DevicePreference {
    type Err = TranslatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(DevicePreference::Auto),
            "cpu" => Ok(DevicePreference::Cpu),
            "cuda" | "gpu" => Ok(DevicePreference::Cuda),
            other => Err(TranslatorError::InvalidConfigurationError(format!(
                "unknown device `{}` (expected auto, cpu or cuda)",
                other
            ))),
        }
    }
}

/// # Floating point precision of the model weights
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Precision {
    Full,
    Half,
}

impl Default for Precision {
    fn default() -> Self {
        Precision::Full
    }
}

impl Precision {
    /// Half precision is only honoured on an accelerator.
    pub fn effective_on(&self, device: DeviceKind) -> Precision {
        if device.is_accelerator() {
            *self
        } else {
            Precision::Full
        }
    }
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Precision::Full => write!(f, "fp32"),
            Precision::Half => write!(f, "fp16"),
        }
    }
}
