//! Device descriptor attached to records.
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{convert::TryFrom, fmt, str::FromStr};

use crate::error::GymLikeError;

/// Device on which the training stack places the fields of a [`Record`](super::Record).
///
/// The adapter never allocates anything on the device; it only carries the
/// descriptor so that downstream consumers can move the fields.
/// It is serialized as `cpu` or `cuda:<index>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Device {
    /// Host memory.
    Cpu,

    /// CUDA device with the given index.
    Cuda(usize),
}

impl Default for Device {
    fn default() -> Self {
        Device::Cpu
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Device::Cpu => write!(f, "cpu"),
            Device::Cuda(ix) => write!(f, "cuda:{}", ix),
        }
    }
}

impl FromStr for Device {
    type Err = anyhow::Error;

    /// Parses `cpu`, `cuda` or `cuda:<index>`.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "cpu" => Ok(Device::Cpu),
            "cuda" => Ok(Device::Cuda(0)),
            s => match s.strip_prefix("cuda:") {
                Some(ix) => Ok(Device::Cuda(ix.parse().map_err(|_| {
                    GymLikeError::InvalidConfig(format!("invalid device index in '{}'", s))
                })?)),
                None => Err(GymLikeError::InvalidConfig(format!("unknown device '{}'", s)).into()),
            },
        }
    }
}

impl TryFrom<String> for Device {
    type Error = anyhow::Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<Device> for String {
    fn from(device: Device) -> Self {
        device.to_string()
    }
}
