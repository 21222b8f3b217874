//! Configuration of [`GymLikeEnv`](crate::GymLikeEnv).
use anyhow::Result;
use gymlike_core::{
    record::{Device, RecordValue},
    Options, SimValue,
};
use num_traits::clamp;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Floating-point width of the `reward` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FloatWidth {
    /// Stored as [`RecordValue::Scalar`].
    F32,

    /// Stored as [`RecordValue::Double`].
    F64,
}

impl Default for FloatWidth {
    fn default() -> Self {
        FloatWidth::F32
    }
}

impl FloatWidth {
    /// Casts a value to this width.
    ///
    /// Values out of the range of the width saturate to its largest finite
    /// value of the same sign. NaN is kept.
    pub fn cast(&self, v: f64) -> RecordValue {
        match self {
            FloatWidth::F32 => RecordValue::Scalar(clamp(v, -f32::MAX as f64, f32::MAX as f64) as f32),
            FloatWidth::F64 => RecordValue::Double(clamp(v, -f64::MAX, f64::MAX)),
        }
    }
}

/// Configuration of [`GymLikeEnv`](crate::GymLikeEnv).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GymLikeEnvConfig {
    /// Name of the environment in the simulator library.
    pub env_name: String,

    /// Name of the task, for libraries partitioning environments by task.
    pub task_name: Option<String>,

    /// Number of simulator steps per step of the adapter.
    pub frame_skip: usize,

    /// Keys of the info structure copied into the output records.
    pub info_keys: Vec<String>,

    /// If `true`, out-of-range actions are rejected instead of clipped.
    pub strict_actions: bool,

    /// Width of the `reward` field.
    pub reward_dtype: FloatWidth,

    /// Batch size of records created on reset.
    pub batch_size: Vec<usize>,

    /// Device of records created on reset.
    pub device: Device,

    /// Free-form options used when instantiating the simulator.
    pub options: Options,
}

impl Default for GymLikeEnvConfig {
    fn default() -> Self {
        Self {
            env_name: "".to_string(),
            task_name: None,
            frame_skip: 1,
            info_keys: vec![],
            strict_actions: false,
            reward_dtype: FloatWidth::F32,
            batch_size: vec![],
            device: Device::Cpu,
            options: Options::new(),
        }
    }
}

impl GymLikeEnvConfig {
    /// Creates a configuration for the given environment.
    pub fn new(env_name: impl Into<String>) -> Self {
        Self {
            env_name: env_name.into(),
            ..Self::default()
        }
    }

    /// Sets the name of the task.
    pub fn task_name(mut self, v: impl Into<String>) -> Self {
        self.task_name = Some(v.into());
        self
    }

    /// Sets the number of simulator steps per step of the adapter.
    pub fn frame_skip(mut self, v: usize) -> Self {
        self.frame_skip = v;
        self
    }

    /// Sets the keys of the info structure copied into the output records.
    pub fn info_keys(mut self, v: Vec<String>) -> Self {
        self.info_keys = v;
        self
    }

    /// Sets the strict action validation mode.
    pub fn strict_actions(mut self, v: bool) -> Self {
        self.strict_actions = v;
        self
    }

    /// Sets the width of the `reward` field.
    pub fn reward_dtype(mut self, v: FloatWidth) -> Self {
        self.reward_dtype = v;
        self
    }

    /// Sets the batch size of records created on reset.
    pub fn batch_size(mut self, v: Vec<usize>) -> Self {
        self.batch_size = v;
        self
    }

    /// Sets the device of records created on reset.
    pub fn device(mut self, v: Device) -> Self {
        self.device = v;
        self
    }

    /// Adds an option used when instantiating the simulator.
    pub fn option(mut self, key: impl Into<String>, value: SimValue) -> Self {
        self.options.insert(key.into(), value);
        self
    }

    /// Constructs [`GymLikeEnvConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`GymLikeEnvConfig`] as YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
