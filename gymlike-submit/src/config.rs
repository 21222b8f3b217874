//! Configuration of a sweep.
use anyhow::Result;
use gymlike_kitchen::ApplianceApi;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Resources requested for each job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    /// Name of the jobs.
    pub name: String,

    /// Directory of the job logs.
    pub folder: String,

    /// Time limit in minutes.
    pub timeout_min: usize,

    /// Partition of the cluster.
    pub partition: String,

    /// GPUs per node.
    pub gpus_per_node: usize,

    /// CPUs per task.
    pub cpus_per_task: usize,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            name: "redq".to_string(),
            folder: "REDQ_log".to_string(),
            timeout_min: 1200,
            partition: "train".to_string(),
            gpus_per_node: 8,
            cpus_per_task: 95,
        }
    }
}

/// Configuration of a sweep of training runs over the kitchen tasks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    /// Resources of the jobs.
    pub executor: ExecutorConfig,

    /// Command running a single training job, followed by its flags.
    pub program: String,

    /// Configuration file given to the training program.
    pub config_path: String,

    /// Seeds of the runs.
    pub seeds: Vec<u64>,

    /// Values of the average pooling switch.
    pub avg_pooling: Vec<bool>,

    /// Values of the shared mapping switch.
    pub shared_mapping: Vec<bool>,

    /// Devices of the data collectors.
    pub collector_devices: Vec<String>,

    /// Environments left out of the sweep.
    pub exclude_envs: Vec<String>,

    /// Only environments starting with this prefix are swept.
    pub env_prefix: String,

    /// Interval between two submissions in milliseconds.
    pub submit_interval_ms: u64,

    /// Generation of the appliance environments installed with `mj_envs`.
    pub appliance_api: ApplianceApi,
}

impl Default for SweepConfig {
    fn default() -> Self {
        let mut collector_devices = (1..8).map(|i| format!("cuda:{}", i)).collect::<Vec<_>>();
        collector_devices.push("cuda:4".to_string());

        Self {
            executor: ExecutorConfig::default(),
            program: "python redq.py".to_string(),
            config_path: "redq_configs_pixels/generic.txt".to_string(),
            seeds: vec![1, 42, 1988],
            avg_pooling: vec![true, false],
            shared_mapping: vec![true, false],
            collector_devices,
            exclude_envs: vec!["visual_kitchen-v3".to_string()],
            env_prefix: "visual".to_string(),
            submit_interval_ms: 3000,
            appliance_api: ApplianceApi::Unified,
        }
    }
}

impl SweepConfig {
    /// Selects the environments of the sweep, keeping the given order.
    pub fn select_envs<'a>(&self, ids: impl IntoIterator<Item = &'a str>) -> Vec<String> {
        ids.into_iter()
            .filter(|id| id.starts_with(&self.env_prefix))
            .filter(|id| !self.exclude_envs.iter().any(|e| e.as_str() == *id))
            .map(str::to_string)
            .collect()
    }

    /// Constructs [`SweepConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`SweepConfig`] as YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
