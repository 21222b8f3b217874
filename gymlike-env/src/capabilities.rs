//! Capability descriptors of simulator libraries.
use crate::GymLikeEnvConfig;
use anyhow::Result;
use gymlike_core::{error::GymLikeError, Simulator};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Environments provided by a simulator library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AvailableEnvs {
    /// A flat list of environment names. Task names are not checked.
    Flat(Vec<String>),

    /// Environment names, each with the list of its tasks.
    ByTask(BTreeMap<String, Vec<String>>),
}

/// Describes what a simulator library provides.
///
/// The descriptor is given to [`GymLikeEnv::build`](crate::GymLikeEnv::build), which
/// checks the requested environment against it before wrapping a simulator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Capabilities {
    /// Name of the library, used in error messages.
    pub libname: String,

    /// Environments provided by the library.
    pub available_envs: AvailableEnvs,
}

impl Capabilities {
    /// Capabilities of a library with a flat list of environments.
    pub fn flat(libname: impl Into<String>, envs: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            libname: libname.into(),
            available_envs: AvailableEnvs::Flat(envs.into_iter().map(Into::into).collect()),
        }
    }

    /// Capabilities of a library partitioning environments by task.
    pub fn by_task(libname: impl Into<String>, envs: BTreeMap<String, Vec<String>>) -> Self {
        Self {
            libname: libname.into(),
            available_envs: AvailableEnvs::ByTask(envs),
        }
    }

    /// Checks that the environment, and its task if the library partitions
    /// environments by task, are provided by the library.
    ///
    /// For a library partitioning environments by task, a missing task is unknown.
    pub fn check(&self, env_name: &str, task_name: Option<&str>) -> Result<(), GymLikeError> {
        let known = match &self.available_envs {
            AvailableEnvs::Flat(envs) => envs.iter().any(|e| e == env_name),
            AvailableEnvs::ByTask(envs) => match (envs.get(env_name), task_name) {
                (Some(tasks), Some(task)) => tasks.iter().any(|t| t == task),
                _ => false,
            },
        };

        if known {
            Ok(())
        } else {
            Err(GymLikeError::Configuration {
                env_name: env_name.to_string(),
                task_name: task_name.map(str::to_string),
                libname: self.libname.clone(),
            })
        }
    }
}

/// A simulator library: a capability descriptor and a factory of simulators.
pub trait SimulatorLibrary {
    /// Simulators created by the library.
    type Sim: Simulator;

    /// Describes the environments the library provides.
    fn capabilities(&self) -> &Capabilities;

    /// Instantiates the simulator described by `config`.
    ///
    /// Called only after `config` has been checked against [`Self::capabilities`].
    fn make(&self, config: &GymLikeEnvConfig) -> Result<Self::Sim>;
}
