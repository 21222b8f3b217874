//! An adapter of gym-like simulators.
//!
//! [`GymLikeEnv`] wraps a [`Simulator`] following the gym protocol, i.e., a `reset`
//! returning an observation and a `step` returning `(observation, reward, done, info)`,
//! and republishes its outputs as [`Record`]s consumed by the training stack.
//!
//! ## Capabilities
//!
//! A simulator library is described by [`Capabilities`]: its name and the environments
//! it provides, either as a flat list or partitioned by task. The adapter checks the
//! requested environment against it before wrapping a simulator, and fails with
//! [`GymLikeError::Configuration`] for an unknown one. [`SimulatorLibrary`] couples the
//! descriptor with a factory of simulators, used by [`GymLikeEnv::make`].
//!
//! ## Observation
//!
//! Raw observations are interpreted as an [`Observation`]. A single array is written
//! at `next_observation`; each entry of a dict is written at `next_<key>`.
//!
//! ## Action
//!
//! The `action` field of input records is converted into the native representation
//! of the simulator's declared [`ActionSpace`]. Out-of-range actions are clipped, or
//! rejected with [`GymLikeError::InvalidAction`] when `strict_actions` is set.
//!
//! ## Output conventions
//!
//! Raw simulator outputs go through an [`OutputTransform`] before anything else.
//! [`TupleOutput`] handles the classic `(observation, reward, done, info)` convention
//! and [`TerminatedTruncatedOutput`] the five-element one of gymnasium.
//!
//! ## Python
//!
//! With the `python` feature, [`python::PyGymSimulator`] wraps a `gym` environment
//! running in the Python interpreter, based on [`PyO3`](https://github.com/PyO3/pyo3).
//!
//! [`Simulator`]: gymlike_core::Simulator
//! [`Record`]: gymlike_core::record::Record
//! [`ActionSpace`]: gymlike_core::spaces::ActionSpace
//! [`GymLikeError::Configuration`]: gymlike_core::error::GymLikeError::Configuration
//! [`GymLikeError::InvalidAction`]: gymlike_core::error::GymLikeError::InvalidAction
mod base;
mod capabilities;
mod config;
mod obs;
#[cfg(feature = "python")]
pub mod python;
pub mod transform;
pub use base::{GymLikeEnv, ACTION_KEY, DONE_KEY, REWARD_KEY};
pub use capabilities::{AvailableEnvs, Capabilities, SimulatorLibrary};
pub use config::{FloatWidth, GymLikeEnvConfig};
pub use obs::{Observation, NEXT_OBSERVATION, NEXT_PREFIX};
pub use transform::{GymOutput, Info, OutputTransform, TerminatedTruncatedOutput, TupleOutput};
