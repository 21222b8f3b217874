//! Normalization of raw simulator outputs.
//!
//! [`GymLikeEnv`](crate::GymLikeEnv) passes every raw output of the simulator, of
//! both reset and step, through an [`OutputTransform`]. The transform is the only
//! place where conventions of a particular simulator family are handled; whatever
//! it returns is consumed uniformly by the adapter.
//!
//! Outputs of reset are given to the transform wrapped in a one-element tuple, so
//! that a transform sees the same shape for both calls.
mod terminated_truncated;
mod tuple;
use crate::Observation;
use anyhow::Result;
use gymlike_core::{error::GymLikeError, SimValue};
pub use terminated_truncated::TerminatedTruncatedOutput;
pub use tuple::TupleOutput;

/// Auxiliary diagnostic data of a simulator step.
pub type Info = Vec<(String, SimValue)>;

/// Normalized output of a simulator.
#[derive(Debug, Clone, PartialEq)]
pub struct GymOutput {
    /// Observation.
    pub obs: Observation,

    /// Reward, `None` if the simulator gave no reward signal.
    pub reward: Option<f64>,

    /// Flag denoting the end of an episode.
    pub done: bool,

    /// Info structure, if any.
    pub info: Option<Info>,
}

/// Converts raw simulator outputs into [`GymOutput`].
pub trait OutputTransform {
    /// Normalizes a raw output.
    fn transform(&mut self, raw: SimValue) -> Result<GymOutput>;
}

fn type_error(expected: &str, actual: &SimValue) -> GymLikeError {
    GymLikeError::Type {
        expected: expected.to_string(),
        actual: actual.type_name().to_string(),
    }
}

/// Reads a reward, `None` denoting no reward signal.
pub(crate) fn read_reward(v: SimValue) -> Result<Option<f64>, GymLikeError> {
    match v {
        SimValue::None => Ok(None),
        v => match v.as_f64() {
            Some(r) => Ok(Some(r)),
            None => Err(type_error("float", &v)),
        },
    }
}

/// Reads a flag, `None` being `false`.
pub(crate) fn read_flag(v: SimValue) -> Result<bool, GymLikeError> {
    match v {
        SimValue::None => Ok(false),
        SimValue::Bool(b) => Ok(b),
        v => match v.as_f64() {
            Some(x) => Ok(x != 0.0),
            None => Err(type_error("bool", &v)),
        },
    }
}

/// Reads an info structure.
pub(crate) fn read_info(v: SimValue) -> Result<Option<Info>, GymLikeError> {
    match v {
        SimValue::None => Ok(None),
        SimValue::Dict(items) => Ok(Some(items)),
        v => Err(type_error("dict", &v)),
    }
}
