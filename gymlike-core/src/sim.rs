//! Contract of external simulators.
use crate::{
    error::GymLikeError,
    record::RecordValue,
    spaces::{ActionSpace, ObservationSpec},
};
use anyhow::Result;
use ndarray::ArrayD;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Keyword options passed through verbatim to the simulator.
pub type Options = BTreeMap<String, SimValue>;

/// Native value exchanged with a simulator.
///
/// Simulators are typically written in a dynamically typed language, so their
/// outputs are not known to have a particular shape until they are inspected.
/// This type describes what such an output can be.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SimValue {
    /// Absence of a value.
    None,

    /// A flag.
    Bool(bool),

    /// An integer.
    Int(i64),

    /// A floating-point number.
    Float(f64),

    /// A string.
    Str(String),

    /// A numerical array.
    Array(ArrayD<f32>),

    /// A fixed-size sequence of values.
    Tuple(Vec<SimValue>),

    /// A mapping from string keys to values, in insertion order.
    Dict(Vec<(String, SimValue)>),
}

impl SimValue {
    /// Name of the type of the value, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            SimValue::None => "None",
            SimValue::Bool(_) => "bool",
            SimValue::Int(_) => "int",
            SimValue::Float(_) => "float",
            SimValue::Str(_) => "str",
            SimValue::Array(_) => "array",
            SimValue::Tuple(_) => "tuple",
            SimValue::Dict(_) => "dict",
        }
    }

    /// Returns `true` for [`SimValue::None`].
    pub fn is_none(&self) -> bool {
        matches!(self, SimValue::None)
    }

    /// Looks up a key of a [`SimValue::Dict`].
    pub fn get(&self, key: &str) -> Option<&SimValue> {
        match self {
            SimValue::Dict(items) => items.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Interprets the value as a number, if it is one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            SimValue::Int(v) => Some(*v as f64),
            SimValue::Float(v) => Some(*v),
            SimValue::Array(a) if a.len() == 1 => a.iter().next().map(|v| *v as f64),
            _ => None,
        }
    }

    /// Converts numerical values into an array.
    ///
    /// Numbers and flags become zero-dimensional arrays.
    pub fn to_array(&self) -> Result<ArrayD<f32>, GymLikeError> {
        let scalar = |v: f32| ArrayD::from_elem(ndarray::IxDyn(&[]), v);
        match self {
            SimValue::Array(a) => Ok(a.clone()),
            SimValue::Float(v) => Ok(scalar(*v as f32)),
            SimValue::Int(v) => Ok(scalar(*v as f32)),
            SimValue::Bool(v) => Ok(scalar(if *v { 1.0 } else { 0.0 })),
            v => Err(GymLikeError::Type {
                expected: "array".to_string(),
                actual: v.type_name().to_string(),
            }),
        }
    }
}

impl std::convert::TryFrom<SimValue> for RecordValue {
    type Error = GymLikeError;

    fn try_from(value: SimValue) -> Result<Self, Self::Error> {
        match value {
            SimValue::Bool(v) => Ok(RecordValue::Bool(v)),
            SimValue::Int(v) => Ok(RecordValue::Int(v)),
            SimValue::Float(v) => Ok(RecordValue::Double(v)),
            SimValue::Str(v) => Ok(RecordValue::String(v)),
            SimValue::Array(v) => Ok(RecordValue::Array(v)),
            v => Err(GymLikeError::Type {
                expected: "bool, int, float, str or array".to_string(),
                actual: v.type_name().to_string(),
            }),
        }
    }
}

/// A simulator with a reset/step call pair.
///
/// Implementations own the simulated environment. Calls block until the
/// simulator returns.
pub trait Simulator {
    /// Resets the simulator and returns the initial observation.
    fn reset(&mut self, options: &Options) -> Result<SimValue>;

    /// Advances the simulator with an action in its native representation.
    ///
    /// The returned value is expected to be a tuple
    /// `(observation, reward, done, info?)`, but simulators with other conventions
    /// may return anything an output transform of the adapter understands.
    fn step(&mut self, action: &SimValue) -> Result<SimValue>;

    /// Seeds the simulator.
    ///
    /// `None` asks the simulator to seed itself. The default implementation fails
    /// because seeding is specific to each simulator.
    fn seed(&mut self, _seed: Option<u64>) -> Result<()> {
        Err(GymLikeError::SeedNotImplemented(std::any::type_name::<Self>().to_string()).into())
    }

    /// Declared action space.
    fn action_space(&self) -> ActionSpace;

    /// Declared observation fields.
    fn observation_spec(&self) -> ObservationSpec {
        ObservationSpec::default()
    }
}
