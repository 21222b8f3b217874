//! Observations of gym-like simulators.
use gymlike_core::{error::GymLikeError, SimValue};
use ndarray::{ArrayD, IxDyn};

/// Prefix of the fields of the next observation in a record.
pub const NEXT_PREFIX: &str = "next_";

/// Field of a single unnamed observation in a record.
pub const NEXT_OBSERVATION: &str = "next_observation";

/// Observation returned by a simulator.
#[derive(Debug, Clone, PartialEq)]
pub enum Observation {
    /// A single array.
    Array(ArrayD<f32>),

    /// Arrays keyed by name.
    Keyed(Vec<(String, ArrayD<f32>)>),
}

impl Observation {
    /// Interprets a native value as an observation.
    ///
    /// Dicts become [`Observation::Keyed`], with each value converted into an array.
    /// Arrays and numbers become [`Observation::Array`], as do sequences of numbers
    /// or of equally shaped arrays, which are stacked along a new first axis.
    pub fn from_sim(value: SimValue) -> Result<Self, GymLikeError> {
        match value {
            SimValue::Dict(items) => Ok(Observation::Keyed(
                items
                    .into_iter()
                    .map(|(k, v)| Ok((k, v.to_array()?)))
                    .collect::<Result<Vec<_>, GymLikeError>>()?,
            )),
            v @ SimValue::Array(_) | v @ SimValue::Float(_) | v @ SimValue::Int(_) => {
                Ok(Observation::Array(v.to_array()?))
            }
            SimValue::Tuple(items) => Ok(Observation::Array(stack(&items)?)),
            v => Err(GymLikeError::Type {
                expected: "array or dict".to_string(),
                actual: v.type_name().to_string(),
            }),
        }
    }

    /// Names the observation as fields of the next step.
    ///
    /// A single array becomes [`NEXT_OBSERVATION`]; each key of a keyed
    /// observation is prefixed with [`NEXT_PREFIX`].
    pub fn into_fields(self) -> Vec<(String, ArrayD<f32>)> {
        match self {
            Observation::Array(a) => vec![(NEXT_OBSERVATION.to_string(), a)],
            Observation::Keyed(items) => items
                .into_iter()
                .map(|(k, v)| (format!("{}{}", NEXT_PREFIX, k), v))
                .collect(),
        }
    }
}

fn stack(items: &[SimValue]) -> Result<ArrayD<f32>, GymLikeError> {
    let invalid = || GymLikeError::Type {
        expected: "sequence of equally shaped numbers or arrays".to_string(),
        actual: "tuple".to_string(),
    };
    let arrays = items
        .iter()
        .map(|v| match v {
            SimValue::Tuple(inner) => stack(inner),
            SimValue::Array(_) | SimValue::Float(_) | SimValue::Int(_) | SimValue::Bool(_) => v.to_array(),
            _ => Err(invalid()),
        })
        .collect::<Result<Vec<_>, _>>()?;

    let inner = arrays.first().map(|a| a.shape().to_vec()).unwrap_or_default();
    if arrays.iter().any(|a| a.shape() != inner.as_slice()) {
        return Err(invalid());
    }
    let mut shape = vec![arrays.len()];
    shape.extend(inner);
    let data = arrays.iter().flat_map(|a| a.iter().cloned()).collect::<Vec<_>>();
    ArrayD::from_shape_vec(IxDyn(&shape), data).map_err(|_| invalid())
}
