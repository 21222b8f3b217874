//! Action spaces.
use crate::{error::GymLikeError, sim::SimValue};
use anyhow::Result;
use ndarray::{ArrayD, IxDyn};
use num_traits::clamp;
use serde::{Deserialize, Serialize};

/// A bounded box in `R^n`, the space of continuous actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxSpace {
    /// Lower bounds, one per element.
    pub low: Vec<f32>,

    /// Upper bounds, one per element.
    pub high: Vec<f32>,

    /// Shape of an action.
    pub shape: Vec<usize>,
}

impl BoxSpace {
    /// Box with per-element bounds.
    ///
    /// Fails with [`GymLikeError::InvalidConfig`] unless `low` and `high` both have
    /// one bound per element of `shape` and no lower bound exceeds its upper bound.
    pub fn new(low: Vec<f32>, high: Vec<f32>, shape: &[usize]) -> Result<Self> {
        let space = Self {
            low,
            high,
            shape: shape.to_vec(),
        };
        space.check_bounds()?;
        Ok(space)
    }

    /// Box with the same bounds for all elements.
    pub fn uniform(low: f32, high: f32, shape: &[usize]) -> Self {
        let n = shape.iter().product();
        Self {
            low: vec![low; n],
            high: vec![high; n],
            shape: shape.to_vec(),
        }
    }

    fn n_elems(&self) -> usize {
        self.shape.iter().product()
    }

    fn check_bounds(&self) -> Result<()> {
        let n = self.n_elems();
        if self.low.len() != n || self.high.len() != n {
            return Err(GymLikeError::InvalidConfig(format!(
                "{} lower and {} upper bounds for shape {:?}",
                self.low.len(),
                self.high.len(),
                self.shape
            ))
            .into());
        }
        if self.low.iter().zip(self.high.iter()).any(|(lo, hi)| !(lo <= hi)) {
            return Err(GymLikeError::InvalidConfig(format!(
                "lower bounds {:?} exceed upper bounds {:?}",
                self.low, self.high
            ))
            .into());
        }
        Ok(())
    }

    fn reshape(&self, action: &ArrayD<f32>) -> Result<ArrayD<f32>> {
        self.check_bounds()?;
        if action.len() != self.n_elems() {
            return Err(GymLikeError::InvalidAction(format!(
                "expected {} elements for shape {:?}, got shape {:?}",
                self.n_elems(),
                self.shape,
                action.shape()
            ))
            .into());
        }
        let v = action.iter().cloned().collect::<Vec<_>>();
        Ok(ArrayD::from_shape_vec(IxDyn(&self.shape), v)?)
    }

    fn contains(&self, action: &ArrayD<f32>) -> bool {
        action.len() == self.n_elems()
            && self.low.len() == self.n_elems()
            && self.high.len() == self.n_elems()
            && action
                .iter()
                .zip(self.low.iter().zip(self.high.iter()))
                .all(|(a, (lo, hi))| lo <= a && a <= hi)
    }
}

/// The space of `n` discrete actions `0, ..., n - 1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscreteSpace {
    /// Number of actions.
    pub n: usize,
}

impl DiscreteSpace {
    fn index(&self, action: &ArrayD<f32>) -> Result<f32> {
        match action.len() {
            1 => Ok(action.iter().cloned().next().unwrap_or_default()),
            _ => Err(GymLikeError::InvalidAction(format!(
                "expected a single discrete action, got shape {:?}",
                action.shape()
            ))
            .into()),
        }
    }

    fn contains(&self, action: &ArrayD<f32>) -> bool {
        match self.index(action) {
            Ok(a) => a.fract() == 0.0 && a >= 0.0 && (a as usize) < self.n,
            Err(_) => false,
        }
    }
}

/// Declared action space of a simulator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ActionSpace {
    /// Continuous actions.
    Box(BoxSpace),

    /// Discrete actions.
    Discrete(DiscreteSpace),
}

impl ActionSpace {
    /// Returns `true` if the action is in the space.
    pub fn contains(&self, action: &ArrayD<f32>) -> bool {
        match self {
            ActionSpace::Box(space) => space.contains(action),
            ActionSpace::Discrete(space) => space.contains(action),
        }
    }

    /// Converts an action of the training stack into the native representation of the simulator.
    ///
    /// Actions in the space are converted without loss. Out-of-range actions fail with
    /// [`GymLikeError::InvalidAction`] if `strict` is `true`; otherwise they are clipped
    /// into the space (discrete actions are also rounded to the nearest index).
    /// An action with a wrong number of elements or a NaN element always fails.
    pub fn to_native(&self, action: &ArrayD<f32>, strict: bool) -> Result<SimValue> {
        if action.iter().any(|a| a.is_nan()) {
            return Err(GymLikeError::InvalidAction(format!(
                "{:?} contains NaN",
                action.iter().collect::<Vec<_>>()
            ))
            .into());
        }
        if strict && !self.contains(action) {
            return Err(GymLikeError::InvalidAction(format!(
                "{:?} is out of {:?}",
                action.iter().collect::<Vec<_>>(),
                self
            ))
            .into());
        }

        match self {
            ActionSpace::Box(space) => {
                let mut action = space.reshape(action)?;
                action
                    .iter_mut()
                    .zip(space.low.iter().zip(space.high.iter()))
                    .for_each(|(a, (lo, hi))| *a = clamp(*a, *lo, *hi));
                Ok(SimValue::Array(action))
            }
            ActionSpace::Discrete(space) => {
                let a = space.index(action)?;
                let max = space.n.saturating_sub(1) as f32;
                Ok(SimValue::Int(clamp(a.round(), 0.0, max) as i64))
            }
        }
    }

    /// Converts an action in the native representation of the simulator back into an array.
    pub fn from_native(&self, action: &SimValue) -> Result<ArrayD<f32>> {
        match (self, action) {
            (ActionSpace::Box(space), SimValue::Array(_)) | (ActionSpace::Box(space), SimValue::Float(_)) => {
                space.reshape(&action.to_array()?)
            }
            (ActionSpace::Discrete(_), SimValue::Int(_)) => Ok(action.to_array()?),
            (ActionSpace::Box(_), v) => Err(GymLikeError::Type {
                expected: "array".to_string(),
                actual: v.type_name().to_string(),
            }
            .into()),
            (ActionSpace::Discrete(_), v) => Err(GymLikeError::Type {
                expected: "int".to_string(),
                actual: v.type_name().to_string(),
            }
            .into()),
        }
    }
}
