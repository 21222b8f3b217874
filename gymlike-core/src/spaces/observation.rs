//! Declared observation fields.
use crate::{error::GymLikeError, record::RecordValue};
use anyhow::Result;
use ndarray::{ArrayD, IxDyn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Shapes of observation fields, keyed by field name in a record
/// (e.g., `next_observation` or `next_robot_jnt`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObservationSpec {
    shapes: BTreeMap<String, Vec<usize>>,
}

impl ObservationSpec {
    /// Declares the shape of a field.
    pub fn field(mut self, key: impl Into<String>, shape: &[usize]) -> Self {
        self.shapes.insert(key.into(), shape.to_vec());
        self
    }

    /// Declared shape of a field.
    pub fn shape(&self, key: &str) -> Option<&[usize]> {
        self.shapes.get(key).map(|s| s.as_slice())
    }

    /// Encodes observation fields into record values.
    ///
    /// Declared fields are reshaped to their declared shape. Undeclared
    /// fields are passed through as they are.
    pub fn encode(&self, fields: Vec<(String, ArrayD<f32>)>) -> Result<Vec<(String, RecordValue)>> {
        fields
            .into_iter()
            .map(|(key, value)| -> Result<(String, RecordValue)> {
                let value = match self.shapes.get(&key) {
                    None => value,
                    Some(shape) => {
                        if value.len() != shape.iter().product::<usize>() {
                            return Err(GymLikeError::ShapeMismatch {
                                key,
                                expected: shape.clone(),
                                actual: value.shape().to_vec(),
                            }
                            .into());
                        }
                        value.into_shape(IxDyn(shape))?
                    }
                };
                Ok((key, RecordValue::Array(value)))
            })
            .collect()
    }
}
