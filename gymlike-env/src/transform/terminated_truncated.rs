use super::{read_flag, read_info, read_reward, type_error, GymOutput, OutputTransform, TupleOutput};
use crate::Observation;
use anyhow::Result;
use gymlike_core::SimValue;

/// Transform for simulators following the gymnasium convention.
///
/// Step outputs are `(observation, reward, terminated, truncated, info)` and the
/// episode is done if it is either terminated or truncated. Reset outputs are
/// `(observation, info)`, given to the transform as `((observation, info),)`.
/// Four-element step outputs of the older convention are handled as by
/// [`TupleOutput`].
#[derive(Debug, Clone, Default)]
pub struct TerminatedTruncatedOutput;

impl OutputTransform for TerminatedTruncatedOutput {
    fn transform(&mut self, raw: SimValue) -> Result<GymOutput> {
        let items = match raw {
            SimValue::Tuple(items) => items,
            v => return Err(type_error("tuple", &v).into()),
        };

        match items.len() {
            1 => {
                let (obs, info) = match items.into_iter().next() {
                    Some(SimValue::Tuple(inner)) if inner.len() == 2 => {
                        let mut inner = inner.into_iter();
                        (inner.next(), inner.next())
                    }
                    obs => (obs, None),
                };
                Ok(GymOutput {
                    obs: Observation::from_sim(obs.unwrap_or(SimValue::None))?,
                    reward: None,
                    done: false,
                    info: match info {
                        Some(info) => read_info(info)?,
                        None => None,
                    },
                })
            }
            5 => {
                let mut items = items.into_iter();
                let mut next = || items.next().unwrap_or(SimValue::None);
                let obs = Observation::from_sim(next())?;
                let reward = read_reward(next())?;
                let terminated = read_flag(next())?;
                let truncated = read_flag(next())?;
                let info = read_info(next())?;
                Ok(GymOutput {
                    obs,
                    reward,
                    done: terminated || truncated,
                    info,
                })
            }
            _ => TupleOutput.transform(SimValue::Tuple(items)),
        }
    }
}
