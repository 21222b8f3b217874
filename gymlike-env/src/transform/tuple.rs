use super::{read_flag, read_info, read_reward, type_error, GymOutput, OutputTransform};
use crate::Observation;
use anyhow::Result;
use gymlike_core::SimValue;

/// Default transform for outputs already shaped as `(observation, reward, done, info)`.
///
/// Trailing elements may be missing: reset outputs are `(observation,)`, and a step
/// output without info is `(observation, reward, done)`. Anything but a tuple fails
/// with [`GymLikeError::Type`](gymlike_core::error::GymLikeError::Type) naming the
/// received type.
#[derive(Debug, Clone, Default)]
pub struct TupleOutput;

impl OutputTransform for TupleOutput {
    fn transform(&mut self, raw: SimValue) -> Result<GymOutput> {
        let mut items = match raw {
            SimValue::Tuple(items) => items.into_iter(),
            v => return Err(type_error("tuple", &v).into()),
        };
        let obs = match items.next() {
            Some(obs) => Observation::from_sim(obs)?,
            None => return Err(type_error("non-empty tuple", &SimValue::Tuple(vec![])).into()),
        };
        let reward = match items.next() {
            Some(v) => read_reward(v)?,
            None => None,
        };
        let done = match items.next() {
            Some(v) => read_flag(v)?,
            None => false,
        };
        let info = match items.next() {
            Some(v) => read_info(v)?,
            None => None,
        };

        Ok(GymOutput {
            obs,
            reward,
            done,
            info,
        })
    }
}
