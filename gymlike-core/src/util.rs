//! Utilities for interaction of policies and environments.
use crate::{record::Record, sim::Options, Env};
use anyhow::Result;
use log::trace;

/// Runs an episode of at most `max_steps` steps and returns the records produced by the steps.
///
/// The environment is reset with empty options. `policy` receives the latest record
/// (the reset record first, then the output of the previous step) and returns a record
/// with an `action` field. The episode stops as soon as a step reports `done`.
pub fn rollout<E, P>(env: &mut E, max_steps: usize, mut policy: P) -> Result<Vec<Record>>
where
    E: Env,
    P: FnMut(&Record) -> Result<Record>,
{
    let mut records = Vec::with_capacity(max_steps);
    let mut record = env.reset(&Options::new())?;

    for i in 0..max_steps {
        let act = policy(&record)?;
        record = env.step(&act)?;
        records.push(record.clone());
        if record.get_bool("done")? {
            trace!("rollout(): episode ended at step {}", i + 1);
            break;
        }
    }

    Ok(records)
}
