//! Environment.
use crate::{record::Record, seed::SeedContext, sim::Options};
use anyhow::Result;

/// An environment exchanging [`Record`]s with the training stack.
///
/// [`Env::step`] reads the `action` field of its input and returns a record with
/// the next observation, `reward` and `done`. [`Env::reset`] returns a record with
/// the initial observation and `done` set to `false`.
pub trait Env {
    /// Resets the environment.
    fn reset(&mut self, options: &Options) -> Result<Record>;

    /// Performs an environment step with the action in `record`.
    fn step(&mut self, record: &Record) -> Result<Record>;

    /// Seeds the environment and returns a seed for the next component, if `seed` is given.
    fn set_seed(&mut self, ctx: &mut SeedContext, seed: Option<u64>) -> Result<Option<u64>>;

    /// The record produced by the last step, if any.
    fn current_record(&self) -> Option<&Record>;

    /// Whether the episode has ended.
    fn is_done(&self) -> bool;
}
