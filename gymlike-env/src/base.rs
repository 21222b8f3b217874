//! Adapter of gym-like simulators.
use crate::{
    Capabilities, GymLikeEnvConfig, GymOutput, Observation, OutputTransform, SimulatorLibrary,
    TupleOutput,
};
use anyhow::Result;
use gymlike_core::{
    derive_seed,
    error::GymLikeError,
    record::{Record, RecordValue},
    spaces::{ActionSpace, ObservationSpec},
    Env, Options, SeedContext, SimValue, Simulator,
};
use log::{debug, info, trace};
use std::{convert::TryFrom, fmt};

/// Key of the action in input records.
pub const ACTION_KEY: &str = "action";

/// Key of the reward in output records.
pub const REWARD_KEY: &str = "reward";

/// Key of the done flag in output records.
pub const DONE_KEY: &str = "done";

/// An environment wrapping a gym-like simulator.
///
/// A gym-like simulator has a `reset` returning an observation and a `step` returning
/// `(observation, reward, done, info)`. This adapter republishes those outputs as
/// [`Record`]s:
///
/// * the observation is written at `next_observation`, unless it is a dict, in which
///   case each of its entries is written at `next_<key>`,
/// * the reward at `reward`, with the width given in the configuration,
///   or NaN if the simulator gave no reward,
/// * the done flag at `done`,
/// * and each configured info key at its own key.
///
/// Each step of the adapter repeats the action `frame_skip` times, summing the
/// rewards and stopping early when the episode ends.
///
/// Raw simulator outputs go through an [`OutputTransform`], [`TupleOutput`] by default,
/// which is the place to handle a simulator with a different output convention.
pub struct GymLikeEnv<S, T = TupleOutput>
where
    S: Simulator,
    T: OutputTransform,
{
    sim: S,

    transform: T,

    config: GymLikeEnvConfig,

    action_space: ActionSpace,

    observation_spec: ObservationSpec,

    /// The last record produced by the environment.
    current_record: Option<Record>,

    is_done: bool,
}

impl<S, T> GymLikeEnv<S, T>
where
    S: Simulator,
    T: OutputTransform,
{
    /// Wraps a simulator.
    ///
    /// Fails with [`GymLikeError::Configuration`] if the environment (or its task)
    /// is unknown in `capabilities`, and with [`GymLikeError::InvalidConfig`] if
    /// `frame_skip` is zero.
    pub fn build(
        config: &GymLikeEnvConfig,
        capabilities: &Capabilities,
        sim: S,
        transform: T,
    ) -> Result<Self> {
        Self::check_config(config, capabilities)?;
        info!("Initialize {}", Self::describe(config));

        Ok(Self {
            action_space: sim.action_space(),
            observation_spec: sim.observation_spec(),
            sim,
            transform,
            config: config.clone(),
            current_record: None,
            is_done: false,
        })
    }

    /// Instantiates a simulator of `library` and wraps it.
    ///
    /// The configuration is checked before the simulator is instantiated.
    pub fn make<L>(config: &GymLikeEnvConfig, library: &L, transform: T) -> Result<Self>
    where
        L: SimulatorLibrary<Sim = S>,
    {
        Self::check_config(config, library.capabilities())?;
        let sim = library.make(config)?;
        Self::build(config, library.capabilities(), sim, transform)
    }

    fn check_config(config: &GymLikeEnvConfig, capabilities: &Capabilities) -> Result<()> {
        if config.frame_skip == 0 {
            return Err(GymLikeError::InvalidConfig("frame_skip must be at least 1".to_string()).into());
        }
        capabilities.check(&config.env_name, config.task_name.as_deref())?;
        Ok(())
    }

    fn describe(config: &GymLikeEnvConfig) -> String {
        format!(
            "GymLikeEnv(env={}, task={}, batch_size={:?})",
            config.env_name,
            config.task_name.as_deref().unwrap_or("None"),
            config.batch_size
        )
    }

    /// Configuration of the environment.
    pub fn config(&self) -> &GymLikeEnvConfig {
        &self.config
    }

    /// Declared action space of the simulator.
    pub fn action_space(&self) -> &ActionSpace {
        &self.action_space
    }

    /// Declared observation fields of the simulator.
    pub fn observation_spec(&self) -> &ObservationSpec {
        &self.observation_spec
    }

    /// Wrapped simulator.
    pub fn simulator(&self) -> &S {
        &self.sim
    }

    /// Wrapped simulator.
    pub fn simulator_mut(&mut self) -> &mut S {
        &mut self.sim
    }

    fn read_obs(&self, obs: Observation) -> Result<Vec<(String, RecordValue)>> {
        self.observation_spec.encode(obs.into_fields())
    }
}

impl<S, T> Env for GymLikeEnv<S, T>
where
    S: Simulator,
    T: OutputTransform,
{
    /// Resets the simulator.
    ///
    /// `options` are passed through verbatim. The returned record has the observation
    /// fields and `done = false`, but no `reward`.
    fn reset(&mut self, options: &Options) -> Result<Record> {
        trace!("GymLikeEnv::reset()");

        let raw = self.sim.reset(options)?;
        let GymOutput { obs, .. } = self.transform.transform(SimValue::Tuple(vec![raw]))?;

        let mut record = Record::new(self.config.batch_size.clone(), self.config.device);
        for (k, v) in self.read_obs(obs)? {
            record.insert(k, v);
        }
        self.is_done = false;
        record.insert(DONE_KEY, RecordValue::Bool(self.is_done));

        self.current_record = Some(record.clone());
        Ok(record)
    }

    /// Steps the simulator with the `action` field of `record`.
    ///
    /// The output record takes the batch size and device of `record`.
    fn step(&mut self, record: &Record) -> Result<Record> {
        trace!("GymLikeEnv::step()");

        let act = record.get_array(ACTION_KEY)?;
        let act = self.action_space.to_native(&act, self.config.strict_actions)?;

        // Missing rewards contribute 0 to the sum, but the reward is NaN
        // if none of the sub-steps gave one.
        let mut reward = 0.0;
        let mut has_reward = false;
        let mut last = None;
        for i in 0..self.config.frame_skip {
            let out = self.transform.transform(self.sim.step(&act)?)?;
            if let Some(r) = out.reward {
                reward += r;
                has_reward = true;
            }
            let done = out.done;
            last = Some(out);
            if done {
                debug!("Episode ended at sub-step {} of {}", i + 1, self.config.frame_skip);
                break;
            }
        }
        let GymOutput { obs, done, info, .. } = last.ok_or_else(|| {
            GymLikeError::InvalidConfig("frame_skip must be at least 1".to_string())
        })?;
        let reward = if has_reward { reward } else { f64::NAN };

        let mut out = Record::new(record.batch_size().to_vec(), record.device());
        for (k, v) in self.read_obs(obs)? {
            out.insert(k, v);
        }
        out.insert(REWARD_KEY, self.config.reward_dtype.cast(reward));
        out.insert(DONE_KEY, RecordValue::Bool(done));
        self.is_done = done;

        for key in self.config.info_keys.iter() {
            let value = info
                .as_ref()
                .and_then(|info| info.iter().find(|(k, _)| k == key))
                .map(|(_, v)| v.clone())
                .ok_or_else(|| GymLikeError::MissingInfoKey(key.clone()))?;
            out.insert(key.clone(), RecordValue::try_from(value)?);
        }

        self.current_record = Some(out.clone());
        Ok(out)
    }

    /// Seeds the simulator.
    ///
    /// With a seed, the shared random state in `ctx` is reseeded, the simulator is
    /// seeded, and a seed derived with [`derive_seed`] is returned for the next
    /// component. Without a seed, only the simulator is asked to seed itself.
    fn set_seed(&mut self, ctx: &mut SeedContext, seed: Option<u64>) -> Result<Option<u64>> {
        match seed {
            Some(seed) => {
                ctx.manual_seed(seed);
                self.sim.seed(Some(seed))?;
                let new_seed = derive_seed(seed);
                debug!("Seeded {} with {}, next seed {}", self.config.env_name, seed, new_seed);
                Ok(Some(new_seed))
            }
            None => {
                self.sim.seed(None)?;
                Ok(None)
            }
        }
    }

    fn current_record(&self) -> Option<&Record> {
        self.current_record.as_ref()
    }

    fn is_done(&self) -> bool {
        self.is_done
    }
}

impl<S, T> fmt::Display for GymLikeEnv<S, T>
where
    S: Simulator,
    T: OutputTransform,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Self::describe(&self.config))
    }
}

#[cfg(test)]
mod test;
