use super::*;
use crate::{FloatWidth, TerminatedTruncatedOutput, NEXT_OBSERVATION};
use gymlike_core::{
    record::Device,
    spaces::{BoxSpace, DiscreteSpace},
    util::rollout,
};
use ndarray::{arr1, ArrayD};
use std::cell::Cell;
use test_log::test;

const ENV_NAME: &str = "visual_kitchen_micro_open-v3";

/// A simulator replaying scripted outputs.
struct ScriptedSimulator {
    reset_obs: SimValue,
    outputs: Vec<SimValue>,
    n_steps: usize,
    actions: Vec<SimValue>,
    resets: Vec<Options>,
    seeds: Vec<Option<u64>>,
    action_space: ActionSpace,
    observation_spec: ObservationSpec,
}

impl ScriptedSimulator {
    fn new(outputs: Vec<SimValue>) -> Self {
        Self {
            reset_obs: array(&[0.0, 0.0]),
            outputs,
            n_steps: 0,
            actions: vec![],
            resets: vec![],
            seeds: vec![],
            action_space: ActionSpace::Box(BoxSpace::uniform(-1.0, 1.0, &[2])),
            observation_spec: ObservationSpec::default(),
        }
    }

    fn reset_obs(mut self, obs: SimValue) -> Self {
        self.reset_obs = obs;
        self
    }

    fn action_space(mut self, space: ActionSpace) -> Self {
        self.action_space = space;
        self
    }
}

impl Simulator for ScriptedSimulator {
    fn reset(&mut self, options: &Options) -> Result<SimValue> {
        self.resets.push(options.clone());
        Ok(self.reset_obs.clone())
    }

    fn step(&mut self, action: &SimValue) -> Result<SimValue> {
        self.actions.push(action.clone());
        let out = self.outputs[self.n_steps % self.outputs.len()].clone();
        self.n_steps += 1;
        Ok(out)
    }

    fn seed(&mut self, seed: Option<u64>) -> Result<()> {
        self.seeds.push(seed);
        Ok(())
    }

    fn action_space(&self) -> ActionSpace {
        self.action_space.clone()
    }

    fn observation_spec(&self) -> ObservationSpec {
        self.observation_spec.clone()
    }
}

/// A simulator without seeding.
struct UnseededSimulator;

impl Simulator for UnseededSimulator {
    fn reset(&mut self, _options: &Options) -> Result<SimValue> {
        Ok(array(&[0.0]))
    }

    fn step(&mut self, _action: &SimValue) -> Result<SimValue> {
        Ok(step_out(array(&[0.0]), Some(0.0), false, None))
    }

    fn action_space(&self) -> ActionSpace {
        ActionSpace::Discrete(DiscreteSpace { n: 2 })
    }
}

fn array(v: &[f32]) -> SimValue {
    SimValue::Array(arr1(v).into_dyn())
}

fn step_out(obs: SimValue, reward: Option<f64>, done: bool, info: Option<Vec<(&str, SimValue)>>) -> SimValue {
    let mut items = vec![
        obs,
        reward.map(SimValue::Float).unwrap_or(SimValue::None),
        SimValue::Bool(done),
    ];
    if let Some(info) = info {
        items.push(SimValue::Dict(
            info.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
        ));
    }
    SimValue::Tuple(items)
}

fn capabilities() -> Capabilities {
    Capabilities::flat("mj_envs", vec![ENV_NAME, "visual_kitchen_light_on-v3"])
}

fn config() -> GymLikeEnvConfig {
    GymLikeEnvConfig::new(ENV_NAME)
}

fn env_with(
    config: &GymLikeEnvConfig,
    sim: ScriptedSimulator,
) -> GymLikeEnv<ScriptedSimulator> {
    GymLikeEnv::build(config, &capabilities(), sim, TupleOutput).unwrap()
}

fn action(v: &[f32]) -> Record {
    Record::from_slice(&[(ACTION_KEY, RecordValue::Array(arr1(v).into_dyn()))])
}

fn gymlike_err(err: anyhow::Error) -> GymLikeError {
    err.downcast::<GymLikeError>().unwrap()
}

#[test]
fn test_unknown_env() {
    for name in ["", "kitchen", "visual_kitchen-v4"].iter() {
        let sim = ScriptedSimulator::new(vec![]);
        let config = GymLikeEnvConfig::new(*name);
        let err = GymLikeEnv::build(&config, &capabilities(), sim, TupleOutput)
            .err()
            .unwrap();
        assert_eq!(
            gymlike_err(err),
            GymLikeError::Configuration {
                env_name: name.to_string(),
                task_name: None,
                libname: "mj_envs".to_string(),
            }
        );
    }
}

#[test]
fn test_unknown_task() {
    let mut envs = std::collections::BTreeMap::new();
    envs.insert("cheetah".to_string(), vec!["run".to_string()]);
    let caps = Capabilities::by_task("dm_control", envs);
    let config = GymLikeEnvConfig::new("cheetah").task_name("fly");
    let err = GymLikeEnv::build(&config, &caps, ScriptedSimulator::new(vec![]), TupleOutput)
        .err()
        .unwrap();
    assert!(err.to_string().contains("fly"));
    assert!(err.to_string().contains("dm_control"));

    let config = GymLikeEnvConfig::new("cheetah").task_name("run");
    assert!(GymLikeEnv::build(&config, &caps, ScriptedSimulator::new(vec![]), TupleOutput).is_ok());
}

#[test]
fn test_zero_frame_skip() {
    let config = config().frame_skip(0);
    let err = GymLikeEnv::build(&config, &capabilities(), ScriptedSimulator::new(vec![]), TupleOutput)
        .err()
        .unwrap();
    assert!(matches!(gymlike_err(err), GymLikeError::InvalidConfig(_)));
}

#[test]
fn test_reset() -> Result<()> {
    let config = config().batch_size(vec![1]).device(Device::Cuda(2));
    let mut env = env_with(&config, ScriptedSimulator::new(vec![]));
    let mut options = Options::new();
    options.insert("seed".to_string(), SimValue::Int(3));

    let record = env.reset(&options)?;
    assert!(!record.get_bool(DONE_KEY)?);
    assert!(!record.contains_key(REWARD_KEY));
    assert_eq!(record.get_array(NEXT_OBSERVATION)?, arr1(&[0f32, 0.0]).into_dyn());
    assert_eq!(record.batch_size(), &[1]);
    assert_eq!(record.device(), Device::Cuda(2));
    assert_eq!(env.simulator().resets, vec![options]);
    assert!(!env.is_done());
    assert_eq!(env.current_record(), Some(&record));
    Ok(())
}

#[test]
fn test_reset_clears_done() -> Result<()> {
    let sim = ScriptedSimulator::new(vec![step_out(array(&[1.0, 1.0]), Some(1.0), true, None)]);
    let mut env = env_with(&config(), sim);
    env.step(&action(&[0.0, 0.0]))?;
    assert!(env.is_done());
    let record = env.reset(&Options::new())?;
    assert!(!env.is_done());
    assert!(!record.get_bool(DONE_KEY)?);
    Ok(())
}

#[test]
fn test_in_bounds_actions_never_rejected() -> Result<()> {
    for strict in [false, true].iter() {
        let sim = ScriptedSimulator::new(vec![step_out(array(&[0.0, 0.0]), Some(0.0), false, None)]);
        let mut env = env_with(&config().strict_actions(*strict), sim);
        for a in [[-1.0f32, 1.0], [0.0, 0.5], [1.0, -1.0]].iter() {
            env.step(&action(a))?;
        }
        assert_eq!(env.simulator().actions[2], array(&[1.0, -1.0]));
    }
    Ok(())
}

#[test]
fn test_out_of_bounds_action() -> Result<()> {
    let out = step_out(array(&[0.0, 0.0]), Some(0.0), false, None);

    let mut env = env_with(&config().strict_actions(true), ScriptedSimulator::new(vec![out.clone()]));
    let err = env.step(&action(&[2.0, 0.0])).unwrap_err();
    assert!(matches!(gymlike_err(err), GymLikeError::InvalidAction(_)));
    assert_eq!(env.simulator().n_steps, 0);

    let mut env = env_with(&config(), ScriptedSimulator::new(vec![out]));
    env.step(&action(&[2.0, 0.0]))?;
    assert_eq!(env.simulator().actions[0], array(&[1.0, 0.0]));
    Ok(())
}

#[test]
fn test_discrete_action() -> Result<()> {
    let sim = ScriptedSimulator::new(vec![step_out(array(&[0.0]), Some(0.0), false, None)])
        .action_space(ActionSpace::Discrete(DiscreteSpace { n: 3 }));
    let mut env = env_with(&config(), sim);
    let record = Record::from_slice(&[(ACTION_KEY, RecordValue::Int(2))]);
    env.step(&record)?;
    assert_eq!(env.simulator().actions, vec![SimValue::Int(2)]);
    Ok(())
}

#[test]
fn test_missing_action() {
    let mut env = env_with(&config(), ScriptedSimulator::new(vec![]));
    let err = env.step(&Record::empty()).unwrap_err();
    assert_eq!(gymlike_err(err), GymLikeError::RecordKey(ACTION_KEY.to_string()));
}

#[test]
fn test_frame_skip_sums_rewards() -> Result<()> {
    let outputs = vec![
        step_out(array(&[1.0, 0.0]), Some(1.0), false, None),
        step_out(array(&[2.0, 0.0]), None, false, None),
        step_out(array(&[3.0, 0.0]), Some(2.5), false, None),
        step_out(array(&[4.0, 0.0]), Some(-0.5), false, None),
    ];
    let mut env = env_with(&config().frame_skip(4), ScriptedSimulator::new(outputs));
    let record = env.step(&action(&[0.0, 0.0]))?;

    assert_eq!(env.simulator().n_steps, 4);
    assert_eq!(record.get_scalar(REWARD_KEY)?, 3.0);
    assert!(!record.get_bool(DONE_KEY)?);
    assert_eq!(record.get_array(NEXT_OBSERVATION)?, arr1(&[4f32, 0.0]).into_dyn());
    Ok(())
}

#[test]
fn test_frame_skip_stops_at_done() -> Result<()> {
    let outputs = vec![
        step_out(array(&[1.0, 0.0]), Some(1.0), false, None),
        step_out(array(&[2.0, 0.0]), Some(2.0), true, None),
        step_out(array(&[3.0, 0.0]), Some(4.0), false, None),
    ];
    let mut env = env_with(&config().frame_skip(3), ScriptedSimulator::new(outputs));
    let record = env.step(&action(&[0.0, 0.0]))?;

    assert_eq!(env.simulator().n_steps, 2);
    assert_eq!(record.get_scalar(REWARD_KEY)?, 3.0);
    assert!(record.get_bool(DONE_KEY)?);
    assert_eq!(record.get_array(NEXT_OBSERVATION)?, arr1(&[2f32, 0.0]).into_dyn());
    assert!(env.is_done());
    Ok(())
}

#[test]
fn test_no_reward_is_nan() -> Result<()> {
    let outputs = vec![step_out(array(&[1.0, 0.0]), None, false, None)];
    let mut env = env_with(&config().frame_skip(3), ScriptedSimulator::new(outputs));
    let record = env.step(&action(&[0.0, 0.0]))?;

    assert_eq!(env.simulator().n_steps, 3);
    assert!(record.get_scalar(REWARD_KEY)?.is_nan());
    Ok(())
}

#[test]
fn test_zero_reward_is_not_nan() -> Result<()> {
    let outputs = vec![step_out(array(&[1.0, 0.0]), Some(0.0), false, None)];
    let mut env = env_with(&config().frame_skip(2), ScriptedSimulator::new(outputs));
    let record = env.step(&action(&[0.0, 0.0]))?;
    assert_eq!(record.get_scalar(REWARD_KEY)?, 0.0);
    Ok(())
}

#[test]
fn test_reward_sum_saturates() -> Result<()> {
    let outputs = vec![step_out(array(&[1.0, 0.0]), Some(3e38), false, None)];
    let mut env = env_with(&config().frame_skip(2), ScriptedSimulator::new(outputs));
    let record = env.step(&action(&[0.0, 0.0]))?;
    assert_eq!(record.get_scalar(REWARD_KEY)?, f32::MAX);
    Ok(())
}

#[test]
fn test_reward_width() -> Result<()> {
    let outputs = vec![step_out(array(&[1.0, 0.0]), Some(0.1), false, None)];
    let mut env = env_with(&config().reward_dtype(FloatWidth::F64), ScriptedSimulator::new(outputs));
    let record = env.step(&action(&[0.0, 0.0]))?;
    assert_eq!(record.get(REWARD_KEY), Some(&RecordValue::Double(0.1)));
    Ok(())
}

#[test]
fn test_dict_observation() -> Result<()> {
    let obs = SimValue::Dict(vec![
        ("pos".to_string(), array(&[1.0, 2.0])),
        ("vel".to_string(), array(&[3.0, 4.0])),
    ]);
    let sim = ScriptedSimulator::new(vec![step_out(obs.clone(), Some(0.0), false, None)])
        .reset_obs(obs);
    let mut env = env_with(&config(), sim);

    for record in vec![env.reset(&Options::new())?, env.step(&action(&[0.0, 0.0]))?] {
        assert_eq!(record.get_array("next_pos")?, arr1(&[1f32, 2.0]).into_dyn());
        assert_eq!(record.get_array("next_vel")?, arr1(&[3f32, 4.0]).into_dyn());
        assert!(!record.contains_key(NEXT_OBSERVATION));
    }
    Ok(())
}

#[test]
fn test_array_observation() -> Result<()> {
    let sim = ScriptedSimulator::new(vec![step_out(array(&[1.0, 2.0, 3.0]), Some(0.0), false, None)]);
    let mut env = env_with(&config(), sim);
    let record = env.step(&action(&[0.0, 0.0]))?;

    let obs_keys = record
        .keys()
        .filter(|k| k.starts_with("next_"))
        .collect::<Vec<_>>();
    assert_eq!(obs_keys, vec![NEXT_OBSERVATION]);
    assert_eq!(record.len(), 3);
    Ok(())
}

#[test]
fn test_sequence_observation() -> Result<()> {
    let obs = SimValue::Tuple(vec![SimValue::Int(1), SimValue::Int(2), SimValue::Int(3)]);
    let sim = ScriptedSimulator::new(vec![step_out(obs, Some(0.0), false, None)]);
    let mut env = env_with(&config(), sim);
    let record = env.step(&action(&[0.0, 0.0]))?;
    assert_eq!(record.get_array(NEXT_OBSERVATION)?, arr1(&[1f32, 2.0, 3.0]).into_dyn());
    Ok(())
}

#[test]
fn test_observation_spec_is_applied() -> Result<()> {
    let mut sim = ScriptedSimulator::new(vec![step_out(array(&[1.0, 2.0, 3.0, 4.0]), Some(0.0), false, None)]);
    sim.observation_spec = ObservationSpec::default().field(NEXT_OBSERVATION, &[2, 2]);
    let mut env = env_with(&config(), sim);
    let record = env.step(&action(&[0.0, 0.0]))?;
    assert_eq!(record.get_array(NEXT_OBSERVATION)?.shape(), &[2, 2]);
    Ok(())
}

#[test]
fn test_info_keys() -> Result<()> {
    let outputs = vec![
        step_out(array(&[0.0, 0.0]), Some(0.0), false, Some(vec![("solved", SimValue::Bool(false))])),
        step_out(
            array(&[0.0, 0.0]),
            Some(0.0),
            false,
            Some(vec![
                ("solved", SimValue::Bool(true)),
                ("obj_dist", SimValue::Float(0.25)),
            ]),
        ),
    ];
    let config = config()
        .frame_skip(2)
        .info_keys(vec!["solved".to_string(), "obj_dist".to_string()]);
    let mut env = env_with(&config, ScriptedSimulator::new(outputs));
    let record = env.step(&action(&[0.0, 0.0]))?;

    assert!(record.get_bool("solved")?);
    assert_eq!(record.get_double("obj_dist")?, 0.25);
    Ok(())
}

#[test]
fn test_missing_info_key() {
    let outputs = vec![step_out(
        array(&[0.0, 0.0]),
        Some(0.0),
        false,
        Some(vec![("solved", SimValue::Bool(true))]),
    )];
    let config = config().info_keys(vec!["solved".to_string(), "success".to_string()]);
    let mut env = env_with(&config, ScriptedSimulator::new(outputs));
    let err = env.step(&action(&[0.0, 0.0])).unwrap_err();
    assert_eq!(gymlike_err(err), GymLikeError::MissingInfoKey("success".to_string()));

    // No info at all
    let outputs = vec![step_out(array(&[0.0, 0.0]), Some(0.0), false, None)];
    let config = GymLikeEnvConfig::new(ENV_NAME).info_keys(vec!["solved".to_string()]);
    let mut env = env_with(&config, ScriptedSimulator::new(outputs));
    let err = env.step(&action(&[0.0, 0.0])).unwrap_err();
    assert_eq!(gymlike_err(err), GymLikeError::MissingInfoKey("solved".to_string()));
}

#[test]
fn test_output_not_a_tuple() {
    let mut env = env_with(&config(), ScriptedSimulator::new(vec![array(&[0.0, 0.0])]));
    let err = env.step(&action(&[0.0, 0.0])).unwrap_err();
    assert_eq!(
        gymlike_err(err),
        GymLikeError::Type {
            expected: "tuple".to_string(),
            actual: "array".to_string(),
        }
    );
}

#[test]
fn test_custom_transform() -> Result<()> {
    let outputs = vec![SimValue::Tuple(vec![
        array(&[0.0, 0.0]),
        SimValue::Float(1.0),
        SimValue::Bool(false),
        SimValue::Bool(true),
        SimValue::Dict(vec![]),
    ])];
    let sim = ScriptedSimulator::new(outputs).reset_obs(SimValue::Tuple(vec![
        array(&[0.0, 0.0]),
        SimValue::Dict(vec![]),
    ]));
    let mut env = GymLikeEnv::build(&config(), &capabilities(), sim, TerminatedTruncatedOutput)?;
    env.reset(&Options::new())?;
    let record = env.step(&action(&[0.0, 0.0]))?;
    assert!(record.get_bool(DONE_KEY)?);
    assert_eq!(record.get_scalar(REWARD_KEY)?, 1.0);
    Ok(())
}

#[test]
fn test_output_record_follows_input_record() -> Result<()> {
    let sim = ScriptedSimulator::new(vec![step_out(array(&[0.0, 0.0]), Some(0.0), false, None)]);
    let mut env = env_with(&config(), sim);
    let mut input = Record::new(vec![1], Device::Cuda(1));
    input.insert(ACTION_KEY, RecordValue::Array(arr1(&[0f32, 0.0]).into_dyn()));
    let record = env.step(&input)?;
    assert_eq!(record.batch_size(), &[1]);
    assert_eq!(record.device(), Device::Cuda(1));
    assert_eq!(env.current_record(), Some(&record));
    Ok(())
}

#[test]
fn test_set_seed() -> Result<()> {
    let mut derived = vec![];
    for _ in 0..2 {
        let mut ctx = SeedContext::default();
        let mut env = env_with(&config(), ScriptedSimulator::new(vec![]));
        let seed = env.set_seed(&mut ctx, Some(5))?;
        assert_eq!(env.simulator().seeds, vec![Some(5)]);
        assert_eq!(ctx.seed(), Some(5));
        derived.push(seed);
    }
    assert_eq!(derived[0], derived[1]);
    assert_ne!(derived[0], Some(5));
    assert_eq!(derived[0], Some(derive_seed(5)));
    Ok(())
}

#[test]
fn test_set_seed_without_seed() -> Result<()> {
    let mut ctx = SeedContext::new(11);
    let mut env = env_with(&config(), ScriptedSimulator::new(vec![]));
    assert_eq!(env.set_seed(&mut ctx, None)?, None);
    assert_eq!(env.simulator().seeds, vec![None]);
    assert_eq!(ctx.seed(), Some(11));
    Ok(())
}

#[test]
fn test_set_seed_not_implemented() {
    let mut ctx = SeedContext::default();
    let mut env = GymLikeEnv::build(&config(), &capabilities(), UnseededSimulator, TupleOutput).unwrap();
    let err = env.set_seed(&mut ctx, Some(1)).unwrap_err();
    assert!(matches!(gymlike_err(err), GymLikeError::SeedNotImplemented(_)));
}

#[test]
fn test_display() {
    let env = env_with(&config().batch_size(vec![4]), ScriptedSimulator::new(vec![]));
    assert_eq!(
        env.to_string(),
        "GymLikeEnv(env=visual_kitchen_micro_open-v3, task=None, batch_size=[4])"
    );
}

#[test]
fn test_rollout() -> Result<()> {
    let outputs = vec![
        step_out(array(&[1.0, 0.0]), Some(1.0), false, None),
        step_out(array(&[2.0, 0.0]), Some(1.0), false, None),
        step_out(array(&[3.0, 0.0]), Some(1.0), true, None),
    ];
    let mut env = env_with(&config(), ScriptedSimulator::new(outputs));
    let records = rollout(&mut env, 10, |record| {
        let obs = record.get_array(NEXT_OBSERVATION)?;
        let a: ArrayD<f32> = obs.mapv(|x| x * 0.1);
        Ok(Record::from_slice(&[(ACTION_KEY, RecordValue::Array(a))]))
    })?;
    assert_eq!(records.len(), 3);
    assert!(records[2].get_bool(DONE_KEY)?);
    assert_eq!(env.simulator().actions[1], array(&[0.1, 0.0]));
    Ok(())
}

struct CountingLibrary {
    caps: Capabilities,
    n_made: Cell<usize>,
}

impl SimulatorLibrary for CountingLibrary {
    type Sim = ScriptedSimulator;

    fn capabilities(&self) -> &Capabilities {
        &self.caps
    }

    fn make(&self, _config: &GymLikeEnvConfig) -> Result<Self::Sim> {
        self.n_made.set(self.n_made.get() + 1);
        Ok(ScriptedSimulator::new(vec![]))
    }
}

#[test]
fn test_make_checks_before_instantiation() {
    let library = CountingLibrary {
        caps: capabilities(),
        n_made: Cell::new(0),
    };
    assert!(GymLikeEnv::make(&GymLikeEnvConfig::new("unknown"), &library, TupleOutput).is_err());
    assert_eq!(library.n_made.get(), 0);
    assert!(GymLikeEnv::make(&config(), &library, TupleOutput).is_ok());
    assert_eq!(library.n_made.get(), 1);
}
