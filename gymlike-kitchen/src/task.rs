//! Kitchen task variants.
use gymlike_core::{Options, SimValue};
use gymlike_env::GymLikeEnvConfig;
use serde::{Deserialize, Serialize};

/// Target of a joint at reset or as a goal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum JointTarget {
    /// A fixed joint position.
    Fixed(f64),

    /// A position sampled uniformly in `[low, high]`.
    Range(f64, f64),
}

impl JointTarget {
    fn to_sim(self) -> SimValue {
        match self {
            JointTarget::Fixed(v) => SimValue::Float(v),
            JointTarget::Range(lo, hi) => SimValue::Tuple(vec![SimValue::Float(lo), SimValue::Float(hi)]),
        }
    }
}

/// Generation of the franka appliance environments installed with `mj_envs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplianceApi {
    /// A single `FrankaAppliance` class handles fixed and randomized variants.
    Unified,

    /// `FrankaApplianceFixed` and `FrankaApplianceRandom` classes.
    Split,
}

/// A registered variant of the kitchen tasks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KitchenTask {
    /// Identifier in the gym registry.
    pub id: String,

    /// `module:Class` creating the environment.
    pub entry_point: String,

    /// Length of an episode.
    pub max_episode_steps: usize,

    /// Joint positions at reset.
    pub obj_init: Vec<(String, JointTarget)>,

    /// Joint positions to reach.
    pub obj_goal: Vec<(String, JointTarget)>,

    /// Site the end effector interacts with, if the task has a single object.
    pub interact_site: Option<String>,

    /// Interaction sites of the appliance.
    pub obj_interaction_sites: Vec<String>,

    /// Joints of the appliance.
    pub obj_jnt_names: Vec<String>,

    /// Bodies of the appliance.
    pub obj_body_names: Vec<String>,

    /// Bodies whose placement is randomized at reset.
    pub obj_body_randomize: Vec<String>,

    /// Weights of the observation keys.
    pub obs_keys_wt: Vec<(String, f64)>,

    /// Model and config files under the `relay_kitchen` directory.
    pub assets: (String, String),

    /// Generation of the appliance environment, `None` for the relay kitchen.
    pub appliance_api: Option<ApplianceApi>,
}

fn joints(targets: &[(String, JointTarget)]) -> SimValue {
    SimValue::Dict(targets.iter().map(|(k, v)| (k.clone(), v.to_sim())).collect())
}

fn names(v: &[String]) -> SimValue {
    SimValue::Tuple(v.iter().map(|s| SimValue::Str(s.clone())).collect())
}

impl KitchenTask {
    /// Keyword arguments of the registered environment.
    ///
    /// `curr_dir` is the `relay_kitchen` directory of the installed `mj_envs`, used to
    /// locate the model and config files of the task.
    pub fn kwargs(&self, curr_dir: &str) -> Options {
        let mut kwargs = Options::new();
        let (model, config) = &self.assets;
        kwargs.insert("model_path".to_string(), SimValue::Str(format!("{}/{}", curr_dir, model)));
        kwargs.insert("config_path".to_string(), SimValue::Str(format!("{}/{}", curr_dir, config)));
        kwargs.insert("obj_init".to_string(), joints(&self.obj_init));
        kwargs.insert("obj_goal".to_string(), joints(&self.obj_goal));
        if let Some(site) = &self.interact_site {
            kwargs.insert("interact_site".to_string(), SimValue::Str(site.clone()));
        }
        if !self.obj_interaction_sites.is_empty() {
            let key = match self.appliance_api {
                Some(ApplianceApi::Split) => "obj_interaction_site",
                _ => "obj_interaction_sites",
            };
            kwargs.insert(key.to_string(), names(&self.obj_interaction_sites));
        }
        if !self.obj_jnt_names.is_empty() {
            kwargs.insert("obj_jnt_names".to_string(), names(&self.obj_jnt_names));
        }
        if !self.obj_body_names.is_empty() {
            kwargs.insert("obj_body_names".to_string(), names(&self.obj_body_names));
        }
        if !self.obj_body_randomize.is_empty() {
            kwargs.insert("obj_body_randomize".to_string(), names(&self.obj_body_randomize));
        }
        kwargs.insert(
            "obs_keys_wt".to_string(),
            SimValue::Dict(
                self.obs_keys_wt
                    .iter()
                    .map(|(k, w)| (k.clone(), SimValue::Float(*w)))
                    .collect(),
            ),
        );
        kwargs
    }

    /// Configuration of an adapter of the registered environment.
    pub fn env_config(&self) -> GymLikeEnvConfig {
        GymLikeEnvConfig::new(self.id.as_str())
    }

    /// Returns `true` if the reset or goal positions are sampled.
    pub fn is_randomized(&self) -> bool {
        self.obj_init
            .iter()
            .chain(self.obj_goal.iter())
            .any(|(_, t)| matches!(t, JointTarget::Range(..)))
    }
}
