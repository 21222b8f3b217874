//! Registration table of the kitchen tasks.
use crate::{ApplianceApi, JointTarget, KitchenTask};
use anyhow::Result;
use gymlike_core::error::GymLikeError;
use gymlike_env::Capabilities;
use log::debug;

/// Name of the library providing the kitchen tasks.
pub const LIBNAME: &str = "mj_envs";

/// Entry point of the relay kitchen tasks.
pub const ENTRY_POINT: &str = "mj_envs.envs.relay_kitchen:KitchenFrankaFixed";

// Model and config of the kitchen scene, relative to the `relay_kitchen` directory.
const KITCHEN_MODEL: &str = "assets/franka_kitchen.xml";
const KITCHEN_CONFIG: &str = "assets/franka_kitchen.config";

const KNOB_ON: f64 = -1.57;
const LIGHT_ON: f64 = -0.7;
const SLIDE_OPEN: f64 = 0.44;
const MICRO_OPEN: f64 = -1.25;
const RDOOR_OPEN: f64 = 1.57;
const LDOOR_OPEN: f64 = -1.25;

const JOINTS: [&str; 9] = [
    "knob1_joint",
    "knob2_joint",
    "knob3_joint",
    "knob4_joint",
    "lightswitch_joint",
    "slidedoor_joint",
    "micro0joint",
    "rightdoorhinge",
    "leftdoorhinge",
];

// Positions of JOINTS with every appliance open or on.
const OPEN: [f64; 9] = [
    KNOB_ON, KNOB_ON, KNOB_ON, KNOB_ON, LIGHT_ON, SLIDE_OPEN, MICRO_OPEN, RDOOR_OPEN, LDOOR_OPEN,
];

fn obs_keys_wt() -> Vec<(String, f64)> {
    vec![("robot_jnt".to_string(), 1.0), ("end_effector".to_string(), 1.0)]
}

fn fixed(joint: &str, v: f64) -> Vec<(String, JointTarget)> {
    vec![(joint.to_string(), JointTarget::Fixed(v))]
}

fn strings(v: &[&str]) -> Vec<String> {
    v.iter().map(|s| s.to_string()).collect()
}

fn relay_kitchen(id: &str, max_episode_steps: usize) -> KitchenTask {
    KitchenTask {
        id: id.to_string(),
        entry_point: ENTRY_POINT.to_string(),
        max_episode_steps,
        obj_init: vec![],
        obj_goal: vec![],
        interact_site: None,
        obj_interaction_sites: vec![],
        obj_jnt_names: vec![],
        obj_body_names: vec![],
        obj_body_randomize: vec![],
        obs_keys_wt: obs_keys_wt(),
        assets: (KITCHEN_MODEL.to_string(), KITCHEN_CONFIG.to_string()),
        appliance_api: None,
    }
}

/// A task moving a single joint of the kitchen from `from` to `to`.
fn relay_kitchen_single(id: &str, joint: &str, from: f64, to: f64, site: &str) -> KitchenTask {
    KitchenTask {
        obj_init: fixed(joint, from),
        obj_goal: fixed(joint, to),
        interact_site: Some(site.to_string()),
        ..relay_kitchen(id, 50)
    }
}

fn relay_kitchen_tasks() -> Vec<KitchenTask> {
    let all = |values: &[f64]| {
        JOINTS
            .iter()
            .zip(values.iter())
            .map(|(j, v)| (j.to_string(), JointTarget::Fixed(*v)))
            .collect::<Vec<_>>()
    };

    let mut tasks = vec![
        KitchenTask {
            obj_init: all(&[0.0; 9][..]),
            ..relay_kitchen("visual_kitchen-v3", 280)
        },
        KitchenTask {
            obj_init: all(&OPEN[..]),
            ..relay_kitchen("visual_kitchen_close-v3", 50)
        },
    ];

    // (name, joint, open/on position, interaction site), with `on` for knobs and light
    let appliances = [
        ("micro", "micro0joint", MICRO_OPEN, "microhandle_site", ("open", "close")),
        ("rdoor", "rightdoorhinge", RDOOR_OPEN, "rightdoor_site", ("open", "close")),
        ("ldoor", "leftdoorhinge", LDOOR_OPEN, "leftdoor_site", ("open", "close")),
        ("sdoor", "slidedoor_joint", SLIDE_OPEN, "slide_site", ("open", "close")),
        ("light", "lightswitch_joint", LIGHT_ON, "light_site", ("on", "off")),
        ("knob4", "knob4_joint", KNOB_ON, "knob4_site", ("on", "off")),
        ("knob3", "knob3_joint", KNOB_ON, "knob3_site", ("on", "off")),
        ("knob2", "knob2_joint", KNOB_ON, "knob2_site", ("on", "off")),
        ("knob1", "knob1_joint", KNOB_ON, "knob1_site", ("on", "off")),
    ];
    for (name, joint, open, site, (on, off)) in appliances.iter() {
        tasks.push(relay_kitchen_single(
            &format!("visual_kitchen_{}_{}-v3", name, on),
            joint,
            0.0,
            *open,
            site,
        ));
        tasks.push(relay_kitchen_single(
            &format!("visual_kitchen_{}_{}-v3", name, off),
            joint,
            *open,
            0.0,
            site,
        ));
    }

    tasks
}

/// Description of an appliance of the franka appliance tasks.
struct Appliance {
    name: &'static str,
    asset: &'static str,
    joint: &'static str,
    open: f64,
    site: &'static str,
    body: &'static str,
    // The unified API only names the bodies of the microwave.
    names_body: bool,
}

const MICROWAVE: Appliance = Appliance {
    name: "micro",
    asset: "franka_microwave",
    joint: "micro0joint",
    open: MICRO_OPEN,
    site: "microhandle_site",
    body: "microwave",
    names_body: true,
};

const SLIDE_CABINET: Appliance = Appliance {
    name: "slide",
    asset: "franka_slidecabinet",
    joint: "slidedoor_joint",
    open: SLIDE_OPEN,
    site: "slide_site",
    body: "slidecabinet",
    names_body: false,
};

#[derive(Clone, Copy)]
enum Variant {
    Open,
    Close,
    Random,
}

fn franka_appliance(api: ApplianceApi, appliance: &Appliance, variant: Variant) -> KitchenTask {
    let suffix = match variant {
        Variant::Open => "open",
        Variant::Close => "close",
        Variant::Random => "random",
    };
    let (init, goal) = match variant {
        Variant::Open => (JointTarget::Fixed(0.0), JointTarget::Fixed(appliance.open)),
        Variant::Close => (JointTarget::Fixed(appliance.open), JointTarget::Fixed(0.0)),
        Variant::Random => {
            let (lo, hi) = if appliance.open < 0.0 {
                (appliance.open, 0.0)
            } else {
                (0.0, appliance.open)
            };
            (JointTarget::Range(lo, hi), JointTarget::Range(lo, hi))
        }
    };
    let random = matches!(variant, Variant::Random);

    let entry_point = match (api, random) {
        (ApplianceApi::Unified, _) => "mj_envs.envs.relay_kitchen:FrankaAppliance",
        (ApplianceApi::Split, false) => "mj_envs.envs.relay_kitchen:FrankaApplianceFixed",
        (ApplianceApi::Split, true) => "mj_envs.envs.relay_kitchen:FrankaApplianceRandom",
    };
    let max_episode_steps = match (api, appliance.name, variant) {
        (ApplianceApi::Unified, "micro", Variant::Open) => 75,
        _ => 50,
    };
    let body = vec![appliance.body.to_string()];
    let (obj_body_names, obj_body_randomize) = match api {
        ApplianceApi::Split => (body, vec![]),
        ApplianceApi::Unified if random => (vec![], body),
        ApplianceApi::Unified if appliance.names_body => (body, vec![]),
        ApplianceApi::Unified => (vec![], vec![]),
    };

    KitchenTask {
        id: format!("visual_franka_{}_{}-v3", appliance.name, suffix),
        entry_point: entry_point.to_string(),
        max_episode_steps,
        obj_init: vec![(appliance.joint.to_string(), init)],
        obj_goal: vec![(appliance.joint.to_string(), goal)],
        interact_site: Some(appliance.site.to_string()),
        obj_interaction_sites: strings(&[appliance.site]),
        obj_jnt_names: strings(&[appliance.joint]),
        obj_body_names,
        obj_body_randomize,
        obs_keys_wt: obs_keys_wt(),
        assets: (
            format!("assets/{}.xml", appliance.asset),
            format!("assets/{}.config", appliance.asset),
        ),
        appliance_api: Some(api),
    }
}

/// The kitchen tasks registered by `mj_envs`, in registration order.
#[derive(Debug, Clone)]
pub struct KitchenRegistry {
    tasks: Vec<KitchenTask>,
    capabilities: Capabilities,
}

impl KitchenRegistry {
    /// Builds the table for the given generation of the appliance environments.
    pub fn new(api: ApplianceApi) -> Self {
        let mut tasks = relay_kitchen_tasks();
        for appliance in [MICROWAVE, SLIDE_CABINET].iter() {
            for variant in [Variant::Open, Variant::Close, Variant::Random].iter() {
                tasks.push(franka_appliance(api, appliance, *variant));
            }
        }
        debug!("{} kitchen tasks with the {:?} appliance API", tasks.len(), api);

        let capabilities = Capabilities::flat(LIBNAME, tasks.iter().map(|t| t.id.clone()));
        Self { tasks, capabilities }
    }

    /// Looks up a task.
    ///
    /// Fails with [`GymLikeError::Configuration`] if the task is not registered.
    pub fn get(&self, id: &str) -> Result<&KitchenTask> {
        self.tasks.iter().find(|t| t.id == id).ok_or_else(|| {
            GymLikeError::Configuration {
                env_name: id.to_string(),
                task_name: None,
                libname: LIBNAME.to_string(),
            }
            .into()
        })
    }

    /// Identifiers of all tasks.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.tasks.iter().map(|t| t.id.as_str())
    }

    /// Identifiers of the tasks with visual observations.
    pub fn visual_ids(&self) -> impl Iterator<Item = &str> {
        self.ids().filter(|id| id.starts_with("visual"))
    }

    /// All tasks.
    pub fn tasks(&self) -> &[KitchenTask] {
        &self.tasks
    }

    /// Capability descriptor listing the registered tasks.
    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }
}
