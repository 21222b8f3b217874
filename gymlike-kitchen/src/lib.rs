//! Registration table of the visual kitchen tasks of `mj_envs`.
//!
//! The table has the relay kitchen variants, where a single joint of the kitchen is
//! moved (e.g., opening the microwave or turning a knob on), and the franka appliance
//! variants, where the robot works on an isolated appliance. Depending on the
//! installed `mj_envs`, the appliance variants are provided by a single class or by
//! a pair of classes, see [`ApplianceApi`].
//!
//! ```no_run
//! # use anyhow::Result;
//! use gymlike_kitchen::{ApplianceApi, KitchenRegistry};
//!
//! # fn main() -> Result<()> {
//! let registry = KitchenRegistry::new(ApplianceApi::Unified);
//! let task = registry.get("visual_kitchen_micro_open-v3")?;
//! assert_eq!(task.max_episode_steps, 50);
//!
//! // The registry also describes which environments can be wrapped.
//! let config = task.env_config();
//! registry.capabilities().check(&config.env_name, None)?;
//! # Ok(())
//! # }
//! ```
mod registry;
mod task;
pub use registry::{KitchenRegistry, ENTRY_POINT, LIBNAME};
pub use task::{ApplianceApi, JointTarget, KitchenTask};
