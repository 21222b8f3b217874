#![warn(missing_docs)]
//! Core types of gym-like environments.
//!
//! * [`record`] - records of named tensor-like fields exchanged with the training stack
//! * [`Simulator`] - contract of external simulators and their native values ([`SimValue`])
//! * [`spaces`] - declared action and observation spaces
//! * [`SeedContext`] - explicit random state shared with the training stack
//! * [`Env`] - environments producing records, and [`util::rollout`]
pub mod error;
pub mod record;
pub mod spaces;
pub mod util;

mod env;
mod seed;
mod sim;
pub use env::Env;
pub use seed::{derive_seed, SeedContext, MAX_SEED};
pub use sim::{Options, SimValue, Simulator};
