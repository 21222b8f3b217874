//! Action and observation spaces declared by simulators.
mod action;
mod observation;

pub use action::{ActionSpace, BoxSpace, DiscreteSpace};
pub use observation::ObservationSpec;
