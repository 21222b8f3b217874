//! Submission of training sweeps over the kitchen tasks.
//!
//! A [`SweepConfig`] describes a grid of training runs: seeds, model switches and
//! environments taken from the kitchen registration table. [`expand`] turns the grid
//! into [`JobRequest`]s, and [`submit_all`] hands them to a [`Scheduler`], chaining
//! the runs of each environment one after another.
mod config;
mod job;
mod scheduler;
pub use config::{ExecutorConfig, SweepConfig};
pub use job::{exp_name, expand, JobRequest};
pub use scheduler::{
    submit_all, DryRunScheduler, JobId, SbatchScheduler, Scheduler, SubmittedJob,
};
