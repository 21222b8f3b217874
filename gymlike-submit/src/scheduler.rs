//! Submission of jobs to a scheduler.
use crate::{ExecutorConfig, JobRequest};
use anyhow::{anyhow, Result};
use log::info;
use std::{collections::HashMap, process::Command, thread::sleep, time::Duration};

/// Identifier of a submitted job.
pub type JobId = String;

/// A batch scheduler.
pub trait Scheduler {
    /// Submits a job, starting after the job `dependency` if given.
    fn submit(&mut self, job: &JobRequest, dependency: Option<&str>) -> Result<JobId>;
}

/// A job accepted by the scheduler.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmittedJob {
    /// Identifier given by the scheduler.
    pub id: JobId,

    /// Name of the experiment.
    pub exp_name: String,

    /// Dependency of the job, e.g., `afterany:123`.
    pub dependency: Option<String>,
}

/// Submits jobs in order.
///
/// A job is chained on the last job of the same environment with `afterany`, so
/// that runs of an environment do not overlap. Submissions are `interval` apart.
pub fn submit_all<S: Scheduler>(
    scheduler: &mut S,
    jobs: &[JobRequest],
    interval: Duration,
) -> Result<Vec<SubmittedJob>> {
    let mut deps: HashMap<&str, JobId> = HashMap::new();
    let mut submitted = vec![];

    for (i, job) in jobs.iter().enumerate() {
        if i > 0 {
            sleep(interval);
        }
        let dependency = deps.get(job.env_name.as_str()).map(|id| format!("afterany:{}", id));
        let id = scheduler.submit(job, dependency.as_deref())?;
        info!(
            "flags: {:?}, dependency: {}, job id: {}, exp_name: {}",
            job.flags,
            dependency.as_deref().unwrap_or(""),
            id,
            job.exp_name
        );

        deps.insert(job.env_name.as_str(), id.clone());
        submitted.push(SubmittedJob {
            id,
            exp_name: job.exp_name.clone(),
            dependency,
        });
    }

    Ok(submitted)
}

/// A scheduler only logging jobs, with sequential identifiers.
#[derive(Debug, Clone, Default)]
pub struct DryRunScheduler {
    next_id: usize,
}

impl Scheduler for DryRunScheduler {
    fn submit(&mut self, job: &JobRequest, dependency: Option<&str>) -> Result<JobId> {
        self.next_id += 1;
        info!("Dry run of {} (dependency = {:?})", job.exp_name, dependency);
        Ok(self.next_id.to_string())
    }
}

/// Submits jobs with `sbatch` of Slurm.
#[derive(Debug, Clone)]
pub struct SbatchScheduler {
    executor: ExecutorConfig,
    program: String,
}

fn quote(s: &str) -> String {
    if !s.is_empty()
        && s.chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_.,:/=+@%".contains(c))
    {
        s.to_string()
    } else {
        format!("'{}'", s.replace('\'', r"'\''"))
    }
}

impl SbatchScheduler {
    /// Creates a scheduler running `program` with the flags of each job.
    pub fn new(executor: ExecutorConfig, program: impl Into<String>) -> Self {
        Self {
            executor,
            program: program.into(),
        }
    }

    /// Arguments of `sbatch` for a job.
    pub fn args(&self, job: &JobRequest, dependency: Option<&str>) -> Vec<String> {
        let e = &self.executor;
        let mut args = vec![
            "--parsable".to_string(),
            format!("--job-name={}", e.name),
            format!("--output={}/%j_0_log.out", e.folder),
            format!("--error={}/%j_0_log.err", e.folder),
            format!("--time={}", e.timeout_min),
            format!("--partition={}", e.partition),
            format!("--gpus-per-node={}", e.gpus_per_node),
            format!("--cpus-per-task={}", e.cpus_per_task),
        ];
        if let Some(dep) = dependency {
            args.push(format!("--dependency={}", dep));
        }
        let flags = job.flags.iter().map(|f| quote(f)).collect::<Vec<_>>();
        args.push(format!("--wrap={} {}", self.program, flags.join(" ")));
        args
    }
}

impl Scheduler for SbatchScheduler {
    fn submit(&mut self, job: &JobRequest, dependency: Option<&str>) -> Result<JobId> {
        let output = Command::new("sbatch").args(self.args(job, dependency)).output()?;
        if !output.status.success() {
            return Err(anyhow!(
                "sbatch failed for {}: {}",
                job.exp_name,
                String::from_utf8_lossy(&output.stderr).trim()
            ));
        }

        // `--parsable` prints `<job id>[;<cluster>]`
        let stdout = String::from_utf8_lossy(&output.stdout);
        match stdout.trim().split(';').next() {
            Some(id) if !id.is_empty() => Ok(id.to_string()),
            _ => Err(anyhow!("sbatch printed no job id for {}", job.exp_name)),
        }
    }
}
