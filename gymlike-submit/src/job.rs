//! Expansion of a sweep into job requests.
use crate::SweepConfig;

/// A single training run to submit.
#[derive(Debug, Clone, PartialEq)]
pub struct JobRequest {
    /// Environment of the run.
    pub env_name: String,

    /// Seed of the run.
    pub seed: u64,

    /// Average pooling switch.
    pub avg_pooling: bool,

    /// Shared mapping switch.
    pub shared_mapping: bool,

    /// Name of the experiment.
    pub exp_name: String,

    /// Command line flags of the training program.
    pub flags: Vec<String>,
}

/// Name of the experiment of a run.
pub fn exp_name(env_name: &str, seed: u64, avg_pooling: bool, shared_mapping: bool) -> String {
    let mut parts = vec!["SUBMITIT".to_string(), env_name.to_string(), "seed".to_string(), seed.to_string()];
    if avg_pooling {
        parts.push("avg_pooling".to_string());
    }
    if shared_mapping {
        parts.push("shared_mapping".to_string());
    }
    parts.join("_")
}

/// Expands the grid of a sweep over `envs`.
///
/// Runs are ordered by shared mapping, then average pooling, then environment,
/// then seed, the last varying fastest.
pub fn expand(config: &SweepConfig, envs: &[String]) -> Vec<JobRequest> {
    let mut jobs = vec![];
    for &shared_mapping in config.shared_mapping.iter() {
        for &avg_pooling in config.avg_pooling.iter() {
            for env_name in envs.iter() {
                for &seed in config.seeds.iter() {
                    let exp_name = exp_name(env_name, seed, avg_pooling, shared_mapping);
                    let mut flags = vec![
                        "--config".to_string(),
                        config.config_path.clone(),
                        "--env_name".to_string(),
                        env_name.clone(),
                        "--seed".to_string(),
                        seed.to_string(),
                        "--exp_name".to_string(),
                        exp_name.clone(),
                        "--collector_devices".to_string(),
                    ];
                    flags.extend(config.collector_devices.iter().cloned());
                    if avg_pooling {
                        flags.push("--use_avg_pooling".to_string());
                    }
                    if shared_mapping {
                        flags.push("--shared_mapping".to_string());
                    }

                    jobs.push(JobRequest {
                        env_name: env_name.clone(),
                        seed,
                        avg_pooling,
                        shared_mapping,
                        exp_name,
                        flags,
                    });
                }
            }
        }
    }
    jobs
}
