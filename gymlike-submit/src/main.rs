use anyhow::Result;
use clap::Parser;
use gymlike_kitchen::KitchenRegistry;
use gymlike_submit::{
    expand, submit_all, DryRunScheduler, SbatchScheduler, SubmittedJob, SweepConfig,
};
use log::info;
use std::time::Duration;

/// Submit training runs over the visual kitchen tasks
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Sweep configuration in YAML, defaults are used if not given
    #[arg(short, long)]
    config: Option<String>,

    /// Log the jobs without submitting them
    #[arg(short, long, default_value_t = false)]
    dry_run: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = match args.config.as_ref() {
        Some(path) => SweepConfig::load(path)?,
        None => SweepConfig::default(),
    };

    let registry = KitchenRegistry::new(config.appliance_api);
    let envs = config.select_envs(registry.ids());
    let jobs = expand(&config, &envs);
    info!("Submitting {} jobs over {} environments", jobs.len(), envs.len());

    let interval = Duration::from_millis(config.submit_interval_ms);
    let submitted: Vec<SubmittedJob> = if args.dry_run {
        submit_all(&mut DryRunScheduler::default(), &jobs, Duration::from_millis(0))?
    } else {
        let mut scheduler = SbatchScheduler::new(config.executor.clone(), config.program.as_str());
        submit_all(&mut scheduler, &jobs, interval)?
    };

    for job in submitted.iter() {
        println!("{}\t{}", job.id, job.exp_name);
    }

    Ok(())
}
