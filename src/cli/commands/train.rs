//! Train command - Run learning episodes in the reference arena

use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;

use super::{FallbackArg, policy_path};
use crate::{
    cli::output::{print_kv, print_section, print_subsection},
    sim::{RunSummary, Simulation, SimulationConfig, learning_lineup},
};

#[derive(Debug, Parser)]
pub struct TrainArgs {
    /// Number of training episodes
    #[arg(long, default_value_t = 200)]
    pub episodes: usize,

    /// Number of hunter agents
    #[arg(long, default_value_t = 2)]
    pub hunters: usize,

    /// Arena width in cells
    #[arg(long, default_value_t = 9)]
    pub width: i32,

    /// Arena height in cells
    #[arg(long, default_value_t = 9)]
    pub height: i32,

    /// Step cap per episode
    #[arg(long, default_value_t = 400)]
    pub max_steps: usize,

    /// Observation noise bound for opponent positions
    #[arg(long, default_value_t = 0)]
    pub noise: i32,

    /// Random seed for reproducibility
    #[arg(long)]
    pub seed: Option<u64>,

    /// Hunter substitution when an illegal action comes back
    #[arg(long, value_enum, default_value = "stop")]
    pub hunter_fallback: FallbackArg,

    /// Directory for exported policies
    #[arg(long, default_value = "policies")]
    pub policy_dir: PathBuf,

    /// Optional CSV file for per-episode statistics
    #[arg(long)]
    pub stats_out: Option<PathBuf>,

    /// Disable the progress bar
    #[arg(long)]
    pub no_progress: bool,
}

pub fn execute(args: TrainArgs) -> Result<()> {
    let config = SimulationConfig {
        episodes: args.episodes,
        max_steps: args.max_steps,
        width: args.width,
        height: args.height,
        hunters: args.hunters,
        noise_bound: args.noise,
        test_mode: false,
        hunter_fallback: args.hunter_fallback.into(),
        seed: args.seed,
        progress: !args.no_progress,
    };

    print_section("Training");
    print_kv("episodes", &args.episodes.to_string());
    print_kv("hunters", &args.hunters.to_string());
    print_kv("arena", &format!("{}x{}", args.width, args.height));
    print_kv("noise bound", &args.noise.to_string());
    if let Some(seed) = args.seed {
        print_kv("seed", &seed.to_string());
    }

    let agents = learning_lineup(args.hunters, args.seed)?;
    let summary = Simulation::new(config).run(agents)?;

    save_policies(&args.policy_dir, &summary)?;
    if let Some(path) = &args.stats_out {
        write_stats(path, &summary)?;
        println!("\nPer-episode statistics written to {}", path.display());
    }

    report(&summary);
    println!("\nPolicies written to {}", args.policy_dir.display());
    Ok(())
}

fn save_policies(dir: &PathBuf, summary: &RunSummary) -> Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("create policy directory {}", dir.display()))?;
    for (agent_id, policy) in summary.policies.iter().enumerate() {
        if let Some(policy) = policy {
            let path = policy_path(dir, agent_id);
            policy
                .save(&path)
                .with_context(|| format!("save policy for agent {agent_id}"))?;
        }
    }
    Ok(())
}

fn write_stats(path: &PathBuf, summary: &RunSummary) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("create statistics file {}", path.display()))?;
    for record in &summary.episodes {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

fn report(summary: &RunSummary) {
    print_subsection("Results");
    print_kv("episodes", &summary.episodes.len().to_string());
    print_kv("mean score", &format!("{:.1}", summary.mean_score()));
    if let Some(last) = summary.episodes.last() {
        print_kv("final score", &format!("{:.1}", last.score));
    }

    for (agent_id, usage) in summary.behavior_usage.iter().enumerate() {
        let Some(usage) = usage else { continue };
        print_subsection(&format!("Behavior usage (agent {agent_id})"));
        for (behavior, count) in usage {
            print_kv(behavior, &count.to_string());
        }
    }
}
