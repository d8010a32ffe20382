//! Evaluate command - Run saved policies in test mode

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use super::{FallbackArg, policy_path};
use crate::{
    cli::output::{print_kv, print_section, print_subsection},
    learning::Policy,
    sim::{Simulation, SimulationConfig, learning_lineup},
};

#[derive(Debug, Parser)]
pub struct EvaluateArgs {
    /// Number of evaluation episodes
    #[arg(long, default_value_t = 20)]
    pub episodes: usize,

    /// Number of hunter agents (must match the trained policies)
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

    /// Directory holding the trained policies
    #[arg(long, default_value = "policies")]
    pub policy_dir: PathBuf,

    /// Disable the progress bar
    #[arg(long)]
    pub no_progress: bool,
}

pub fn execute(args: EvaluateArgs) -> Result<()> {
    let config = SimulationConfig {
        episodes: args.episodes,
        max_steps: args.max_steps,
        width: args.width,
        height: args.height,
        hunters: args.hunters,
        noise_bound: args.noise,
        test_mode: true,
        hunter_fallback: args.hunter_fallback.into(),
        seed: args.seed,
        progress: !args.no_progress,
    };

    print_section("Evaluation");
    print_kv("episodes", &args.episodes.to_string());
    print_kv("policies", &args.policy_dir.display().to_string());

    let mut agents = learning_lineup(args.hunters, args.seed)?;
    for (agent_id, agent) in agents.iter_mut().enumerate() {
        let path = policy_path(&args.policy_dir, agent_id);
        let policy = Policy::load(&path)
            .with_context(|| format!("load policy for agent {agent_id} from {}", path.display()))?;
        agent
            .set_policy(&policy)
            .with_context(|| format!("policy for agent {agent_id} does not fit its role"))?;
    }

    let summary = Simulation::new(config).run(agents)?;

    print_subsection("Results");
    print_kv("episodes", &summary.episodes.len().to_string());
    print_kv("mean score", &format!("{:.1}", summary.mean_score()));
    let cleared = summary
        .episodes
        .iter()
        .filter(|e| e.food_remaining == 0)
        .count();
    print_kv("cleared arenas", &cleared.to_string());
    Ok(())
}
