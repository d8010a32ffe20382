//! pursuit CLI - Train and evaluate behavior-learning pursuit agents
//!
//! This CLI provides a unified interface for:
//! - Training the behavior learners in the reference arena
//! - Evaluating exported policies in test mode

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "pursuit")]
#[command(version, about = "Behavior-based RL for pursuit-evasion agents", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train behavior-learning agents in the reference arena
    Train(pursuit::cli::commands::train::TrainArgs),

    /// Evaluate saved policies without learning or exploration
    Evaluate(pursuit::cli::commands::evaluate::EvaluateArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Train(args) => pursuit::cli::commands::train::execute(args),
        Commands::Evaluate(args) => pursuit::cli::commands::evaluate::execute(args),
    }
}
