//! CLI command implementations

pub mod evaluate;
pub mod train;

use std::path::{Path, PathBuf};

use clap::ValueEnum;

use crate::{adapter::FallbackPolicy, types::HUNTED_INDEX};

/// Hunter-side substitution for illegal replies, as a CLI choice.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FallbackArg {
    /// Stand still.
    Stop,
    /// Pick a random legal action.
    Random,
}

impl From<FallbackArg> for FallbackPolicy {
    fn from(arg: FallbackArg) -> Self {
        match arg {
            FallbackArg::Stop => FallbackPolicy::Stop,
            FallbackArg::Random => FallbackPolicy::RandomLegal,
        }
    }
}

/// Policy file path for one agent inside a policy directory.
pub(crate) fn policy_path(dir: &Path, agent_id: usize) -> PathBuf {
    if agent_id == HUNTED_INDEX {
        dir.join("hunted.json")
    } else {
        dir.join(format!("hunter-{agent_id}.json"))
    }
}
