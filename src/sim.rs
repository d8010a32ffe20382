//! Simulation runner.
//!
//! Reproduces the two-process topology inside one process: every agent's
//! controller runs on its own worker thread, the adapters are driven
//! serially by the environment loop on the calling thread, and nothing is
//! shared between agents but the transport channels.

use std::{collections::BTreeMap, thread};

use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};

use crate::{
    adapter::{AdapterAgent, FallbackPolicy},
    agents::{BehaviorLearningAgent, DecisionAgent},
    arena::Arena,
    controller::AgentController,
    environment::EnvironmentState,
    error::{Error, Result},
    learning::Policy,
    noise::PositionNoise,
    protocol::ChannelMessenger,
    types::HUNTED_INDEX,
};

/// Configuration for one simulation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Number of episodes to play.
    pub episodes: usize,

    /// Step cap per episode.
    pub max_steps: usize,

    /// Arena width in cells.
    pub width: i32,

    /// Arena height in cells.
    pub height: i32,

    /// Number of hunter agents.
    pub hunters: usize,

    /// Observation noise bound for opponent positions.
    pub noise_bound: i32,

    /// Run every episode in evaluation mode (no learning, no exploration).
    pub test_mode: bool,

    /// Illegal-reply substitution for hunter proxies.
    pub hunter_fallback: FallbackPolicy,

    /// Random seed; None for a non-deterministic run.
    pub seed: Option<u64>,

    /// Whether to show a progress bar.
    pub progress: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            episodes: 100,
            max_steps: 400,
            width: 9,
            height: 9,
            hunters: 2,
            noise_bound: 0,
            test_mode: false,
            hunter_fallback: FallbackPolicy::Stop,
            seed: None,
            progress: true,
        }
    }
}

/// Outcome of a single episode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpisodeRecord {
    pub episode: usize,
    pub score: f64,
    pub steps: usize,
    pub food_remaining: usize,
}

/// Everything a finished run hands back.
#[derive(Debug)]
pub struct RunSummary {
    pub episodes: Vec<EpisodeRecord>,
    /// Per agent, indexed by agent id.
    pub policies: Vec<Option<Policy>>,
    /// Per agent, indexed by agent id.
    pub behavior_usage: Vec<Option<BTreeMap<String, u64>>>,
}

impl RunSummary {
    pub fn mean_score(&self) -> f64 {
        if self.episodes.is_empty() {
            return 0.0;
        }
        self.episodes.iter().map(|e| e.score).sum::<f64>() / self.episodes.len() as f64
    }
}

/// The default learning line-up: one hunted learner plus one learner per
/// hunter, all seeded from the run seed when given.
pub fn learning_lineup(hunters: usize, seed: Option<u64>) -> Result<Vec<Box<dyn DecisionAgent>>> {
    let mut agents: Vec<Box<dyn DecisionAgent>> = Vec::with_capacity(hunters + 1);
    for id in 0..=hunters {
        let agent = if id == HUNTED_INDEX {
            BehaviorLearningAgent::hunted(hunters)?
        } else {
            BehaviorLearningAgent::hunter(id, hunters)?
        };
        let agent = match seed {
            Some(seed) => agent.with_seed(seed.wrapping_add(id as u64)),
            None => agent,
        };
        agents.push(Box::new(agent));
    }
    Ok(agents)
}

/// A run over the reference arena.
pub struct Simulation {
    config: SimulationConfig,
}

impl Simulation {
    pub fn new(config: SimulationConfig) -> Self {
        Self { config }
    }

    /// Drive `agents` (indexed by agent id, hunted first) through the
    /// configured number of episodes and collect what came back.
    ///
    /// Existing policies can be pre-loaded into the agents before calling;
    /// trained policies are recovered in the summary after the controllers
    /// shut down.
    pub fn run(&self, agents: Vec<Box<dyn DecisionAgent>>) -> Result<RunSummary> {
        let config = &self.config;
        if agents.len() != config.hunters + 1 {
            return Err(Error::InvalidConfiguration {
                message: format!(
                    "run needs {} agents (hunted + hunters), got {}",
                    config.hunters + 1,
                    agents.len()
                ),
            });
        }

        let mut adapters = Vec::with_capacity(agents.len());
        let mut handles = Vec::with_capacity(agents.len());
        for (id, agent) in agents.into_iter().enumerate() {
            let (client, server) = ChannelMessenger::pair();
            let mut controller = AgentController::new(Box::new(server), agent);
            handles.push(thread::spawn(
                move || -> Result<Box<dyn DecisionAgent>> {
                    controller.run()?;
                    Ok(controller.into_agent())
                },
            ));

            let noise = match config.seed {
                Some(seed) => {
                    PositionNoise::seeded(config.noise_bound, seed.wrapping_add(100 + id as u64))
                }
                None => PositionNoise::new(config.noise_bound),
            };
            let mut adapter = if id == HUNTED_INDEX {
                AdapterAgent::hunted(Box::new(client), noise)
            } else {
                AdapterAgent::hunter(id, Box::new(client), noise)
                    .with_fallback(config.hunter_fallback)
            };
            if let Some(seed) = config.seed {
                adapter = adapter.with_seed(seed.wrapping_add(200 + id as u64));
            }
            if config.test_mode {
                adapter.enable_test_mode();
            }
            adapters.push(adapter);
        }

        let progress = if config.progress {
            Some(episode_progress(config.episodes as u64)?)
        } else {
            None
        };

        let episodes = self.play_episodes(&mut adapters, progress.as_ref());

        // Disconnect the transport so every controller's run loop returns,
        // then recover the agents for policy and usage export.
        drop(adapters);
        let mut policies = Vec::with_capacity(handles.len());
        let mut behavior_usage = Vec::with_capacity(handles.len());
        for (agent_id, handle) in handles.into_iter().enumerate() {
            let agent = handle
                .join()
                .map_err(|_| Error::ControllerFailed { agent_id })??;
            policies.push(agent.policy());
            behavior_usage.push(agent.behavior_usage());
        }

        if let Some(pb) = progress {
            pb.finish_and_clear();
        }

        Ok(RunSummary {
            episodes: episodes?,
            policies,
            behavior_usage,
        })
    }

    fn play_episodes(
        &self,
        adapters: &mut [AdapterAgent],
        progress: Option<&ProgressBar>,
    ) -> Result<Vec<EpisodeRecord>> {
        let config = &self.config;
        let mut records = Vec::with_capacity(config.episodes);

        for episode in 0..config.episodes {
            let mut arena = Arena::new(config.width, config.height, config.hunters);
            for adapter in adapters.iter_mut() {
                adapter.start_game(arena.layout())?;
            }

            let mut steps = 0;
            'episode: while steps < config.max_steps {
                for adapter in adapters.iter_mut() {
                    let action = adapter.get_action(&arena)?;
                    arena.apply(adapter.agent_id(), action);
                    if arena.finished() {
                        break 'episode;
                    }
                }
                steps += 1;
            }

            // One observe-only exchange per agent so the terminal reward
            // reaches the learners before the next handshake.
            for adapter in adapters.iter_mut() {
                adapter.update(&arena)?;
            }

            records.push(EpisodeRecord {
                episode,
                score: arena.score(),
                steps,
                food_remaining: arena.food_remaining(),
            });
            if let Some(pb) = progress {
                pb.set_message(format!("score {:.0}", arena.score()));
                pb.inc(1);
            }
        }

        Ok(records)
    }
}

fn episode_progress(total: u64) -> Result<ProgressBar> {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} episodes ({msg})")
            .map_err(|e| Error::ProgressTemplate {
                message: e.to_string(),
            })?
            .progress_chars("=>-"),
    );
    Ok(pb)
}
