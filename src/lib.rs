//! Behavior-based reinforcement learning for pursuit-evasion game agents
//!
//! This crate provides:
//! - A request/response protocol carrying perceived state from an
//!   environment process to a decision process and a chosen action back
//! - Environment-side proxy agents with observation noise, role-specific
//!   rewards, and illegal-action fallback
//! - A macro-behavior layer (eat, flee, seek, pursue) over the game's
//!   four-directional action space
//! - Online Q-learning with linear function approximation and ε-greedy
//!   exploration over the behavior set
//! - A threaded simulation runner and a small reference arena to drive it

pub mod adapter;
pub mod agents;
pub mod arena;
pub mod behaviors;
pub mod cli;
pub mod controller;
pub mod encoder;
pub mod environment;
pub mod error;
pub mod features;
pub mod learning;
pub mod noise;
pub mod perception;
pub mod protocol;
pub mod sim;
pub mod types;

pub use adapter::{AdapterAgent, FallbackPolicy, RewardPolicy};
pub use agents::{
    BehaviorLearningAgent, DecisionAgent, EaterAgent, FoodSearchAgent, RandomAgent,
};
pub use arena::Arena;
pub use behaviors::{Behavior, resolve_suggestion};
pub use controller::AgentController;
pub use encoder::StateEncoder;
pub use environment::{BoolGrid, EnvironmentState, Layout};
pub use error::{Error, Result};
pub use features::Feature;
pub use learning::{ApproximateQLearning, Policy};
pub use noise::PositionNoise;
pub use perception::WorldView;
pub use protocol::{
    AckMessage, ActionReply, ChannelMessenger, GameStartMessage, Message, Messenger, StateMessage,
};
pub use sim::{RunSummary, Simulation, SimulationConfig, learning_lineup};
pub use types::{Direction, HUNTED_INDEX, Position};
