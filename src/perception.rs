//! Decision-side world state.
//!
//! Each controller rebuilds its picture of the game from the state messages
//! it receives; nothing else crosses the process boundary. The view also
//! carries the iteration counter that drives the learning-rate schedule.

use std::collections::{BTreeMap, BTreeSet};

use crate::{
    protocol::StateMessage,
    types::{Direction, HUNTED_INDEX, Position},
};

/// Per-agent snapshot of the perceived game state.
#[derive(Debug, Clone, Default)]
pub struct WorldView {
    agent_id: usize,
    width: i32,
    height: i32,
    agent_positions: BTreeMap<usize, Position>,
    food: BTreeSet<Position>,
    walls: BTreeSet<Position>,
    fragile: BTreeMap<usize, f64>,
    iteration: u64,
}

impl WorldView {
    pub fn new(agent_id: usize) -> Self {
        Self {
            agent_id,
            ..Self::default()
        }
    }

    /// Reset per-episode state from the handshake.
    ///
    /// The iteration counter deliberately survives episodes: the step-size
    /// schedule anneals over the whole run.
    pub fn begin_episode(&mut self, width: i32, height: i32) {
        self.width = width;
        self.height = height;
        self.agent_positions.clear();
        self.food.clear();
        self.walls.clear();
        self.fragile.clear();
    }

    /// Fold one state message into the view.
    pub fn apply(&mut self, msg: &StateMessage) {
        self.agent_id = msg.agent_id;
        self.agent_positions = msg.agent_positions.clone();
        self.food = msg.food_positions.clone();
        self.walls = msg.wall_positions.clone();
        self.fragile = msg.fragile_agents.clone();
        self.iteration += 1;
    }

    pub fn agent_id(&self) -> usize {
        self.agent_id
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// Number of state messages applied so far; never reset.
    pub fn iteration(&self) -> u64 {
        self.iteration
    }

    pub fn own_position(&self) -> Option<Position> {
        self.position_of(self.agent_id)
    }

    pub fn position_of(&self, agent_id: usize) -> Option<Position> {
        self.agent_positions.get(&agent_id).copied()
    }

    /// Fragility flag for an agent: 1.0 while its scared timer runs.
    pub fn fragile(&self, agent_id: usize) -> f64 {
        self.fragile.get(&agent_id).copied().unwrap_or(0.0)
    }

    pub fn is_wall(&self, pos: Position) -> bool {
        self.walls.contains(&pos)
    }

    pub fn food_positions(&self) -> impl Iterator<Item = Position> + '_ {
        self.food.iter().copied()
    }

    /// Adversary indices from this agent's perspective: the hunted agent
    /// sees every hunter; a hunter sees the hunted agent.
    pub fn enemy_ids(&self) -> Vec<usize> {
        if self.agent_id == HUNTED_INDEX {
            self.agent_positions
                .keys()
                .copied()
                .filter(|&id| id != HUNTED_INDEX)
                .collect()
        } else {
            vec![HUNTED_INDEX]
        }
    }

    /// Closest food pellet to `from`, ties broken by position order.
    pub fn nearest_food(&self, from: Position) -> Option<Position> {
        self.food
            .iter()
            .copied()
            .min_by_key(|&pos| (from.manhattan(pos), pos))
    }

    /// Closest enemy to `from`, ties broken by agent index.
    pub fn nearest_enemy(&self, from: Position) -> Option<(usize, Position)> {
        self.enemy_ids()
            .into_iter()
            .filter_map(|id| self.position_of(id).map(|pos| (id, pos)))
            .min_by_key(|&(id, pos)| (from.manhattan(pos), id))
    }

    /// Closest enemy whose scared timer is running.
    pub fn nearest_fragile_enemy(&self, from: Position) -> Option<(usize, Position)> {
        self.enemy_ids()
            .into_iter()
            .filter(|&id| self.fragile(id) > 0.0)
            .filter_map(|id| self.position_of(id).map(|pos| (id, pos)))
            .min_by_key(|&(id, pos)| (from.manhattan(pos), id))
    }
}
