//! Common test utilities for the pursuit test suite.
//!
//! Provides a hand-built environment fixture and small scripted decision
//! agents used across the integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use rand::{SeedableRng, rngs::StdRng};

use pursuit::{
    BoolGrid, DecisionAgent, Direction, EnvironmentState, Layout, Result, WorldView,
    resolve_suggestion,
    types::{HUNTED_ACTIONS, HUNTED_INDEX, HUNTER_ACTIONS},
};

/// A fully scriptable environment snapshot.
pub struct FixtureState {
    score: f64,
    positions: Vec<(i32, i32)>,
    food: BoolGrid,
    walls: BoolGrid,
    scared: Vec<u32>,
    legal: Vec<Vec<Direction>>,
}

impl FixtureState {
    pub fn new(width: i32, height: i32, agents: usize) -> Self {
        let legal = (0..agents)
            .map(|id| {
                if id == HUNTED_INDEX {
                    HUNTED_ACTIONS.to_vec()
                } else {
                    HUNTER_ACTIONS.to_vec()
                }
            })
            .collect();
        Self {
            score: 0.0,
            positions: (0..agents).map(|id| (1 + id as i32, 1)).collect(),
            food: BoolGrid::new(width, height),
            walls: BoolGrid::new(width, height),
            scared: vec![0; agents],
            legal,
        }
    }

    pub fn layout(&self) -> Layout {
        Layout {
            width: self.food.width(),
            height: self.food.height(),
        }
    }

    pub fn set_score(&mut self, score: f64) {
        self.score = score;
    }

    pub fn set_position(&mut self, agent_id: usize, x: i32, y: i32) {
        self.positions[agent_id] = (x, y);
    }

    pub fn add_food(&mut self, x: i32, y: i32) {
        self.food.set(x, y, true);
    }

    pub fn add_wall(&mut self, x: i32, y: i32) {
        self.walls.set(x, y, true);
    }

    pub fn set_scared(&mut self, agent_id: usize, ticks: u32) {
        self.scared[agent_id] = ticks;
    }

    pub fn set_legal(&mut self, agent_id: usize, actions: Vec<Direction>) {
        self.legal[agent_id] = actions;
    }
}

impl EnvironmentState for FixtureState {
    fn score(&self) -> f64 {
        self.score
    }

    fn agent_count(&self) -> usize {
        self.positions.len()
    }

    fn agent_position(&self, agent_id: usize) -> (i32, i32) {
        self.positions[agent_id]
    }

    fn food(&self) -> &BoolGrid {
        &self.food
    }

    fn walls(&self) -> &BoolGrid {
        &self.walls
    }

    fn scared_timer(&self, agent_id: usize) -> u32 {
        self.scared[agent_id]
    }

    fn legal_actions(&self, agent_id: usize) -> Vec<Direction> {
        self.legal[agent_id].clone()
    }
}

/// Always proposes the same direction, resolved through the standard
/// three-tier fallback.
pub struct SuggestingAgent {
    suggestion: Direction,
    rng: StdRng,
}

impl SuggestingAgent {
    pub fn new(suggestion: Direction, seed: u64) -> Self {
        Self {
            suggestion,
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl DecisionAgent for SuggestingAgent {
    fn name(&self) -> &str {
        "suggesting"
    }

    fn choose_action(
        &mut self,
        _view: &WorldView,
        _executed_action: Direction,
        _reward: f64,
        legal_actions: &[Direction],
        _test_mode: bool,
    ) -> Result<Direction> {
        Ok(resolve_suggestion(
            self.suggestion,
            legal_actions,
            &mut self.rng,
        ))
    }
}

/// Records every reward and mode flag it sees, always replying the same
/// direction.
pub struct RecorderAgent {
    reply: Direction,
    pub rewards: Arc<Mutex<Vec<f64>>>,
    pub modes: Arc<Mutex<Vec<bool>>>,
}

impl RecorderAgent {
    pub fn new(reply: Direction) -> Self {
        Self {
            reply,
            rewards: Arc::new(Mutex::new(Vec::new())),
            modes: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn reward_log(&self) -> Arc<Mutex<Vec<f64>>> {
        Arc::clone(&self.rewards)
    }

    pub fn mode_log(&self) -> Arc<Mutex<Vec<bool>>> {
        Arc::clone(&self.modes)
    }
}

impl DecisionAgent for RecorderAgent {
    fn name(&self) -> &str {
        "recorder"
    }

    fn choose_action(
        &mut self,
        _view: &WorldView,
        _executed_action: Direction,
        reward: f64,
        _legal_actions: &[Direction],
        test_mode: bool,
    ) -> Result<Direction> {
        self.rewards.lock().unwrap().push(reward);
        self.modes.lock().unwrap().push(test_mode);
        Ok(self.reply)
    }
}
