//! Scalar feature extractors for value approximation.
//!
//! Features turn the perceived state into the real-valued inputs of the
//! linear Q approximation. Producing a non-finite value violates the
//! learning contract; the learning core checks and aborts rather than
//! sanitizing.

use crate::{perception::WorldView, types::HUNTED_INDEX};

/// A named scalar function of the perceived state.
///
/// The registered feature list must stay stable in count and order across a
/// run; the weight table's shape is derived from it.
pub trait Feature: Send {
    fn name(&self) -> String;

    fn evaluate(&self, view: &WorldView) -> f64;
}

/// Closeness to the nearest food pellet, in `(0, 1]`; zero without food.
#[derive(Debug, Clone, Copy, Default)]
pub struct FoodDistanceFeature;

impl Feature for FoodDistanceFeature {
    fn name(&self) -> String {
        "food_distance".to_string()
    }

    fn evaluate(&self, view: &WorldView) -> f64 {
        let Some(own) = view.own_position() else {
            return 0.0;
        };
        match view.nearest_food(own) {
            Some(food) => 1.0 / (1.0 + own.manhattan(food) as f64),
            None => 0.0,
        }
    }
}

/// Closeness to one specific enemy agent, in `(0, 1]`; zero when unseen.
#[derive(Debug, Clone, Copy)]
pub struct EnemyDistanceFeature {
    enemy_id: usize,
}

impl EnemyDistanceFeature {
    pub fn new(enemy_id: usize) -> Self {
        Self { enemy_id }
    }
}

impl Feature for EnemyDistanceFeature {
    fn name(&self) -> String {
        format!("enemy_distance[{}]", self.enemy_id)
    }

    fn evaluate(&self, view: &WorldView) -> f64 {
        let Some(own) = view.own_position() else {
            return 0.0;
        };
        match view.position_of(self.enemy_id) {
            Some(enemy) => 1.0 / (1.0 + own.manhattan(enemy) as f64),
            None => 0.0,
        }
    }
}

/// Fragility indicator for one agent: exactly 1.0 while its scared timer
/// runs, else exactly 0.0.
#[derive(Debug, Clone, Copy)]
pub struct FragileAgentFeature {
    agent_id: usize,
}

impl FragileAgentFeature {
    pub fn new(agent_id: usize) -> Self {
        Self { agent_id }
    }
}

impl Feature for FragileAgentFeature {
    fn name(&self) -> String {
        format!("fragile_agent[{}]", self.agent_id)
    }

    fn evaluate(&self, view: &WorldView) -> f64 {
        view.fragile(self.agent_id)
    }
}

/// The feature set wired for an agent: food distance, one enemy-distance
/// entry per enemy, and one fragility flag per agent in the game.
pub fn role_features(agent_id: usize, ally_ids: &[usize], enemy_ids: &[usize]) -> Vec<Box<dyn Feature>> {
    let mut features: Vec<Box<dyn Feature>> = vec![Box::new(FoodDistanceFeature)];
    for &enemy_id in enemy_ids {
        features.push(Box::new(EnemyDistanceFeature::new(enemy_id)));
    }
    for &id in std::iter::once(&agent_id).chain(ally_ids).chain(enemy_ids) {
        features.push(Box::new(FragileAgentFeature::new(id)));
    }
    features
}

/// Enemy indices for an agent in a game with `hunters` hunter agents.
pub fn role_enemies(agent_id: usize, hunters: usize) -> Vec<usize> {
    if agent_id == HUNTED_INDEX {
        (1..=hunters).collect()
    } else {
        vec![HUNTED_INDEX]
    }
}

/// Ally indices for an agent in a game with `hunters` hunter agents.
pub fn role_allies(agent_id: usize, hunters: usize) -> Vec<usize> {
    if agent_id == HUNTED_INDEX {
        Vec::new()
    } else {
        (1..=hunters).filter(|&id| id != agent_id).collect()
    }
}
