//! Canonical state-message construction.

use std::collections::{BTreeMap, BTreeSet};

use crate::{
    environment::EnvironmentState,
    noise::PositionNoise,
    protocol::StateMessage,
    types::{Direction, HUNTED_INDEX, Position},
};

/// Converts raw environment snapshots into wire-ready [`StateMessage`]s.
///
/// All positions cross the wire axis-swapped via [`Position::from_env`].
/// The hunted agent's position is always reported exactly; every hunter
/// position carries one independent noise draw per axis, modeling imperfect
/// sensing of adversaries without degrading self-localization.
#[derive(Debug)]
pub struct StateEncoder {
    agent_id: usize,
    noise: PositionNoise,
}

impl StateEncoder {
    pub fn new(agent_id: usize, noise: PositionNoise) -> Self {
        Self { agent_id, noise }
    }

    pub fn agent_id(&self) -> usize {
        self.agent_id
    }

    /// Build the state message for one decision step.
    ///
    /// `reward`, `executed_action`, and `test_mode` are bookkeeping owned by
    /// the proxy; everything else is read from the snapshot.
    pub fn encode(
        &mut self,
        state: &dyn EnvironmentState,
        reward: f64,
        executed_action: Direction,
        test_mode: bool,
    ) -> StateMessage {
        let mut agent_positions = BTreeMap::new();
        for id in 0..state.agent_count() {
            let (x, y) = state.agent_position(id);
            let pos = Position::from_env(x, y);
            let reported = if id == HUNTED_INDEX {
                pos
            } else {
                self.noise.apply(pos)
            };
            agent_positions.insert(id, reported);
        }

        let food_positions: BTreeSet<Position> = state
            .food()
            .set_cells()
            .map(|(x, y)| Position::from_env(x, y))
            .collect();

        let wall_positions: BTreeSet<Position> = state
            .walls()
            .set_cells()
            .map(|(x, y)| Position::from_env(x, y))
            .collect();

        let mut fragile_agents = BTreeMap::new();
        for id in 0..state.agent_count() {
            let flag = if state.scared_timer(id) > 0 { 1.0 } else { 0.0 };
            fragile_agents.insert(id, flag);
        }

        StateMessage {
            agent_id: self.agent_id,
            agent_positions,
            food_positions,
            fragile_agents,
            wall_positions,
            legal_actions: state.legal_actions(self.agent_id),
            reward,
            executed_action,
            test_mode,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::BoolGrid;

    struct Snapshot {
        food: BoolGrid,
        walls: BoolGrid,
        positions: Vec<(i32, i32)>,
        scared: Vec<u32>,
    }

    impl EnvironmentState for Snapshot {
        fn score(&self) -> f64 {
            0.0
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

        fn legal_actions(&self, _agent_id: usize) -> Vec<Direction> {
            vec![Direction::North, Direction::Stop]
        }
    }

    fn snapshot() -> Snapshot {
        let mut food = BoolGrid::new(6, 5);
        food.set(2, 3, true);
        let mut walls = BoolGrid::new(6, 5);
        walls.set(5, 1, true);
        Snapshot {
            food,
            walls,
            positions: vec![(1, 2), (4, 4)],
            scared: vec![0, 3],
        }
    }

    #[test]
    fn encode_swaps_axes_everywhere() {
        let state = snapshot();
        let mut encoder = StateEncoder::new(0, PositionNoise::seeded(0, 1));
        let msg = encoder.encode(&state, 0.0, Direction::Stop, false);

        assert_eq!(msg.agent_positions[&0], Position::new(2, 1));
        assert_eq!(msg.agent_positions[&1], Position::new(4, 4));
        assert!(msg.food_positions.contains(&Position::new(3, 2)));
        assert!(msg.wall_positions.contains(&Position::new(1, 5)));
    }

    #[test]
    fn hunted_position_is_exact_under_noise() {
        let state = snapshot();
        let mut encoder = StateEncoder::new(1, PositionNoise::seeded(2, 9));
        for _ in 0..50 {
            let msg = encoder.encode(&state, 0.0, Direction::North, false);
            assert_eq!(msg.agent_positions[&0], Position::new(2, 1));
            let hunter = msg.agent_positions[&1];
            assert!((hunter.row - 4).abs() <= 2);
            assert!((hunter.col - 4).abs() <= 2);
        }
    }

    #[test]
    fn fragile_flags_follow_scared_timers() {
        let state = snapshot();
        let mut encoder = StateEncoder::new(0, PositionNoise::seeded(0, 1));
        let msg = encoder.encode(&state, 0.0, Direction::Stop, false);
        assert_eq!(msg.fragile_agents[&0], 0.0);
        assert_eq!(msg.fragile_agents[&1], 1.0);
    }
}
