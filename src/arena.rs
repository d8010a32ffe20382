//! Reference arena environment.
//!
//! A deliberately small pursuit arena implementing [`EnvironmentState`]:
//! bordered grid, food pellets, one power capsule, a capture rule, and a
//! score. It exists so the simulation runner, the CLI, and the integration
//! tests can drive the control loop end-to-end; it is not a game engine.

use crate::{
    environment::{BoolGrid, EnvironmentState, Layout},
    types::{Direction, HUNTED_ACTIONS, HUNTED_INDEX, HUNTER_ACTIONS},
};

const FOOD_SCORE: f64 = 10.0;
const TIME_PENALTY: f64 = 1.0;
const CAPTURE_SCORE: f64 = 500.0;
const FRAGILE_CAPTURE_SCORE: f64 = 200.0;
const CLEAR_BONUS: f64 = 500.0;
const SCARED_TICKS: u32 = 40;

#[derive(Debug)]
pub struct Arena {
    walls: BoolGrid,
    food: BoolGrid,
    capsule: Option<(i32, i32)>,
    positions: Vec<(i32, i32)>,
    spawns: Vec<(i32, i32)>,
    scared: Vec<u32>,
    score: f64,
    finished: bool,
}

impl Arena {
    /// Build an arena with a wall border, food on alternating interior
    /// cells, one capsule, the hunted agent in one corner, and hunters
    /// spread across the others.
    pub fn new(width: i32, height: i32, hunters: usize) -> Self {
        assert!(width >= 5 && height >= 5, "arena must be at least 5x5");

        let mut walls = BoolGrid::new(width, height);
        for x in 0..width {
            walls.set(x, 0, true);
            walls.set(x, height - 1, true);
        }
        for y in 0..height {
            walls.set(0, y, true);
            walls.set(width - 1, y, true);
        }

        let hunted_spawn = (1, 1);
        let corner_spawns = [
            (width - 2, height - 2),
            (1, height - 2),
            (width - 2, 1),
        ];
        let mut spawns = vec![hunted_spawn];
        for i in 0..hunters {
            spawns.push(corner_spawns[i % corner_spawns.len()]);
        }

        let capsule = Some((width / 2, height / 2));

        let mut food = BoolGrid::new(width, height);
        for x in 1..width - 1 {
            for y in 1..height - 1 {
                let cell = (x, y);
                if (x + y) % 2 == 0 && !spawns.contains(&cell) && capsule != Some(cell) {
                    food.set(x, y, true);
                }
            }
        }

        Self {
            walls,
            food,
            capsule,
            positions: spawns.clone(),
            spawns,
            scared: vec![0; hunters + 1],
            score: 0.0,
            finished: false,
        }
    }

    pub fn layout(&self) -> Layout {
        Layout {
            width: self.walls.width(),
            height: self.walls.height(),
        }
    }

    pub fn finished(&self) -> bool {
        self.finished
    }

    pub fn food_remaining(&self) -> usize {
        self.food.count()
    }

    /// Apply one agent's move and settle its consequences.
    ///
    /// Moves into walls are ignored; the adapters only hand over legal
    /// actions, so a blocked move here means the caller skipped them.
    pub fn apply(&mut self, agent_id: usize, direction: Direction) {
        if self.finished {
            return;
        }

        let (x, y) = self.positions[agent_id];
        let (dr, dc) = direction.delta();
        // Native coordinates: column is x, row is y.
        let target = (x + dc, y + dr);
        if self.walls.contains(target.0, target.1) && !self.walls.get(target.0, target.1) {
            self.positions[agent_id] = target;
        }

        if agent_id == HUNTED_INDEX {
            self.score -= TIME_PENALTY;
            let (x, y) = self.positions[HUNTED_INDEX];
            if self.food.get(x, y) {
                self.food.set(x, y, false);
                self.score += FOOD_SCORE;
            }
            if self.capsule == Some((x, y)) {
                self.capsule = None;
                for timer in self.scared.iter_mut().skip(1) {
                    *timer = SCARED_TICKS;
                }
            }
            for timer in self.scared.iter_mut().skip(1) {
                *timer = timer.saturating_sub(1);
            }
        }

        self.settle_captures();

        if !self.finished && self.food.count() == 0 {
            self.score += CLEAR_BONUS;
            self.finished = true;
        }
    }

    fn settle_captures(&mut self) {
        let hunted = self.positions[HUNTED_INDEX];
        for hunter in 1..self.positions.len() {
            if self.positions[hunter] != hunted {
                continue;
            }
            if self.scared[hunter] > 0 {
                // Fragile hunter is eaten and respawns.
                self.score += FRAGILE_CAPTURE_SCORE;
                self.positions[hunter] = self.spawns[hunter];
                self.scared[hunter] = 0;
            } else {
                self.score -= CAPTURE_SCORE;
                self.finished = true;
                return;
            }
        }
    }
}

impl EnvironmentState for Arena {
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
        let catalog: &[Direction] = if agent_id == HUNTED_INDEX {
            &HUNTED_ACTIONS
        } else {
            &HUNTER_ACTIONS
        };
        let (x, y) = self.positions[agent_id];
        catalog
            .iter()
            .copied()
            .filter(|dir| {
                let (dr, dc) = dir.delta();
                !self.walls.get(x + dc, y + dr)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn border_limits_legal_actions() {
        let arena = Arena::new(7, 7, 1);
        // Hunted starts at (1, 1): west and south are border walls.
        let legal = arena.legal_actions(HUNTED_INDEX);
        assert!(legal.contains(&Direction::North));
        assert!(legal.contains(&Direction::East));
        assert!(legal.contains(&Direction::Stop));
        assert!(!legal.contains(&Direction::South));
        assert!(!legal.contains(&Direction::West));
    }

    #[test]
    fn eating_food_raises_the_score() {
        let mut arena = Arena::new(7, 7, 1);
        let before_food = arena.food_remaining();
        // Two steps north from the spawn: (1, 2) is empty, (1, 3) holds food.
        arena.apply(HUNTED_INDEX, Direction::North);
        arena.apply(HUNTED_INDEX, Direction::North);
        assert_eq!(arena.food_remaining(), before_food - 1);
        assert_eq!(arena.score(), FOOD_SCORE - 2.0 * TIME_PENALTY);
    }

    #[test]
    fn capture_ends_the_episode() {
        let mut arena = Arena::new(7, 7, 1);
        arena.positions[1] = (1, 2);
        arena.apply(1, Direction::South); // hunter moves onto the hunted
        assert!(arena.finished());
        assert_eq!(arena.score(), -CAPTURE_SCORE);
    }

    #[test]
    fn capsule_makes_hunters_fragile() {
        let mut arena = Arena::new(7, 7, 2);
        arena.positions[HUNTED_INDEX] = (3, 2);
        arena.apply(HUNTED_INDEX, Direction::North); // onto the capsule at (3, 3)
        assert!(arena.scared_timer(1) > 0);
        assert!(arena.scared_timer(2) > 0);
        assert_eq!(arena.scared_timer(HUNTED_INDEX), 0);
    }

    #[test]
    fn fragile_hunter_respawns_when_caught() {
        let mut arena = Arena::new(7, 7, 1);
        arena.scared[1] = 5;
        arena.positions[1] = (1, 2);
        let before = arena.score();
        arena.apply(1, Direction::South);
        assert!(!arena.finished());
        assert_eq!(arena.positions[1], arena.spawns[1]);
        assert_eq!(arena.score(), before + FRAGILE_CAPTURE_SCORE);
    }
}
