//! Environment collaborator interface.
//!
//! The game engine lives outside this crate; the proxy only needs the
//! observations enumerated here, in the engine's native `(x, y)` vocabulary.
//! The [`StateEncoder`](crate::encoder::StateEncoder) performs the one-time
//! axis swap and noise injection when these observations go on the wire.

use serde::{Deserialize, Serialize};

use crate::types::Direction;

/// A dense boolean grid indexed by native `(x, y)` coordinates.
///
/// Used for both the food layout and the wall layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoolGrid {
    width: i32,
    height: i32,
    cells: Vec<bool>,
}

impl BoolGrid {
    /// Create an all-false grid.
    pub fn new(width: i32, height: i32) -> Self {
        assert!(width > 0 && height > 0, "grid dimensions must be positive");
        Self {
            width,
            height,
            cells: vec![false; (width * height) as usize],
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// Whether `(x, y)` is inside the grid.
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.width && y >= 0 && y < self.height
    }

    /// Value at `(x, y)`; out-of-bounds reads as false.
    pub fn get(&self, x: i32, y: i32) -> bool {
        self.contains(x, y) && self.cells[(y * self.width + x) as usize]
    }

    pub fn set(&mut self, x: i32, y: i32, value: bool) {
        assert!(self.contains(x, y), "grid write out of bounds");
        self.cells[(y * self.width + x) as usize] = value;
    }

    /// Iterate over all `(x, y)` cells that are set.
    pub fn set_cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        (0..self.height)
            .flat_map(move |y| (0..self.width).map(move |x| (x, y)))
            .filter(|&(x, y)| self.get(x, y))
    }

    /// Count of set cells.
    pub fn count(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }
}

/// Map dimensions exchanged in the game-start handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layout {
    pub width: i32,
    pub height: i32,
}

/// Read access to one step's environment snapshot.
///
/// Supplied by the environment collaborator per decision step; every method
/// speaks the environment's native coordinate and action vocabulary.
pub trait EnvironmentState {
    /// Current game score.
    fn score(&self) -> f64;

    /// Total number of live agents, hunted agent included.
    fn agent_count(&self) -> usize;

    /// Native `(x, y)` position of the given agent.
    fn agent_position(&self, agent_id: usize) -> (i32, i32);

    /// The food layout.
    fn food(&self) -> &BoolGrid;

    /// The wall layout.
    fn walls(&self) -> &BoolGrid;

    /// Remaining scared ticks for the given agent; zero means not fragile.
    fn scared_timer(&self, agent_id: usize) -> u32;

    /// Actions currently legal for the given agent.
    fn legal_actions(&self, agent_id: usize) -> Vec<Direction>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_roundtrip() {
        let mut grid = BoolGrid::new(4, 3);
        grid.set(1, 2, true);
        grid.set(3, 0, true);
        assert!(grid.get(1, 2));
        assert!(!grid.get(0, 0));
        assert!(!grid.get(7, 7));
        assert_eq!(grid.count(), 2);
        let cells: Vec<_> = grid.set_cells().collect();
        assert_eq!(cells, vec![(3, 0), (1, 2)]);
    }
}
