//! Core value types: directions and board positions.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Index of the hunted agent; hunters occupy indices 1 and upward.
pub const HUNTED_INDEX: usize = 0;

/// The four moves plus standing still.
///
/// `Stop` is part of the hunted agent's action catalog only; hunters must
/// keep moving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    North,
    South,
    East,
    West,
    Stop,
}

/// Actions available to hunter agents.
pub const HUNTER_ACTIONS: [Direction; 4] = [
    Direction::North,
    Direction::South,
    Direction::East,
    Direction::West,
];

/// Actions available to the hunted agent.
pub const HUNTED_ACTIONS: [Direction; 5] = [
    Direction::North,
    Direction::South,
    Direction::East,
    Direction::West,
    Direction::Stop,
];

impl Direction {
    /// Offset in `(row, col)` board coordinates. North increases row.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::North => (1, 0),
            Direction::South => (-1, 0),
            Direction::East => (0, 1),
            Direction::West => (0, -1),
            Direction::Stop => (0, 0),
        }
    }

    /// The reverse move; `Stop` is its own opposite.
    pub fn opposite(self) -> Self {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
            Direction::Stop => Direction::Stop,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::North => "North",
            Direction::South => "South",
            Direction::East => "East",
            Direction::West => "West",
            Direction::Stop => "Stop",
        };
        write!(f, "{name}")
    }
}

/// A board position in `(row, column)` coordinates.
///
/// The environment speaks `(x, y)`; the wire format stores positions with
/// the axes swapped. [`Position::from_env`] performs that swap and is the
/// only sanctioned conversion; both endpoints rely on it bit-for-bit.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub struct Position {
    pub row: i32,
    pub col: i32,
}

impl Position {
    /// Create a position directly from board coordinates.
    pub fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// Convert from the environment's native `(x, y)` coordinates.
    pub fn from_env(x: i32, y: i32) -> Self {
        Self { row: y, col: x }
    }

    /// The neighboring position one step in `direction`.
    pub fn step(self, direction: Direction) -> Self {
        let (dr, dc) = direction.delta();
        Self {
            row: self.row + dr,
            col: self.col + dc,
        }
    }

    /// Manhattan distance to `other`.
    pub fn manhattan(self, other: Self) -> i32 {
        (self.row - other.row).abs() + (self.col - other.col).abs()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}
