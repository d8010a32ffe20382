//! Bounded symmetric noise for opponent observations.

use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::types::Position;

/// Uniform integer noise on the closed interval `[-bound, bound]`.
///
/// Applied independently to each coordinate axis of every opponent's
/// reported position, never to the reporting agent's own position. A bound
/// of zero is the identity, so evaluation runs stay exact.
#[derive(Debug)]
pub struct PositionNoise {
    bound: i32,
    rng: StdRng,
}

impl PositionNoise {
    /// Create a noise source with the given bound.
    pub fn new(bound: i32) -> Self {
        Self::with_rng(bound, StdRng::from_rng(&mut rand::rng()))
    }

    /// Create a seeded noise source for reproducible runs.
    pub fn seeded(bound: i32, seed: u64) -> Self {
        Self::with_rng(bound, StdRng::seed_from_u64(seed))
    }

    fn with_rng(bound: i32, rng: StdRng) -> Self {
        assert!(bound >= 0, "noise bound must be non-negative");
        Self { bound, rng }
    }

    pub fn bound(&self) -> i32 {
        self.bound
    }

    /// One offset draw from `[-bound, bound]`.
    pub fn offset(&mut self) -> i32 {
        if self.bound == 0 {
            0
        } else {
            self.rng.random_range(-self.bound..=self.bound)
        }
    }

    /// Perturb both axes of a position independently.
    pub fn apply(&mut self, pos: Position) -> Position {
        Position {
            row: pos.row + self.offset(),
            col: pos.col + self.offset(),
        }
    }
}
