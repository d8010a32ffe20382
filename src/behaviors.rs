//! Macro-behaviors and suggestion dispatch.
//!
//! A behavior maps the perceived state to one suggested primitive action.
//! Suggestions need not be legal; every consumer routes them through
//! [`resolve_suggestion`], which keeps behavior authors out of the legality
//! bookkeeping entirely.

use rand::{rngs::StdRng, seq::IndexedRandom};

use crate::{
    perception::WorldView,
    types::{Direction, HUNTER_ACTIONS, Position},
};

/// A macro-behavior: state plus legal actions in, one suggested move out.
///
/// Implementations are deterministic given the view. The name identifies the
/// behavior for usage accounting.
pub trait Behavior: Send {
    fn name(&self) -> &str;

    fn suggest(&self, view: &WorldView, legal_actions: &[Direction]) -> Direction;
}

/// Uniform fallback applied to every behavior suggestion.
///
/// Three tiers: a legal suggestion passes through; with no legal actions the
/// agent stands still; otherwise a uniformly random legal action is taken.
pub fn resolve_suggestion(
    suggestion: Direction,
    legal_actions: &[Direction],
    rng: &mut StdRng,
) -> Direction {
    if legal_actions.contains(&suggestion) {
        suggestion
    } else if legal_actions.is_empty() {
        Direction::Stop
    } else {
        *legal_actions.choose(rng).expect("legal actions non-empty")
    }
}

/// Move that brings `from` closest to `target`, avoiding known walls.
///
/// Ties resolve by the fixed North/South/East/West ordering so repeated
/// evaluation of the same view is stable.
fn step_toward(view: &WorldView, from: Position, target: Position) -> Direction {
    best_step(view, from, target, false)
}

/// Move that takes `from` farthest from `target`, avoiding known walls.
fn step_away(view: &WorldView, from: Position, target: Position) -> Direction {
    best_step(view, from, target, true)
}

fn best_step(view: &WorldView, from: Position, target: Position, away: bool) -> Direction {
    let mut best = Direction::Stop;
    let mut best_dist: Option<i32> = None;
    for dir in HUNTER_ACTIONS {
        let next = from.step(dir);
        if view.is_wall(next) {
            continue;
        }
        let dist = next.manhattan(target);
        let better = match best_dist {
            None => true,
            Some(current) => {
                if away {
                    dist > current
                } else {
                    dist < current
                }
            }
        };
        if better {
            best = dir;
            best_dist = Some(dist);
        }
    }
    best
}

/// Head for the nearest food pellet.
#[derive(Debug, Clone, Copy, Default)]
pub struct EatBehavior;

impl Behavior for EatBehavior {
    fn name(&self) -> &str {
        "eat"
    }

    fn suggest(&self, view: &WorldView, _legal_actions: &[Direction]) -> Direction {
        let Some(own) = view.own_position() else {
            return Direction::Stop;
        };
        match view.nearest_food(own) {
            Some(food) => step_toward(view, own, food),
            None => Direction::Stop,
        }
    }
}

/// Put distance between this agent and the nearest enemy.
#[derive(Debug, Clone, Copy, Default)]
pub struct FleeBehavior;

impl Behavior for FleeBehavior {
    fn name(&self) -> &str {
        "flee"
    }

    fn suggest(&self, view: &WorldView, _legal_actions: &[Direction]) -> Direction {
        let Some(own) = view.own_position() else {
            return Direction::Stop;
        };
        match view.nearest_enemy(own) {
            Some((_, enemy)) => step_away(view, own, enemy),
            None => Direction::Stop,
        }
    }
}

/// Close in on the nearest enemy.
#[derive(Debug, Clone, Copy, Default)]
pub struct SeekBehavior;

impl Behavior for SeekBehavior {
    fn name(&self) -> &str {
        "seek"
    }

    fn suggest(&self, view: &WorldView, _legal_actions: &[Direction]) -> Direction {
        let Some(own) = view.own_position() else {
            return Direction::Stop;
        };
        match view.nearest_enemy(own) {
            Some((_, enemy)) => step_toward(view, own, enemy),
            None => Direction::Stop,
        }
    }
}

/// Chase the nearest fragile enemy, falling back to the nearest enemy while
/// nobody is fragile.
#[derive(Debug, Clone, Copy, Default)]
pub struct PursueBehavior;

impl Behavior for PursueBehavior {
    fn name(&self) -> &str {
        "pursue"
    }

    fn suggest(&self, view: &WorldView, _legal_actions: &[Direction]) -> Direction {
        let Some(own) = view.own_position() else {
            return Direction::Stop;
        };
        let target = view
            .nearest_fragile_enemy(own)
            .or_else(|| view.nearest_enemy(own));
        match target {
            Some((_, enemy)) => step_toward(view, own, enemy),
            None => Direction::Stop,
        }
    }
}
