//! Decision-process agents.
//!
//! Every agent implements [`DecisionAgent`]: one call per received state,
//! returning the primitive action to place in the reply. The behavior
//! learner is the centerpiece; the scripted agents are pluggable baselines.

use std::collections::{BTreeMap, HashMap, VecDeque};

use rand::{SeedableRng, rngs::StdRng, seq::IndexedRandom};

use crate::{
    behaviors::{
        Behavior, EatBehavior, FleeBehavior, PursueBehavior, SeekBehavior, resolve_suggestion,
    },
    error::Result,
    features::{role_allies, role_enemies, role_features},
    learning::{ApproximateQLearning, Policy},
    perception::WorldView,
    types::{Direction, HUNTER_ACTIONS, HUNTED_INDEX, Position},
};

/// Learning-rate schedule constant: step size is `K / (K + iteration)`.
const K: f64 = 1.0;
const DISCOUNT_FACTOR: f64 = 0.9;
const INITIAL_LEARNING_RATE: f64 = 0.1;
const EXPLORATION_RATE: f64 = 0.1;

/// A per-agent decision policy living in the decision process.
pub trait DecisionAgent: Send {
    fn name(&self) -> &str;

    /// Select the action for the state currently held by `view`.
    ///
    /// `executed_action` and `reward` describe the transition into that
    /// state; `test_mode` selects between learning and evaluating.
    fn choose_action(
        &mut self,
        view: &WorldView,
        executed_action: Direction,
        reward: f64,
        legal_actions: &[Direction],
        test_mode: bool,
    ) -> Result<Direction>;

    /// Export the learned weight vector, if this agent has one.
    fn policy(&self) -> Option<Policy> {
        None
    }

    /// Import a weight vector. Non-learning agents accept and ignore it.
    fn set_policy(&mut self, _policy: &Policy) -> Result<()> {
        Ok(())
    }

    /// Behavior usage counters, if this agent dispatches behaviors.
    fn behavior_usage(&self) -> Option<BTreeMap<String, u64>> {
        None
    }
}

/// The online behavior learner: ε-greedy approximate Q-learning over a
/// role-specific macro-behavior set.
pub struct BehaviorLearningAgent {
    label: String,
    behaviors: Vec<Box<dyn Behavior>>,
    learning: ApproximateQLearning,
    exploration_rate: f64,
    previous_behavior: usize,
    behavior_usage: BTreeMap<String, u64>,
    test_mode: bool,
    rng: StdRng,
}

impl BehaviorLearningAgent {
    /// Learner for the hunted role: all four behaviors, enemies are the
    /// hunters.
    pub fn hunted(hunters: usize) -> Result<Self> {
        let behaviors: Vec<Box<dyn Behavior>> = vec![
            Box::new(EatBehavior),
            Box::new(FleeBehavior),
            Box::new(SeekBehavior),
            Box::new(PursueBehavior),
        ];
        Self::with_behaviors("hunted-learner", HUNTED_INDEX, hunters, behaviors)
    }

    /// Learner for a hunter role: no eat behavior, the hunted is the enemy.
    pub fn hunter(agent_id: usize, hunters: usize) -> Result<Self> {
        let behaviors: Vec<Box<dyn Behavior>> = vec![
            Box::new(FleeBehavior),
            Box::new(SeekBehavior),
            Box::new(PursueBehavior),
        ];
        Self::with_behaviors(&format!("hunter-learner-{agent_id}"), agent_id, hunters, behaviors)
    }

    fn with_behaviors(
        label: &str,
        agent_id: usize,
        hunters: usize,
        behaviors: Vec<Box<dyn Behavior>>,
    ) -> Result<Self> {
        let enemies = role_enemies(agent_id, hunters);
        let allies = role_allies(agent_id, hunters);
        let features = role_features(agent_id, &allies, &enemies);
        let behavior_names: Vec<String> =
            behaviors.iter().map(|b| b.name().to_string()).collect();
        let behavior_usage = behavior_names.iter().map(|n| (n.clone(), 0)).collect();

        let learning = ApproximateQLearning::new(
            behavior_names,
            features,
            INITIAL_LEARNING_RATE,
            DISCOUNT_FACTOR,
            EXPLORATION_RATE,
        )?;

        Ok(Self {
            label: label.to_string(),
            behaviors,
            learning,
            exploration_rate: EXPLORATION_RATE,
            previous_behavior: 0,
            behavior_usage,
            test_mode: false,
            rng: StdRng::from_rng(&mut rand::rng()),
        })
    }

    /// Seed both the exploration and fallback RNGs for reproducible runs.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.learning = self.learning.with_seed(seed);
        self.rng = StdRng::seed_from_u64(seed.wrapping_add(1));
        self
    }

    /// Step size currently in effect (schedule-annealed).
    pub fn current_learning_rate(&self) -> f64 {
        self.learning.learning_rate()
    }

    /// Disable exploration and weight updates.
    fn enable_test_mode(&mut self) {
        self.test_mode = true;
        self.learning.set_exploration_rate(0.0);
    }

    /// Restore exploration and weight updates.
    fn enable_learn_mode(&mut self) {
        self.test_mode = false;
        self.learning.set_exploration_rate(self.exploration_rate);
    }
}

impl DecisionAgent for BehaviorLearningAgent {
    fn name(&self) -> &str {
        &self.label
    }

    fn choose_action(
        &mut self,
        view: &WorldView,
        _executed_action: Direction,
        reward: f64,
        legal_actions: &[Direction],
        test_mode: bool,
    ) -> Result<Direction> {
        if test_mode {
            self.enable_test_mode();
        } else {
            self.enable_learn_mode();
        }

        if !self.test_mode {
            self.learning
                .set_learning_rate(K / (K + view.iteration() as f64));
            self.learning.learn(view, self.previous_behavior, reward)?;
        }

        let behavior = self.learning.act(view)?;
        self.previous_behavior = behavior;
        let suggestion = self.behaviors[behavior].suggest(view, legal_actions);

        *self
            .behavior_usage
            .entry(self.behaviors[behavior].name().to_string())
            .or_default() += 1;

        Ok(resolve_suggestion(suggestion, legal_actions, &mut self.rng))
    }

    fn policy(&self) -> Option<Policy> {
        Some(self.learning.get_policy())
    }

    fn set_policy(&mut self, policy: &Policy) -> Result<()> {
        self.learning.set_policy(policy)
    }

    fn behavior_usage(&self) -> Option<BTreeMap<String, u64>> {
        Some(self.behavior_usage.clone())
    }
}

/// Uniform random choice among the legal actions.
pub struct RandomAgent {
    rng: StdRng,
}

impl RandomAgent {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_rng(&mut rand::rng()),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomAgent {
    fn default() -> Self {
        Self::new()
    }
}

impl DecisionAgent for RandomAgent {
    fn name(&self) -> &str {
        "random"
    }

    fn choose_action(
        &mut self,
        _view: &WorldView,
        _executed_action: Direction,
        _reward: f64,
        legal_actions: &[Direction],
        _test_mode: bool,
    ) -> Result<Direction> {
        Ok(legal_actions
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(Direction::Stop))
    }
}

/// Greedy eater: the eat behavior alone, no learning.
pub struct EaterAgent {
    behavior: EatBehavior,
    rng: StdRng,
}

impl EaterAgent {
    pub fn new() -> Self {
        Self {
            behavior: EatBehavior,
            rng: StdRng::from_rng(&mut rand::rng()),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            behavior: EatBehavior,
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for EaterAgent {
    fn default() -> Self {
        Self::new()
    }
}

impl DecisionAgent for EaterAgent {
    fn name(&self) -> &str {
        "eater"
    }

    fn choose_action(
        &mut self,
        view: &WorldView,
        _executed_action: Direction,
        _reward: f64,
        legal_actions: &[Direction],
        _test_mode: bool,
    ) -> Result<Direction> {
        let suggestion = self.behavior.suggest(view, legal_actions);
        Ok(resolve_suggestion(suggestion, legal_actions, &mut self.rng))
    }
}

/// Breadth-first shortest path to the nearest reachable food pellet.
///
/// The one search-based policy in the catalog; it plans a full path over
/// the known wall layout and emits the first step, standing still when no
/// food is reachable.
pub struct FoodSearchAgent {
    rng: StdRng,
}

impl FoodSearchAgent {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_rng(&mut rand::rng()),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn first_step_to_food(view: &WorldView) -> Option<Direction> {
        let start = view.own_position()?;
        let in_bounds = |pos: Position| {
            view.width() <= 0
                || (pos.row >= 0 && pos.row < view.height() && pos.col >= 0 && pos.col < view.width())
        };

        let mut first_step: HashMap<Position, Direction> = HashMap::new();
        let mut queue = VecDeque::from([start]);
        while let Some(current) = queue.pop_front() {
            if current != start && view.food_positions().any(|food| food == current) {
                return first_step.get(&current).copied();
            }
            for dir in HUNTER_ACTIONS {
                let next = current.step(dir);
                if !in_bounds(next) || view.is_wall(next) || next == start {
                    continue;
                }
                if first_step.contains_key(&next) {
                    continue;
                }
                let step = *first_step.get(&current).unwrap_or(&dir);
                first_step.insert(next, step);
                queue.push_back(next);
            }
        }
        None
    }
}

impl Default for FoodSearchAgent {
    fn default() -> Self {
        Self::new()
    }
}

impl DecisionAgent for FoodSearchAgent {
    fn name(&self) -> &str {
        "food-search"
    }

    fn choose_action(
        &mut self,
        view: &WorldView,
        _executed_action: Direction,
        _reward: f64,
        legal_actions: &[Direction],
        _test_mode: bool,
    ) -> Result<Direction> {
        let suggestion = Self::first_step_to_food(view).unwrap_or(Direction::Stop);
        Ok(resolve_suggestion(suggestion, legal_actions, &mut self.rng))
    }
}
