//! Q-learning with linear function approximation.
//!
//! The state space is implicit: a state is only ever seen through the
//! registered feature extractors, and `Q(s, a) = Σ_i w[a][i] · f_i(s)` is
//! evaluated on demand, never materialized as a table.

use std::{collections::BTreeMap, fs::File, path::Path};

use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    features::Feature,
    perception::WorldView,
};

/// Exported weight vector: behavior name to one coefficient per feature.
///
/// Export and import are all-or-nothing; there is no partial transfer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Policy {
    pub weights: BTreeMap<String, Vec<f64>>,
}

impl Policy {
    /// Write the policy as pretty-printed JSON.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(&path).map_err(|source| Error::Io {
            operation: format!("create policy file {:?}", path.as_ref()),
            source,
        })?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    /// Read a policy previously written by [`save`](Self::save).
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(&path).map_err(|source| Error::Io {
            operation: format!("open policy file {:?}", path.as_ref()),
            source,
        })?;
        let policy = serde_json::from_reader(file)?;
        Ok(policy)
    }
}

/// ε-greedy Q-learning over a fixed behavior set.
///
/// Behaviors are identified by index into the fixed, ordered name list the
/// core was constructed with; the caller dispatches the chosen index to the
/// matching behavior object. The weight table is owned exclusively by this
/// instance and mutated only by [`learn`](Self::learn) and
/// [`set_policy`](Self::set_policy).
pub struct ApproximateQLearning {
    behavior_names: Vec<String>,
    features: Vec<Box<dyn Feature>>,
    weights: Vec<Vec<f64>>,
    learning_rate: f64,
    discount_factor: f64,
    exploration_rate: f64,
    previous_features: Option<Vec<f64>>,
    rng: StdRng,
}

impl ApproximateQLearning {
    /// Create a core with zeroed weights.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] for an empty behavior or
    /// feature set, or rates outside their domains.
    pub fn new(
        behavior_names: Vec<String>,
        features: Vec<Box<dyn Feature>>,
        learning_rate: f64,
        discount_factor: f64,
        exploration_rate: f64,
    ) -> Result<Self> {
        if behavior_names.is_empty() {
            return Err(Error::InvalidConfiguration {
                message: "behavior set must not be empty".to_string(),
            });
        }
        if features.is_empty() {
            return Err(Error::InvalidConfiguration {
                message: "feature set must not be empty".to_string(),
            });
        }
        for (value, name) in [
            (learning_rate, "learning rate"),
            (discount_factor, "discount factor"),
            (exploration_rate, "exploration rate"),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::InvalidConfiguration {
                    message: format!("{name} {value} must be finite and non-negative"),
                });
            }
        }
        if exploration_rate > 1.0 {
            return Err(Error::InvalidConfiguration {
                message: format!("exploration rate {exploration_rate} must not exceed 1.0"),
            });
        }

        let weights = vec![vec![0.0; features.len()]; behavior_names.len()];
        Ok(Self {
            behavior_names,
            features,
            weights,
            learning_rate,
            discount_factor,
            exploration_rate,
            previous_features: None,
            rng: StdRng::from_rng(&mut rand::rng()),
        })
    }

    /// Seed the exploration RNG for reproducible runs.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn behavior_count(&self) -> usize {
        self.behavior_names.len()
    }

    pub fn feature_count(&self) -> usize {
        self.features.len()
    }

    pub fn exploration_rate(&self) -> f64 {
        self.exploration_rate
    }

    /// Force the exploration rate; zero disables exploration entirely.
    pub fn set_exploration_rate(&mut self, rate: f64) {
        self.exploration_rate = rate;
    }

    /// Set the step size; the caller owns the annealing schedule.
    pub fn set_learning_rate(&mut self, rate: f64) {
        self.learning_rate = rate;
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    /// Evaluate all registered features against a view.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NonFiniteFeature`] if any extractor violates the
    /// numeric contract; values are never sanitized.
    fn feature_vector(&self, view: &WorldView) -> Result<Vec<f64>> {
        let mut values = Vec::with_capacity(self.features.len());
        for feature in &self.features {
            let value = feature.evaluate(view);
            if !value.is_finite() {
                return Err(Error::NonFiniteFeature {
                    name: feature.name(),
                    value,
                });
            }
            values.push(value);
        }
        Ok(values)
    }

    fn q_value(&self, behavior: usize, features: &[f64]) -> f64 {
        self.weights[behavior]
            .iter()
            .zip(features)
            .map(|(w, f)| w * f)
            .sum()
    }

    fn max_q(&self, features: &[f64]) -> f64 {
        (0..self.behavior_names.len())
            .map(|behavior| self.q_value(behavior, features))
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Greedy behavior index; ties break to the earliest behavior in the
    /// fixed ordering, never randomly, so evaluation stays reproducible.
    fn greedy_behavior(&self, features: &[f64]) -> usize {
        let mut best = 0;
        let mut best_q = self.q_value(0, features);
        for behavior in 1..self.behavior_names.len() {
            let q = self.q_value(behavior, features);
            if q > best_q {
                best = behavior;
                best_q = q;
            }
        }
        best
    }

    /// ε-greedy behavior selection for the current state.
    pub fn act(&mut self, view: &WorldView) -> Result<usize> {
        let features = self.feature_vector(view)?;
        if self.exploration_rate > 0.0 && self.rng.random::<f64>() < self.exploration_rate {
            Ok(self.rng.random_range(0..self.behavior_names.len()))
        } else {
            Ok(self.greedy_behavior(&features))
        }
    }

    /// One-step TD update for the transition into `view`.
    ///
    /// Uses the cached feature vector of the previous decision state; the
    /// first call only seeds that cache. `previous_behavior` is the behavior
    /// chosen on the previous step.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NonFiniteReward`] or [`Error::NonFiniteFeature`] on
    /// a numeric contract violation; the weight table is left untouched.
    pub fn learn(&mut self, view: &WorldView, previous_behavior: usize, reward: f64) -> Result<()> {
        if !reward.is_finite() {
            return Err(Error::NonFiniteReward { value: reward });
        }
        let current = self.feature_vector(view)?;

        if let Some(previous) = self.previous_features.take() {
            let td_target = reward + self.discount_factor * self.max_q(&current);
            let td_error = td_target - self.q_value(previous_behavior, &previous);
            let step = self.learning_rate * td_error;
            for (weight, feature) in self.weights[previous_behavior].iter_mut().zip(&previous) {
                *weight += step * feature;
            }
        }

        self.previous_features = Some(current);
        Ok(())
    }

    /// Export the whole weight table.
    pub fn get_policy(&self) -> Policy {
        let weights = self
            .behavior_names
            .iter()
            .cloned()
            .zip(self.weights.iter().cloned())
            .collect();
        Policy { weights }
    }

    /// Import a whole weight table, replacing the current one.
    ///
    /// # Errors
    ///
    /// Rejects unknown behavior names, missing behaviors, and per-behavior
    /// weight vectors whose length does not match the feature count. The
    /// current table is untouched on error.
    pub fn set_policy(&mut self, policy: &Policy) -> Result<()> {
        if policy.weights.len() != self.behavior_names.len() {
            return Err(Error::InvalidConfiguration {
                message: format!(
                    "policy covers {} behaviors, expected {}",
                    policy.weights.len(),
                    self.behavior_names.len()
                ),
            });
        }
        let mut incoming = vec![Vec::new(); self.behavior_names.len()];
        for (name, weights) in &policy.weights {
            let index = self
                .behavior_names
                .iter()
                .position(|n| n == name)
                .ok_or_else(|| Error::UnknownBehavior { name: name.clone() })?;
            if weights.len() != self.features.len() {
                return Err(Error::WeightCountMismatch {
                    behavior: name.clone(),
                    expected: self.features.len(),
                    got: weights.len(),
                });
            }
            incoming[index] = weights.clone();
        }
        self.weights = incoming;
        Ok(())
    }
}
