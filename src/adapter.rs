//! Environment-side proxy agents.

use rand::{SeedableRng, rngs::StdRng, seq::IndexedRandom};
use serde::{Deserialize, Serialize};

use crate::{
    encoder::StateEncoder,
    environment::{EnvironmentState, Layout},
    error::{Error, Result},
    noise::PositionNoise,
    protocol::{ActionReply, GameStartMessage, Message, Messenger, StateMessage},
    types::{Direction, HUNTED_INDEX},
};

/// Role-specific reward sign.
///
/// One capability with a selectable sign, not a class per role: the hunted
/// agent is rewarded when the score rises, hunters when it falls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewardPolicy {
    /// Reward is `current_score - previous_score`.
    ScoreGain,
    /// Reward is `previous_score - current_score`.
    ScoreLoss,
}

impl RewardPolicy {
    pub fn reward(self, current_score: f64, previous_score: f64) -> f64 {
        match self {
            RewardPolicy::ScoreGain => current_score - previous_score,
            RewardPolicy::ScoreLoss => previous_score - current_score,
        }
    }
}

/// Substitution applied when the controller replies with an illegal action.
///
/// The choice between standing still and picking a random legal move is an
/// explicit per-proxy configuration; both roles default to [`Stop`].
///
/// [`Stop`]: FallbackPolicy::Stop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackPolicy {
    #[default]
    Stop,
    RandomLegal,
}

impl FallbackPolicy {
    fn resolve(self, legal_actions: &[Direction], rng: &mut StdRng) -> Direction {
        match self {
            FallbackPolicy::Stop => Direction::Stop,
            FallbackPolicy::RandomLegal => legal_actions
                .choose(rng)
                .copied()
                .unwrap_or(Direction::Stop),
        }
    }
}

/// Per-agent proxy embedded in the environment process.
///
/// Owns one transport endpoint. Every call that touches the messenger blocks
/// until the decision process replies; there is no retry layer, so a failed
/// exchange aborts the run.
pub struct AdapterAgent {
    encoder: StateEncoder,
    messenger: Box<dyn Messenger + Send>,
    reward_policy: RewardPolicy,
    fallback: FallbackPolicy,
    initial_action: Direction,
    previous_action: Direction,
    previous_score: f64,
    test_mode: bool,
    invalid_reply: bool,
    rng: StdRng,
}

impl AdapterAgent {
    /// Proxy for the hunted agent (index 0).
    pub fn hunted(messenger: Box<dyn Messenger + Send>, noise: PositionNoise) -> Self {
        Self::new(
            HUNTED_INDEX,
            messenger,
            noise,
            RewardPolicy::ScoreGain,
            Direction::Stop,
        )
    }

    /// Proxy for a hunter agent (index 1 and upward).
    pub fn hunter(agent_id: usize, messenger: Box<dyn Messenger + Send>, noise: PositionNoise) -> Self {
        Self::new(
            agent_id,
            messenger,
            noise,
            RewardPolicy::ScoreLoss,
            Direction::North,
        )
    }

    fn new(
        agent_id: usize,
        messenger: Box<dyn Messenger + Send>,
        noise: PositionNoise,
        reward_policy: RewardPolicy,
        initial_action: Direction,
    ) -> Self {
        Self {
            encoder: StateEncoder::new(agent_id, noise),
            messenger,
            reward_policy,
            fallback: FallbackPolicy::default(),
            initial_action,
            previous_action: initial_action,
            previous_score: 0.0,
            test_mode: false,
            invalid_reply: false,
            rng: StdRng::from_rng(&mut rand::rng()),
        }
    }

    /// Select the illegal-reply substitution policy.
    pub fn with_fallback(mut self, fallback: FallbackPolicy) -> Self {
        self.fallback = fallback;
        self
    }

    /// Seed the fallback RNG for reproducible runs.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn agent_id(&self) -> usize {
        self.encoder.agent_id()
    }

    /// Whether the most recent reply had to be substituted.
    pub fn last_reply_was_invalid(&self) -> bool {
        self.invalid_reply
    }

    /// Reset bookkeeping and run the game-start handshake.
    ///
    /// The reply payload is discarded; receipt is all the proxy needs.
    pub fn start_game(&mut self, layout: Layout) -> Result<()> {
        self.previous_score = 0.0;
        self.previous_action = self.initial_action;
        let msg = Message::GameStart(GameStartMessage {
            agent_id: self.agent_id(),
            map_width: layout.width,
            map_height: layout.height,
        });
        self.messenger.exchange(&msg)?;
        Ok(())
    }

    /// Run one step exchange and return a legal action to apply.
    ///
    /// The replied action is recorded as the previous action before the
    /// legality check, so the next state message reports what the controller
    /// chose even when the substitution kicks in.
    pub fn get_action(&mut self, state: &dyn EnvironmentState) -> Result<Direction> {
        let msg = Message::State(self.create_state_message(state));
        let reply = self.expect_action(self.messenger.exchange(&msg)?)?;

        self.previous_action = reply.action;

        let legal_actions = state.legal_actions(self.agent_id());
        if legal_actions.contains(&reply.action) {
            self.invalid_reply = false;
            Ok(reply.action)
        } else {
            self.invalid_reply = true;
            Ok(self.fallback.resolve(&legal_actions, &mut self.rng))
        }
    }

    /// Observe-only step exchange: pushes state, discards the replied action.
    ///
    /// Used to keep a controller's learning in sync for steps whose
    /// on-environment action was not chosen by it. Reward bookkeeping is
    /// refreshed exactly as in [`get_action`](Self::get_action).
    pub fn update(&mut self, state: &dyn EnvironmentState) -> Result<()> {
        let msg = Message::State(self.create_state_message(state));
        self.expect_action(self.messenger.exchange(&msg)?)?;
        Ok(())
    }

    /// Mark subsequent state messages as evaluation steps.
    pub fn enable_test_mode(&mut self) {
        self.test_mode = true;
    }

    /// Mark subsequent state messages as learning steps.
    pub fn enable_learn_mode(&mut self) {
        self.test_mode = false;
    }

    fn create_state_message(&mut self, state: &dyn EnvironmentState) -> StateMessage {
        let reward = self.reward_policy.reward(state.score(), self.previous_score);
        self.previous_score = state.score();
        self.encoder
            .encode(state, reward, self.previous_action, self.test_mode)
    }

    fn expect_action(&self, reply: Message) -> Result<ActionReply> {
        match reply {
            Message::Action(action) => Ok(action),
            other => Err(Error::UnexpectedMessage {
                expected: "action",
                got: other.kind(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reward_sign_is_role_specific() {
        assert_eq!(RewardPolicy::ScoreGain.reward(10.0, 6.0), 4.0);
        assert_eq!(RewardPolicy::ScoreLoss.reward(10.0, 6.0), -4.0);
    }

    #[test]
    fn stop_fallback_ignores_legal_actions() {
        let mut rng = StdRng::seed_from_u64(0);
        let legal = [Direction::North, Direction::East];
        assert_eq!(FallbackPolicy::Stop.resolve(&legal, &mut rng), Direction::Stop);
    }

    #[test]
    fn random_fallback_picks_a_legal_action() {
        let mut rng = StdRng::seed_from_u64(0);
        let legal = [Direction::North, Direction::East];
        for _ in 0..20 {
            let action = FallbackPolicy::RandomLegal.resolve(&legal, &mut rng);
            assert!(legal.contains(&action));
        }
        assert_eq!(
            FallbackPolicy::RandomLegal.resolve(&[], &mut rng),
            Direction::Stop
        );
    }
}
